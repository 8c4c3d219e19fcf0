use crate::config::{Config, Workspace};
use crate::export::export_contributions;
use crate::git::{collect_files, replay, GitCli};
use crate::github::{fetch_contributions, FetchOptions, GitHubClient};
use crate::import::{import_items, select_kinds, ImportPlan, ImportStats};
use crate::model::{Affiliation, ContributionKind, KindSelection};
use crate::prompt::Prompt;
use crate::report;
use crate::util::parse_since_date;
use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use console::style;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "contrib-replay")]
#[command(about = "Fetch your contributions from GitHub and replay them as dated commits")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Workspace root holding exports/ and contributions/ (default: current dir)")]
    pub root: Option<PathBuf>,

    #[arg(long, short, global = true, help = "Enable debug logging")]
    pub verbose: bool,
}

#[derive(Args, Clone, Default)]
pub struct FetchArgs {
    #[arg(help = "Only contributions since this instant (YYYY-MM-DDTHH:MM:SSZ)")]
    pub since: Option<String>,

    #[arg(help = "Repository affiliation: owner,collaborator,organization_member")]
    pub affiliation: Option<String>,

    #[arg(help = "commits, prs, reviews, all, or comma-separated (default: commits)")]
    pub types: Option<String>,
}

impl FetchArgs {
    fn is_empty(&self) -> bool {
        self.since.is_none() && self.affiliation.is_none() && self.types.is_none()
    }
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Fetch contributions from GitHub into exports/*.csv
    Fetch(FetchArgs),
    /// Turn exported CSV rows into markdown files (consumes the CSVs)
    Import {
        #[arg(help = "commits, prs, reviews, all, or comma-separated (default: every CSV present)")]
        types: Option<String>,
    },
    /// Commit contribution files to git with their original dates
    Commit {
        #[arg(help = "commits, prs, reviews, all, or comma-separated (default: all)")]
        types: Option<String>,
    },
    /// Fetch and then import
    Both(FetchArgs),
    /// Fetch, import, then commit
    Full(FetchArgs),
}

const OPERATIONS: &[&str] = &[
    "Fetch contributions from GitHub",
    "Import contributions from CSV",
    "Commit contributions to git",
    "Fetch and then import",
    "Full workflow (fetch → import → commit)",
];

impl Cli {
    /// Like `Parser::parse`, but operation names are case-insensitive and an
    /// unknown operation exits 1 and names the valid ones.
    pub fn parse() -> Self {
        match <Self as Parser>::try_parse_from(normalize_operation(std::env::args_os().collect())) {
            Ok(cli) => cli,
            Err(e) if e.kind() == ErrorKind::InvalidSubcommand => {
                let _ = e.print();
                let valid: Vec<String> = Self::command()
                    .get_subcommands()
                    .map(|c| c.get_name().to_string())
                    .collect();
                eprintln!("\nValid operations: {}", valid.join(", "));
                std::process::exit(1);
            }
            Err(e) => e.exit(),
        }
    }

    pub fn execute(self) -> Result<()> {
        let workspace = Workspace::new(self.common.root.as_ref())
            .context("Failed to resolve workspace root")?;

        let command = match self.command {
            Some(command) => command,
            None => prompt_operation()?,
        };

        match command {
            Commands::Fetch(args) => {
                run_fetch(&workspace, &args)?;
            }
            Commands::Import { types } => {
                let kinds = resolve_import_kinds(&workspace, types.as_deref())?;
                run_import(&workspace, &kinds)?;
            }
            Commands::Commit { types } => {
                let kinds = match types.as_deref() {
                    Some(t) => KindSelection::parse(t)?,
                    None => Prompt::stdio().commit_kinds()?,
                };
                run_commit(&workspace, &kinds)?;
            }
            Commands::Both(args) => {
                let kinds = run_fetch(&workspace, &args)?;
                report::stage_banner("import");
                run_import(&workspace, &kinds)?;
                report::all_complete();
            }
            Commands::Full(args) => {
                let kinds = run_fetch(&workspace, &args)?;
                report::stage_banner("import");
                run_import(&workspace, &kinds)?;
                report::stage_banner("commit");
                run_commit(&workspace, &kinds)?;
                report::all_complete();
            }
        }

        Ok(())
    }
}

/// Lower-case the operation argument when it names a subcommand in any case.
fn normalize_operation(mut args: Vec<OsString>) -> Vec<OsString> {
    let names: Vec<String> = Cli::command()
        .get_subcommands()
        .map(|c| c.get_name().to_string())
        .collect();

    let mut i = 1;
    while i < args.len() {
        let Some(arg) = args[i].to_str() else {
            break;
        };
        if arg == "--root" {
            i += 2;
            continue;
        }
        if arg.starts_with('-') {
            i += 1;
            continue;
        }
        let lower = arg.to_lowercase();
        if names.contains(&lower) {
            args[i] = lower.into();
        }
        break;
    }
    args
}

fn prompt_operation() -> Result<Commands> {
    println!("{}", style("contrib-replay").cyan().bold());
    println!("{}\n", style("Replay your GitHub contributions as local git history").dim());

    let choice = Prompt::stdio().select("What would you like to do?", OPERATIONS, 0)?;
    Ok(match choice {
        0 => Commands::Fetch(FetchArgs::default()),
        1 => Commands::Import { types: None },
        2 => Commands::Commit { types: None },
        3 => Commands::Both(FetchArgs::default()),
        _ => Commands::Full(FetchArgs::default()),
    })
}

/// Turn positional fetch arguments into options, or ask when none were given.
fn resolve_fetch_args(args: &FetchArgs) -> Result<(KindSelection, Option<chrono::DateTime<chrono::Utc>>, Affiliation)> {
    if args.is_empty() {
        return Ok(Prompt::stdio().fetch_options()?);
    }

    let since = args.since.as_deref().map(parse_since_date).transpose()?;
    let affiliation = match args.affiliation.as_deref() {
        Some(a) => Affiliation::parse(a)?,
        None => Affiliation::default(),
    };
    let kinds = match args.types.as_deref() {
        Some(t) => KindSelection::parse(t)?,
        None => KindSelection::commits_only(),
    };
    Ok((kinds, since, affiliation))
}

/// Fetch and export. Returns the kinds that now have a CSV on disk.
fn run_fetch(workspace: &Workspace, args: &FetchArgs) -> Result<KindSelection> {
    let (kinds, since, affiliation) = resolve_fetch_args(args)?;
    let config = Config::from_env()?;

    let opts = FetchOptions {
        username: config.username.clone(),
        affiliation,
        since,
        kinds,
    };
    report::fetch_config(&opts);

    let client = GitHubClient::new(&config);
    let result = fetch_contributions(&client, &opts).context("Failed to fetch contributions")?;
    report::fetch_summary(&opts, &result);

    let files = export_contributions(workspace, &kinds, &result).context("Failed to export CSV files")?;
    report::fetch_completion(&result, &files);

    Ok(kinds)
}

fn resolve_import_kinds(workspace: &Workspace, types: Option<&str>) -> Result<KindSelection> {
    match types {
        Some(t) => Ok(select_kinds(workspace, Some(t))?),
        None => {
            let available = select_kinds(workspace, None)?;
            Ok(Prompt::stdio().import_kinds(&available)?)
        }
    }
}

fn run_import(workspace: &Workspace, kinds: &KindSelection) -> Result<Vec<(ContributionKind, ImportStats)>> {
    report::import_config(kinds);

    let mut results = Vec::new();
    for kind in kinds.kinds() {
        println!("Importing {}...", style(kind.label()).bold());
        let plan = ImportPlan::for_kind(workspace, kind);
        let stats = import_items(&plan).with_context(|| format!("Failed to import {kind}"))?;
        results.push((kind, stats));
    }

    report::import_summary(&results);
    Ok(results)
}

fn run_commit(workspace: &Workspace, kinds: &KindSelection) -> Result<()> {
    let git = GitCli::open(Some(workspace.root())).context("Failed to open git repository")?;
    let files = collect_files(workspace, kinds).context("Failed to scan contribution files")?;

    if files.is_empty() {
        println!("{} No contribution files found to commit", style("Warning:").yellow());
        return Ok(());
    }
    println!("\nFound {} contribution file(s) to commit\n", files.len());

    let stats = replay(&git, files);
    report::replay_summary(&stats);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn operation_name_is_case_insensitive() {
        assert_eq!(
            normalize_operation(args(&["contrib-replay", "--root", "Full", "FETCH", "2024-01-01T00:00:00Z"])),
            args(&["contrib-replay", "--root", "Full", "fetch", "2024-01-01T00:00:00Z"])
        );
        assert_eq!(
            normalize_operation(args(&["contrib-replay", "-v", "Import", "ALL"])),
            args(&["contrib-replay", "-v", "import", "ALL"])
        );
    }

    #[test]
    fn unknown_operation_is_left_for_clap_to_reject() {
        let normalized = normalize_operation(args(&["contrib-replay", "Bogus"]));
        assert_eq!(normalized, args(&["contrib-replay", "Bogus"]));
        let err = <Cli as Parser>::try_parse_from(normalized).err().map(|e| e.kind());
        assert_eq!(err, Some(ErrorKind::InvalidSubcommand));
    }
}
