use crate::export::ExportedFile;
use crate::git::ReplayStats;
use crate::github::{FetchResult, FetchOptions};
use crate::import::ImportStats;
use crate::model::{ContributionKind, KindSelection};
use crate::util::to_iso;
use console::style;
use std::time::Duration;

fn rule(c: &str) -> String {
    c.repeat(60)
}

fn elapsed(d: Duration) -> String {
    humantime::format_duration(Duration::from_millis(d.as_millis() as u64)).to_string()
}

pub fn fetch_config(opts: &FetchOptions) {
    println!("\n{}", rule("─"));
    println!("{}", style("Configuration").bold());
    println!("   User: {}", style(&opts.username).cyan());
    println!("   Fetching: {}", opts.kinds.titles().join(", "));
    if let Some(since) = &opts.since {
        println!("   Date filter: {}", to_iso(since));
    }
    println!("   Repository affiliation: {}", opts.affiliation);
    println!("{}\n", rule("─"));
}

pub fn fetch_summary(opts: &FetchOptions, result: &FetchResult) {
    let stats = &result.stats;
    println!("\n{}", rule("═"));
    println!("{}", style("Summary").bold());
    if opts.kinds.commits {
        println!("   Repositories processed: {}", stats.repos_processed);
        println!("   Repositories with commits: {}", stats.repos_with_commits);
        println!("   Total commits found: {}", style(result.commits.len()).cyan());
    }
    if opts.kinds.pull_requests {
        println!("   Total pull requests found: {}", style(result.pull_requests.len()).cyan());
    }
    if opts.kinds.code_reviews {
        println!("   Total code reviews found: {}", style(result.code_reviews.len()).cyan());
    }
    if stats.search_truncated > 0 {
        println!(
            "   {} {} older pull requests are beyond the search limit and were not fetched",
            style("Warning:").yellow(),
            stats.search_truncated
        );
    }
    if stats.prs_degraded > 0 {
        println!(
            "   Pull requests from search data only (details unavailable): {}",
            style(stats.prs_degraded).yellow()
        );
    }
    if stats.search_skipped > 0 {
        println!(
            "   Search hits skipped (not a pull request): {}",
            style(stats.search_skipped).yellow()
        );
    }
    if stats.errors > 0 {
        println!("   Errors (skipped): {}", style(stats.errors).red());
    }
    println!("   Affiliation filter: {}", opts.affiliation);
    if let Some(since) = &opts.since {
        println!("   Filtered since: {}", to_iso(since));
    }
}

pub fn fetch_completion(result: &FetchResult, files: &[ExportedFile]) {
    println!("\n{}", rule("═"));
    println!("{}", style("Fetch Complete!").green().bold());
    println!("   Total time: {}", elapsed(result.stats.elapsed));
    if files.is_empty() {
        println!("   No data to export");
    } else {
        println!("   CSV files saved:");
        for file in files {
            println!(
                "     - {} ({} rows, {:.2} KB)",
                file.path.display(),
                file.rows,
                file.bytes as f64 / 1024.0
            );
        }
    }
    println!("{}\n", rule("═"));
}

pub fn import_config(kinds: &KindSelection) {
    println!("\n{}", rule("─"));
    println!("{}", style("Configuration").bold());
    println!("   Importing: {}", kinds.titles().join(", "));
    println!("{}\n", rule("─"));
}

pub fn import_summary(results: &[(ContributionKind, ImportStats)]) {
    println!("{}", rule("═"));
    println!("{}", style("Import Complete!").green().bold());
    println!("{}", rule("═"));

    if results.is_empty() {
        println!("\n{} No contributions were imported", style("Warning:").yellow());
    }
    for (kind, stats) in results {
        println!("\n{}", style(kind.title()).bold());
        println!("   Total in CSV: {}", stats.total);
        println!("   Imported: {}", style(stats.imported).green());
        println!("   Skipped (already exist): {}", stats.skipped);
        if stats.discarded > 0 {
            println!("   Discarded (invalid): {}", style(stats.discarded).yellow());
        }
    }
    println!();
}

pub fn replay_summary(stats: &ReplayStats) {
    println!("\n{}", rule("═"));
    println!("{}", style("Commit Summary").bold());
    println!("   Total files: {}", stats.total);
    println!("   Committed: {}", style(stats.committed).green());
    println!("   Skipped (already committed): {}", stats.skipped - stats.invalid);
    if stats.invalid > 0 {
        println!("   Skipped (invalid date prefix): {}", style(stats.invalid).yellow());
    }
    if stats.errors > 0 {
        println!("   Errors: {}", style(stats.errors).red());
    }
    println!("{}\n", rule("═"));
}

pub fn stage_banner(next: &str) {
    println!("\n{}", rule("="));
    println!("Proceeding to {next}...");
    println!("{}\n", rule("="));
}

pub fn all_complete() {
    println!("{}", rule("═"));
    println!("{}", style("All operations complete!").green().bold());
    println!("{}\n", rule("═"));
}
