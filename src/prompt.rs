//! Line-based interactive prompts.
//!
//! Reads from any `BufRead` and writes to any `Write` so the flows can be
//! driven from tests; [`Prompt::stdio`] wires them to the terminal. End of
//! input is treated as the user cancelling.

use crate::error::{ContribError, Result};
use crate::model::{Affiliation, ContributionKind, KindSelection, DEFAULT_AFFILIATION};
use crate::util::parse_since_date;
use chrono::{DateTime, Utc};
use console::{style, Term};
use std::io::{self, BufRead, StdinLock, Write};

pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<StdinLock<'static>, Term> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), Term::stderr())
    }
}

const AFFILIATION_PRESETS: &[(&str, &str)] = &[
    ("All (owner + collaborator + organization member)", DEFAULT_AFFILIATION),
    ("Owned + Collaborator (exclude organization repos)", "owner,collaborator"),
    ("Only owned repositories", "owner"),
    ("Only collaborator repositories", "collaborator"),
    ("Custom (comma-separated)", ""),
];

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_answer(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ContribError::Cancelled);
        }
        Ok(line.trim().to_string())
    }

    fn ask(&mut self, question: &str, hint: &str) -> Result<String> {
        write!(self.output, "{} {} ", style("?").green(), style(question).bold())?;
        if !hint.is_empty() {
            write!(self.output, "{} ", style(hint).dim())?;
        }
        self.output.flush()?;
        self.read_answer()
    }

    fn complain(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "  {}", style(message).red())?;
        Ok(())
    }

    /// Pick one option by number. Empty input takes `default`.
    pub fn select(&mut self, question: &str, options: &[&str], default: usize) -> Result<usize> {
        loop {
            for (i, option) in options.iter().enumerate() {
                let marker = if i == default { ">" } else { " " };
                writeln!(self.output, "  {marker} {}) {option}", i + 1)?;
            }
            let answer = self.ask(question, &format!("[{}]", default + 1))?;
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => self.complain(&format!("Enter a number between 1 and {}", options.len()))?,
            }
        }
    }

    /// Toggle-free checklist: the answer is the full list of chosen numbers.
    /// Empty input keeps the pre-checked defaults. At least one is required.
    pub fn multi_select(&mut self, question: &str, options: &[(&str, bool)]) -> Result<Vec<bool>> {
        loop {
            for (i, (label, checked)) in options.iter().enumerate() {
                let mark = if *checked { "x" } else { " " };
                writeln!(self.output, "  [{mark}] {}) {label}", i + 1)?;
            }
            let answer = self.ask(question, "(comma-separated numbers)")?;

            let chosen: Option<Vec<bool>> = if answer.is_empty() {
                Some(options.iter().map(|(_, checked)| *checked).collect())
            } else {
                let mut picks = vec![false; options.len()];
                answer
                    .split(',')
                    .map(|t| t.trim().parse::<usize>().ok().filter(|n| (1..=options.len()).contains(n)))
                    .try_for_each(|n| n.map(|n| picks[n - 1] = true))
                    .map(|_| picks)
            };

            match chosen {
                Some(picks) if picks.iter().any(|p| *p) => return Ok(picks),
                _ => self.complain("Please select at least one option")?,
            }
        }
    }

    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "(Y/n)" } else { "(y/N)" };
        loop {
            match self.ask(question, hint)?.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.complain("Please answer y or n")?,
            }
        }
    }

    /// Ask until `parse` accepts the answer.
    pub fn text<T>(&mut self, question: &str, parse: impl Fn(&str) -> Result<T>) -> Result<T> {
        loop {
            let answer = self.ask(question, "")?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => self.complain(&e.to_string())?,
            }
        }
    }

    fn kinds(&mut self, question: &str, options: &[(ContributionKind, bool)]) -> Result<KindSelection> {
        let labels: Vec<(&str, bool)> = options.iter().map(|(k, c)| (k.title(), *c)).collect();
        let picks = self.multi_select(question, &labels)?;

        let mut selection = KindSelection::default();
        for ((kind, _), picked) in options.iter().zip(picks) {
            selection.set(*kind, picked);
        }
        Ok(selection)
    }

    /// Kinds, optional since-date, and affiliation for a fetch.
    pub fn fetch_options(&mut self) -> Result<(KindSelection, Option<DateTime<Utc>>, Affiliation)> {
        let kinds = self.kinds(
            "What would you like to fetch?",
            &[
                (ContributionKind::Commit, true),
                (ContributionKind::PullRequest, false),
                (ContributionKind::CodeReview, false),
            ],
        )?;

        let since = if self.confirm("Do you want to filter by date?", false)? {
            Some(self.text("Enter start date (YYYY-MM-DDTHH:MM:SSZ):", parse_since_date)?)
        } else {
            None
        };

        let labels: Vec<&str> = AFFILIATION_PRESETS.iter().map(|(label, _)| *label).collect();
        let choice = self.select("Which repositories should be included?", &labels, 1)?;
        let affiliation = match AFFILIATION_PRESETS[choice].1 {
            "" => self.text(
                "Enter affiliations (comma-separated: owner,collaborator,organization_member):",
                Affiliation::parse,
            )?,
            preset => Affiliation::parse(preset)?,
        };

        Ok((kinds, since, affiliation))
    }

    /// Offer only kinds whose CSV exists; skip the question when there is one.
    pub fn import_kinds(&mut self, available: &KindSelection) -> Result<KindSelection> {
        let options: Vec<(ContributionKind, bool)> =
            available.kinds().into_iter().map(|k| (k, true)).collect();
        if options.len() <= 1 {
            return Ok(*available);
        }
        self.kinds("Which contributions would you like to import?", &options)
    }

    pub fn commit_kinds(&mut self) -> Result<KindSelection> {
        let options: Vec<(ContributionKind, bool)> =
            ContributionKind::ALL.into_iter().map(|k| (k, true)).collect();
        self.kinds("Which contributions would you like to commit?", &options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn prompt(input: &str) -> Prompt<Cursor<Vec<u8>>, Vec<u8>> {
        Prompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn empty_answer_takes_defaults() {
        let (kinds, since, affiliation) = prompt("\n\n\n").fetch_options().unwrap();
        assert_eq!(kinds, KindSelection::commits_only());
        assert_eq!(since, None);
        assert_eq!(affiliation.to_string(), "owner,collaborator");
    }

    #[test]
    fn invalid_date_is_asked_again() {
        let input = "2,3\ny\n2024-01-01\n2024-01-01T00:00:00Z\n5\nowner\n";
        let (kinds, since, affiliation) = prompt(input).fetch_options().unwrap();
        assert!(!kinds.commits && kinds.pull_requests && kinds.code_reviews);
        assert_eq!(since, Some(parse_since_date("2024-01-01T00:00:00Z").unwrap()));
        assert_eq!(affiliation.to_string(), "owner");
    }

    #[test]
    fn end_of_input_cancels() {
        assert!(matches!(
            prompt("").commit_kinds(),
            Err(ContribError::Cancelled)
        ));
    }

    #[test]
    fn out_of_range_choice_is_rejected() {
        let picks = prompt("7\n0,1\n2\n")
            .multi_select("pick", &[("a", false), ("b", false)])
            .unwrap();
        assert_eq!(picks, vec![false, true]);
    }

    #[test]
    fn single_available_import_skips_question() {
        let available = KindSelection {
            commits: false,
            pull_requests: false,
            code_reviews: true,
        };
        assert_eq!(prompt("").import_kinds(&available).unwrap(), available);
    }
}
