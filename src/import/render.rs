use crate::csv::Row;
use crate::util::{display_date, filename_stamp};

pub fn is_valid_commit(row: &Row) -> bool {
    !row.get("author_date").is_empty() && !row.get("short_sha").is_empty()
}

pub fn is_valid_pull_request(row: &Row) -> bool {
    !row.get("author_date").is_empty() && !row.get("short_sha").is_empty()
}

pub fn is_valid_code_review(row: &Row) -> bool {
    !row.get("submitted_at").is_empty() && !row.get("review_id").is_empty()
}

pub fn commit_file_name(row: &Row) -> String {
    format!("{}-{}.md", filename_stamp(row.get("author_date")), row.get("short_sha"))
}

pub fn pull_request_file_name(row: &Row) -> String {
    format!("{}-{}.md", filename_stamp(row.get("author_date")), row.get("short_sha"))
}

pub fn code_review_file_name(row: &Row) -> String {
    format!("{}-{}.md", filename_stamp(row.get("submitted_at")), row.get("review_id"))
}

pub fn render_commit(row: &Row) -> String {
    format!(
        "# Commit\n\
         \n\
         - **Date**: {date}\n\
         - **SHA**: `{short}`\n\
         - **Full SHA**: `{sha}`\n\
         - **Author**: {author}\n\
         - **Repository**: {repo}\n\
         - **Message**: {message}\n",
        date = display_date(row.get("author_date")),
        short = row.get("short_sha"),
        sha = row.get("sha"),
        author = row.get("author_name"),
        repo = row.get("repo"),
        message = row.get("message_first_line"),
    )
}

pub fn render_pull_request(row: &Row) -> String {
    let sha = row.get("sha");
    let sha_line = if sha.is_empty() {
        String::new()
    } else {
        format!("- **Full SHA**: `{sha}`\n")
    };

    format!(
        "# Pull Request\n\
         \n\
         - **Date**: {date}\n\
         - **SHA**: `{short}`\n\
         {sha_line}\
         - **Author**: {author}\n\
         - **Repository**: {repo}\n\
         - **Title**: {title}\n\
         - **State**: {state}\n",
        date = display_date(row.get("author_date")),
        short = row.get("short_sha"),
        author = row.get("author_name"),
        repo = row.get("repo"),
        title = row.get("title"),
        state = row.get("state"),
    )
}

pub fn render_code_review(row: &Row) -> String {
    format!(
        "# Code Review\n\
         \n\
         - **Date**: {date}\n\
         - **Review ID**: `{id}`\n\
         - **State**: {state}\n\
         - **Repository**: {repo}\n\
         - **Pull Request**: #{number} {title}\n",
        date = display_date(row.get("submitted_at")),
        id = row.get("review_id"),
        state = row.get("state"),
        repo = row.get("repo"),
        number = row.get("pr_number"),
        title = row.get("pr_title"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn commit_file_name_encodes_timestamp() {
        let row: Row = [("author_date", "2024-03-01T12:00:00Z"), ("short_sha", "abc1234")]
            .into_iter()
            .collect();
        assert_eq!(commit_file_name(&row), "2024-03-01T12-00-00-abc1234.md");
    }

    #[test]
    fn file_names_sort_chronologically() {
        let early: Row = [("submitted_at", "2024-03-01T09:59:59Z"), ("review_id", "9")]
            .into_iter()
            .collect();
        let late: Row = [("submitted_at", "2024-03-01T10:00:00Z"), ("review_id", "1")]
            .into_iter()
            .collect();
        assert!(code_review_file_name(&early) < code_review_file_name(&late));
    }

    #[test]
    fn validation_requires_timestamp_and_id() {
        let missing_sha: Row = [("author_date", "2024-03-01T12:00:00Z")].into_iter().collect();
        assert!(!is_valid_commit(&missing_sha));
        let missing_date: Row = [("review_id", "3")].into_iter().collect();
        assert!(!is_valid_code_review(&missing_date));
    }

    #[test]
    fn pull_request_omits_empty_full_sha() {
        let row: Row = [
            ("author_date", "2024-03-01T12:00:00Z"),
            ("short_sha", "pr-5"),
            ("author_name", "octo"),
        ]
        .into_iter()
        .collect();
        let md = render_pull_request(&row);
        assert!(md.starts_with("# Pull Request\n\n- **Date**: 2024-03-01 12:00:00\n"));
        assert!(!md.contains("Full SHA"));
    }

    #[test]
    fn unparseable_date_is_shown_raw() {
        let row: Row = [("submitted_at", "sometime"), ("review_id", "3")].into_iter().collect();
        assert!(render_code_review(&row).contains("- **Date**: sometime\n"));
    }
}
