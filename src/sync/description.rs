//! Navigation block rendering and splicing
//!
//! The block lives between two fixed HTML-comment markers inside each pull
//! request description. Text outside the markers belongs to the user and is
//! never touched.

use crate::types::{Platform, PullRequest};
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

/// Opening marker of the managed section
pub const BEGIN_MARKER: &str = "<!-- DO NOT EDIT: generated by git stack push (start)-->";

/// Closing marker of the managed section
pub const END_MARKER: &str = "<!-- DO NOT EDIT: generated by git stack push (end) -->";

static SECTION: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        "(?s){}.*?{}",
        regex::escape(BEGIN_MARKER),
        regex::escape(END_MARKER)
    );
    Regex::new(&pattern).expect("marker pattern is a valid regex")
});

/// Heading line above the list of requests
pub const fn stack_heading(platform: Platform) -> &'static str {
    match platform {
        Platform::GitHub => "Pull request stack:",
        Platform::GitLab => "Merge request stack:",
    }
}

/// Render the marked navigation block for `current`
///
/// `prs` is rendered in the order given. The entry before `current` is
/// labelled `Next`, the one after it `Prev`. A single-entry stack renders
/// an empty block.
pub fn render_navigation(current: &PullRequest, prs: &[PullRequest], heading: &str) -> String {
    let body = if prs.len() <= 1 {
        String::new()
    } else {
        let current_index = prs
            .iter()
            .position(|pr| pr.source_branch == current.source_branch);

        let lines: Vec<String> = prs
            .iter()
            .enumerate()
            .map(|(i, pr)| {
                let role = match current_index {
                    Some(c) if i == c => "Current: ",
                    Some(c) if i + 1 == c => "Next: ",
                    Some(c) if i == c + 1 => "Prev: ",
                    _ => "",
                };
                format!("- {role}{}", pr.markdown_web_url)
            })
            .collect();

        format!("{heading}\n{}", lines.join("\n"))
    };

    format!("{BEGIN_MARKER}\n{body}\n{END_MARKER}")
}

/// Put `block` into `description`
///
/// Replaces the first existing marker pair (markers included); otherwise
/// appends the block after a blank line.
pub fn splice_navigation(description: &str, block: &str) -> String {
    if SECTION.is_match(description) {
        SECTION.replace(description, NoExpand(block)).into_owned()
    } else {
        format!("{}\n\n{block}", description.trim_end())
    }
}

/// New description for `current` given the full ordered list of requests
pub fn format_description(current: &PullRequest, prs: &[PullRequest], heading: &str) -> String {
    splice_navigation(&current.description, &render_navigation(current, prs, heading))
}
