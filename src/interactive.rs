//! Interactive override of the automatic candidate selection.

use crate::error::{PolysubError, Result};
use crate::select::CandidateDescriptor;
use console::style;
use dialoguer::Select;

/// Let the user confirm or override the selector's pick for one role.
///
/// The heuristic's choice is the default item, so plain Enter keeps the
/// automatic behavior. Returns the index of the chosen candidate.
pub fn confirm_candidate(
    role_label: &str,
    suggested: usize,
    candidates: &[CandidateDescriptor],
) -> Result<usize> {
    debug_assert!(suggested < candidates.len());

    println!(
        "{} {} subtitle candidates:",
        style("?").cyan(),
        style(role_label).bold()
    );

    let items: Vec<String> = candidates.iter().map(describe).collect();

    let chosen = Select::new()
        .with_prompt("Pick a candidate (Enter keeps the suggestion)")
        .items(&items)
        .default(suggested)
        .interact()
        .map_err(|e| PolysubError::Io(std::io::Error::other(e)))?;

    if chosen != suggested {
        println!(
            "{} overriding automatic pick with '{}'",
            style("!").yellow(),
            candidates[chosen].release_name
        );
    }

    Ok(chosen)
}

fn describe(candidate: &CandidateDescriptor) -> String {
    let name = if candidate.release_name.is_empty() {
        "(unnamed release)"
    } else {
        &candidate.release_name
    };
    format!("{} — {} downloads", name, candidate.download_count)
}
