//! Tab completion.
//!
//! The token under the cursor is the last whitespace-separated token of the
//! input. As the first token it completes command names; after a command it
//! completes repository names.

use crate::command::command_names_with_prefix;
use crate::index::RepoIndex;

/// Maximum number of candidates listed for an ambiguous completion.
pub const COMPLETION_LIMIT: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Nothing,
    /// Replace the input from byte offset `start` with `replacement`.
    Unique { start: usize, replacement: String },
    /// Several matches; at most [`COMPLETION_LIMIT`] are listed.
    Candidates { start: usize, candidates: Vec<String> },
}

/// Completes the last token of `input`.
pub fn complete(input: &str, index: &RepoIndex) -> Completion {
    let start = input
        .rfind(char::is_whitespace)
        .map(|pos| pos + input[pos..].chars().next().map_or(1, char::len_utf8))
        .unwrap_or(0);
    let token = &input[start..];
    let is_command = input[..start].trim().is_empty();

    let mut matches: Vec<String> = if is_command {
        command_names_with_prefix(token)
            .into_iter()
            .map(str::to_string)
            .collect()
    } else {
        if token.is_empty() {
            return Completion::Nothing;
        }
        index
            .with_prefix(token)
            .into_iter()
            .map(|repo| repo.name.clone())
            .collect()
    };

    match matches.len() {
        0 => Completion::Nothing,
        1 => Completion::Unique {
            start,
            replacement: matches.remove(0),
        },
        _ => {
            matches.truncate(COMPLETION_LIMIT);
            Completion::Candidates {
                start,
                candidates: matches,
            }
        }
    }
}
