//! Parsing of submitted lines into typed commands.
//!
//! Arguments are validated once here, so handlers receive a ready payload
//! instead of raw tokens.

use crate::filter::{parse_assignment, FilterKey};

/// Static description of a command, used by `help` and completion.
#[derive(Debug, Clone, Copy)]
pub struct CommandInfo {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
}

pub const COMMANDS: &[CommandInfo] = &[
    CommandInfo { name: "help", usage: "help", summary: "list available commands" },
    CommandInfo { name: "ls", usage: "ls [-l]", summary: "list repositories, newest first" },
    CommandInfo { name: "repo", usage: "repo <name>", summary: "show details for a repository" },
    CommandInfo { name: "open", usage: "open <name>", summary: "open a repository in the browser" },
    CommandInfo {
        name: "filter",
        usage: "filter [key=value...|clear]",
        summary: "filter ls by language, fork or year",
    },
    CommandInfo { name: "graph", usage: "graph [lang]", summary: "chart repositories per language" },
    CommandInfo { name: "timeline", usage: "timeline", summary: "recently pushed repositories" },
    CommandInfo { name: "random", usage: "random", summary: "show a random repository" },
    CommandInfo { name: "stats", usage: "stats", summary: "collection summary" },
    CommandInfo { name: "about", usage: "about", summary: "about this terminal" },
    CommandInfo { name: "skills", usage: "skills", summary: "stack and languages in use" },
    CommandInfo { name: "explore", usage: "explore", summary: "guided tour (ctrl+c to abort)" },
    CommandInfo { name: "clear", usage: "clear", summary: "clear the screen" },
];

/// What `filter` was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    Show,
    Clear,
    /// Recognised assignments, in the order given.
    Set(Vec<(FilterKey, String)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphKind {
    Language,
    Unknown(String),
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Ls { long: bool },
    Repo { name: Option<String> },
    Open { name: Option<String> },
    Filter(FilterAction),
    Graph(GraphKind),
    Timeline,
    Random,
    Stats,
    About,
    Skills,
    Clear,
    Explore,
    /// The first token did not name a command.
    Unknown(String),
}

/// Parses a raw input line. Returns `None` for empty or whitespace-only input.
pub fn parse(line: &str) -> Option<Command> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?.to_lowercase();
    let args: Vec<&str> = tokens.collect();

    let command = match name.as_str() {
        "help" => Command::Help,
        "ls" => Command::Ls {
            long: args.contains(&"-l"),
        },
        "repo" => Command::Repo {
            name: args.first().map(|s| s.to_string()),
        },
        "open" => Command::Open {
            name: args.first().map(|s| s.to_string()),
        },
        "filter" => Command::Filter(parse_filter_args(&args)),
        "graph" => Command::Graph(match args.first() {
            None => GraphKind::Language,
            Some(kind) if matches!(kind.to_lowercase().as_str(), "lang" | "language") => {
                GraphKind::Language
            }
            Some(kind) => GraphKind::Unknown(kind.to_string()),
        }),
        "timeline" => Command::Timeline,
        "random" => Command::Random,
        "stats" => Command::Stats,
        "about" => Command::About,
        "skills" => Command::Skills,
        "clear" => Command::Clear,
        "explore" => Command::Explore,
        _ => Command::Unknown(line.split_whitespace().next().unwrap_or_default().to_string()),
    };
    Some(command)
}

fn parse_filter_args(args: &[&str]) -> FilterAction {
    match args {
        [] => FilterAction::Show,
        [single] if single.eq_ignore_ascii_case("clear") => FilterAction::Clear,
        tokens => FilterAction::Set(tokens.iter().filter_map(|t| parse_assignment(t)).collect()),
    }
}

/// Names of all commands starting with `prefix` (case-insensitive).
pub fn command_names_with_prefix(prefix: &str) -> Vec<&'static str> {
    let prefix = prefix.to_lowercase();
    COMMANDS
        .iter()
        .map(|info| info.name)
        .filter(|name| name.starts_with(&prefix))
        .collect()
}
