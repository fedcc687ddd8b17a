//! Command handlers.
//!
//! Each handler reads the repository index and filter state and returns the
//! output events for one command. A handler `Err` is reported by the
//! interpreter as a command error; it never ends the session.

use crate::chart;
use crate::command::{Command, FilterAction, GraphKind, COMMANDS};
use crate::filter::FilterSet;
use crate::index::{Lookup, RepoIndex, AMBIGUOUS_DISPLAY_LIMIT};
use crate::output::OutputEvent;
use crate::providers::RandomSource;
use crate::repository::{sort_by_recent, Repository};
use anyhow::{bail, Result};
use std::collections::BTreeSet;

/// Number of entries shown by `timeline`.
pub const TIMELINE_LENGTH: usize = 12;

/// Static part of the `skills` output.
pub const STACK: &[&str] = &["Rust", "Python", "TypeScript", "SQL", "Docker", "Linux", "Git"];

const ABOUT: &[&str] = &[
    "repoterm: a terminal for browsing a list of repositories.",
    "Every entry comes from public repository metadata loaded at startup.",
    "Use 'ls', 'repo <name>' and 'graph' to look around, or 'explore' for a tour.",
];

pub const NO_REPOS: &str = "no repositories loaded";

/// State a handler may read or change.
pub struct HandlerContext<'a> {
    pub index: &'a RepoIndex,
    pub filters: &'a mut FilterSet,
    pub random: &'a dyn RandomSource,
}

/// Runs `command`. `explore` and unknown commands are handled by the
/// interpreter and produce no output here.
pub fn dispatch(command: &Command, ctx: &mut HandlerContext<'_>) -> Result<Vec<OutputEvent>> {
    match command {
        Command::Help => Ok(help()),
        Command::Ls { long } => Ok(ls(ctx.index, ctx.filters, *long)),
        Command::Repo { name } => Ok(repo(ctx.index, name.as_deref())),
        Command::Open { name } => Ok(open(ctx.index, name.as_deref())),
        Command::Filter(action) => Ok(filter(ctx.filters, action)),
        Command::Graph(kind) => Ok(graph(ctx.index, kind)),
        Command::Timeline => Ok(timeline(ctx.index)),
        Command::Random => random(ctx.index, ctx.random),
        Command::Stats => Ok(stats(ctx.index)),
        Command::About => Ok(ABOUT.iter().map(|line| OutputEvent::plain(*line)).collect()),
        Command::Skills => Ok(skills(ctx.index)),
        Command::Clear => Ok(vec![OutputEvent::Clear]),
        Command::Explore | Command::Unknown(_) => Ok(Vec::new()),
    }
}

fn help() -> Vec<OutputEvent> {
    let mut out = vec![OutputEvent::accent("available commands:")];
    out.extend(
        COMMANDS
            .iter()
            .map(|info| OutputEvent::plain(format!("  {:<28} {}", info.usage, info.summary))),
    );
    out
}

fn ls(index: &RepoIndex, filters: &FilterSet, long: bool) -> Vec<OutputEvent> {
    let mut out = Vec::new();
    if let Some(active) = filters.describe() {
        out.push(OutputEvent::muted(format!("filters: {}", active)));
    }
    if index.is_empty() {
        out.push(OutputEvent::warning(NO_REPOS));
        return out;
    }

    let matching = sort_by_recent(filters.apply(index.repos()));
    if matching.is_empty() {
        out.push(OutputEvent::warning("no matches for the current filters"));
        return out;
    }

    for repo in matching {
        if long {
            out.push(OutputEvent::plain(format!(
                "{:<28} {:<12} ★{:<5} {}",
                repo.name,
                repo.language().unwrap_or(chart::MISC_LABEL),
                repo.stargazers_count,
                repo.date_label()
            )));
        } else {
            out.push(OutputEvent::plain(repo.name.clone()));
        }
    }
    out
}

/// Full detail card for one repository.
pub fn repo_card(repo: &Repository) -> Vec<OutputEvent> {
    let mut out = vec![
        OutputEvent::accent(repo.name.clone()),
        OutputEvent::plain(format!("  {}", repo.description_or_default())),
        OutputEvent::muted(format!(
            "  [{}] [{}] [★ {}] [{}]",
            repo.language().unwrap_or(chart::MISC_LABEL),
            if repo.fork { "fork" } else { "orig" },
            repo.stargazers_count,
            repo.default_branch
        )),
        OutputEvent::muted(format!("  updated {}", repo.date_label())),
    ];
    if let Some(license) = repo.license_label() {
        out.push(OutputEvent::muted(format!("  license: {}", license)));
    }
    if !repo.topics.is_empty() {
        out.push(OutputEvent::muted(format!("  topics: {}", repo.topics.join(", "))));
    }
    if !repo.html_url.is_empty() {
        out.push(OutputEvent::accent(format!("  {}", repo.html_url)));
    }
    out
}

fn lookup_outcome(query: &str, lookup: Lookup<'_>) -> Vec<OutputEvent> {
    match lookup {
        Lookup::Found(repo) => repo_card(repo),
        Lookup::Ambiguous(candidates) => {
            let mut out = vec![OutputEvent::warning(format!(
                "'{}' matches {} repositories:",
                query,
                candidates.len()
            ))];
            out.extend(
                candidates
                    .iter()
                    .take(AMBIGUOUS_DISPLAY_LIMIT)
                    .map(|repo| OutputEvent::plain(format!("  {}", repo.name))),
            );
            if candidates.len() > AMBIGUOUS_DISPLAY_LIMIT {
                out.push(OutputEvent::muted(format!(
                    "  ...and {} more",
                    candidates.len() - AMBIGUOUS_DISPLAY_LIMIT
                )));
            }
            out
        }
        Lookup::NotFound => vec![OutputEvent::warning(format!(
            "no repository matching '{}'",
            query
        ))],
    }
}

fn repo(index: &RepoIndex, name: Option<&str>) -> Vec<OutputEvent> {
    let Some(name) = name else {
        return vec![OutputEvent::warning("usage: repo <name>")];
    };
    lookup_outcome(name, index.lookup(name))
}

fn open(index: &RepoIndex, name: Option<&str>) -> Vec<OutputEvent> {
    let Some(name) = name else {
        return vec![OutputEvent::warning("usage: open <name>")];
    };
    match index.lookup(name) {
        Lookup::Found(repo) if !repo.html_url.is_empty() => vec![
            OutputEvent::success(format!("opening {}", repo.html_url)),
            OutputEvent::OpenUrl(repo.html_url.clone()),
        ],
        other => lookup_outcome(name, other),
    }
}

fn filter(filters: &mut FilterSet, action: &FilterAction) -> Vec<OutputEvent> {
    match action {
        FilterAction::Show => {}
        FilterAction::Clear => {
            filters.clear();
            return vec![OutputEvent::success("filters cleared")];
        }
        FilterAction::Set(assignments) => {
            for (key, value) in assignments {
                filters.set(*key, value);
            }
        }
    }
    match filters.describe() {
        Some(active) => vec![OutputEvent::plain(format!("filters: {}", active))],
        None => vec![OutputEvent::muted("no filters")],
    }
}

fn graph(index: &RepoIndex, kind: &GraphKind) -> Vec<OutputEvent> {
    match kind {
        GraphKind::Unknown(kind) => vec![OutputEvent::warning(format!(
            "unknown graph '{}'. try: graph lang",
            kind
        ))],
        GraphKind::Language => {
            if index.is_empty() {
                return vec![OutputEvent::warning(NO_REPOS)];
            }
            let counts = chart::language_counts(index.repos());
            let mut out = vec![OutputEvent::accent(format!(
                "languages across {} repositories",
                index.len()
            ))];
            out.extend(chart::bar_chart(&counts).into_iter().map(OutputEvent::plain));
            out
        }
    }
}

fn timeline(index: &RepoIndex) -> Vec<OutputEvent> {
    if index.is_empty() {
        return vec![OutputEvent::warning(NO_REPOS)];
    }
    sort_by_recent(index.repos())
        .into_iter()
        .take(TIMELINE_LENGTH)
        .map(|repo| {
            OutputEvent::plain(format!(
                "{:<28} {:<14} {}",
                repo.name,
                repo.date_label(),
                repo.language().unwrap_or(chart::MISC_LABEL)
            ))
        })
        .collect()
}

fn random(index: &RepoIndex, source: &dyn RandomSource) -> Result<Vec<OutputEvent>> {
    if index.is_empty() {
        return Ok(vec![OutputEvent::warning(NO_REPOS)]);
    }
    let position = source.index(index.len());
    let Some(repo) = index.get(position) else {
        bail!(
            "random pick {} is out of range for {} repositories",
            position,
            index.len()
        );
    };
    Ok(repo_card(repo))
}

fn stats(index: &RepoIndex) -> Vec<OutputEvent> {
    let repos = index.repos();
    let forks = repos.iter().filter(|repo| repo.fork).count();
    let languages: BTreeSet<&str> = repos.iter().filter_map(Repository::language).collect();
    let last_pushed = sort_by_recent(repos)
        .first()
        .map(|repo| repo.date_label())
        .unwrap_or_else(|| "n/a".to_string());

    vec![
        OutputEvent::plain(format!("repositories: {}", repos.len())),
        OutputEvent::plain(format!("forks:        {}", forks)),
        OutputEvent::plain(format!("languages:    {}", languages.len())),
        OutputEvent::plain(format!("last push:    {}", last_pushed)),
    ]
}

fn skills(index: &RepoIndex) -> Vec<OutputEvent> {
    let languages: BTreeSet<&str> = index.repos().iter().filter_map(Repository::language).collect();
    let observed = if languages.is_empty() {
        "none yet".to_string()
    } else {
        languages.into_iter().collect::<Vec<_>>().join(", ")
    };
    vec![
        OutputEvent::accent(format!("stack: {}", STACK.join(", "))),
        OutputEvent::plain(format!("languages in repositories: {}", observed)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{line_texts, Tone};
    use crate::repository::License;

    struct FixedRandom(usize);

    impl RandomSource for FixedRandom {
        fn index(&self, _len: usize) -> usize {
            self.0
        }
    }

    fn repo(name: &str, language: Option<&str>, fork: bool, stars: u64, pushed: &str) -> Repository {
        Repository {
            language: language.map(str::to_string),
            fork,
            stargazers_count: stars,
            pushed_at: Some(pushed.to_string()),
            html_url: format!("https://github.com/octo/{}", name),
            ..Repository::named(name)
        }
    }

    fn fixture() -> RepoIndex {
        RepoIndex::new(vec![
            repo("a", Some("Go"), false, 3, "2023-01-01T00:00:00Z"),
            repo("b", Some("Go"), true, 9, "2024-01-01T00:00:00Z"),
            repo("c", Some("Rust"), false, 1, "2022-01-01T00:00:00Z"),
        ])
    }

    fn run(index: &RepoIndex, filters: &mut FilterSet, command: Command) -> Vec<OutputEvent> {
        let mut ctx = HandlerContext {
            index,
            filters,
            random: &FixedRandom(0),
        };
        dispatch(&command, &mut ctx).unwrap()
    }

    fn texts(events: &[OutputEvent]) -> Vec<String> {
        line_texts(events).into_iter().map(str::to_string).collect()
    }

    // =========================================================================
    // help / about / clear
    // =========================================================================

    #[test]
    fn test_help_lists_every_command() {
        let out = texts(&run(&fixture(), &mut FilterSet::default(), Command::Help));
        for info in COMMANDS {
            assert!(out.iter().any(|line| line.contains(info.usage)), "{} missing", info.name);
        }
    }

    #[test]
    fn test_clear_emits_clear_event() {
        let out = run(&fixture(), &mut FilterSet::default(), Command::Clear);
        assert_eq!(out, vec![OutputEvent::Clear]);
    }

    // =========================================================================
    // ls
    // =========================================================================

    #[test]
    fn test_ls_sorts_by_recency() {
        let out = texts(&run(&fixture(), &mut FilterSet::default(), Command::Ls { long: false }));
        assert_eq!(out, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_ls_long_form_includes_language_and_date() {
        let out = texts(&run(&fixture(), &mut FilterSet::default(), Command::Ls { long: true }));
        assert!(out[0].starts_with("b "));
        assert!(out[0].contains("Go"));
        assert!(out[0].contains("★9"));
        assert!(out[0].contains("Jan 01, 2024"));
    }

    #[test]
    fn test_ls_echoes_active_filters() {
        let index = fixture();
        let mut filters = FilterSet::default();
        run(&index, &mut filters, Command::Filter(FilterAction::Set(vec![(
            crate::filter::FilterKey::Language,
            "Rust".to_string(),
        )])));

        let out = texts(&run(&index, &mut filters, Command::Ls { long: false }));

        assert_eq!(out, vec!["filters: language=Rust", "c"]);
    }

    #[test]
    fn test_ls_reports_no_matches() {
        let index = fixture();
        let mut filters = FilterSet::default();
        filters.set(crate::filter::FilterKey::Year, "1999");

        let out = run(&index, &mut filters, Command::Ls { long: false });

        let last = out.last().unwrap().as_line().unwrap();
        assert_eq!(last.tone, Tone::Warning);
        assert!(last.text.contains("no matches"));
    }

    #[test]
    fn test_ls_on_empty_collection() {
        let out = texts(&run(&RepoIndex::default(), &mut FilterSet::default(), Command::Ls { long: false }));
        assert_eq!(out, vec![NO_REPOS]);
    }

    // =========================================================================
    // repo / open
    // =========================================================================

    #[test]
    fn test_repo_card_contents() {
        let mut record = repo("tool", Some("Rust"), true, 7, "2024-02-03T00:00:00Z");
        record.description = Some("Does things".to_string());
        record.license = Some(License {
            name: Some("MIT License".to_string()),
            ..License::default()
        });
        record.topics = vec!["cli".to_string()];

        let out = texts(&repo_card(&record));

        assert_eq!(out[0], "tool");
        assert!(out[1].contains("Does things"));
        assert_eq!(out[2], "  [Rust] [fork] [★ 7] [main]");
        assert!(out[3].contains("Feb 03, 2024"));
        assert!(out.iter().any(|line| line.contains("license: MIT License")));
        assert!(out.iter().any(|line| line.contains("topics: cli")));
        assert!(out.last().unwrap().contains("https://github.com/octo/tool"));
    }

    #[test]
    fn test_repo_card_omits_absent_license() {
        let out = texts(&repo_card(&Repository::named("plain")));
        assert!(!out.iter().any(|line| line.contains("license")));
        assert!(out.iter().any(|line| line.contains("No description yet.")));
    }

    #[test]
    fn test_repo_not_found_emits_exactly_one_warning() {
        let out = run(&fixture(), &mut FilterSet::default(), Command::Repo { name: Some("x".to_string()) });

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_line().unwrap().tone, Tone::Warning);
    }

    #[test]
    fn test_repo_ambiguous_caps_candidates() {
        let index = RepoIndex::new((0..10).map(|i| Repository::named(&format!("lib{}", i))).collect());

        let out = texts(&run(&index, &mut FilterSet::default(), Command::Repo { name: Some("lib".to_string()) }));

        assert!(out[0].contains("matches 10 repositories"));
        assert_eq!(out.len(), 1 + AMBIGUOUS_DISPLAY_LIMIT + 1);
        assert!(out.last().unwrap().contains("2 more"));
    }

    #[test]
    fn test_repo_without_name_prints_usage() {
        let out = texts(&run(&fixture(), &mut FilterSet::default(), Command::Repo { name: None }));
        assert_eq!(out, vec!["usage: repo <name>"]);
    }

    #[test]
    fn test_open_signals_url() {
        let out = run(&fixture(), &mut FilterSet::default(), Command::Open { name: Some("c".to_string()) });
        assert!(out.contains(&OutputEvent::OpenUrl("https://github.com/octo/c".to_string())));
    }

    #[test]
    fn test_open_without_url_falls_back_to_card() {
        let index = RepoIndex::new(vec![Repository::named("nourl")]);

        let out = run(&index, &mut FilterSet::default(), Command::Open { name: Some("nourl".to_string()) });

        assert!(!out.iter().any(|e| matches!(e, OutputEvent::OpenUrl(_))));
        assert_eq!(texts(&out)[0], "nourl");
    }

    // =========================================================================
    // filter
    // =========================================================================

    #[test]
    fn test_filter_show_without_filters() {
        let out = texts(&run(&fixture(), &mut FilterSet::default(), Command::Filter(FilterAction::Show)));
        assert_eq!(out, vec!["no filters"]);
    }

    #[test]
    fn test_filter_clear_then_show_reports_no_filters() {
        let index = fixture();
        let mut filters = FilterSet::default();
        filters.set(crate::filter::FilterKey::Fork, "true");

        run(&index, &mut filters, Command::Filter(FilterAction::Clear));
        let out = texts(&run(&index, &mut filters, Command::Filter(FilterAction::Show)));

        assert_eq!(out, vec!["no filters"]);
    }

    // =========================================================================
    // graph / timeline / stats / skills / random
    // =========================================================================

    #[test]
    fn test_graph_language_counts() {
        let out = texts(&run(&fixture(), &mut FilterSet::default(), Command::Graph(GraphKind::Language)));

        assert!(out[1].starts_with("Go "));
        assert!(out[1].ends_with(" 2"));
        assert_eq!(out[1].chars().filter(|c| *c == '█').count(), chart::BAR_WIDTH);
        assert!(out[2].starts_with("Rust "));
        assert!(out[2].ends_with(" 1"));
        assert_eq!(out[2].chars().filter(|c| *c == '█').count(), chart::BAR_WIDTH / 2);
    }

    #[test]
    fn test_graph_ignores_filters() {
        let index = fixture();
        let mut filters = FilterSet::default();
        filters.set(crate::filter::FilterKey::Language, "Rust");

        let out = texts(&run(&index, &mut filters, Command::Graph(GraphKind::Language)));

        assert!(out.iter().any(|line| line.starts_with("Go ")));
    }

    #[test]
    fn test_graph_unknown_kind_warns() {
        let out = texts(&run(
            &fixture(),
            &mut FilterSet::default(),
            Command::Graph(GraphKind::Unknown("stars".to_string())),
        ));
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("'stars'"));
    }

    #[test]
    fn test_timeline_caps_at_twelve() {
        let index = RepoIndex::new(
            (0..20)
                .map(|i| repo(&format!("r{}", i), None, false, 0, &format!("2020-01-{:02}T00:00:00Z", i + 1)))
                .collect(),
        );

        let out = texts(&run(&index, &mut FilterSet::default(), Command::Timeline));

        assert_eq!(out.len(), TIMELINE_LENGTH);
        assert!(out[0].contains("r19"));
        assert!(out[0].contains("misc"));
    }

    #[test]
    fn test_timeline_columns_are_name_date_language() {
        let index = RepoIndex::new(vec![repo("tool", Some("Rust"), false, 0, "2024-03-05T00:00:00Z")]);

        let out = texts(&run(&index, &mut FilterSet::default(), Command::Timeline));

        assert!(out[0].starts_with("tool "));
        let date = out[0].find("Mar 05, 2024").unwrap();
        let language = out[0].find("Rust").unwrap();
        assert!(date < language);
    }

    #[test]
    fn test_stats_summary() {
        let out = texts(&run(&fixture(), &mut FilterSet::default(), Command::Stats));
        assert_eq!(out[0], "repositories: 3");
        assert_eq!(out[1], "forks:        1");
        assert_eq!(out[2], "languages:    2");
        assert_eq!(out[3], "last push:    Jan 01, 2024");
    }

    #[test]
    fn test_skills_lists_sorted_distinct_languages() {
        let out = texts(&run(&fixture(), &mut FilterSet::default(), Command::Skills));
        assert!(out[0].starts_with("stack: "));
        assert_eq!(out[1], "languages in repositories: Go, Rust");
    }

    #[test]
    fn test_random_uses_injected_source() {
        let index = fixture();
        let mut filters = FilterSet::default();
        let mut ctx = HandlerContext {
            index: &index,
            filters: &mut filters,
            random: &FixedRandom(2),
        };

        let out = dispatch(&Command::Random, &mut ctx).unwrap();

        assert_eq!(texts(&out)[0], "c");
    }

    #[test]
    fn test_random_out_of_range_is_an_error() {
        let index = fixture();
        let mut filters = FilterSet::default();
        let mut ctx = HandlerContext {
            index: &index,
            filters: &mut filters,
            random: &FixedRandom(99),
        };

        let err = dispatch(&Command::Random, &mut ctx).unwrap_err();

        assert!(err.to_string().contains("out of range"));
    }
}
