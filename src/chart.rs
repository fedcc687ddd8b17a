//! ASCII bar charts.

use crate::repository::Repository;
use std::collections::HashMap;

/// Category used for repositories without a language.
pub const MISC_LABEL: &str = "misc";
pub const LABEL_WIDTH: usize = 12;
pub const BAR_WIDTH: usize = 24;

const FILLED: char = '█';
const EMPTY: char = '░';

/// Counts repositories per language, most frequent first.
///
/// Ties keep the order in which the languages first appear.
pub fn language_counts(repos: &[Repository]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for repo in repos {
        let label = repo.language().unwrap_or(MISC_LABEL).to_string();
        match positions.get(&label) {
            Some(&position) => counts[position].1 += 1,
            None => {
                positions.insert(label.clone(), counts.len());
                counts.push((label, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Filled units for `count` on a bar scaled so that `max` fills `width`.
/// Any non-zero count gets at least one unit.
pub fn bar_units(count: usize, max: usize, width: usize) -> usize {
    if count == 0 || max == 0 {
        return 0;
    }
    let scaled = (count as f64 / max as f64 * width as f64).round() as usize;
    scaled.clamp(1, width)
}

/// One chart row: fixed-width label, proportional bar, numeric count.
pub fn bar_row(label: &str, count: usize, max: usize) -> String {
    let units = bar_units(count, max, BAR_WIDTH);
    let label: String = label.chars().take(LABEL_WIDTH).collect();
    format!(
        "{:<width$} {}{} {}",
        label,
        FILLED.to_string().repeat(units),
        EMPTY.to_string().repeat(BAR_WIDTH - units),
        count,
        width = LABEL_WIDTH
    )
}

/// Rows for every `(label, count)` pair, scaled to the largest count.
pub fn bar_chart(rows: &[(String, usize)]) -> Vec<String> {
    let max = rows.iter().map(|(_, count)| *count).max().unwrap_or(0);
    rows.iter()
        .map(|(label, count)| bar_row(label, *count, max))
        .collect()
}
