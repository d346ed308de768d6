use crate::types::{JoinedRow, Observation};
use std::collections::HashMap;

/// Dimension whose options carry a `Level N: description` suffix.
pub const QUALIFICATION_DIMENSION: &str = "highest_qualification";

/// Category excluded from every table.
pub const NOT_APPLICABLE: &str = "Does not apply";

/// Category label of an observation: the second axis option, cut at the first
/// colon when the first axis is the qualification dimension.
pub fn category(observation: &Observation) -> &str {
    let option = observation.category.option.as_str();
    if observation.area.id == QUALIFICATION_DIMENSION {
        option.split(':').next().unwrap_or(option)
    } else {
        option
    }
}

/// Left-joins `area` onto `reference` by category and computes the share of
/// each category within its dataset. Output follows the order of `area`.
pub fn join_and_compute(area: &[Observation], reference: &[Observation]) -> Vec<JoinedRow> {
    // 1. Reference counts by category, first occurrence wins
    let mut reference_counts: HashMap<&str, u64> = HashMap::new();
    for observation in reference {
        reference_counts
            .entry(category(observation))
            .or_insert(observation.count);
    }

    // 2. Join, dropping the not-applicable row before anything is summed
    let joined: Vec<(&str, u64, Option<u64>)> = area
        .iter()
        .map(|observation| {
            let name = category(observation);
            (name, observation.count, reference_counts.get(name).copied())
        })
        .filter(|(name, _, _)| *name != NOT_APPLICABLE)
        .collect();

    // 3. Totals over the remaining rows
    let total_area: u64 = joined.iter().map(|(_, count, _)| count).sum();
    let total_reference: u64 = joined.iter().filter_map(|(_, _, count)| *count).sum();

    joined
        .into_iter()
        .map(|(name, area_count, reference_count)| JoinedRow {
            category: name.to_string(),
            area_count,
            reference_count,
            area_share: format_share(Some(share(area_count, total_area))),
            reference_share: format_share(reference_count.map(|c| share(c, total_reference))),
        })
        .collect()
}

/// Whole-percent share of `count` in `total`, rounding half to even.
/// A zero total gives 0.
pub fn share(count: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    let proportion = count as f64 / total as f64;
    (proportion * 100.0).round_ties_even() as u64
}

fn format_share(share: Option<u64>) -> String {
    match share {
        Some(share) => format!("{}%", share),
        None => "n/a".to_string(),
    }
}
