//! Dimensional breakdowns summed across a whole query window.
//!
//! Unlike bucketed series, breakdowns ignore time: every occurrence of a
//! language or editor name across all days and nesting levels is folded into
//! one entry. Percentages are computed against the total of the same result
//! set, so entries only make sense together.

use indexmap::IndexMap;
use serde::Serialize;

use super::rates::percentage;
use crate::types::{CompletionCounts, MetricRecord};

/// One language or editor in a breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BreakdownEntry {
    pub name: String,
    /// Engaged users summed over every day in the window
    pub total_engaged_users: u64,
    pub total_suggestions: u64,
    pub total_acceptances: u64,
    pub total_lines_suggested: u64,
    pub total_lines_accepted: u64,
    /// Accepted / suggested (0-100)
    pub acceptance_rate: f64,
    /// Share of the set's engaged users (0-100)
    pub percentage: f64,
}

/// Request volume for one chat mode or model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageShare {
    pub name: String,
    pub requests: u64,
    /// Share of the set's requests (0-100)
    pub percentage: f64,
}

#[derive(Default)]
struct Tally {
    engaged_users: u64,
    counts: CompletionCounts,
}

/// Code completion usage per language.
///
/// Sorted by engaged users, descending. Ties keep the order in which the
/// languages were first seen.
pub fn breakdown_by_language(records: &[MetricRecord]) -> Vec<BreakdownEntry> {
    let mut tallies: IndexMap<&str, Tally> = IndexMap::new();

    for leaf in records.iter().flat_map(MetricRecord::completion_leaves) {
        let tally = tallies.entry(leaf.name.as_str()).or_default();
        tally.engaged_users += leaf.total_engaged_users;
        tally.counts = tally.counts + CompletionCounts::from(leaf);
    }

    finish_entries(tallies)
}

/// Code completion usage per editor.
///
/// Engaged users come from the editor node; suggestion counters are summed
/// from the editor's language leaves. Sorted like [`breakdown_by_language`].
pub fn breakdown_by_editor(records: &[MetricRecord]) -> Vec<BreakdownEntry> {
    let mut tallies: IndexMap<&str, Tally> = IndexMap::new();

    for editor in records.iter().flat_map(MetricRecord::completion_editors) {
        let tally = tallies.entry(editor.name.as_str()).or_default();
        tally.engaged_users += editor.total_engaged_users;
        tally.counts = tally.counts + editor.counts();
    }

    finish_entries(tallies)
}

fn finish_entries(tallies: IndexMap<&str, Tally>) -> Vec<BreakdownEntry> {
    let total_users: u64 = tallies.values().map(|t| t.engaged_users).sum();

    let mut entries: Vec<BreakdownEntry> = tallies
        .into_iter()
        .map(|(name, tally)| BreakdownEntry {
            name: name.to_string(),
            total_engaged_users: tally.engaged_users,
            total_suggestions: tally.counts.suggestions,
            total_acceptances: tally.counts.acceptances,
            total_lines_suggested: tally.counts.lines_suggested,
            total_lines_accepted: tally.counts.lines_accepted,
            acceptance_rate: percentage(tally.counts.acceptances, tally.counts.suggestions),
            percentage: percentage(tally.engaged_users, total_users),
        })
        .collect();

    // stable: ties stay in first-seen order
    entries.sort_by(|a, b| b.total_engaged_users.cmp(&a.total_engaged_users));
    entries
}

/// Chat requests per chat mode (Edit, Ask, Agent, ...).
pub fn breakdown_by_chat_mode(records: &[MetricRecord]) -> Vec<UsageShare> {
    let pairs = records
        .iter()
        .filter_map(|r| r.chat_requests.as_ref())
        .flat_map(|c| c.requests_by_mode.iter())
        .map(|m| (m.mode.as_str(), m.requests));
    finish_shares(pairs)
}

/// Chat requests per model.
pub fn breakdown_by_model(records: &[MetricRecord]) -> Vec<UsageShare> {
    let pairs = records
        .iter()
        .filter_map(|r| r.model_usage.as_ref())
        .flat_map(|m| m.usage_by_model.iter())
        .map(|m| (m.model.as_str(), m.requests));
    finish_shares(pairs)
}

fn finish_shares<'a>(pairs: impl Iterator<Item = (&'a str, u64)>) -> Vec<UsageShare> {
    let mut totals: IndexMap<&str, u64> = IndexMap::new();
    for (name, requests) in pairs {
        *totals.entry(name).or_default() += requests;
    }

    let total: u64 = totals.values().sum();
    let mut shares: Vec<UsageShare> = totals
        .into_iter()
        .map(|(name, requests)| UsageShare {
            name: name.to_string(),
            requests,
            percentage: percentage(requests, total),
        })
        .collect();

    shares.sort_by(|a, b| b.requests.cmp(&a.requests));
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{day, tree_record};
    use crate::types::{ChatModeRequests, ChatRequests};

    #[test]
    fn test_empty_input() {
        assert!(breakdown_by_language(&[]).is_empty());
        assert!(breakdown_by_editor(&[]).is_empty());
        assert!(breakdown_by_chat_mode(&[]).is_empty());
        assert!(breakdown_by_model(&[]).is_empty());
    }

    #[test]
    fn test_language_breakdown_flattens_editors_and_days() {
        let records = vec![
            tree_record(
                day(2024, 3, 4),
                &[
                    ("vscode", "rust", 3, 100, 40),
                    ("neovim", "rust", 1, 20, 10),
                    ("vscode", "python", 2, 50, 10),
                ],
            ),
            tree_record(day(2024, 3, 5), &[("vscode", "python", 2, 50, 15)]),
        ];

        let breakdown = breakdown_by_language(&records);

        assert_eq!(breakdown.len(), 2);
        let rust = &breakdown[0];
        assert_eq!(rust.name, "rust");
        assert_eq!(rust.total_engaged_users, 4);
        assert_eq!(rust.total_suggestions, 120);
        assert_eq!(rust.total_acceptances, 50);
        assert_eq!(rust.acceptance_rate, 41.67);
        assert_eq!(rust.percentage, 50.0);

        let python = &breakdown[1];
        assert_eq!(python.total_engaged_users, 4);
        assert_eq!(python.acceptance_rate, 25.0);
        assert_eq!(python.percentage, 50.0);
    }

    #[test]
    fn test_editor_breakdown_sorted_by_engaged_users() {
        let records = vec![tree_record(
            day(2024, 3, 4),
            &[
                ("neovim", "rust", 1, 10, 5),
                ("vscode", "rust", 2, 30, 6),
                ("vscode", "go", 1, 10, 4),
            ],
        )];

        let breakdown = breakdown_by_editor(&records);

        assert_eq!(breakdown[0].name, "vscode");
        assert_eq!(breakdown[0].total_engaged_users, 3);
        assert_eq!(breakdown[0].total_suggestions, 40);
        assert_eq!(breakdown[0].acceptance_rate, 25.0);
        assert_eq!(breakdown[0].percentage, 75.0);
        assert_eq!(breakdown[1].name, "neovim");
        assert_eq!(breakdown[1].percentage, 25.0);
    }

    #[test]
    fn test_zero_total_gives_zero_percentages() {
        let records = vec![tree_record(
            day(2024, 3, 4),
            &[("vscode", "rust", 0, 10, 5), ("vscode", "go", 0, 0, 0)],
        )];

        let breakdown = breakdown_by_language(&records);

        assert_eq!(breakdown.len(), 2);
        assert!(breakdown.iter().all(|e| e.percentage == 0.0));
        // ties keep first-seen order
        assert_eq!(breakdown[0].name, "rust");
        assert_eq!(breakdown[1].acceptance_rate, 0.0);
    }

    #[test]
    fn test_chat_mode_breakdown() {
        let mut a = tree_record(day(2024, 3, 4), &[]);
        a.chat_requests = Some(ChatRequests {
            requests_by_mode: vec![
                ChatModeRequests {
                    mode: "Ask".to_string(),
                    requests: 30,
                },
                ChatModeRequests {
                    mode: "Agent".to_string(),
                    requests: 10,
                },
            ],
            ..Default::default()
        });
        let mut b = a.clone();
        b.date = day(2024, 3, 5);
        b.chat_requests.as_mut().unwrap().requests_by_mode[1].requests = 60;

        let shares = breakdown_by_chat_mode(&[a, b]);

        assert_eq!(shares[0].name, "Agent");
        assert_eq!(shares[0].requests, 70);
        assert_eq!(shares[0].percentage, 53.85);
        assert_eq!(shares[1].name, "Ask");
        assert_eq!(shares[1].percentage, 46.15);
    }
}
