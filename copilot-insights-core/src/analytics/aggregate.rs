//! Per-bucket aggregation.
//!
//! User counts are instantaneous gauges and are averaged over the days in a
//! bucket. Suggestion, chat and pull request counters are cumulative per day
//! and are summed. Rates come from the bucket-level sums.

use serde::Serialize;

use super::rates::{mean_rounded, percentage};
use crate::types::{ChatCounts, CompletionCounts, MetricRecord};

/// Aggregated counters for one group of daily records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BucketTotals {
    /// Mean active users per day
    pub total_active_users: u64,
    /// Mean engaged users per day
    pub total_engaged_users: u64,
    pub total_code_suggestions: u64,
    pub total_code_acceptances: u64,
    pub total_code_lines_suggested: u64,
    pub total_code_lines_accepted: u64,
    /// Mean IDE chat engaged users per day
    pub total_chat_engaged_users: u64,
    pub total_chats: u64,
    pub total_chat_insertion_events: u64,
    pub total_chat_copy_events: u64,
    pub total_pr_summaries_created: u64,
    /// Accepted / suggested completions (0-100)
    pub acceptance_rate: f64,
    /// Accepted / suggested lines (0-100)
    pub lines_acceptance_rate: f64,
    /// (Insertions + copies) / chats (0-100)
    pub chat_acceptance_rate: f64,
}

/// Aggregate the records of one bucket into a single row.
///
/// An empty slice yields all-zero totals.
pub fn aggregate_bucket(records: &[&MetricRecord]) -> BucketTotals {
    let mut active_users = 0u64;
    let mut engaged_users = 0u64;
    let mut chat_engaged_users = 0u64;
    let mut completions = CompletionCounts::default();
    let mut chat = ChatCounts::default();
    let mut pr_summaries = 0u64;

    for record in records {
        active_users += record.total_active_users;
        engaged_users += record.total_engaged_users;
        chat_engaged_users += record.chat_engaged_users();
        completions = completions + record.completion_counts();
        chat = chat + record.chat_counts();
        pr_summaries += record.pr_summaries_created();
    }

    let days = records.len();

    BucketTotals {
        total_active_users: mean_rounded(active_users, days),
        total_engaged_users: mean_rounded(engaged_users, days),
        total_code_suggestions: completions.suggestions,
        total_code_acceptances: completions.acceptances,
        total_code_lines_suggested: completions.lines_suggested,
        total_code_lines_accepted: completions.lines_accepted,
        total_chat_engaged_users: mean_rounded(chat_engaged_users, days),
        total_chats: chat.chats,
        total_chat_insertion_events: chat.insertion_events,
        total_chat_copy_events: chat.copy_events,
        total_pr_summaries_created: pr_summaries,
        acceptance_rate: percentage(completions.acceptances, completions.suggestions),
        lines_acceptance_rate: percentage(completions.lines_accepted, completions.lines_suggested),
        chat_acceptance_rate: percentage(chat.insertion_events + chat.copy_events, chat.chats),
    }
}
