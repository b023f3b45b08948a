//! Headline KPIs for a query window.

use serde::{Deserialize, Serialize};

use super::rates::{mean2, mean_rounded, mean_to_int, percentage};
use crate::clock::Clock;
use crate::types::{CompletionCounts, MetricRecord, SeatSnapshot};

/// Model reported when no record in the window names one.
pub const DEFAULT_MOST_USED_MODEL: &str = "Claude Sonnet 4.5";

/// Days of inactivity after which a seat no longer counts as active.
pub const DEFAULT_ACTIVE_SEAT_WINDOW_DAYS: i64 = 30;

/// Tunables for [`summarize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryOptions {
    pub active_seat_window_days: i64,
    pub fallback_model: String,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            active_seat_window_days: DEFAULT_ACTIVE_SEAT_WINDOW_DAYS,
            fallback_model: DEFAULT_MOST_USED_MODEL.to_string(),
        }
    }
}

/// Scalar KPIs for headline display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InsightsSummary {
    /// Mean daily active users
    pub total_active_users: u64,
    /// Mean daily engaged users
    pub total_engaged_users: u64,
    /// Acceptance rate over the whole window (0-100)
    pub average_acceptance_rate: f64,
    /// Lines acceptance rate over the whole window (0-100)
    pub average_lines_acceptance_rate: f64,
    pub total_seats: u64,
    pub active_seats: u64,
    /// Active seats / total seats (0-100)
    pub adoption_rate: f64,
    pub total_suggestions: u64,
    pub total_acceptances: u64,
    pub total_chats: u64,
    /// Highest single-day active user count
    pub peak_active_users: u64,
    /// Mean daily agent adoption percentage, rounded to an integer
    pub agent_adoption_percentage: u64,
    /// Mean daily agent users
    pub agent_active_users: u64,
    pub most_used_model: String,
    pub total_lines_changed: u64,
    /// Mean daily agent contribution percentage (0-100)
    pub agent_contribution_percentage: f64,
    /// Mean daily lines deleted by the agent
    pub average_lines_deleted_by_agent: u64,
}

/// Count seats used within `window_days` of the clock's current instant.
pub fn count_active_seats(seats: &SeatSnapshot, clock: &dyn Clock, window_days: i64) -> u64 {
    let now = clock.now();
    seats
        .seats
        .iter()
        .filter(|seat| seat.is_active(now, window_days))
        .count() as u64
}

/// Model named by the most recent record that carries one.
///
/// Records are ranked by date; among records of the same date the later one
/// in input order wins.
pub fn latest_most_used_model(records: &[MetricRecord]) -> Option<&str> {
    records
        .iter()
        .filter_map(|r| {
            r.model_usage
                .as_ref()
                .and_then(|m| m.most_used_model.as_deref())
                .map(|model| (r.date, model))
        })
        .max_by_key(|(date, _)| *date)
        .map(|(_, model)| model)
}

/// Compute headline KPIs for a window of records and an optional seat snapshot.
///
/// An empty record list yields zero for every usage KPI and the fallback
/// model name; seat KPIs are still derived from the snapshot since they do
/// not depend on usage records.
pub fn summarize(
    records: &[MetricRecord],
    seats: Option<&SeatSnapshot>,
    clock: &dyn Clock,
    options: &SummaryOptions,
) -> InsightsSummary {
    let total_seats = seats.map(|s| s.total_seats).unwrap_or(0);
    let active_seats = seats
        .map(|s| count_active_seats(s, clock, options.active_seat_window_days))
        .unwrap_or(0);
    let adoption_rate = percentage(active_seats, total_seats);

    let most_used_model = latest_most_used_model(records)
        .unwrap_or(options.fallback_model.as_str())
        .to_string();

    let mut active_users = 0u64;
    let mut engaged_users = 0u64;
    let mut peak_active_users = 0u64;
    let mut completions = CompletionCounts::default();
    let mut chats = 0u64;
    let mut agent_adoption = 0.0f64;
    let mut agent_users = 0u64;
    let mut lines_changed = 0u64;
    let mut agent_contribution = 0.0f64;
    let mut lines_deleted_by_agent = 0.0f64;

    for record in records {
        active_users += record.total_active_users;
        engaged_users += record.total_engaged_users;
        peak_active_users = peak_active_users.max(record.total_active_users);
        completions = completions + record.completion_counts();
        chats += record.chat_counts().chats;

        if let Some(adoption) = &record.agent_adoption {
            agent_adoption += adoption.percentage;
            agent_users += adoption.active_agent_users;
        }
        if let Some(generation) = &record.code_generation {
            lines_changed += generation.total_lines_changed;
            agent_contribution += generation.agent_contribution_percentage;
            lines_deleted_by_agent += generation.average_lines_deleted_by_agent;
        }
    }

    let days = records.len();

    InsightsSummary {
        total_active_users: mean_rounded(active_users, days),
        total_engaged_users: mean_rounded(engaged_users, days),
        average_acceptance_rate: percentage(completions.acceptances, completions.suggestions),
        average_lines_acceptance_rate: percentage(
            completions.lines_accepted,
            completions.lines_suggested,
        ),
        total_seats,
        active_seats,
        adoption_rate,
        total_suggestions: completions.suggestions,
        total_acceptances: completions.acceptances,
        total_chats: chats,
        peak_active_users,
        agent_adoption_percentage: mean_to_int(agent_adoption, days),
        agent_active_users: mean_rounded(agent_users, days),
        most_used_model,
        total_lines_changed: lines_changed,
        agent_contribution_percentage: mean2(agent_contribution, days),
        average_lines_deleted_by_agent: mean_to_int(lines_deleted_by_agent, days),
    }
}
