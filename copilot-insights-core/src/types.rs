//! Core domain types for copilot-insights
//!
//! These types mirror the pre-joined JSON blobs returned by the query layer:
//! one [`MetricRecord`] per calendar day (optionally scoped by enterprise,
//! organization or team) and one [`SeatSnapshot`] per seat listing.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Engaged user** | A user who performed at least one tracked action in the scope |
//! | **Seat** | A license assignment, independent of usage |
//! | **Leaf** | The innermost node of a usage tree, the only level carrying counters |
//!
//! ### Schema versions
//!
//! Two shapes of metric record exist in the wild: a simple one carrying only
//! the four usage trees, and a richer one adding agent adoption, chat-mode
//! requests, model usage and code generation. Both deserialize into the same
//! [`MetricRecord`]: every enhanced field is an `Option` and every list
//! defaults to empty, so aggregation never branches on which schema it got.
//!
//! ### Absent sub-trees
//!
//! Any of the usage trees may be `null` for a given day. The traversal
//! helpers on [`MetricRecord`] yield no leaves for an absent tree, and the
//! counter types ([`CompletionCounts`], [`ChatCounts`]) sum from zero, so an
//! absent tree contributes nothing instead of failing.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::Add;

// ============================================
// Metric Record
// ============================================

/// Usage metrics for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Storage identifier (date plus scope)
    #[serde(default)]
    pub id: String,
    /// Calendar day these counters cover
    pub date: NaiveDate,
    #[serde(default)]
    pub total_active_users: u64,
    #[serde(default)]
    pub total_engaged_users: u64,

    pub copilot_ide_code_completions: Option<IdeCodeCompletions>,
    pub copilot_ide_chat: Option<IdeChat>,
    pub copilot_dotcom_chat: Option<DotcomChat>,
    pub copilot_dotcom_pull_requests: Option<DotcomPullRequests>,

    // Enhanced schema
    pub daily_active_users: Option<u64>,
    pub weekly_active_users: Option<u64>,
    pub agent_adoption: Option<AgentAdoption>,
    pub chat_requests: Option<ChatRequests>,
    pub model_usage: Option<ModelUsage>,
    pub language_usage: Option<LanguageUsage>,
    pub code_generation: Option<CodeGeneration>,

    // Scope
    pub enterprise: Option<String>,
    pub organization: Option<String>,
    pub team: Option<String>,
    pub last_update: Option<String>,
}

impl MetricRecord {
    /// Create an empty record for a day: zero users, every sub-tree absent.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: date.format("%Y-%m-%d").to_string(),
            date,
            total_active_users: 0,
            total_engaged_users: 0,
            copilot_ide_code_completions: None,
            copilot_ide_chat: None,
            copilot_dotcom_chat: None,
            copilot_dotcom_pull_requests: None,
            daily_active_users: None,
            weekly_active_users: None,
            agent_adoption: None,
            chat_requests: None,
            model_usage: None,
            language_usage: None,
            code_generation: None,
            enterprise: None,
            organization: None,
            team: None,
            last_update: None,
        }
    }

    /// Code completion editors, empty when the tree is absent.
    pub fn completion_editors(&self) -> &[CompletionEditor] {
        self.copilot_ide_code_completions
            .as_ref()
            .map(|c| c.editors.as_slice())
            .unwrap_or_default()
    }

    /// Every `editor -> model -> language` leaf of the code completion tree.
    pub fn completion_leaves(&self) -> impl Iterator<Item = &CompletionLanguage> {
        self.completion_editors()
            .iter()
            .flat_map(|editor| editor.leaves())
    }

    /// Summed code completion counters for the day.
    pub fn completion_counts(&self) -> CompletionCounts {
        self.completion_leaves().map(CompletionCounts::from).sum()
    }

    /// Every `editor -> model` leaf of the IDE chat tree.
    pub fn ide_chat_models(&self) -> impl Iterator<Item = &ChatModel> {
        self.copilot_ide_chat
            .iter()
            .flat_map(|chat| chat.editors.iter())
            .flat_map(|editor| editor.models.iter())
    }

    /// Summed chat counters for the day.
    ///
    /// Chats from the dotcom chat tree count towards `chats`; that tree
    /// carries no insertion or copy events.
    pub fn chat_counts(&self) -> ChatCounts {
        let ide: ChatCounts = self.ide_chat_models().map(ChatCounts::from).sum();
        let dotcom: u64 = self
            .copilot_dotcom_chat
            .iter()
            .flat_map(|chat| chat.models.iter())
            .map(|model| model.total_chats)
            .sum();
        ide + ChatCounts {
            chats: dotcom,
            ..ChatCounts::default()
        }
    }

    /// Engaged users of the IDE chat tree, 0 when absent.
    pub fn chat_engaged_users(&self) -> u64 {
        self.copilot_ide_chat
            .as_ref()
            .map(|chat| chat.total_engaged_users)
            .unwrap_or(0)
    }

    /// Pull request summaries created across every repository and model.
    pub fn pr_summaries_created(&self) -> u64 {
        self.copilot_dotcom_pull_requests
            .iter()
            .flat_map(|prs| prs.repositories.iter())
            .flat_map(|repo| repo.models.iter())
            .map(|model| model.total_pr_summaries_created)
            .sum()
    }

    /// Whether this record falls inside the given scope.
    ///
    /// A `None` field in the scope matches any value.
    pub fn in_scope(&self, scope: &Scope) -> bool {
        fn matches(want: &Option<String>, have: &Option<String>) -> bool {
            want.is_none() || want == have
        }
        matches(&scope.enterprise, &self.enterprise)
            && matches(&scope.organization, &self.organization)
            && matches(&scope.team, &self.team)
    }
}

/// Enterprise / organization / team selector for the query layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub enterprise: Option<String>,
    pub organization: Option<String>,
    pub team: Option<String>,
}

// ============================================
// Usage Trees
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeCodeCompletions {
    #[serde(default)]
    pub total_engaged_users: u64,
    /// Per-language engaged users, independent of editor
    #[serde(default)]
    pub languages: Vec<LanguageEngagement>,
    #[serde(default)]
    pub editors: Vec<CompletionEditor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageEngagement {
    pub name: String,
    #[serde(default)]
    pub total_engaged_users: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionEditor {
    pub name: String,
    #[serde(default)]
    pub total_engaged_users: u64,
    #[serde(default)]
    pub models: Vec<CompletionModel>,
}

impl CompletionEditor {
    /// Every `model -> language` leaf under this editor.
    pub fn leaves(&self) -> impl Iterator<Item = &CompletionLanguage> {
        self.models.iter().flat_map(|model| model.languages.iter())
    }

    /// Summed code completion counters under this editor.
    pub fn counts(&self) -> CompletionCounts {
        self.leaves().map(CompletionCounts::from).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionModel {
    pub name: String,
    #[serde(default)]
    pub is_custom_model: bool,
    pub custom_model_training_date: Option<String>,
    #[serde(default)]
    pub total_engaged_users: u64,
    #[serde(default)]
    pub languages: Vec<CompletionLanguage>,
}

/// Leaf of the code completion tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionLanguage {
    pub name: String,
    #[serde(default)]
    pub total_engaged_users: u64,
    #[serde(default)]
    pub total_code_suggestions: u64,
    #[serde(default)]
    pub total_code_acceptances: u64,
    #[serde(default)]
    pub total_code_lines_suggested: u64,
    #[serde(default)]
    pub total_code_lines_accepted: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeChat {
    #[serde(default)]
    pub total_engaged_users: u64,
    #[serde(default)]
    pub editors: Vec<ChatEditor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatEditor {
    pub name: String,
    #[serde(default)]
    pub total_engaged_users: u64,
    #[serde(default)]
    pub models: Vec<ChatModel>,
}

/// Leaf of the IDE chat tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatModel {
    pub name: String,
    #[serde(default)]
    pub is_custom_model: bool,
    pub custom_model_training_date: Option<String>,
    #[serde(default)]
    pub total_engaged_users: u64,
    #[serde(default)]
    pub total_chats: u64,
    #[serde(default)]
    pub total_chat_insertion_events: u64,
    #[serde(default)]
    pub total_chat_copy_events: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DotcomChat {
    #[serde(default)]
    pub total_engaged_users: u64,
    #[serde(default)]
    pub models: Vec<DotcomChatModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DotcomChatModel {
    pub name: String,
    #[serde(default)]
    pub is_custom_model: bool,
    pub custom_model_training_date: Option<String>,
    #[serde(default)]
    pub total_engaged_users: u64,
    #[serde(default)]
    pub total_chats: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DotcomPullRequests {
    #[serde(default)]
    pub total_engaged_users: u64,
    #[serde(default)]
    pub repositories: Vec<PullRequestRepository>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequestRepository {
    pub name: String,
    #[serde(default)]
    pub total_engaged_users: u64,
    #[serde(default)]
    pub models: Vec<PullRequestModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequestModel {
    pub name: String,
    #[serde(default)]
    pub is_custom_model: bool,
    pub custom_model_training_date: Option<String>,
    #[serde(default)]
    pub total_engaged_users: u64,
    #[serde(default)]
    pub total_pr_summaries_created: u64,
}

// ============================================
// Enhanced Schema
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentAdoption {
    /// Share of active users who used agent mode (0-100)
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub active_agent_users: u64,
    #[serde(default)]
    pub total_active_users: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequests {
    #[serde(default)]
    pub average_per_active_user: f64,
    #[serde(default)]
    pub total_requests: u64,
    #[serde(default)]
    pub requests_by_mode: Vec<ChatModeRequests>,
}

/// Requests issued in one chat mode (Edit, Ask, Agent, Custom, Inline).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatModeRequests {
    pub mode: String,
    #[serde(default)]
    pub requests: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub most_used_model: Option<String>,
    #[serde(default)]
    pub usage_by_model: Vec<ModelUsageEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelUsageEntry {
    pub model: String,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub requests: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageUsage {
    #[serde(default)]
    pub usage_by_language: Vec<LanguageUsageEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageUsageEntry {
    pub language: String,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub requests: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeGeneration {
    #[serde(default)]
    pub total_lines_changed: u64,
    /// Share of changed lines written by the agent (0-100)
    #[serde(default)]
    pub agent_contribution_percentage: f64,
    #[serde(default)]
    pub average_lines_deleted_by_agent: f64,
    pub daily_lines: Option<DailyLineCounts>,
    pub user_initiated_changes: Option<UserInitiatedChanges>,
    pub agent_initiated_changes: Option<AgentInitiatedChanges>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLineCounts {
    #[serde(default)]
    pub added: u64,
    #[serde(default)]
    pub deleted: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInitiatedChanges {
    #[serde(default)]
    pub by_mode: Vec<CodeChangeByMode>,
    #[serde(default)]
    pub by_model: Vec<CodeChangeByModel>,
    #[serde(default)]
    pub by_language: Vec<CodeChangeByLanguage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeChangeByMode {
    pub mode: String,
    #[serde(default)]
    pub suggested: u64,
    #[serde(default)]
    pub added: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeChangeByModel {
    pub model: String,
    #[serde(default)]
    pub suggested: u64,
    #[serde(default)]
    pub added: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeChangeByLanguage {
    pub language: String,
    #[serde(default)]
    pub suggested: u64,
    #[serde(default)]
    pub added: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentInitiatedChanges {
    #[serde(default)]
    pub total_added: u64,
    #[serde(default)]
    pub total_deleted: u64,
    #[serde(default)]
    pub by_model: Vec<AgentChangeByModel>,
    #[serde(default)]
    pub by_language: Vec<AgentChangeByLanguage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentChangeByModel {
    pub model: String,
    #[serde(default)]
    pub added: u64,
    #[serde(default)]
    pub deleted: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentChangeByLanguage {
    pub language: String,
    #[serde(default)]
    pub added: u64,
    #[serde(default)]
    pub deleted: u64,
}

// ============================================
// Seats
// ============================================

/// A snapshot of every seat assignment at the time of the query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatSnapshot {
    #[serde(default)]
    pub id: String,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub total_seats: u64,
    #[serde(default)]
    pub seats: Vec<Seat>,
    pub enterprise: Option<String>,
    pub organization: Option<String>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub has_next_page: bool,
    pub last_update: Option<String>,
}

/// One license holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pending_cancellation_date: Option<NaiveDate>,
    /// Last time the holder used the assistant, `None` if never
    pub last_activity_at: Option<DateTime<Utc>>,
    /// Editor of last use, `None` if never used
    pub last_activity_editor: Option<String>,
    pub plan_type: Option<String>,
    pub assignee: Option<SeatAssignee>,
    /// Team through which the seat was granted, `None` for direct assignment
    pub assigning_team: Option<SeatTeam>,
}

impl Seat {
    /// Whether the seat was used within `window_days` days of `now`.
    ///
    /// Whole days are counted, so activity 30 days and 23 hours ago is
    /// still inside a 30-day window.
    pub fn is_active(&self, now: DateTime<Utc>, window_days: i64) -> bool {
        match self.last_activity_at {
            Some(last) => now.signed_duration_since(last).num_days() <= window_days,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatTeam {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatAssignee {
    #[serde(default)]
    pub id: u64,
    pub login: String,
    pub name: Option<String>,
}

// ============================================
// Counters
// ============================================

/// Summable code completion counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionCounts {
    pub suggestions: u64,
    pub acceptances: u64,
    pub lines_suggested: u64,
    pub lines_accepted: u64,
}

impl From<&CompletionLanguage> for CompletionCounts {
    fn from(leaf: &CompletionLanguage) -> Self {
        Self {
            suggestions: leaf.total_code_suggestions,
            acceptances: leaf.total_code_acceptances,
            lines_suggested: leaf.total_code_lines_suggested,
            lines_accepted: leaf.total_code_lines_accepted,
        }
    }
}

impl Add for CompletionCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            suggestions: self.suggestions + rhs.suggestions,
            acceptances: self.acceptances + rhs.acceptances,
            lines_suggested: self.lines_suggested + rhs.lines_suggested,
            lines_accepted: self.lines_accepted + rhs.lines_accepted,
        }
    }
}

impl Sum for CompletionCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Summable chat counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatCounts {
    pub chats: u64,
    pub insertion_events: u64,
    pub copy_events: u64,
}

impl From<&ChatModel> for ChatCounts {
    fn from(leaf: &ChatModel) -> Self {
        Self {
            chats: leaf.total_chats,
            insertion_events: leaf.total_chat_insertion_events,
            copy_events: leaf.total_chat_copy_events,
        }
    }
}

impl Add for ChatCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            chats: self.chats + rhs.chats,
            insertion_events: self.insertion_events + rhs.insertion_events,
            copy_events: self.copy_events + rhs.copy_events,
        }
    }
}

impl Sum for ChatCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
