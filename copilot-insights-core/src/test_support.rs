//! Record builders shared by unit tests.

use chrono::{DateTime, NaiveDate, Utc};

use crate::types::{
    ChatEditor, ChatModel, CompletionEditor, CompletionLanguage, CompletionModel, IdeChat,
    IdeCodeCompletions, MetricRecord, Seat, SeatSnapshot,
};

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn instant(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

/// One code completion leaf: (editor, language, engaged users, suggestions, acceptances).
pub type Leaf<'a> = (&'a str, &'a str, u64, u64, u64);

/// A record whose completion tree holds the given leaves under one model.
///
/// Editor engaged users are the sum of their leaves' engaged users. Line
/// counters mirror the suggestion counters.
pub fn tree_record(date: NaiveDate, leaves: &[Leaf<'_>]) -> MetricRecord {
    let mut editors: Vec<CompletionEditor> = Vec::new();
    for &(editor, language, engaged, suggestions, acceptances) in leaves {
        let leaf = CompletionLanguage {
            name: language.to_string(),
            total_engaged_users: engaged,
            total_code_suggestions: suggestions,
            total_code_acceptances: acceptances,
            total_code_lines_suggested: suggestions,
            total_code_lines_accepted: acceptances,
        };
        match editors.iter_mut().find(|e| e.name == editor) {
            Some(existing) => {
                existing.total_engaged_users += engaged;
                existing.models[0].languages.push(leaf);
            }
            None => editors.push(CompletionEditor {
                name: editor.to_string(),
                total_engaged_users: engaged,
                models: vec![CompletionModel {
                    name: "default".to_string(),
                    languages: vec![leaf],
                    ..Default::default()
                }],
            }),
        }
    }

    let mut record = MetricRecord::new(date);
    record.copilot_ide_code_completions = Some(IdeCodeCompletions {
        total_engaged_users: editors.iter().map(|e| e.total_engaged_users).sum(),
        languages: Vec::new(),
        editors,
    });
    record
}

/// A record with a single vscode/rust completion leaf.
pub fn completion_record(date: NaiveDate, suggestions: u64, acceptances: u64) -> MetricRecord {
    tree_record(date, &[("vscode", "rust", 1, suggestions, acceptances)])
}

/// A record with a single IDE chat leaf and one chat-engaged user.
pub fn chat_record(date: NaiveDate, chats: u64, insertions: u64, copies: u64) -> MetricRecord {
    let mut record = MetricRecord::new(date);
    record.copilot_ide_chat = Some(IdeChat {
        total_engaged_users: 1,
        editors: vec![ChatEditor {
            name: "vscode".to_string(),
            total_engaged_users: 1,
            models: vec![ChatModel {
                name: "default".to_string(),
                total_engaged_users: 1,
                total_chats: chats,
                total_chat_insertion_events: insertions,
                total_chat_copy_events: copies,
                ..Default::default()
            }],
        }],
    });
    record
}

pub fn seat(last_activity_at: Option<DateTime<Utc>>) -> Seat {
    Seat {
        created_at: instant("2024-01-01T00:00:00Z"),
        updated_at: None,
        pending_cancellation_date: None,
        last_activity_at,
        last_activity_editor: last_activity_at.map(|_| "vscode".to_string()),
        plan_type: Some("business".to_string()),
        assignee: None,
        assigning_team: None,
    }
}

pub fn snapshot(seats: Vec<Seat>) -> SeatSnapshot {
    SeatSnapshot {
        total_seats: seats.len() as u64,
        seats,
        ..Default::default()
    }
}
