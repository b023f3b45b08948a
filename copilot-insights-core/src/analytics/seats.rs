//! Seat roster queries: search, team and editor filters, sorting.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::Seat;

/// Column a roster is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatSortField {
    Login,
    Team,
    CreatedAt,
    #[default]
    LastActivityAt,
    LastActivityEditor,
}

impl SeatSortField {
    pub const ALL: [SeatSortField; 5] = [
        SeatSortField::Login,
        SeatSortField::Team,
        SeatSortField::CreatedAt,
        SeatSortField::LastActivityAt,
        SeatSortField::LastActivityEditor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeatSortField::Login => "login",
            SeatSortField::Team => "team",
            SeatSortField::CreatedAt => "created_at",
            SeatSortField::LastActivityAt => "last_activity_at",
            SeatSortField::LastActivityEditor => "last_activity_editor",
        }
    }
}

impl fmt::Display for SeatSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeatSortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeatSortField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| Error::Parse {
                what: "seat sort field",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(Error::Parse {
                what: "sort direction",
                value: other.to_string(),
            }),
        }
    }
}

/// Roster selection. Empty fields keep every seat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatQuery {
    /// Case-insensitive substring of the assignee's login or name
    pub search: Option<String>,
    /// Exact assigning team name
    pub team: Option<String>,
    /// Prefix of the last-activity editor, e.g. `vscode`
    pub editor: Option<String>,
    #[serde(default)]
    pub sort_field: SeatSortField,
    #[serde(default)]
    pub direction: SortDirection,
}

fn login(seat: &Seat) -> &str {
    seat.assignee.as_ref().map(|a| a.login.as_str()).unwrap_or("")
}

fn team_name(seat: &Seat) -> &str {
    seat.assigning_team
        .as_ref()
        .map(|t| t.name.as_str())
        .unwrap_or("")
}

fn matches_search(seat: &Seat, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    seat.assignee.as_ref().is_some_and(|a| {
        a.login.to_lowercase().contains(&needle)
            || a
                .name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
    })
}

/// Seats matching every populated field of `query`, in input order.
pub fn filter_seats<'a>(seats: &'a [Seat], query: &SeatQuery) -> Vec<&'a Seat> {
    seats
        .iter()
        .filter(|seat| {
            query
                .search
                .as_deref()
                .filter(|s| !s.is_empty())
                .map_or(true, |s| matches_search(seat, s))
        })
        .filter(|seat| {
            query
                .team
                .as_deref()
                .map_or(true, |team| team_name(seat) == team)
        })
        .filter(|seat| {
            query.editor.as_deref().map_or(true, |editor| {
                seat.last_activity_editor
                    .as_deref()
                    .is_some_and(|e| e.starts_with(editor))
            })
        })
        .collect()
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Stable sort by `field`. Missing logins, teams and editors sort as empty
/// strings; never-active seats sort before any activity.
pub fn sort_seats(seats: &mut [&Seat], field: SeatSortField, direction: SortDirection) {
    seats.sort_by(|a, b| {
        let ordering = match field {
            SeatSortField::Login => compare_text(login(a), login(b)),
            SeatSortField::Team => compare_text(team_name(a), team_name(b)),
            SeatSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SeatSortField::LastActivityAt => a.last_activity_at.cmp(&b.last_activity_at),
            SeatSortField::LastActivityEditor => compare_text(
                a.last_activity_editor.as_deref().unwrap_or(""),
                b.last_activity_editor.as_deref().unwrap_or(""),
            ),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Filter then sort.
pub fn query_seats<'a>(seats: &'a [Seat], query: &SeatQuery) -> Vec<&'a Seat> {
    let mut selected = filter_seats(seats, query);
    sort_seats(&mut selected, query.sort_field, query.direction);
    selected
}

/// Distinct editors of last use, without version suffix (`vscode/1.88` -> `vscode`), sorted.
pub fn seat_editors(seats: &[Seat]) -> Vec<String> {
    seats
        .iter()
        .filter_map(|seat| seat.last_activity_editor.as_deref())
        .filter_map(|editor| editor.split('/').next())
        .filter(|editor| !editor.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct assigning team names, sorted.
pub fn seat_teams(seats: &[Seat]) -> Vec<String> {
    seats
        .iter()
        .filter_map(|seat| seat.assigning_team.as_ref())
        .map(|team| team.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
