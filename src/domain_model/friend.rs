use crate::domain_model::{UserId, UserPair};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// An undirected friendship. There is at most one edge per pair.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct FriendshipEdge {
    pub pair: UserPair,
    pub since: DateTime<Utc>,
}

impl FriendshipEdge {
    /// `since` is kept at microsecond precision, the resolution of the
    /// MySQL column.
    pub fn new(a: UserId, b: UserId, since: DateTime<Utc>) -> Self {
        Self {
            pair: UserPair::new(a, b),
            since: since.trunc_subsecs(6),
        }
    }
}

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct FriendCursor {
    pub since: DateTime<Utc>,
    pub other_user: UserId, // tiebreaker
}

impl FriendCursor {
    /// Cursor resuming right after `summary`.
    pub fn after(summary: &FriendSummary) -> Self {
        Self {
            since: summary.since,
            other_user: summary.user_id,
        }
    }

    /// True when a row sorts strictly after this cursor in
    /// `(since DESC, other_user DESC)` order.
    pub fn precedes(&self, since: DateTime<Utc>, other_user: UserId) -> bool {
        since < self.since || (since == self.since && other_user < self.other_user)
    }
}

impl fmt::Display for FriendCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}~{}",
            self.since.to_rfc3339_opts(SecondsFormat::Nanos, true),
            self.other_user
        )
    }
}

impl FromStr for FriendCursor {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (date_str, user_str) = s.split_once('~').ok_or("invalid cursor format")?;

        let since = date_str
            .parse::<DateTime<Utc>>()
            .map_err(|e| e.to_string())?;

        let other_user = uuid::Uuid::parse_str(user_str)
            .map(UserId)
            .map_err(|e| e.to_string())?;

        Ok(FriendCursor { since, other_user })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendSummary {
    pub user_id: UserId,
    pub since: DateTime<Utc>,
}

/// Orders summaries newest first, ties broken by id descending.
pub fn sort_friend_page(rows: &mut [FriendSummary]) {
    rows.sort_by(|a, b| {
        b.since
            .cmp(&a.since)
            .then_with(|| b.user_id.cmp(&a.user_id))
    });
}
