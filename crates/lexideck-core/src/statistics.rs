//! Deck-level progress statistics.
//!
//! Everything here is a pure function of a card snapshot and a caller-supplied
//! `now`; nothing is cached between calls.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Card;

/// How long ago a card was last reviewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyBucket {
    /// Under 24 hours.
    Today,
    /// Under 7 days.
    ThisWeek,
    /// Under 30 days.
    ThisMonth,
    /// 30 days or more, or never reviewed.
    Older,
}

impl RecencyBucket {
    pub const ALL: [RecencyBucket; 4] = [
        RecencyBucket::Today,
        RecencyBucket::ThisWeek,
        RecencyBucket::ThisMonth,
        RecencyBucket::Older,
    ];

    /// Bucket for a review timestamp relative to `now`.
    pub fn classify(last_reviewed_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let Some(reviewed) = last_reviewed_at else {
            return RecencyBucket::Older;
        };
        let age = now - reviewed;
        if age < Duration::hours(24) {
            RecencyBucket::Today
        } else if age < Duration::days(7) {
            RecencyBucket::ThisWeek
        } else if age < Duration::days(30) {
            RecencyBucket::ThisMonth
        } else {
            RecencyBucket::Older
        }
    }
}

impl fmt::Display for RecencyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecencyBucket::Today => write!(f, "today"),
            RecencyBucket::ThisWeek => write!(f, "this week"),
            RecencyBucket::ThisMonth => write!(f, "this month"),
            RecencyBucket::Older => write!(f, "older / never"),
        }
    }
}

/// Card counts per recency bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    pub today: usize,
    pub this_week: usize,
    pub this_month: usize,
    pub older: usize,
}

impl BucketCounts {
    pub fn get(&self, bucket: RecencyBucket) -> usize {
        match bucket {
            RecencyBucket::Today => self.today,
            RecencyBucket::ThisWeek => self.this_week,
            RecencyBucket::ThisMonth => self.this_month,
            RecencyBucket::Older => self.older,
        }
    }

    fn increment(&mut self, bucket: RecencyBucket) {
        match bucket {
            RecencyBucket::Today => self.today += 1,
            RecencyBucket::ThisWeek => self.this_week += 1,
            RecencyBucket::ThisMonth => self.this_month += 1,
            RecencyBucket::Older => self.older += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.today + self.this_week + self.this_month + self.older
    }
}

/// Derived progress figures for one deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub total_cards: usize,
    pub known_cards: usize,
    pub unknown_cards: usize,
    /// Most recent review across the deck, if any card was ever reviewed.
    pub last_reviewed_at: Option<DateTime<Utc>>,
    /// Share of known cards, in `[0, 1]`.
    pub average_accuracy: f64,
    pub buckets: BucketCounts,
}

/// Compute statistics for a card snapshot as of `now`.
pub fn compute(cards: &[Card], now: DateTime<Utc>) -> StatisticsSnapshot {
    let total_cards = cards.len();
    let known_cards = cards.iter().filter(|c| c.is_known).count();

    let average_accuracy = if total_cards > 0 {
        known_cards as f64 / total_cards as f64
    } else {
        0.0
    };

    let last_reviewed_at = cards.iter().filter_map(|c| c.last_reviewed_at).max();

    let mut buckets = BucketCounts::default();
    for card in cards {
        buckets.increment(RecencyBucket::classify(card.last_reviewed_at, now));
    }

    StatisticsSnapshot {
        total_cards,
        known_cards,
        unknown_cards: total_cards - known_cards,
        last_reviewed_at,
        average_accuracy,
        buckets,
    }
}

impl StatisticsSnapshot {
    /// Format the snapshot as a markdown summary.
    pub fn to_markdown(&self, deck_name: &str) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {deck_name}\n\n"));
        md.push_str(&format!(
            "**Cards:** {} total, {} known, {} unknown ({:.1}% known)\n\n",
            self.total_cards,
            self.known_cards,
            self.unknown_cards,
            self.average_accuracy * 100.0
        ));
        match self.last_reviewed_at {
            Some(ts) => md.push_str(&format!("**Last review:** {}\n\n", ts.to_rfc3339())),
            None => md.push_str("**Last review:** never\n\n"),
        }

        md.push_str("| Last reviewed | Cards |\n");
        md.push_str("|---------------|-------|\n");
        for bucket in RecencyBucket::ALL {
            md.push_str(&format!("| {} | {} |\n", bucket, self.buckets.get(bucket)));
        }

        md
    }
}
