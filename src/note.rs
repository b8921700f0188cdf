//! Core data structures for the recaller application.
//!
//! This module contains the primary record type: a question/answer note with
//! its spaced-repetition scheduling state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{next_review_from, normalize_tags};

/// Represents a single reviewable note in our system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for the note
    pub id: String,
    /// Question side shown first during review
    pub title: String,
    /// Answer side revealed on demand
    pub description: String,
    /// Tags for organization, deduplicated with insertion order kept
    pub tags: Vec<String>,
    /// When the note was created
    pub created_at: DateTime<Utc>,
    /// When the note was last reviewed, if ever
    pub last_reviewed: Option<DateTime<Utc>>,
    /// Next scheduled review time
    pub next_review: DateTime<Utc>,
    /// Current position in the review interval ladder
    pub interval_index: usize,
    /// Total reviews recorded
    pub review_count: u32,
    /// Successful reviews recorded
    pub success_count: u32,
}

impl Note {
    /// Creates a new note with the given title and description.
    ///
    /// The note starts at the bottom of the interval ladder with its first
    /// review due one day from now.
    pub fn new(title: String, description: String, tags: Vec<String>) -> Self {
        let now = Utc::now();
        // Generate a unique ID using timestamp and title
        let id = format!(
            "{}-{}",
            now.timestamp_millis(),
            title.to_lowercase().replace(' ', "-")
        );

        Note {
            id,
            title,
            description,
            tags: normalize_tags(tags),
            created_at: now,
            last_reviewed: None,
            next_review: next_review_from(now, 0),
            interval_index: 0,
            review_count: 0,
            success_count: 0,
        }
    }

    /// Whether the note's next scheduled review has arrived as of `as_of`.
    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.next_review <= as_of
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn new_note_starts_at_bottom_of_ladder() {
        let note = Note::new("Question".into(), "Answer".into(), vec![]);

        assert_eq!(note.interval_index, 0);
        assert_eq!(note.review_count, 0);
        assert_eq!(note.success_count, 0);
        assert!(note.last_reviewed.is_none());
        assert_eq!(note.next_review, note.created_at + Duration::days(1));
    }

    #[test]
    fn new_note_deduplicates_tags_preserving_order() {
        let note = Note::new(
            "Q".into(),
            "A".into(),
            vec![
                "rust".to_string(),
                " study ".to_string(),
                "rust".to_string(),
                "".to_string(),
            ],
        );

        assert_eq!(note.tags, vec!["rust".to_string(), "study".to_string()]);
    }

    #[test]
    fn note_is_due_once_next_review_arrives() {
        let note = Note::new("Q".into(), "A".into(), vec![]);

        assert!(!note.is_due(note.created_at));
        assert!(note.is_due(note.next_review));
        assert!(note.is_due(note.next_review + Duration::hours(5)));
    }
}
