//! Spaced-repetition scheduling for the recaller application.
//!
//! A fixed-ladder (Leitner-style) scheduler: every note carries one index
//! into [`REVIEW_LADDER`]. A successful review climbs one rung and saturates
//! at the top; any failure drops the note back to the bottom rung. The
//! per-note state is exactly that one index plus the review counters.

use chrono::{DateTime, Duration, Utc};

use crate::Note;

/// Review intervals in days, indexed by a note's `interval_index`.
pub const REVIEW_LADDER: [i64; 5] = [1, 3, 7, 14, 30];

/// Computes the next review time for a given ladder position.
pub fn next_review_from(from: DateTime<Utc>, interval_index: usize) -> DateTime<Utc> {
    from + Duration::days(REVIEW_LADDER[interval_index])
}

/// Applies a review outcome to a note's scheduling state.
///
/// Increments the counters, moves the interval index (up one rung on
/// success, back to zero on failure), and snapshots the next review time as
/// `now + ladder[interval_index]` days.
pub fn apply_outcome(note: &mut Note, success: bool, now: DateTime<Utc>) {
    note.review_count += 1;

    if success {
        note.success_count += 1;
        // Move to next interval or stay at maximum
        note.interval_index = (note.interval_index + 1).min(REVIEW_LADDER.len() - 1);
    } else {
        // Reset to first interval on failure
        note.interval_index = 0;
    }

    note.last_reviewed = Some(now);
    note.next_review = next_review_from(now, note.interval_index);
}

/// How many whole days a note's review is late as of `as_of`.
///
/// Returns `None` while the next review is still in the future; `Some(0)`
/// means the review arrived today (due), anything greater means overdue.
pub fn days_late(note: &Note, as_of: DateTime<Utc>) -> Option<i64> {
    if note.next_review > as_of {
        return None;
    }
    Some((as_of - note.next_review).num_days())
}

/// Renders a review date relative to `now` for display.
///
/// The day difference is rounded up, so any part of a future day counts as
/// that day: 36 hours out reads "Due in 2 days", 12 hours overdue still
/// reads "Due today".
pub fn format_relative_label(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_days = ceil_days(date - now);

    if diff_days < 0 {
        let overdue = diff_days.unsigned_abs();
        format!(
            "{} day{} overdue",
            overdue,
            if overdue == 1 { "" } else { "s" }
        )
    } else if diff_days == 0 {
        "Due today".to_string()
    } else if diff_days == 1 {
        "Due tomorrow".to_string()
    } else {
        format!("Due in {} days", diff_days)
    }
}

/// Ceiling of a duration in whole days.
fn ceil_days(diff: Duration) -> i64 {
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    let ms = diff.num_milliseconds();
    if ms >= 0 {
        (ms + DAY_MS - 1) / DAY_MS
    } else {
        // Integer division truncates toward zero, which is already the
        // ceiling for negative values.
        ms / DAY_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_note() -> Note {
        Note::new("Question".into(), "Answer".into(), vec![])
    }

    #[test]
    fn success_climbs_one_rung_and_saturates() {
        let mut note = sample_note();
        let mut previous = note.interval_index;

        for _ in 0..10 {
            apply_outcome(&mut note, true, Utc::now());
            assert!(note.interval_index >= previous, "index must not decrease");
            assert!(note.interval_index <= REVIEW_LADDER.len() - 1);
            previous = note.interval_index;
        }

        assert_eq!(note.interval_index, REVIEW_LADDER.len() - 1);
        assert_eq!(note.review_count, 10);
        assert_eq!(note.success_count, 10);
    }

    #[test]
    fn failure_resets_to_first_interval() {
        let mut note = sample_note();
        for _ in 0..4 {
            apply_outcome(&mut note, true, Utc::now());
        }
        assert_eq!(note.interval_index, 4);

        apply_outcome(&mut note, false, Utc::now());

        assert_eq!(note.interval_index, 0);
        assert_eq!(note.review_count, 5);
        assert_eq!(note.success_count, 4);
    }

    #[test]
    fn success_count_never_exceeds_review_count() {
        let mut note = sample_note();
        let outcomes = [true, false, true, true, false, false, true];

        for (i, &success) in outcomes.iter().enumerate() {
            apply_outcome(&mut note, success, Utc::now());
            assert!(note.success_count <= note.review_count, "after outcome {}", i);
        }
    }

    #[test]
    fn outcome_snapshots_next_review_from_now() {
        let mut note = sample_note();
        let now = Utc::now();

        apply_outcome(&mut note, true, now);
        assert_eq!(note.last_reviewed, Some(now));
        assert_eq!(note.next_review, now + Duration::days(REVIEW_LADDER[1]));

        apply_outcome(&mut note, false, now);
        assert_eq!(note.next_review, now + Duration::days(REVIEW_LADDER[0]));
    }

    #[test]
    fn days_late_excludes_future_reviews() {
        let note = sample_note();

        // Due tomorrow: not late yet, even a minute before the deadline.
        assert_eq!(days_late(&note, note.created_at), None);
        assert_eq!(
            days_late(&note, note.next_review - Duration::minutes(1)),
            None
        );

        assert_eq!(days_late(&note, note.next_review), Some(0));
        assert_eq!(
            days_late(&note, note.next_review + Duration::hours(12)),
            Some(0)
        );
        assert_eq!(
            days_late(&note, note.next_review + Duration::days(3)),
            Some(3)
        );
    }

    #[test]
    fn relative_labels_round_up_to_whole_days() {
        let now = Utc::now();

        assert_eq!(format_relative_label(now, now), "Due today");
        assert_eq!(
            format_relative_label(now + Duration::days(1), now),
            "Due tomorrow"
        );
        assert_eq!(
            format_relative_label(now + Duration::hours(36), now),
            "Due in 2 days"
        );
        assert_eq!(
            format_relative_label(now + Duration::days(10), now),
            "Due in 10 days"
        );
        assert_eq!(
            format_relative_label(now - Duration::hours(12), now),
            "Due today"
        );
        assert_eq!(
            format_relative_label(now - Duration::days(1), now),
            "1 day overdue"
        );
        assert_eq!(
            format_relative_label(now - Duration::days(2), now),
            "2 days overdue"
        );
    }
}
