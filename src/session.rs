//! Review session control flow.
//!
//! A session is one linear pass over a fixed batch of notes, typically the
//! due notes snapshotted at session start. The batch never changes once the
//! session exists; edits to the store during the session do not affect it.
//! Each note is shown question-first, optionally revealed, then either
//! answered (reporting the outcome back to the store) or skipped.

use log::debug;

use crate::{Note, NoteStore, RecallError, Result};

/// Where a review session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The batch was empty at session start
    Empty,
    /// Positioned on the note at `index`, answer hidden or revealed
    Active { index: usize, revealed: bool },
    /// The walk advanced past the last note
    Finished,
}

/// Drives one pass over a batch of notes under review.
pub struct ReviewSession {
    /// Snapshot of the notes to walk, in caller-supplied order
    batch: Vec<Note>,
    state: SessionState,
    /// Notes answered (not skipped) so far
    answered: usize,
}

impl ReviewSession {
    /// Starts a session over the given batch.
    pub fn new(batch: Vec<Note>) -> Self {
        let state = if batch.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Active {
                index: 0,
                revealed: false,
            }
        };

        debug!("Starting review session over {} notes", batch.len());
        Self {
            batch,
            state,
            answered: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of notes in the batch.
    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// The note currently under review, while the session is active.
    pub fn current(&self) -> Option<&Note> {
        match self.state {
            SessionState::Active { index, .. } => self.batch.get(index),
            _ => None,
        }
    }

    /// One-based position of the current note, for progress display.
    pub fn position(&self) -> Option<usize> {
        match self.state {
            SessionState::Active { index, .. } => Some(index + 1),
            _ => None,
        }
    }

    /// How many notes were answered (skips excluded).
    pub fn answered(&self) -> usize {
        self.answered
    }

    /// Reveals the answer side of the current note.
    pub fn reveal(&mut self) -> Result<()> {
        match self.state {
            SessionState::Active {
                index,
                revealed: false,
            } => {
                self.state = SessionState::Active {
                    index,
                    revealed: true,
                };
                Ok(())
            }
            SessionState::Active { revealed: true, .. } => {
                Err(violation("reveal", "the answer is already revealed"))
            }
            _ => Err(violation("reveal", "no note is under review")),
        }
    }

    /// Records the outcome for the current note and advances.
    ///
    /// Only valid once the answer has been revealed; grading an unseen
    /// answer would make the recorded outcome meaningless.
    pub fn answer(&mut self, success: bool, store: &mut NoteStore) -> Result<()> {
        match self.state {
            SessionState::Active {
                index,
                revealed: true,
            } => {
                let id = self.batch[index].id.clone();
                store.record_outcome(&id, success)?;
                self.answered += 1;
                self.advance(index);
                Ok(())
            }
            SessionState::Active {
                revealed: false, ..
            } => Err(violation("answer", "the answer has not been revealed")),
            _ => Err(violation("answer", "no note is under review")),
        }
    }

    /// Advances past the current note without recording an outcome.
    ///
    /// Valid whether or not the answer is revealed; the note's schedule is
    /// left untouched.
    pub fn skip(&mut self) -> Result<()> {
        match self.state {
            SessionState::Active { index, .. } => {
                self.advance(index);
                Ok(())
            }
            _ => Err(violation("skip", "no note is under review")),
        }
    }

    /// Abandons the rest of the walk. Unvisited notes report nothing.
    /// Already-terminal sessions are unaffected.
    pub fn finish(&mut self) {
        if let SessionState::Active { .. } = self.state {
            debug!("Review session abandoned with {} answered", self.answered);
            self.state = SessionState::Finished;
        }
    }

    fn advance(&mut self, index: usize) {
        self.state = if index + 1 < self.batch.len() {
            SessionState::Active {
                index: index + 1,
                revealed: false,
            }
        } else {
            SessionState::Finished
        };
    }
}

fn violation(action: &str, reason: &str) -> RecallError {
    RecallError::SessionViolation {
        message: format!("{} is not valid here: {}", action, reason),
    }
}
