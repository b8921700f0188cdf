//! Shared types for the recaller application.
//!
//! This module contains the crate-wide `Result` alias, the aggregate
//! statistics record, and the CLI command surface.

use std::path::PathBuf;

use clap::Subcommand;
use serde::{Deserialize, Serialize};

use crate::RecallError;

/// A specialized Result type for recaller operations.
pub type Result<T> = std::result::Result<T, RecallError>;

/// Aggregate review statistics across the whole note collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Total number of notes in the store
    pub total: usize,
    /// Notes whose review date arrived today (zero full days late)
    pub due: usize,
    /// Notes whose review date is more than a full day in the past
    pub overdue: usize,
    /// Notes that have been reviewed at least once
    pub reviewed: usize,
    /// Rounded percentage of successful reviews across reviewed notes
    pub average_success_rate: u32,
}

/// Available subcommands for the recaller application
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    Add {
        /// Question side of the note
        #[clap(short = 'T', long)]
        title: String,

        /// Answer side of the note
        #[clap(short, long)]
        description: String,

        /// Tags to associate with the note (comma-separated)
        #[clap(short, long)]
        tags: Option<String>,
    },

    /// View a note by ID
    View {
        /// ID of the note to view
        id: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// List notes with optional filtering
    List {
        /// Filter notes by tag (repeat for AND semantics)
        #[clap(short, long)]
        tag: Vec<String>,

        /// Only show notes that are due for review
        #[clap(short, long)]
        due: bool,

        /// Limit the number of notes returned
        #[clap(short = 'n', long, default_value_t = 20)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Search notes by title, description, or tag
    Search {
        /// Search query text
        query: String,

        /// Limit the number of search results
        #[clap(short = 'n', long, default_value_t = 20)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Edit an existing note
    Edit {
        /// ID of the note to edit
        id: String,

        /// New question side for the note
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New answer side for the note
        #[clap(short, long)]
        description: Option<String>,

        /// Replacement tags for the note (comma-separated)
        #[clap(short, long)]
        tags: Option<String>,
    },

    /// Delete a note by ID
    Delete {
        /// ID of the note to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Run an interactive review session over the notes that are due
    Study {
        /// Cap the number of notes in the session batch
        #[clap(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show aggregate review statistics
    Stats {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// List tags
    Tags {
        /// Include registry tags no longer attached to any note
        #[clap(short, long)]
        available: bool,
    },

    /// Create a backup archive of both collections
    Backup,

    /// Restore both collections from a backup archive
    Restore {
        /// Path to the backup file
        backup_file: PathBuf,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },
}
