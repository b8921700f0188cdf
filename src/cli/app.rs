//! CLI module for the recaller application
//!
//! This module handles the command-line interface for interacting with the
//! note store and for driving interactive review sessions.
use std::{
    io::{stdin, stdout, Write},
    path::PathBuf,
};

use chrono::Utc;
use console::style;
use log::info;

use crate::{
    format_relative_label, parse_tags, Commands, Note, NoteStore, RecallError, Result,
    ReviewSession,
};

/// CLI application handler - processes CLI commands against the note store.
pub struct App {
    /// The note store backend
    store: NoteStore,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application around the given store
    pub fn new(store: NoteStore, verbose: bool) -> Self {
        Self { store, verbose }
    }

    /// Run the CLI application with the given command
    pub fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Add {
                title,
                description,
                tags,
            } => self.handle_add(title, description, tags)?,

            Commands::View { id, json } => self.handle_view(id, json)?,

            Commands::List {
                tag,
                due,
                limit,
                json,
            } => self.handle_list(tag, due, limit, json)?,

            Commands::Search { query, limit, json } => self.handle_search(query, limit, json)?,

            Commands::Edit {
                id,
                title,
                description,
                tags,
            } => self.handle_edit(id, title, description, tags)?,

            Commands::Delete { id, force } => self.handle_delete(id, force)?,

            Commands::Study { limit } => self.handle_study(limit)?,

            Commands::Stats { json } => self.handle_stats(json)?,

            Commands::Tags { available } => self.handle_tags(available)?,

            Commands::Backup => self.handle_backup()?,

            Commands::Restore { backup_file, force } => self.handle_restore(backup_file, force)?,
        }

        Ok(())
    }

    fn handle_add(
        &mut self,
        title: String,
        description: String,
        tags: Option<String>,
    ) -> Result<()> {
        let note = self.store.create(&title, &description, parse_tags(tags))?;
        println!("Note created with ID: {}", note.id);
        println!(
            "First review: {}",
            format_relative_label(note.next_review, Utc::now())
        );
        Ok(())
    }

    fn handle_view(&self, id: String, json: bool) -> Result<()> {
        let note = self
            .store
            .get(&id)
            .ok_or(RecallError::NoteNotFound { id })?;

        if json {
            println!("{}", serde_json::to_string_pretty(&note)?);
            return Ok(());
        }

        println!("Title: {}", style(&note.title).bold());
        println!("Answer: {}", note.description);
        if !note.tags.is_empty() {
            println!("Tags: {}", style(note.tags.join(", ")).cyan());
        }
        println!("Created: {}", note.created_at.format("%Y-%m-%d %H:%M"));
        match note.last_reviewed {
            Some(at) => println!(
                "Reviews: {} ({} successful), last on {}",
                note.review_count,
                note.success_count,
                at.format("%Y-%m-%d %H:%M")
            ),
            None => println!("Reviews: none yet"),
        }
        println!(
            "Next review: {} ({})",
            format_relative_label(note.next_review, Utc::now()),
            note.next_review.format("%Y-%m-%d")
        );
        Ok(())
    }

    fn handle_list(&self, tags: Vec<String>, due: bool, limit: usize, json: bool) -> Result<()> {
        let mut notes = if due {
            self.store.due_notes(Utc::now())
        } else if !tags.is_empty() {
            self.store.filter_by_tags(&tags)
        } else {
            self.store.list_all()
        };

        // Soonest review first
        notes.sort_by(|a, b| a.next_review.cmp(&b.next_review));
        notes.truncate(limit);

        self.display_notes(&notes, json)
    }

    fn handle_search(&self, query: String, limit: usize, json: bool) -> Result<()> {
        let mut notes = self.store.search(&query);
        notes.sort_by(|a, b| a.title.cmp(&b.title));
        notes.truncate(limit);

        self.display_notes(&notes, json)
    }

    fn handle_edit(
        &mut self,
        id: String,
        title: Option<String>,
        description: Option<String>,
        tags: Option<String>,
    ) -> Result<()> {
        let existing = self
            .store
            .get(&id)
            .ok_or_else(|| RecallError::NoteNotFound { id: id.clone() })?;

        let title = title.unwrap_or(existing.title);
        let description = description.unwrap_or(existing.description);
        let tags = match tags {
            Some(t) => parse_tags(Some(t)),
            None => existing.tags,
        };

        match self.store.update(&id, &title, &description, tags)? {
            Some(note) => println!("Note {} updated", note.id),
            None => return Err(RecallError::NoteNotFound { id }),
        }
        Ok(())
    }

    fn handle_delete(&mut self, id: String, force: bool) -> Result<()> {
        if !force && !self.confirm(&format!("Delete note {} permanently?", id))? {
            println!("Aborted.");
            return Ok(());
        }

        if self.store.delete(&id)? {
            println!("Note {} deleted", id);
        } else {
            println!("No note with ID {}", id);
        }
        Ok(())
    }

    /// Runs an interactive review session over the currently due notes.
    fn handle_study(&mut self, limit: Option<usize>) -> Result<()> {
        let mut batch = self.store.due_notes(Utc::now());
        batch.sort_by(|a, b| a.next_review.cmp(&b.next_review));
        if let Some(limit) = limit {
            batch.truncate(limit);
        }

        info!("Starting study session with {} due notes", batch.len());
        let mut session = ReviewSession::new(batch);

        if session.is_empty() {
            println!("No notes to study! All caught up — come back later or add more notes.");
            return Ok(());
        }

        'notes: while let Some(note) = session.current().cloned() {
            println!();
            println!(
                "{}",
                style(format!(
                    "Note {} of {}",
                    session.position().unwrap_or(0),
                    session.len()
                ))
                .dim()
            );
            println!("{}", style(&note.title).bold());

            // Question stage: answer still hidden
            loop {
                match self.prompt("[r]eveal answer  [s]kip  [q]uit > ")?.as_str() {
                    "r" => {
                        session.reveal()?;
                        break;
                    }
                    "s" => {
                        session.skip()?;
                        continue 'notes;
                    }
                    "q" => {
                        session.finish();
                        break 'notes;
                    }
                    other => println!("Unrecognized input: {}", other),
                }
            }

            println!("{}", note.description);
            if !note.tags.is_empty() {
                println!("Tags: {}", style(note.tags.join(", ")).cyan());
            }

            // Grading stage: answer revealed
            loop {
                match self
                    .prompt("[y] got it  [n] missed it  [s]kip  [q]uit > ")?
                    .as_str()
                {
                    "y" => {
                        session.answer(true, &mut self.store)?;
                        break;
                    }
                    "n" => {
                        session.answer(false, &mut self.store)?;
                        break;
                    }
                    "s" => {
                        session.skip()?;
                        break;
                    }
                    "q" => {
                        session.finish();
                        break 'notes;
                    }
                    other => println!("Unrecognized input: {}", other),
                }
            }
        }

        println!();
        let answered = session.answered();
        println!(
            "Study session complete! You reviewed {} note{}.",
            answered,
            if answered == 1 { "" } else { "s" }
        );
        Ok(())
    }

    fn handle_stats(&self, json: bool) -> Result<()> {
        let stats = self.store.stats(Utc::now());

        if json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        println!("Total notes:          {}", stats.total);
        println!("Due today:            {}", stats.due);
        println!("Overdue:              {}", stats.overdue);
        println!("Reviewed at least once: {}", stats.reviewed);
        println!("Average success rate: {}%", stats.average_success_rate);
        Ok(())
    }

    fn handle_tags(&self, available: bool) -> Result<()> {
        let tags = if available {
            self.store.all_available_tags()
        } else {
            self.store.all_tags()
        };

        if tags.is_empty() {
            println!("No tags yet.");
            return Ok(());
        }

        for tag in tags {
            println!("{}", tag);
        }
        Ok(())
    }

    fn handle_backup(&self) -> Result<()> {
        let path = self.store.create_backup()?;
        println!("Backup created at {}", path.display());
        Ok(())
    }

    fn handle_restore(&mut self, backup_file: PathBuf, force: bool) -> Result<()> {
        if !force
            && !self.confirm("Restoring replaces the current notes and tags. Continue?")?
        {
            println!("Aborted.");
            return Ok(());
        }

        let (notes, tags) = self.store.restore_backup(&backup_file)?;
        println!("Restored {} notes and {} tags", notes, tags);
        Ok(())
    }

    /// Display notes in the requested format
    fn display_notes(&self, notes: &[Note], json: bool) -> Result<()> {
        if notes.is_empty() {
            println!("No notes found matching the criteria.");
            return Ok(());
        }

        if json {
            println!("{}", serde_json::to_string_pretty(notes)?);
            return Ok(());
        }

        let now = Utc::now();
        for note in notes {
            println!(
                "{}  {}  {}",
                style(&note.id).dim(),
                style(&note.title).bold(),
                format_relative_label(note.next_review, now)
            );
            if self.verbose {
                println!("    {}", note.description);
            }
            if !note.tags.is_empty() {
                println!("    Tags: {}", style(note.tags.join(", ")).cyan());
            }
        }

        println!(
            "\nFound {} note{}",
            notes.len(),
            if notes.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    fn confirm(&self, message: &str) -> Result<bool> {
        let input = self.prompt(&format!("{} [y/N] ", message))?;
        Ok(input == "y" || input == "yes")
    }

    /// Reads one lowercased line from stdin. End of input reads as "q".
    fn prompt(&self, message: &str) -> Result<String> {
        print!("{}", message);
        stdout().flush()?;

        let mut line = String::new();
        let bytes = stdin().read_line(&mut line)?;
        if bytes == 0 {
            return Ok("q".to_string());
        }
        Ok(line.trim().to_lowercase())
    }
}
