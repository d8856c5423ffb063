//! Pagination and filter state machine for the notes browser.
//!
//! The controller is a pure transition function: every user intent and
//! every transport completion arrives as an [`Event`], all state
//! changes happen inside [`Model::update`], and any network work a
//! transition requires is handed back as a [`Command`] for the caller
//! to execute. Nothing in this module performs IO, which keeps the
//! whole state machine testable without a runtime.

use shared::{
    domain::{Note, TagFilter},
    protocol::NotesPage,
};
use tracing::debug;

use crate::transport::TransportError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination limits, injected at construction instead of living as
/// module globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub min_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            min_page_size: 1,
            max_page_size: 50,
        }
    }
}

impl PageLimits {
    fn clamp(&self, size: i64) -> u32 {
        size.clamp(i64::from(self.min_page_size), i64::from(self.max_page_size)) as u32
    }
}

/// Status of the most recent list fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadingState {
    Loaded,
    Loading,
    Failed(String),
}

/// Status of the most recent note creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavingState {
    Idle,
    Saving,
    Failed(String),
}

/// Monotonic tag carried by every issued list fetch. A completion
/// whose generation is no longer current is discarded, so the
/// latest-issued request wins regardless of arrival order.
pub type FetchGeneration = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    RequestPage(u32),
    /// Raw text from the page-size control; unparsable input is a
    /// no-op rather than an error.
    ChangePageSize(String),
    AddFilterTag(String),
    RemoveFilterTag(String),
    ListNotesCompleted {
        generation: FetchGeneration,
        result: Result<NotesPage, TransportError>,
    },
    BeginComposeNote,
    CancelComposeNote,
    EditDraftNote(String),
    SubmitDraftNote,
    CreateNoteCompleted(Result<Note, TransportError>),
}

/// Transport work requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ListNotes {
        generation: FetchGeneration,
        page: u32,
        page_size: u32,
        filter: TagFilter,
    },
    CreateNote {
        text: String,
    },
}

/// Read-only projection handed to the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub notes: Vec<Note>,
    pub loading: LoadingState,
    pub saving: SavingState,
    pub page: u32,
    pub page_size: u32,
    pub last_page: u32,
    pub filter: Vec<String>,
    pub draft_text: String,
    pub compose_mode: bool,
}

impl ViewSnapshot {
    // Enablement predicates for the view's controls, derived rather
    // than stored. Previous and first share the page > 0 rule; next
    // and last share the page < last_page bound.

    pub fn can_go_first(&self) -> bool {
        !self.is_loading() && self.page > 0
    }

    pub fn can_go_prev(&self) -> bool {
        !self.is_loading() && self.page > 0
    }

    pub fn can_go_next(&self) -> bool {
        !self.is_loading() && self.page < self.last_page
    }

    pub fn can_go_last(&self) -> bool {
        !self.is_loading() && self.page < self.last_page
    }

    pub fn can_change_page_size(&self) -> bool {
        !self.is_loading()
    }

    /// Whether the draft is submittable; the view gates the submit
    /// affordance on this.
    pub fn is_valid_draft(&self) -> bool {
        !self.draft_text.trim().is_empty()
    }

    fn is_loading(&self) -> bool {
        matches!(self.loading, LoadingState::Loading)
    }
}

#[derive(Debug, Clone)]
pub struct Model {
    limits: PageLimits,
    notes: Vec<Note>,
    loading: LoadingState,
    saving: SavingState,
    page: u32,
    page_size: u32,
    last_page: u32,
    filter: TagFilter,
    draft_text: String,
    compose_mode: bool,
    fetch_generation: FetchGeneration,
}

impl Model {
    /// Initial state with the first page fetch already issued.
    pub fn init(limits: PageLimits) -> (Self, Command) {
        let page_size = limits.clamp(i64::from(DEFAULT_PAGE_SIZE));
        let model = Self {
            limits,
            notes: Vec::new(),
            loading: LoadingState::Loading,
            saving: SavingState::Idle,
            page: 0,
            page_size,
            last_page: 0,
            filter: TagFilter::new(),
            draft_text: String::new(),
            compose_mode: false,
            fetch_generation: 1,
        };
        let command = Command::ListNotes {
            generation: 1,
            page: 0,
            page_size,
            filter: TagFilter::new(),
        };
        (model, command)
    }

    pub fn update(&mut self, event: Event) -> Option<Command> {
        match event {
            Event::RequestPage(page) => {
                self.page = page;
                Some(self.issue_fetch())
            }
            Event::ChangePageSize(raw) => {
                let parsed = raw.trim().parse::<i64>().ok()?;
                let next_size = self.limits.clamp(parsed);
                // Keep the first currently visible record visible.
                let next_page =
                    (u64::from(self.page_size) * u64::from(self.page) / u64::from(next_size)) as u32;
                self.page = next_page;
                self.page_size = next_size;
                Some(self.issue_fetch())
            }
            Event::AddFilterTag(tag) => {
                if !self.filter.insert(tag) {
                    return None;
                }
                self.page = 0;
                Some(self.issue_fetch())
            }
            Event::RemoveFilterTag(tag) => {
                if !self.filter.remove(&tag) {
                    return None;
                }
                self.page = 0;
                Some(self.issue_fetch())
            }
            Event::ListNotesCompleted { generation, result } => {
                if generation != self.fetch_generation {
                    debug!(
                        generation,
                        current = self.fetch_generation,
                        "discarding stale list result"
                    );
                    return None;
                }
                match result {
                    Ok(page) => {
                        self.loading = LoadingState::Loaded;
                        self.last_page = last_page_for(page.total, self.page_size);
                        self.notes = page.data;
                    }
                    Err(err) => self.loading = LoadingState::Failed(err.to_string()),
                }
                None
            }
            Event::BeginComposeNote => {
                self.compose_mode = true;
                None
            }
            Event::CancelComposeNote => {
                self.compose_mode = false;
                None
            }
            Event::EditDraftNote(text) => {
                self.draft_text = text;
                None
            }
            Event::SubmitDraftNote => {
                // The view disables submit for blank drafts; accept the
                // event anyway and do nothing.
                let text = self.draft_text.trim();
                if text.is_empty() {
                    return None;
                }
                self.saving = SavingState::Saving;
                Some(Command::CreateNote {
                    text: text.to_string(),
                })
            }
            Event::CreateNoteCompleted(result) => {
                match result {
                    Ok(note) => {
                        self.notes.insert(0, note);
                        self.draft_text.clear();
                        self.saving = SavingState::Idle;
                    }
                    Err(err) => self.saving = SavingState::Failed(err.to_string()),
                }
                None
            }
        }
    }

    fn issue_fetch(&mut self) -> Command {
        self.loading = LoadingState::Loading;
        self.fetch_generation += 1;
        Command::ListNotes {
            generation: self.fetch_generation,
            page: self.page,
            page_size: self.page_size,
            filter: self.filter.clone(),
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            notes: self.notes.clone(),
            loading: self.loading.clone(),
            saving: self.saving.clone(),
            page: self.page,
            page_size: self.page_size,
            last_page: self.last_page,
            filter: self.filter.tags().to_vec(),
            draft_text: self.draft_text.clone(),
            compose_mode: self.compose_mode,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn loading(&self) -> &LoadingState {
        &self.loading
    }

    pub fn saving(&self) -> &SavingState {
        &self.saving
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn last_page(&self) -> u32 {
        self.last_page
    }

    pub fn filter(&self) -> &TagFilter {
        &self.filter
    }

    pub fn draft_text(&self) -> &str {
        &self.draft_text
    }

    pub fn compose_mode(&self) -> bool {
        self.compose_mode
    }
}

/// `floor((total - 1) / page_size)`, with an empty collection pinned
/// to page 0.
fn last_page_for(total: i64, page_size: u32) -> u32 {
    if total <= 0 {
        return 0;
    }
    ((total - 1) / i64::from(page_size)) as u32
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
