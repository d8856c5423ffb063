use serde::{Deserialize, Serialize};

use crate::domain::Note;

/// One window of the notes collection as returned by the service.
///
/// Every field is required; a response missing any of them must fail
/// decoding rather than fall back to a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesPage {
    pub data: Vec<Note>,
    pub limit: i64,
    pub skip: i64,
    pub total: i64,
}

impl NotesPage {
    /// Whether records remain beyond this window, judged from the
    /// server-echoed `skip`/`total` rather than client pagination
    /// state.
    pub fn has_more(&self) -> bool {
        self.skip + (self.data.len() as i64) < self.total
    }
}
