use super::*;
use std::time::Duration;

use async_trait::async_trait;
use shared::{
    domain::{Note, TagFilter},
    protocol::NotesPage,
};

use crate::controller::{LoadingState, SavingState};
use crate::transport::TransportError;

/// Fake service over a fixed collection of `total` notes named
/// `note-<index>`, newest first.
struct ScriptedTransport {
    total: i64,
    fail_listing: bool,
    list_calls: Mutex<Vec<(u32, u32, Vec<String>)>>,
}

impl ScriptedTransport {
    fn new(total: i64) -> Self {
        Self {
            total,
            fail_listing: false,
            list_calls: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        let mut transport = Self::new(0);
        transport.fail_listing = true;
        transport
    }

    async fn list_calls(&self) -> Vec<(u32, u32, Vec<String>)> {
        self.list_calls.lock().await.clone()
    }
}

#[async_trait]
impl NotesTransport for ScriptedTransport {
    async fn list_notes(
        &self,
        page: u32,
        page_size: u32,
        filter: &TagFilter,
    ) -> Result<NotesPage, TransportError> {
        self.list_calls
            .lock()
            .await
            .push((page, page_size, filter.tags().to_vec()));
        if self.fail_listing {
            return Err(TransportError::Network);
        }
        let skip = i64::from(page) * i64::from(page_size);
        let window = (self.total - skip).clamp(0, i64::from(page_size));
        let data = (skip..skip + window)
            .map(|index| Note {
                text: format!("note-{index}"),
                tags: Vec::new(),
            })
            .collect();
        Ok(NotesPage {
            data,
            limit: i64::from(page_size),
            skip,
            total: self.total,
        })
    }

    async fn create_note(&self, text: &str) -> Result<Note, TransportError> {
        Ok(Note {
            text: text.to_string(),
            tags: Vec::new(),
        })
    }
}

async fn wait_for(
    session: &NotesSession,
    predicate: impl Fn(&ViewSnapshot) -> bool,
) -> ViewSnapshot {
    for _ in 0..200 {
        let snapshot = session.snapshot().await;
        if predicate(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("snapshot condition not reached in time");
}

#[tokio::test]
async fn initial_fetch_populates_the_first_page() {
    let transport = Arc::new(ScriptedTransport::new(25));
    let session = NotesSession::start(transport, PageLimits::default());

    let snapshot = wait_for(&session, |s| s.loading == LoadingState::Loaded).await;
    assert_eq!(snapshot.page, 0);
    assert_eq!(snapshot.last_page, 2);
    assert_eq!(snapshot.notes.len(), 10);
    assert_eq!(snapshot.notes[0].text, "note-0");
}

#[tokio::test]
async fn paging_to_the_last_page_yields_the_tail_window() {
    let transport = Arc::new(ScriptedTransport::new(25));
    let session = NotesSession::start(
        Arc::clone(&transport) as Arc<dyn NotesTransport>,
        PageLimits::default(),
    );
    wait_for(&session, |s| s.loading == LoadingState::Loaded).await;

    session.dispatch(Event::RequestPage(2));
    let snapshot =
        wait_for(&session, |s| s.page == 2 && s.loading == LoadingState::Loaded).await;
    assert_eq!(snapshot.notes.len(), 5);
    assert_eq!(snapshot.notes[0].text, "note-20");
}

#[tokio::test]
async fn repeated_tag_adds_trigger_a_single_refetch() {
    let transport = Arc::new(ScriptedTransport::new(25));
    let session = NotesSession::start(
        Arc::clone(&transport) as Arc<dyn NotesTransport>,
        PageLimits::default(),
    );
    wait_for(&session, |s| s.loading == LoadingState::Loaded).await;

    session.dispatch(Event::AddFilterTag("work".into()));
    session.dispatch(Event::AddFilterTag("work".into()));
    let snapshot = wait_for(&session, |s| {
        s.filter == ["work"] && s.loading == LoadingState::Loaded
    })
    .await;
    assert_eq!(snapshot.page, 0);

    // Initial load plus exactly one filtered refetch.
    let calls = transport.list_calls().await;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1], (0, 10, vec!["work".to_string()]));
}

#[tokio::test]
async fn submitting_a_draft_prepends_the_created_note() {
    let transport = Arc::new(ScriptedTransport::new(3));
    let session = NotesSession::start(transport, PageLimits::default());
    wait_for(&session, |s| s.loading == LoadingState::Loaded).await;

    session.dispatch(Event::BeginComposeNote);
    session.dispatch(Event::EditDraftNote("  call the bank  ".into()));
    session.dispatch(Event::SubmitDraftNote);

    let snapshot = wait_for(&session, |s| {
        s.saving == SavingState::Idle && !s.notes.is_empty() && s.notes[0].text == "call the bank"
    })
    .await;
    assert_eq!(snapshot.draft_text, "");
    assert_eq!(snapshot.notes.len(), 4);
}

#[tokio::test]
async fn listing_failure_surfaces_the_message() {
    let transport = Arc::new(ScriptedTransport::failing());
    let session = NotesSession::start(transport, PageLimits::default());

    let snapshot = wait_for(&session, |s| {
        matches!(s.loading, LoadingState::Failed(_))
    })
    .await;
    assert_eq!(snapshot.loading, LoadingState::Failed("network error".into()));
    assert!(snapshot.notes.is_empty());
}
