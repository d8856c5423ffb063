//! Client-side core for the notes browser: a typed transport to the
//! remote notes service plus the pagination/filter controller that
//! drives it.
//!
//! The split mirrors a Model-Update-View loop with the view cut away:
//! [`controller::Model::update`] is the pure transition function and
//! [`NotesSession`] is the serial event loop that runs transport
//! commands out of band and feeds their completions back into the same
//! queue.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::warn;

pub mod controller;
pub mod transport;

use crate::controller::{Command, Event, Model, PageLimits, ViewSnapshot};
use crate::transport::NotesTransport;

/// Serial event loop around a [`Model`] and a transport.
///
/// Events are processed one at a time in arrival order, so transitions
/// never observe each other mid-flight. Transport calls run as spawned
/// tasks and re-enter the queue as completion events; a superseded
/// fetch is not cancelled, its completion is simply discarded by the
/// controller's generation guard.
pub struct NotesSession {
    model: Mutex<Model>,
    transport: Arc<dyn NotesTransport>,
    queue: mpsc::UnboundedSender<Event>,
}

impl NotesSession {
    /// Starts the event loop with the initial page fetch already in
    /// flight.
    pub fn start(transport: Arc<dyn NotesTransport>, limits: PageLimits) -> Arc<Self> {
        let (queue, events) = mpsc::unbounded_channel();
        let (model, initial_fetch) = Model::init(limits);
        let session = Arc::new(Self {
            model: Mutex::new(model),
            transport,
            queue,
        });
        session.spawn_command(initial_fetch);
        let looped = Arc::clone(&session);
        tokio::spawn(async move { looped.run(events).await });
        session
    }

    /// Feeds a user intent into the event queue.
    pub fn dispatch(&self, event: Event) {
        if self.queue.send(event).is_err() {
            warn!("event queue closed; dropping event");
        }
    }

    /// Read-only projection of the current state for the view layer.
    pub async fn snapshot(&self) -> ViewSnapshot {
        self.model.lock().await.snapshot()
    }

    async fn run(self: Arc<Self>, mut events: mpsc::UnboundedReceiver<Event>) {
        while let Some(event) = events.recv().await {
            let command = self.model.lock().await.update(event);
            if let Some(command) = command {
                self.spawn_command(command);
            }
        }
    }

    fn spawn_command(&self, command: Command) {
        let transport = Arc::clone(&self.transport);
        let queue = self.queue.clone();
        tokio::spawn(async move {
            let completion = match command {
                Command::ListNotes {
                    generation,
                    page,
                    page_size,
                    filter,
                } => Event::ListNotesCompleted {
                    generation,
                    result: transport.list_notes(page, page_size, &filter).await,
                },
                Command::CreateNote { text } => {
                    Event::CreateNoteCompleted(transport.create_note(&text).await)
                }
            };
            // Session is shutting down; nobody is left to observe it.
            let _ = queue.send(completion);
        });
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
