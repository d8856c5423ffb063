//! HTTP boundary to the remote notes service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use shared::{
    domain::{Note, TagFilter},
    protocol::NotesPage,
};
use thiserror::Error;
use tracing::debug;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Classified failure from the notes service.
///
/// Decode failures share this channel with network failures so the
/// controller never observes a partially decoded response. The
/// `Display` text is the message shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("bad url: {0}")]
    BadUrl(String),
    #[error("request timed out")]
    Timeout,
    #[error("network error")]
    Network,
    #[error("bad status: {0}")]
    BadStatus(u16),
    #[error("unreadable response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if let Some(status) = err.status() {
            TransportError::BadStatus(status.as_u16())
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else if err.is_builder() {
            TransportError::BadUrl(err.to_string())
        } else {
            TransportError::Network
        }
    }
}

/// Seam between the controller and the notes service; object-safe so
/// tests can substitute a scripted transport.
#[async_trait]
pub trait NotesTransport: Send + Sync {
    /// Fetches one window of the collection, newest first.
    async fn list_notes(
        &self,
        page: u32,
        page_size: u32,
        filter: &TagFilter,
    ) -> Result<NotesPage, TransportError>;

    /// Creates a note from `text`; the service assigns the tags.
    async fn create_note(&self, text: &str) -> Result<Note, TransportError>;
}

#[derive(Debug, Serialize)]
struct CreateNoteBody {
    text: String,
}

#[derive(Debug)]
pub struct HttpNotesTransport {
    http: Client,
    collection_url: Url,
}

impl HttpNotesTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, TransportError> {
        let mut base = Url::parse(base_url)
            .map_err(|err| TransportError::BadUrl(format!("{base_url}: {err}")))?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let collection_url = base
            .join("note")
            .map_err(|err| TransportError::BadUrl(format!("{base_url}: {err}")))?;
        Ok(Self {
            http,
            collection_url,
        })
    }

    fn list_url(&self, page: u32, page_size: u32, filter: &TagFilter) -> Url {
        let skip = u64::from(page) * u64::from(page_size);
        let mut url = self.collection_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("$sort[createdAt]", "-1");
            query.append_pair("$limit", &page_size.to_string());
            query.append_pair("$skip", &skip.to_string());
            if !filter.is_empty() {
                // The service requires an empty membership parameter
                // ahead of the per-tag values; dropping it changes the
                // match semantics server-side.
                query.append_pair("tags[$in]", "");
                for tag in filter.tags() {
                    query.append_pair("tags[$in]", tag);
                }
            }
        }
        url
    }
}

#[async_trait]
impl NotesTransport for HttpNotesTransport {
    async fn list_notes(
        &self,
        page: u32,
        page_size: u32,
        filter: &TagFilter,
    ) -> Result<NotesPage, TransportError> {
        let url = self.list_url(page, page_size, filter);
        debug!(%url, "listing notes");
        let page = self
            .http
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json::<NotesPage>()
            .await?;
        Ok(page)
    }

    async fn create_note(&self, text: &str) -> Result<Note, TransportError> {
        debug!(url = %self.collection_url, "creating note");
        let note = self
            .http
            .post(self.collection_url.clone())
            .timeout(REQUEST_TIMEOUT)
            .json(&CreateNoteBody {
                text: text.to_string(),
            })
            .send()
            .await?
            .error_for_status()?
            .json::<Note>()
            .await?;
        Ok(note)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
