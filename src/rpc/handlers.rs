//! Transport-free item handlers.
//!
//! Every handler performs its store work and returns a [`CallOutcome`];
//! `service.rs` turns the outcome into a gRPC status. Streaming handlers
//! produce bounded channels so a slow consumer applies back-pressure to
//! the producer instead of growing a buffer.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};

use crate::error::{CallError, CallOutcome};
use crate::model::{Item, ItemId};
use crate::observability::metrics;
use crate::rpc::ids::IdAllocator;
use crate::store::{RecordStore, StoreError};

/// Prefix the chat handler puts in front of every echoed message.
pub const ECHO_PREFIX: &str = "Server Echo: ";

/// Item operations over a record store.
#[derive(Clone)]
pub struct ItemHandlers {
    store: Arc<dyn RecordStore>,
    ids: Arc<IdAllocator>,
    stream_buffer: usize,
}

impl ItemHandlers {
    pub fn new(store: Arc<dyn RecordStore>, ids: Arc<IdAllocator>, stream_buffer: usize) -> Self {
        Self {
            store,
            ids,
            stream_buffer: stream_buffer.max(1),
        }
    }

    /// Insert a record with a caller-chosen id.
    pub fn create(&self, item: Item) -> CallOutcome<Item> {
        require_name(&item.name)?;
        self.store.insert(item.clone())?;
        tracing::info!(id = item.id, name = %item.name, "Item created");
        Ok(item)
    }

    /// Fetch a record by id.
    pub fn get(&self, id: ItemId) -> CallOutcome<Item> {
        self.store
            .find_by_key(id)?
            .ok_or_else(|| CallError::NotFound(format!("Item with ID {id} not found")))
    }

    /// Rename an existing record.
    pub fn update(&self, item: Item) -> CallOutcome<Item> {
        require_name(&item.name)?;
        match self.store.update(item.id, &item.name)? {
            0 => Err(CallError::NotFound(format!("Item with ID {} not found", item.id))),
            _ => {
                tracing::info!(id = item.id, name = %item.name, "Item updated");
                Ok(item)
            }
        }
    }

    /// Remove a record. The request is echoed back on success.
    pub fn delete(&self, item: Item) -> CallOutcome<Item> {
        match self.store.delete(item.id)? {
            0 => Err(CallError::NotFound(format!("Item with ID {} not found", item.id))),
            _ => {
                tracing::info!(id = item.id, "Item deleted");
                Ok(item)
            }
        }
    }

    /// Stream every stored record.
    ///
    /// The store is scanned by a producer task and each record is sent as
    /// soon as it is read. Dropping the returned stream stops the scan.
    pub fn list(&self) -> ReceiverStream<CallOutcome<Item>> {
        let (tx, rx) = mpsc::channel(self.stream_buffer);
        let store = self.store.clone();

        tokio::spawn(async move {
            let scan = match store.scan_all() {
                Ok(scan) => scan,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to start scan");
                    let _ = tx.send(Err(e.into())).await;
                    return;
                }
            };

            let mut sent = 0u64;
            for item in scan {
                if tx.send(Ok(item)).await.is_err() {
                    tracing::debug!(sent, "List consumer went away, stopping scan");
                    break;
                }
                sent += 1;
            }
            metrics::record_streamed("ListAllItems", sent);
        });

        ReceiverStream::new(rx)
    }

    /// Insert each inbound name under a freshly allocated id.
    ///
    /// An empty name aborts the call with `InvalidArgument`. Records
    /// inserted before the bad one stay in the store.
    pub async fn bulk_add<S>(&self, mut names: S) -> CallOutcome<u64>
    where
        S: Stream<Item = CallOutcome<String>> + Send + Unpin,
    {
        let mut accepted = 0u64;
        while let Some(name) = names.next().await {
            let name = name?;
            if name.is_empty() {
                tracing::warn!(accepted, "Bulk add aborted: empty item name");
                return Err(CallError::InvalidArgument(
                    "Item name cannot be empty".to_string(),
                ));
            }
            let id = self.insert_with_fresh_id(name)?;
            tracing::debug!(id, "Bulk add accepted item");
            accepted += 1;
        }

        tracing::info!(accepted, "Bulk add complete");
        Ok(accepted)
    }

    /// Answer each inbound message with its echo, in arrival order.
    ///
    /// The call ends when the inbound stream ends. An inbound fault is
    /// logged, forwarded as `Internal`, and ends the call.
    pub fn chat<S>(&self, mut inbound: S) -> ReceiverStream<CallOutcome<String>>
    where
        S: Stream<Item = CallOutcome<String>> + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::channel(self.stream_buffer);

        tokio::spawn(async move {
            while let Some(message) = inbound.next().await {
                let reply = match message {
                    Ok(content) => {
                        tracing::debug!(content = %content, "Chat message received");
                        Ok(echo(&content))
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Chat stream failed");
                        Err(CallError::Internal(format!("Server error: {e}")))
                    }
                };

                let fatal = reply.is_err();
                if tx.send(reply).await.is_err() || fatal {
                    break;
                }
            }
        });

        ReceiverStream::new(rx)
    }

    /// Ids already taken (e.g. by an explicit create) are skipped.
    fn insert_with_fresh_id(&self, name: String) -> CallOutcome<ItemId> {
        loop {
            let id = self.ids.allocate();
            match self.store.insert(Item::new(id, name.clone())) {
                Ok(()) => return Ok(id),
                Err(StoreError::DuplicateKey(_)) => {
                    tracing::debug!(id, "Allocated id already in use, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Echo transform used by the chat stream.
pub fn echo(content: &str) -> String {
    format!("{ECHO_PREFIX}{content}")
}

fn require_name(name: &str) -> CallOutcome<()> {
    if name.is_empty() {
        return Err(CallError::InvalidArgument(
            "Item name cannot be empty".to_string(),
        ));
    }
    Ok(())
}
