//! gRPC binding of the item handlers.

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio_stream::{Stream, StreamExt};
use tonic::{Request, Response, Status, Streaming};

use crate::error::{CallError, CallOutcome};
use crate::model::Item;
use crate::observability::metrics;
use crate::rpc::handlers::ItemHandlers;
use crate::rpc::proto::{
    ChatMessage, Empty, ItemRequest, ItemResponse, ItemService, ItemsAddedResult,
};

type ResponseStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send>>;

/// `items.ItemService` implementation. One attempt per inbound call.
#[derive(Clone)]
pub struct ItemRpcService {
    handlers: ItemHandlers,
}

impl ItemRpcService {
    pub fn new(handlers: ItemHandlers) -> Self {
        Self { handlers }
    }
}

/// Translate a handler outcome into a gRPC reply, recording the result code.
fn reply<T, M>(method: &'static str, outcome: CallOutcome<T>) -> Result<Response<M>, Status>
where
    M: From<T>,
{
    match outcome {
        Ok(value) => {
            metrics::record_rpc(method, "ok");
            Ok(Response::new(M::from(value)))
        }
        Err(e) => {
            tracing::warn!(method, error = %e, "Call failed");
            metrics::record_rpc(method, e.kind());
            Err(e.into())
        }
    }
}

/// Adapt an inbound gRPC stream to the handlers' outcome stream.
fn inbound<M, T>(
    stream: Streaming<M>,
    extract: fn(M) -> T,
) -> impl Stream<Item = CallOutcome<T>> + Send + Unpin + 'static
where
    M: Send + 'static,
    T: Send + 'static,
{
    stream.map(move |message| message.map(extract).map_err(CallError::from))
}

/// Outbound stream that records its result code once it terminates.
///
/// The first error sets the code; a clean end records `ok`; a stream the
/// client dropped early records `cancelled`.
struct Recorded<S> {
    method: &'static str,
    inner: S,
    code: Option<&'static str>,
    finished: bool,
}

impl<S> Recorded<S> {
    fn new(method: &'static str, inner: S) -> Self {
        Self {
            method,
            inner,
            code: None,
            finished: false,
        }
    }
}

impl<S, T> Stream for Recorded<S>
where
    S: Stream<Item = CallOutcome<T>> + Unpin,
{
    type Item = CallOutcome<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let next = Pin::new(&mut this.inner).poll_next(cx);
        match &next {
            Poll::Ready(Some(Err(e))) => {
                tracing::warn!(method = this.method, error = %e, "Stream failed");
                this.code.get_or_insert(e.kind());
            }
            Poll::Ready(None) if !this.finished => {
                this.finished = true;
                metrics::record_rpc(this.method, this.code.unwrap_or("ok"));
            }
            _ => {}
        }
        next
    }
}

impl<S> Drop for Recorded<S> {
    fn drop(&mut self) {
        if !self.finished {
            metrics::record_rpc(self.method, self.code.unwrap_or("cancelled"));
        }
    }
}

#[tonic::async_trait]
impl ItemService for ItemRpcService {
    async fn create_item(
        &self,
        request: Request<ItemRequest>,
    ) -> Result<Response<ItemResponse>, Status> {
        let item = Item::from(request.into_inner());
        tracing::debug!(id = item.id, name = %item.name, "CreateItem");
        reply("CreateItem", self.handlers.create(item))
    }

    async fn update_item(
        &self,
        request: Request<ItemRequest>,
    ) -> Result<Response<ItemResponse>, Status> {
        let item = Item::from(request.into_inner());
        tracing::debug!(id = item.id, name = %item.name, "UpdateItem");
        reply("UpdateItem", self.handlers.update(item))
    }

    async fn delete_item(
        &self,
        request: Request<ItemRequest>,
    ) -> Result<Response<ItemResponse>, Status> {
        let item = Item::from(request.into_inner());
        tracing::debug!(id = item.id, "DeleteItem");
        reply("DeleteItem", self.handlers.delete(item))
    }

    async fn get_item_by_id(
        &self,
        request: Request<ItemRequest>,
    ) -> Result<Response<ItemResponse>, Status> {
        let id = request.into_inner().id;
        reply("GetItemById", self.handlers.get(id))
    }

    type ListAllItemsStream = ResponseStream<ItemResponse>;

    async fn list_all_items(
        &self,
        _request: Request<Empty>,
    ) -> Result<Response<Self::ListAllItemsStream>, Status> {
        let stream = Recorded::new("ListAllItems", self.handlers.list())
            .map(|outcome| outcome.map(ItemResponse::from).map_err(Status::from));
        Ok(Response::new(Box::pin(stream)))
    }

    async fn add_items(
        &self,
        request: Request<Streaming<ItemRequest>>,
    ) -> Result<Response<ItemsAddedResult>, Status> {
        let names = inbound(request.into_inner(), |req: ItemRequest| req.name);
        let outcome = self
            .handlers
            .bulk_add(names)
            .await
            .map(|total_count| ItemsAddedResult { total_count });
        reply("AddItems", outcome)
    }

    type ChatAboutItemsStream = ResponseStream<ChatMessage>;

    async fn chat_about_items(
        &self,
        request: Request<Streaming<ChatMessage>>,
    ) -> Result<Response<Self::ChatAboutItemsStream>, Status> {
        tracing::info!("ChatAboutItems called");
        let messages = inbound(request.into_inner(), |msg: ChatMessage| msg.content);
        let stream = Recorded::new("ChatAboutItems", self.handlers.chat(messages)).map(|outcome| {
            outcome
                .map(|content| ChatMessage { content })
                .map_err(Status::from)
        });
        Ok(Response::new(Box::pin(stream)))
    }
}
