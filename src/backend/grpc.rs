//! tonic client for `items.ItemService`.

use std::future::Future;
use std::time::Duration;

use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Response, Status};

use crate::backend::ItemBackend;
use crate::config::BackendConfig;
use crate::error::CallOutcome;
use crate::model::{Item, ItemId};
use crate::resilience::{with_deadline, Deadlines};
use crate::rpc::proto::{ChatMessage, Empty, ItemRequest, ItemResponse, ItemServiceClient};

/// Item service client over one HTTP/2 channel.
#[derive(Debug, Clone)]
pub struct GrpcBackend {
    client: ItemServiceClient<Channel>,
    deadlines: Deadlines,
    endpoint: String,
}

impl GrpcBackend {
    /// Build a client without dialing; the first call establishes the
    /// connection, so a backend that is down surfaces as `Unavailable`
    /// on that call instead of failing startup.
    pub fn connect_lazy(
        config: &BackendConfig,
        deadlines: Deadlines,
    ) -> Result<Self, tonic::transport::Error> {
        let endpoint = config.endpoint();
        let channel = Endpoint::from_shared(endpoint.clone())?
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .connect_lazy();

        tracing::info!(endpoint = %endpoint, "Item service client configured");
        Ok(Self {
            client: ItemServiceClient::new(channel),
            deadlines,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Client-streaming bulk add. Returns the number of records accepted.
    pub async fn add_items(&self, names: Vec<String>) -> CallOutcome<u64> {
        let mut client = self.client.clone();
        let outbound = tokio_stream::iter(
            names
                .into_iter()
                .map(|name| ItemRequest { id: 0, name }),
        );
        let request = with_timeout(outbound, self.deadlines.scan);

        with_deadline(self.deadlines.scan, async move {
            let result = client.add_items(request).await?;
            Ok(result.into_inner().total_count)
        })
        .await
    }

    /// Bidirectional chat. Returns the replies in arrival order.
    pub async fn chat(&self, messages: Vec<String>) -> CallOutcome<Vec<String>> {
        let mut client = self.client.clone();
        let outbound = tokio_stream::iter(
            messages
                .into_iter()
                .map(|content| ChatMessage { content }),
        );
        let request = with_timeout(outbound, self.deadlines.scan);

        with_deadline(self.deadlines.scan, async move {
            let mut inbound = client.chat_about_items(request).await?.into_inner();
            let mut replies = Vec::new();
            while let Some(message) = inbound.message().await? {
                replies.push(message.content);
            }
            Ok(replies)
        })
        .await
    }

    async fn unary<F, Fut>(&self, deadline: Duration, call: F) -> CallOutcome<Item>
    where
        F: FnOnce(ItemServiceClient<Channel>) -> Fut,
        Fut: Future<Output = Result<Response<ItemResponse>, Status>>,
    {
        let client = self.client.clone();
        with_deadline(deadline, async move {
            let response = call(client).await?;
            Ok(Item::from(response.into_inner()))
        })
        .await
    }
}

/// Attach a deadline the server can see (`grpc-timeout`).
fn with_timeout<M>(message: M, timeout: Duration) -> Request<M> {
    let mut request = Request::new(message);
    request.set_timeout(timeout);
    request
}

#[tonic::async_trait]
impl ItemBackend for GrpcBackend {
    async fn create_item(&self, item: Item) -> CallOutcome<Item> {
        let request = with_timeout(ItemRequest::from(item), self.deadlines.mutation);
        self.unary(self.deadlines.mutation, |mut client| async move {
            client.create_item(request).await
        })
        .await
    }

    async fn update_item(&self, item: Item) -> CallOutcome<Item> {
        let request = with_timeout(ItemRequest::from(item), self.deadlines.mutation);
        self.unary(self.deadlines.mutation, |mut client| async move {
            client.update_item(request).await
        })
        .await
    }

    async fn delete_item(&self, id: ItemId) -> CallOutcome<Item> {
        let request = with_timeout(
            ItemRequest {
                id,
                name: String::new(),
            },
            self.deadlines.mutation,
        );
        self.unary(self.deadlines.mutation, |mut client| async move {
            client.delete_item(request).await
        })
        .await
    }

    async fn get_item(&self, id: ItemId) -> CallOutcome<Item> {
        let request = with_timeout(
            ItemRequest {
                id,
                name: String::new(),
            },
            self.deadlines.read,
        );
        self.unary(self.deadlines.read, |mut client| async move {
            client.get_item_by_id(request).await
        })
        .await
    }

    async fn list_items(&self) -> CallOutcome<Vec<Item>> {
        let mut client = self.client.clone();
        let request = with_timeout(Empty {}, self.deadlines.scan);

        with_deadline(self.deadlines.scan, async move {
            let mut stream = client.list_all_items(request).await?.into_inner();
            let mut items = Vec::new();
            while let Some(response) = stream.message().await? {
                items.push(Item::from(response));
            }
            Ok(items)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::{classify, FailureClass};

    #[tokio::test]
    async fn test_unreachable_backend_is_a_circuit_failure() {
        let config = BackendConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            connect_timeout_ms: 200,
        };
        let backend = GrpcBackend::connect_lazy(&config, Deadlines::default()).unwrap();
        assert_eq!(backend.endpoint(), "http://127.0.0.1:1");

        let err = backend.create_item(Item::new(1, "x")).await.unwrap_err();
        assert_eq!(classify(&err), FailureClass::CircuitFailure, "{err:?}");
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let config = BackendConfig {
            host: "bad host".to_string(),
            port: 50051,
            connect_timeout_ms: 200,
        };
        assert!(GrpcBackend::connect_lazy(&config, Deadlines::default()).is_err());
    }
}
