//! gRPC server bootstrap for the item service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_stream::wrappers::TcpListenerStream;

use crate::config::RpcConfig;
use crate::rpc::handlers::ItemHandlers;
use crate::rpc::ids::IdAllocator;
use crate::rpc::proto::ItemServiceServer;
use crate::rpc::service::ItemRpcService;
use crate::store::RecordStore;

/// gRPC server exposing `items.ItemService`.
pub struct RpcServer {
    service: ItemRpcService,
    config: RpcConfig,
}

impl RpcServer {
    /// Build a server over `store`, allocating bulk-add ids from `config.first_id`.
    pub fn new(store: Arc<dyn RecordStore>, config: RpcConfig) -> Self {
        let ids = Arc::new(IdAllocator::new(config.first_id));
        let handlers = ItemHandlers::new(store, ids, config.stream_buffer);
        Self {
            service: ItemRpcService::new(handlers),
            config,
        }
    }

    /// Serve until a shutdown signal arrives, then drain in-flight calls.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), tonic::transport::Error> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(
                address = %addr,
                concurrency_per_connection = self.config.concurrency_per_connection,
                "gRPC server starting"
            );
        }

        tonic::transport::Server::builder()
            .concurrency_limit_per_connection(self.config.concurrency_per_connection)
            .trace_fn(|request| tracing::info_span!("grpc", method = %request.uri().path()))
            .add_service(ItemServiceServer::new(self.service))
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                let _ = shutdown.recv().await;
                tracing::info!("gRPC server received shutdown signal");
            })
            .await?;

        tracing::info!("gRPC server stopped");
        Ok(())
    }
}
