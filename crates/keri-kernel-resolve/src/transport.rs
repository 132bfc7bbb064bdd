//! Transport abstraction for resolution requests.
//!
//! The transport layer handles request delivery and the matching response.
//! Implementations may use HTTP, a message bus, or anything else that can
//! carry a [`ResolveRequest`] to a [`NetworkLocation`].

use async_trait::async_trait;

use crate::error::Result;
use crate::messages::{NetworkLocation, ResolveRequest, ResolveResponse};

/// The serving side: something that can answer resolution requests.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, request: ResolveRequest) -> ResolveResponse;
}

/// The requesting side.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` to whoever is bound at `location` and wait for the answer.
    ///
    /// Callers are expected to bound this with their own timeout.
    async fn request(
        &self,
        location: &NetworkLocation,
        request: ResolveRequest,
    ) -> Result<ResolveResponse>;
}

/// An in-memory transport for testing and single-process deployments.
///
/// Uses channels to simulate request delivery between entities.
pub mod memory {
    use super::*;
    use crate::error::ResolveError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::{mpsc, oneshot, RwLock};

    /// Request envelope for internal routing.
    struct Envelope {
        request: ResolveRequest,
        reply: oneshot::Sender<ResolveResponse>,
    }

    /// Shared state for the memory network.
    #[derive(Default)]
    pub struct MemoryNetwork {
        /// Inbox for each bound location.
        inboxes: RwLock<HashMap<NetworkLocation, mpsc::Sender<Envelope>>>,
    }

    impl MemoryNetwork {
        /// Create a new memory network.
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Serve `responder` at `location`, replacing any previous binding.
        ///
        /// Each request is answered on its own task, so a slow answer does
        /// not hold up the others.
        pub async fn bind(&self, location: NetworkLocation, responder: Arc<dyn Responder>) {
            let (tx, mut rx) = mpsc::channel::<Envelope>(1000);

            tokio::spawn(async move {
                while let Some(envelope) = rx.recv().await {
                    let responder = Arc::clone(&responder);
                    tokio::spawn(async move {
                        let response = responder.respond(envelope.request).await;
                        // Requester may have timed out and gone away.
                        let _ = envelope.reply.send(response);
                    });
                }
            });

            tracing::debug!(location = %location, "bound responder");
            self.inboxes.write().await.insert(location, tx);
        }

        /// Stop serving `location`.
        pub async fn unbind(&self, location: &NetworkLocation) -> bool {
            self.inboxes.write().await.remove(location).is_some()
        }

        pub async fn is_bound(&self, location: &NetworkLocation) -> bool {
            self.inboxes.read().await.contains_key(location)
        }

        /// Create a transport connected to this network.
        pub fn transport(self: &Arc<Self>) -> MemoryTransport {
            MemoryTransport {
                network: Arc::clone(self),
            }
        }
    }

    /// In-memory transport implementation.
    #[derive(Clone)]
    pub struct MemoryTransport {
        network: Arc<MemoryNetwork>,
    }

    #[async_trait]
    impl Transport for MemoryTransport {
        async fn request(
            &self,
            location: &NetworkLocation,
            request: ResolveRequest,
        ) -> Result<ResolveResponse> {
            let inbox = {
                let inboxes = self.network.inboxes.read().await;
                inboxes
                    .get(location)
                    .cloned()
                    .ok_or_else(|| ResolveError::Transport(format!("nothing bound at {location}")))?
            };

            let (reply, response) = oneshot::channel();
            inbox
                .send(Envelope { request, reply })
                .await
                .map_err(|_| ResolveError::Transport("responder disconnected".into()))?;

            response
                .await
                .map_err(|_| ResolveError::Transport("responder dropped request".into()))
        }
    }
}
