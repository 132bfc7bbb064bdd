//! Fetching and validating another entity's logs.
//!
//! Nothing a remote entity sends is trusted: the KEL is replayed from its
//! inception and must derive the requested prefix, and a TEL must be anchored
//! in that KEL before its status is believed.

use std::sync::Arc;
use std::time::Duration;

use keri_kernel_core::{Blake3Hash, Kel, KelError, Prefix};
use keri_kernel_tel::{verify_anchoring, TelLog};

use crate::address::AddressResolver;
use crate::error::{ResolveError, Result};
use crate::messages::{NetworkLocation, ResolveRequest, ResolveResponse};
use crate::transport::Transport;

/// Resolver configuration.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Bound on each address lookup and each request/response round trip.
    pub request_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ResolverConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Resolves remote identifiers through an address book and a transport.
#[derive(Clone)]
pub struct RemoteResolver {
    addresses: Arc<dyn AddressResolver>,
    transport: Arc<dyn Transport>,
    config: ResolverConfig,
}

impl RemoteResolver {
    pub fn new(
        addresses: Arc<dyn AddressResolver>,
        transport: Arc<dyn Transport>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            addresses,
            transport,
            config,
        }
    }

    pub fn addresses(&self) -> &Arc<dyn AddressResolver> {
        &self.addresses
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Fetch and replay the KEL of `prefix`.
    pub async fn fetch_kel(&self, prefix: &Prefix) -> Result<Kel> {
        let location = self.locate(prefix).await?;
        let response = self
            .round_trip(&location, ResolveRequest::Kel { prefix: *prefix })
            .await?;

        let events = match response {
            ResolveResponse::Kel { events } => events,
            other => return Err(unexpected("Kel", other)),
        };

        let kel = Kel::replay(events).map_err(|e| {
            tracing::warn!(prefix = %prefix, error = %e, "remote KEL failed validation");
            e
        })?;
        if kel.prefix() != *prefix {
            return Err(ResolveError::InvalidKel(KelError::PrefixMismatch {
                expected: *prefix,
                got: Some(kel.prefix()),
            }));
        }
        Ok(kel)
    }

    /// Fetch the TEL of `credential` from the controller of `kel`.
    ///
    /// `Ok(None)` means the issuer has no log for the credential.
    pub async fn fetch_tel(&self, kel: &Kel, credential: &Blake3Hash) -> Result<Option<TelLog>> {
        let prefix = kel.prefix();
        let location = self.locate(&prefix).await?;
        let response = self
            .round_trip(
                &location,
                ResolveRequest::Tel {
                    prefix,
                    credential: *credential,
                },
            )
            .await?;

        let events = match response {
            ResolveResponse::Tel { events } => events,
            other => return Err(unexpected("Tel", other)),
        };
        if events.is_empty() {
            return Ok(None);
        }

        let log = TelLog::replay(*credential, events)?;
        verify_anchoring(&log, kel).map_err(|e| {
            tracing::warn!(credential = %credential, error = %e, "remote TEL not anchored");
            e
        })?;
        Ok(Some(log))
    }

    async fn locate(&self, prefix: &Prefix) -> Result<NetworkLocation> {
        let timeout = self.config.request_timeout;
        tokio::time::timeout(timeout, self.addresses.resolve(prefix))
            .await
            .map_err(|_| {
                tracing::warn!(prefix = %prefix, ?timeout, "address lookup timed out");
                ResolveError::Timeout(format!("no address for {prefix} within {timeout:?}"))
            })?
    }

    async fn round_trip(
        &self,
        location: &NetworkLocation,
        request: ResolveRequest,
    ) -> Result<ResolveResponse> {
        let timeout = self.config.request_timeout;
        let response = tokio::time::timeout(timeout, self.transport.request(location, request))
            .await
            .map_err(|_| {
                tracing::warn!(location = %location, ?timeout, "resolution timed out");
                ResolveError::Timeout(format!("no response from {location} within {timeout:?}"))
            })??;

        response
            .validate_limits()
            .map_err(|e| ResolveError::UnexpectedResponse(e.to_string()))?;

        match response {
            ResolveResponse::Error { code, message } => Err(ResolveError::Peer { code, message }),
            other => Ok(other),
        }
    }
}

fn unexpected(wanted: &str, got: ResolveResponse) -> ResolveError {
    let got = match got {
        ResolveResponse::Kel { .. } => "Kel",
        ResolveResponse::Tel { .. } => "Tel",
        ResolveResponse::Error { .. } => "Error",
    };
    ResolveError::UnexpectedResponse(format!("expected {wanted}, got {got}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::MemoryAddressBook;
    use crate::messages::ErrorCode;
    use crate::transport::memory::MemoryNetwork;
    use crate::transport::Responder;
    use async_trait::async_trait;
    use keri_kernel_core::{KeyRing, Keypair, SignedKeyEvent};
    use keri_kernel_tel::{SignedTelEvent, TelRegistry, TelStatus};

    /// Serves fixed logs for one identifier.
    struct Fixed {
        kel: Vec<SignedKeyEvent>,
        tel: Vec<SignedTelEvent>,
    }

    #[async_trait]
    impl Responder for Fixed {
        async fn respond(&self, request: ResolveRequest) -> ResolveResponse {
            match request {
                ResolveRequest::Kel { .. } => ResolveResponse::Kel {
                    events: self.kel.clone(),
                },
                ResolveRequest::Tel { .. } => ResolveResponse::Tel {
                    events: self.tel.clone(),
                },
            }
        }
    }

    struct Stall;

    /// Address book that never answers.
    struct SilentBook;

    #[async_trait]
    impl AddressResolver for SilentBook {
        async fn resolve(&self, prefix: &Prefix) -> Result<NetworkLocation> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(ResolveError::NotFound(*prefix))
        }

        async fn register(&self, _prefix: Prefix, _location: NetworkLocation) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl Responder for Stall {
        async fn respond(&self, _request: ResolveRequest) -> ResolveResponse {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            ResolveResponse::error(ErrorCode::Internal, "woke up")
        }
    }

    fn issuer() -> (Kel, Vec<SignedTelEvent>, Blake3Hash) {
        let keys = KeyRing::new(Keypair::from_seed(&[1; 32]), Keypair::from_seed(&[2; 32]));
        let icp = keys.inception_event();
        let mut kel = Kel::incept(icp.event, icp.signature).unwrap();

        let d = Blake3Hash::hash(b"vc");
        let ixn = kel.interact(d);
        let sig = keys.current().sign(&ixn.canonical_bytes());
        let prefix = kel.prefix();
        let seal = kel.confirm(ixn, sig).unwrap().seal(prefix);

        let mut tel = TelRegistry::new();
        tel.record_issuance(d, seal, keys.current()).unwrap();
        let events = tel.log(&d).unwrap().events().to_vec();
        (kel, events, d)
    }

    async fn resolver_for(responder: Arc<dyn Responder>, prefix: Prefix) -> RemoteResolver {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let network = MemoryNetwork::new();
        let location = NetworkLocation::new("mem://issuer");
        network.bind(location.clone(), responder).await;

        let book = MemoryAddressBook::new();
        book.register(prefix, location).await.unwrap();

        RemoteResolver::new(
            Arc::new(book),
            Arc::new(network.transport()),
            ResolverConfig::default().with_request_timeout(Duration::from_millis(50)),
        )
    }

    #[tokio::test]
    async fn test_fetch_kel_and_tel() {
        let (kel, tel, d) = issuer();
        let prefix = kel.prefix();
        let resolver = resolver_for(
            Arc::new(Fixed {
                kel: kel.events().to_vec(),
                tel,
            }),
            prefix,
        )
        .await;

        let fetched = resolver.fetch_kel(&prefix).await.unwrap();
        assert_eq!(fetched, kel);

        let log = resolver.fetch_tel(&fetched, &d).await.unwrap().unwrap();
        assert_eq!(log.status(), TelStatus::Issued);
    }

    #[tokio::test]
    async fn test_empty_tel_is_none() {
        let (kel, _, _) = issuer();
        let prefix = kel.prefix();
        let resolver = resolver_for(
            Arc::new(Fixed {
                kel: kel.events().to_vec(),
                tel: vec![],
            }),
            prefix,
        )
        .await;

        let other = Blake3Hash::hash(b"unknown");
        assert!(resolver.fetch_tel(&kel, &other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_kel_for_another_prefix() {
        let (kel, tel, _) = issuer();
        let asked = Prefix::from_digest(Blake3Hash::hash(b"someone else"));
        let resolver = resolver_for(
            Arc::new(Fixed {
                kel: kel.events().to_vec(),
                tel,
            }),
            asked,
        )
        .await;

        assert!(matches!(
            resolver.fetch_kel(&asked).await,
            Err(ResolveError::InvalidKel(KelError::PrefixMismatch { .. }))
        ));
    }

    #[tokio::test]
    async fn test_tampered_kel_rejected() {
        let (kel, tel, _) = issuer();
        let prefix = kel.prefix();
        let mut events = kel.events().to_vec();
        events[1].signature = events[0].signature;

        let resolver = resolver_for(Arc::new(Fixed { kel: events, tel }), prefix).await;
        assert!(matches!(
            resolver.fetch_kel(&prefix).await,
            Err(ResolveError::InvalidKel(KelError::SignatureInvalid))
        ));
    }

    #[tokio::test]
    async fn test_unknown_prefix() {
        let resolver = RemoteResolver::new(
            Arc::new(MemoryAddressBook::new()),
            Arc::new(MemoryNetwork::new().transport()),
            ResolverConfig::default(),
        );
        let prefix = Prefix::from_digest(Blake3Hash::hash(b"nobody"));
        assert!(matches!(
            resolver.fetch_kel(&prefix).await,
            Err(ResolveError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout() {
        let prefix = Prefix::from_digest(Blake3Hash::hash(b"slow"));
        let resolver = resolver_for(Arc::new(Stall), prefix).await;
        assert!(matches!(
            resolver.fetch_kel(&prefix).await,
            Err(ResolveError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_address_lookup_timeout() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let (kel, _, d) = issuer();
        let resolver = RemoteResolver::new(
            Arc::new(SilentBook),
            Arc::new(MemoryNetwork::new().transport()),
            ResolverConfig::default().with_request_timeout(Duration::from_millis(50)),
        );

        let prefix = kel.prefix();
        let fetched = tokio::time::timeout(Duration::from_secs(2), resolver.fetch_kel(&prefix))
            .await
            .expect("lookup must give up on its own");
        assert!(matches!(fetched, Err(ResolveError::Timeout(_))));

        let fetched = tokio::time::timeout(Duration::from_secs(2), resolver.fetch_tel(&kel, &d))
            .await
            .expect("lookup must give up on its own");
        assert!(matches!(fetched, Err(ResolveError::Timeout(_))));
    }
}
