//! Entity configuration.

use keri_kernel_resolve::ResolverConfig;

use crate::did::ServiceEndpoint;

/// Configuration for an [`Entity`](crate::Entity).
#[derive(Debug, Clone)]
pub struct EntityConfig {
    /// Anchor each revocation in its own interaction event.
    ///
    /// When off, revocations are sealed to the latest KEL event instead.
    pub anchor_revocations: bool,
    /// Endpoints advertised in the entity's DID document.
    pub service_endpoints: Vec<ServiceEndpoint>,
    /// Remote resolution settings.
    pub resolver: ResolverConfig,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            anchor_revocations: true,
            service_endpoints: Vec::new(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl EntityConfig {
    pub fn with_anchor_revocations(mut self, anchor: bool) -> Self {
        self.anchor_revocations = anchor;
        self
    }

    pub fn with_service(mut self, endpoint: ServiceEndpoint) -> Self {
        self.service_endpoints.push(endpoint);
        self
    }

    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }
}
