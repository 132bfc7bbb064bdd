//! A controller hosts several entities behind one network location.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use keri_kernel_core::{KeyRing, Prefix};
use keri_kernel_resolve::{
    ErrorCode, NetworkLocation, RemoteResolver, ResolveRequest, ResolveResponse, Responder,
};

use crate::config::EntityConfig;
use crate::credential::{verify_remote, SignedAttestationDatum, Verification};
use crate::did::{self, DidDocument};
use crate::entity::Entity;
use crate::error::{KernelError, Result};

pub struct Controller {
    entities: RwLock<HashMap<Prefix, Arc<Entity>>>,
    location: NetworkLocation,
    resolver: Arc<RemoteResolver>,
    config: EntityConfig,
}

impl Controller {
    /// `config` is applied to every identifier this controller creates.
    pub fn new(
        location: NetworkLocation,
        resolver: Arc<RemoteResolver>,
        config: EntityConfig,
    ) -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
            location,
            resolver,
            config,
        }
    }

    pub fn location(&self) -> &NetworkLocation {
        &self.location
    }

    /// Incept a new identifier with fresh keys.
    pub async fn create_identifier(&self) -> Result<Arc<Entity>> {
        self.create_identifier_with(KeyRing::generate()).await
    }

    pub async fn create_identifier_with(&self, keys: KeyRing) -> Result<Arc<Entity>> {
        let entity = Entity::incept(keys, self.config.clone())?;
        self.add_entity(entity).await
    }

    /// Host `entity` here and publish its address.
    pub async fn add_entity(&self, entity: Entity) -> Result<Arc<Entity>> {
        let entity = Arc::new(entity.with_resolver(Arc::clone(&self.resolver)));
        let prefix = entity.prefix();
        self.resolver
            .addresses()
            .register(prefix, self.location.clone())
            .await?;
        self.entities.write()?.insert(prefix, Arc::clone(&entity));
        tracing::debug!(prefix = %prefix, location = %self.location, "hosting identifier");
        Ok(entity)
    }

    /// Stop hosting `prefix`. Its address entry is left for the caller.
    pub fn remove_entity(&self, prefix: &Prefix) -> Result<Option<Arc<Entity>>> {
        Ok(self.entities.write()?.remove(prefix))
    }

    pub fn entity(&self, prefix: &Prefix) -> Result<Arc<Entity>> {
        self.entities
            .read()?
            .get(prefix)
            .cloned()
            .ok_or(KernelError::UnknownIdentifier(*prefix))
    }

    pub fn identifiers(&self) -> Result<Vec<Prefix>> {
        let mut ids: Vec<Prefix> = self.entities.read()?.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    fn local(&self, prefix: &Prefix) -> Result<Option<Arc<Entity>>> {
        Ok(self.entities.read()?.get(prefix).cloned())
    }

    /// Verify a credential from `issuer`, hosted here or elsewhere.
    pub async fn verify(&self, issuer: &Prefix, signed: &SignedAttestationDatum) -> Verification {
        match self.local(issuer) {
            Ok(Some(entity)) => entity.verify(issuer, signed).await,
            Ok(None) => verify_remote(&self.resolver, issuer, signed).await,
            Err(e) => Verification::ResolutionError(e.to_string()),
        }
    }

    /// DID document for any identifier, fetching remote key state as needed.
    pub async fn did_document(&self, prefix: &Prefix) -> Result<DidDocument> {
        if let Some(entity) = self.local(prefix)? {
            return entity.did_document();
        }
        let kel = self.resolver.fetch_kel(prefix).await?;
        Ok(did::resolve(kel.current_state_ref()))
    }
}

#[async_trait]
impl Responder for Controller {
    async fn respond(&self, request: ResolveRequest) -> ResolveResponse {
        match self.local(request.prefix()) {
            Ok(Some(entity)) => entity.respond(request).await,
            Ok(None) => ResolveResponse::error(
                ErrorCode::UnknownIdentifier,
                format!("{} is not hosted at {}", request.prefix(), self.location),
            ),
            Err(e) => ResolveResponse::error(ErrorCode::Internal, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keri_kernel_resolve::{AddressResolver, MemoryAddressBook, MemoryNetwork, ResolverConfig};

    fn controller() -> (Controller, Arc<MemoryAddressBook>) {
        let book = Arc::new(MemoryAddressBook::new());
        let resolver = RemoteResolver::new(
            book.clone(),
            Arc::new(MemoryNetwork::new().transport()),
            ResolverConfig::default(),
        );
        let controller = Controller::new(
            NetworkLocation::new("mem://home"),
            Arc::new(resolver),
            EntityConfig::default(),
        );
        (controller, book)
    }

    #[tokio::test]
    async fn test_hosting() {
        let (controller, book) = controller();
        let a = controller.create_identifier().await.unwrap();
        let b = controller.create_identifier().await.unwrap();

        let mut expected = vec![a.prefix(), b.prefix()];
        expected.sort();
        assert_eq!(controller.identifiers().unwrap(), expected);
        assert_eq!(
            book.resolve(&a.prefix()).await.unwrap(),
            NetworkLocation::new("mem://home")
        );

        assert!(controller.remove_entity(&a.prefix()).unwrap().is_some());
        assert!(matches!(
            controller.entity(&a.prefix()),
            Err(KernelError::UnknownIdentifier(_))
        ));
        assert_eq!(controller.entity(&b.prefix()).unwrap().prefix(), b.prefix());
    }

    #[tokio::test]
    async fn test_respond_for_hosted_only() {
        let (controller, _) = controller();
        let a = controller.create_identifier().await.unwrap();

        let ok = controller
            .respond(ResolveRequest::Kel { prefix: a.prefix() })
            .await;
        assert!(matches!(ok, ResolveResponse::Kel { .. }));

        controller.remove_entity(&a.prefix()).unwrap();
        let gone = controller
            .respond(ResolveRequest::Kel { prefix: a.prefix() })
            .await;
        assert!(matches!(
            gone,
            ResolveResponse::Error { code: ErrorCode::UnknownIdentifier, .. }
        ));
    }

    #[tokio::test]
    async fn test_poisoned_registry_is_an_error() {
        let (controller, _) = controller();
        let a = controller.create_identifier().await.unwrap();
        let credential = a.issue("test", serde_json::json!({"msg": "hi"})).unwrap();

        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = controller.entities.write().unwrap();
            panic!("poison the registry");
        }));

        assert!(matches!(
            controller.entity(&a.prefix()),
            Err(KernelError::LockPoisoned)
        ));
        assert!(matches!(
            controller.did_document(&a.prefix()).await,
            Err(KernelError::LockPoisoned)
        ));
        assert!(matches!(
            controller.verify(&a.prefix(), &credential).await,
            Verification::ResolutionError(_)
        ));
        let response = controller
            .respond(ResolveRequest::Kel { prefix: a.prefix() })
            .await;
        assert!(matches!(
            response,
            ResolveResponse::Error { code: ErrorCode::Internal, .. }
        ));
    }
}
