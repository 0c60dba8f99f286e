//! provider::factory
//!
//! Provider selection, construction, and caching.
//!
//! # Design
//!
//! This is the single place providers are built. Call sites request a
//! provider through a [`ProviderSelection`] instead of constructing
//! backends directly, which keeps the architecture boundary intact and
//! makes capability gating impossible to bypass: the factory refuses to
//! hand out a provider whose declared capability set does not cover the
//! caller's requirements.
//!
//! Selection is deterministic: the same selection against the same
//! configuration always resolves to the same provider kind. Instances are
//! cached per provider kind + configuration digest for the process
//! lifetime. The cache is the one piece of shared mutable state in the
//! subsystem; a concurrent first access may race to build an instance, in
//! which case the late arrival is discarded and every caller ends up
//! holding the one retained instance.
//!
//! # Example
//!
//! ```ignore
//! use gitbridge::config::BridgeConfig;
//! use gitbridge::provider::{Capability, ProviderFactory, ProviderSelection};
//!
//! let factory = ProviderFactory::new(BridgeConfig::default());
//! let provider = factory
//!     .get(ProviderSelection {
//!         required: vec![Capability::Blame],
//!         ..Default::default()
//!     })
//!     .await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::cli::CliProvider;
use crate::config::BridgeConfig;
use crate::error::VcsError;

use super::capabilities::Capability;
use super::mock::MockProvider;
use super::traits::{ProviderKind, VcsProvider};

/// What a call site needs from a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderSelection {
    /// Requested provider kind; the configured or default kind when absent
    pub preferred: Option<ProviderKind>,
    /// Capabilities the call site requires the provider to declare
    pub required: Vec<Capability>,
    /// Override of the runtime's subprocess permission; `None` defers to
    /// configuration
    pub allow_subprocess: Option<bool>,
}

/// Builds, gates, and caches provider instances.
pub struct ProviderFactory {
    config: BridgeConfig,
    cache: Mutex<HashMap<String, Arc<dyn VcsProvider>>>,
}

impl ProviderFactory {
    /// Create a factory over the given configuration.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The configuration this factory builds providers from.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Resolve, construct or reuse, and capability-check a provider.
    ///
    /// # Errors
    ///
    /// `ProviderUnavailable` when the resolved kind is disabled for this
    /// runtime, its health check fails, or its capability set does not
    /// cover `selection.required`.
    pub async fn get(
        &self,
        selection: ProviderSelection,
    ) -> Result<Arc<dyn VcsProvider>, VcsError> {
        let kind = self.resolve_kind(&selection)?;
        let key = format!("{}:{}", kind.as_key(), self.config.digest());

        // Fast path: reuse a live instance when it satisfies the caller.
        {
            let cache = self.cache.lock().await;
            if let Some(provider) = cache.get(&key) {
                check_capabilities(provider.as_ref(), &selection.required)?;
                return Ok(Arc::clone(provider));
            }
        }

        // Build outside the lock; instantiation runs a health check and must
        // not serialize unrelated lookups.
        let provider = self.build(kind);

        if !provider.health_check().await {
            return Err(VcsError::ProviderUnavailable {
                detail: format!("{kind} provider failed its health check"),
            });
        }
        check_capabilities(provider.as_ref(), &selection.required)?;

        // Publish; a racing creator may have won, in which case the fresh
        // instance is discarded and the retained one is returned.
        let mut cache = self.cache.lock().await;
        if let Some(existing) = cache.get(&key) {
            return Ok(Arc::clone(existing));
        }
        cache.insert(key, Arc::clone(&provider));
        Ok(provider)
    }

    /// Resolve the provider kind for a selection. Deterministic.
    fn resolve_kind(&self, selection: &ProviderSelection) -> Result<ProviderKind, VcsError> {
        let kind = selection
            .preferred
            .or_else(|| self.config.preferred_kind())
            .unwrap_or(ProviderKind::Cli);

        let allow_subprocess = selection
            .allow_subprocess
            .unwrap_or(self.config.allow_subprocess);
        if kind == ProviderKind::Cli && !allow_subprocess {
            return Err(VcsError::ProviderUnavailable {
                detail: "cli provider requires subprocess spawning, which is disabled \
                         in this runtime"
                    .to_string(),
            });
        }

        Ok(kind)
    }

    fn build(&self, kind: ProviderKind) -> Arc<dyn VcsProvider> {
        match kind {
            ProviderKind::Cli => Arc::new(CliProvider::new(&self.config)),
            ProviderKind::Mock => Arc::new(MockProvider::new()),
        }
    }
}

/// Verify a provider's declared capabilities cover the required set.
fn check_capabilities(
    provider: &dyn VcsProvider,
    required: &[Capability],
) -> Result<(), VcsError> {
    let missing = provider.capabilities().missing(required);
    if missing.is_empty() {
        return Ok(());
    }
    let names: Vec<&str> = missing.iter().map(|c| c.name()).collect();
    Err(VcsError::ProviderUnavailable {
        detail: format!(
            "{} provider lacks required capabilities: {}",
            provider.kind(),
            names.join(", ")
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> ProviderFactory {
        ProviderFactory::new(BridgeConfig::default())
    }

    #[tokio::test]
    async fn mock_selection_resolves_to_mock() {
        let provider = factory()
            .get(ProviderSelection {
                preferred: Some(ProviderKind::Mock),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(provider.kind(), ProviderKind::Mock);
    }

    #[tokio::test]
    async fn required_capability_not_declared_is_refused() {
        // The mock declares no optional capabilities.
        let err = factory()
            .get(ProviderSelection {
                preferred: Some(ProviderKind::Mock),
                required: vec![Capability::Blame],
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, VcsError::ProviderUnavailable { .. }));
    }

    #[tokio::test]
    async fn cli_is_refused_when_subprocess_is_disabled() {
        let err = factory()
            .get(ProviderSelection {
                preferred: Some(ProviderKind::Cli),
                allow_subprocess: Some(false),
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            VcsError::ProviderUnavailable { detail } => {
                assert!(detail.contains("subprocess"));
            }
            other => panic!("expected ProviderUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn instances_are_reused_per_configuration() {
        let factory = factory();
        let selection = ProviderSelection {
            preferred: Some(ProviderKind::Mock),
            ..Default::default()
        };
        let a = factory.get(selection.clone()).await.unwrap();
        let b = factory.get(selection).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn concurrent_first_access_retains_one_instance() {
        let factory = Arc::new(factory());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let factory = Arc::clone(&factory);
            handles.push(tokio::spawn(async move {
                factory
                    .get(ProviderSelection {
                        preferred: Some(ProviderKind::Mock),
                        ..Default::default()
                    })
                    .await
                    .unwrap()
            }));
        }

        let mut providers = Vec::new();
        for handle in handles {
            providers.push(handle.await.unwrap());
        }
        let first = &providers[0];
        assert!(providers.iter().all(|p| Arc::ptr_eq(first, p)));
    }

    #[tokio::test]
    async fn selection_is_deterministic() {
        let factory = factory();
        for _ in 0..3 {
            let provider = factory
                .get(ProviderSelection {
                    preferred: Some(ProviderKind::Mock),
                    ..Default::default()
                })
                .await
                .unwrap();
            assert_eq!(provider.kind(), ProviderKind::Mock);
        }
    }
}
