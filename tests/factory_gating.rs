//! Capability-gating and selection tests for the provider factory.
//!
//! The factory is the sole capability gate: a caller that requires a
//! capability the resolved provider does not declare must be refused with
//! `ProviderUnavailable` before any operation runs, and concurrent first
//! access to one configuration key must retain exactly one instance.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use gitbridge::cli::CliProvider;
use gitbridge::config::BridgeConfig;
use gitbridge::context::OperationContext;
use gitbridge::error::VcsError;
use gitbridge::exec::{ExecError, Executor, RawInvocation};
use gitbridge::provider::{
    Capability, CapabilitySet, MockProvider, ProviderFactory, ProviderKind, ProviderSelection,
    VcsProvider,
};
use gitbridge::types::{StatusOptions, StatusResult};

fn factory() -> ProviderFactory {
    ProviderFactory::new(BridgeConfig::default())
}

fn mock_selection() -> ProviderSelection {
    ProviderSelection {
        preferred: Some(ProviderKind::Mock),
        ..Default::default()
    }
}

// =============================================================================
// Capability gate
// =============================================================================

#[tokio::test]
async fn required_capability_missing_is_provider_unavailable() {
    // The mock backend declares no optional capabilities.
    let err = factory()
        .get(ProviderSelection {
            required: vec![Capability::Blame],
            ..mock_selection()
        })
        .await
        .unwrap_err();

    match err {
        VcsError::ProviderUnavailable { detail } => {
            assert!(detail.contains("blame"), "detail should name the gap: {detail}");
        }
        other => panic!("expected ProviderUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn gate_applies_to_cached_instances_too() {
    let factory = factory();
    // Prime the cache with an unconstrained request.
    factory.get(mock_selection()).await.unwrap();

    // A later caller with real requirements is still refused.
    let err = factory
        .get(ProviderSelection {
            required: vec![Capability::Worktree, Capability::Reflog],
            ..mock_selection()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, VcsError::ProviderUnavailable { .. }));
}

#[tokio::test]
async fn satisfied_requirements_return_the_provider() {
    let provider = factory()
        .get(ProviderSelection {
            preferred: Some(ProviderKind::Cli),
            required: vec![Capability::Blame, Capability::Stash, Capability::Worktree],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(provider.kind(), ProviderKind::Cli);
    assert!(provider
        .capabilities()
        .has_all(&[Capability::Blame, Capability::Stash, Capability::Worktree]));
}

#[tokio::test]
async fn cli_kind_is_refused_when_subprocess_spawning_is_disabled() {
    let err = factory()
        .get(ProviderSelection {
            preferred: Some(ProviderKind::Cli),
            allow_subprocess: Some(false),
            ..Default::default()
        })
        .await
        .unwrap_err();

    match err {
        VcsError::ProviderUnavailable { detail } => assert!(detail.contains("subprocess")),
        other => panic!("expected ProviderUnavailable, got {other:?}"),
    }
}

// =============================================================================
// Selection and caching
// =============================================================================

#[tokio::test]
async fn selection_is_deterministic_and_cached() {
    let factory = factory();
    let first = factory.get(mock_selection()).await.unwrap();
    for _ in 0..4 {
        let again = factory.get(mock_selection()).await.unwrap();
        assert_eq!(again.kind(), ProviderKind::Mock);
        assert!(Arc::ptr_eq(&first, &again));
    }
}

#[tokio::test]
async fn configured_preference_drives_default_selection() {
    let factory = ProviderFactory::new(BridgeConfig {
        provider: Some("mock".to_string()),
        ..Default::default()
    });
    let provider = factory.get(ProviderSelection::default()).await.unwrap();
    assert_eq!(provider.kind(), ProviderKind::Mock);
}

#[tokio::test]
async fn concurrent_first_access_retains_exactly_one_instance() {
    let factory = Arc::new(factory());

    let mut handles = Vec::new();
    for _ in 0..32 {
        let factory = Arc::clone(&factory);
        handles.push(tokio::spawn(
            async move { factory.get(mock_selection()).await.unwrap() },
        ));
    }

    let mut providers = Vec::new();
    for handle in handles {
        providers.push(handle.await.unwrap());
    }
    let first = &providers[0];
    assert!(
        providers.iter().all(|p| Arc::ptr_eq(first, p)),
        "racing first accesses must converge on one retained instance"
    );
}

// =============================================================================
// Result shape across backends
// =============================================================================

/// Executor that answers every invocation with one canned porcelain block.
struct CannedExecutor {
    stdout: String,
}

#[async_trait]
impl Executor for CannedExecutor {
    async fn run(
        &self,
        _program: &Path,
        argv: &[String],
        _cwd: &Path,
        _ctx: &OperationContext,
    ) -> Result<RawInvocation, ExecError> {
        Ok(RawInvocation {
            argv: argv.to_vec(),
            exit_code: Some(0),
            stdout: self.stdout.clone(),
            stderr: String::new(),
        })
    }
}

#[tokio::test]
async fn equivalent_raw_output_yields_identical_results_across_backends() {
    let dir = TempDir::new().unwrap();
    let ctx = OperationContext::new(dir.path().to_path_buf());

    let expected = StatusResult {
        branch: "main".to_string(),
        staged: vec!["added.txt".to_string()],
        unstaged: vec!["modified.txt".to_string()],
        untracked: vec!["new.txt".to_string()],
        ..Default::default()
    };

    let cli = CliProvider::with_executor(
        &BridgeConfig::default(),
        Arc::new(CannedExecutor {
            stdout: "## main\nA  added.txt\n M modified.txt\n?? new.txt\n".to_string(),
        }),
    );
    let from_cli = cli.status(StatusOptions::default(), &ctx).await.unwrap();

    let mock = MockProvider::new()
        .with_capabilities(CapabilitySet::all())
        .with_status(expected.clone());
    let from_mock = mock.status(StatusOptions::default(), &ctx).await.unwrap();

    assert_eq!(from_cli, expected);
    assert_eq!(from_mock, expected);
    // Serialized payloads are byte-identical: no backend-specific fields.
    assert_eq!(
        serde_json::to_string(&from_cli).unwrap(),
        serde_json::to_string(&from_mock).unwrap()
    );
}
