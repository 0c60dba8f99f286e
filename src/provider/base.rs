//! provider::base
//!
//! Shared plumbing for concrete providers.
//!
//! Implements no operation bodies. Concrete providers call into here for
//! the defensive capability re-assertion (the factory is the real gate),
//! working-directory validation, and structured logging at the operation
//! boundary.

use std::path::Path;

use crate::context::OperationContext;
use crate::error::VcsError;

use super::capabilities::{Capability, CapabilitySet};

/// Re-assert that a declared capability set covers `cap`.
///
/// The factory already refused to hand out a provider missing a required
/// capability; this check only catches call sites that bypassed it.
pub fn ensure_capability(declared: &CapabilitySet, cap: Capability) -> Result<(), VcsError> {
    if declared.has(&cap) {
        return Ok(());
    }
    Err(VcsError::ProviderUnavailable {
        detail: format!("provider does not support {cap}"),
    })
}

/// Validate the working directory carried by an operation context.
///
/// Contexts are built through [`crate::context::resolve_workdir`], so this
/// normally passes; it exists so a hand-built context cannot smuggle a
/// relative or missing path into a process invocation.
pub fn validate_workdir(workdir: &Path) -> Result<(), VcsError> {
    if !workdir.is_absolute() {
        return Err(VcsError::Validation {
            detail: format!("working directory must be absolute: {}", workdir.display()),
        });
    }
    if !workdir.is_dir() {
        return Err(VcsError::Validation {
            detail: format!("working directory does not exist: {}", workdir.display()),
        });
    }
    Ok(())
}

/// Record the start of an operation.
pub fn record_operation(operation: &str, ctx: &OperationContext) {
    tracing::debug!(
        op = operation,
        request = %ctx.request_id,
        workdir = %ctx.workdir.display(),
        tenant = ctx.tenant.as_deref().unwrap_or(""),
        "operation started"
    );
}

/// Record an operation failure with its classified kind.
pub fn record_failure(operation: &str, ctx: &OperationContext, error: &VcsError) {
    tracing::warn!(
        op = operation,
        request = %ctx.request_id,
        kind = error.kind(),
        error = %error,
        "operation failed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_capability_passes_when_declared() {
        let caps = CapabilitySet::with([Capability::Blame]);
        assert!(ensure_capability(&caps, Capability::Blame).is_ok());
    }

    #[test]
    fn ensure_capability_fails_when_missing() {
        let caps = CapabilitySet::new();
        let err = ensure_capability(&caps, Capability::Blame).unwrap_err();
        assert!(matches!(err, VcsError::ProviderUnavailable { .. }));
    }

    #[test]
    fn validate_workdir_rejects_relative() {
        let err = validate_workdir(Path::new("relative/dir")).unwrap_err();
        assert!(matches!(err, VcsError::Validation { .. }));
    }

    #[test]
    fn validate_workdir_rejects_missing() {
        let err = validate_workdir(Path::new("/no/such/dir/anywhere")).unwrap_err();
        assert!(matches!(err, VcsError::Validation { .. }));
    }

    #[test]
    fn validate_workdir_accepts_existing_absolute() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_workdir(dir.path()).is_ok());
    }
}
