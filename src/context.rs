//! context
//!
//! Per-call operation context and working-directory resolution.
//!
//! # Design
//!
//! An [`OperationContext`] is constructed fresh for every call, owned by the
//! caller, and passed by reference through the whole call chain. Providers
//! never mutate it and never persist it. The working directory it carries is
//! already validated: absolute, traversal-free, and existing on disk.
//!
//! [`resolve_workdir`] is the single validation point. A caller supplies
//! either the session sentinel (meaning "use the session's recorded
//! directory") or an absolute path; everything else is rejected with a
//! [`VcsError::Validation`] before any process is spawned.

use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::error::VcsError;

/// Path token meaning "use the caller's current session directory".
pub const SESSION_DIR_TOKEN: &str = ".";

/// Per-call metadata threaded through every provider operation.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Validated absolute working directory for the operation
    pub workdir: PathBuf,
    /// Correlation id, unique per call
    pub request_id: Uuid,
    /// Tenant identifier, when the transport layer is multi-tenant
    pub tenant: Option<String>,
}

impl OperationContext {
    /// Create a context for a validated working directory.
    ///
    /// The correlation id is generated here; callers that already have one
    /// (e.g. from an inbound request) should use [`with_request_id`].
    ///
    /// [`with_request_id`]: OperationContext::with_request_id
    pub fn new(workdir: PathBuf) -> Self {
        Self {
            workdir,
            request_id: Uuid::new_v4(),
            tenant: None,
        }
    }

    /// Attach an externally supplied correlation id.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Attach a tenant identifier.
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }
}

/// Resolve a caller-supplied path token into a validated working directory.
///
/// # Arguments
///
/// * `token` - [`SESSION_DIR_TOKEN`] or an absolute path
/// * `session_dir` - the session's recorded directory, if any
///
/// # Errors
///
/// `Validation` when the sentinel is used with no session directory on
/// record, the path is relative, it contains parent-directory components,
/// or it does not name an existing directory.
pub fn resolve_workdir(token: &str, session_dir: Option<&Path>) -> Result<PathBuf, VcsError> {
    if token == SESSION_DIR_TOKEN {
        return match session_dir {
            Some(dir) => Ok(dir.to_path_buf()),
            None => Err(VcsError::Validation {
                detail: "no session directory on record; supply an absolute path".to_string(),
            }),
        };
    }

    let path = PathBuf::from(token);
    if !path.is_absolute() {
        return Err(VcsError::Validation {
            detail: format!("working directory must be absolute: {token}"),
        });
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(VcsError::Validation {
            detail: format!("working directory must not contain '..': {token}"),
        });
    }
    if !path.is_dir() {
        return Err(VcsError::Validation {
            detail: format!("working directory does not exist: {token}"),
        });
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod operation_context {
        use super::*;

        #[test]
        fn fresh_contexts_get_distinct_request_ids() {
            let a = OperationContext::new(PathBuf::from("/tmp"));
            let b = OperationContext::new(PathBuf::from("/tmp"));
            assert_ne!(a.request_id, b.request_id);
        }

        #[test]
        fn builders_set_fields() {
            let id = Uuid::new_v4();
            let ctx = OperationContext::new(PathBuf::from("/tmp"))
                .with_request_id(id)
                .with_tenant("acme");
            assert_eq!(ctx.request_id, id);
            assert_eq!(ctx.tenant.as_deref(), Some("acme"));
        }
    }

    mod resolve_workdir {
        use super::*;

        #[test]
        fn sentinel_uses_session_directory() {
            let resolved = resolve_workdir(SESSION_DIR_TOKEN, Some(Path::new("/tmp"))).unwrap();
            assert_eq!(resolved, PathBuf::from("/tmp"));
        }

        #[test]
        fn sentinel_without_session_is_rejected() {
            let err = resolve_workdir(SESSION_DIR_TOKEN, None).unwrap_err();
            assert!(matches!(err, VcsError::Validation { .. }));
        }

        #[test]
        fn relative_path_is_rejected() {
            let err = resolve_workdir("some/relative/dir", None).unwrap_err();
            assert!(matches!(err, VcsError::Validation { .. }));
        }

        #[test]
        fn traversal_is_rejected() {
            let err = resolve_workdir("/tmp/../etc", None).unwrap_err();
            assert!(matches!(err, VcsError::Validation { .. }));
        }

        #[test]
        fn missing_directory_is_rejected() {
            let err = resolve_workdir("/definitely/not/here", None).unwrap_err();
            assert!(matches!(err, VcsError::Validation { .. }));
        }

        #[test]
        fn existing_absolute_directory_passes() {
            let dir = tempfile::tempdir().unwrap();
            let token = dir.path().display().to_string();
            let resolved = resolve_workdir(&token, None).unwrap();
            assert_eq!(resolved, dir.path());
        }
    }
}
