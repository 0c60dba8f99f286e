//! error
//!
//! The closed error taxonomy surfaced by the provider layer.
//!
//! # Architecture
//!
//! Every failure inside the provider layer is converted to exactly one
//! [`VcsError`] before it crosses the layer boundary. Raw process errors and
//! parser defects never leak to callers. The transport layer receives the
//! error kind and message verbatim and owns final presentation.
//!
//! # Classification
//!
//! [`classify`] turns a failed invocation into one error kind. Matching is
//! done on git's stable, machine-oriented stderr substrings rather than full
//! sentences, so minor wording drift between git versions does not change the
//! classification. Anything unmatched stays [`VcsError::OperationFailed`]
//! with the exit code, sanitized command line, and a stderr excerpt attached.

use std::path::Path;

use thiserror::Error;

use crate::exec::RawInvocation;

/// Maximum stderr excerpt carried in diagnostic context.
const STDERR_EXCERPT_LEN: usize = 400;

/// Errors surfaced by the provider layer.
///
/// This enumeration is closed: callers can match exhaustively and rely on
/// every provider producing the same kinds for the same failure classes.
#[derive(Debug, Clone, Error)]
pub enum VcsError {
    /// The underlying version-control binary could not be located or started.
    ///
    /// Fatal for the provider instance; its health check fails afterwards.
    #[error("version-control tool unavailable: {detail}")]
    ToolUnavailable {
        /// What failed to start
        detail: String,
    },

    /// Target directory is not a valid repository for the operation.
    #[error("not a git repository: {workdir}")]
    NotARepository {
        /// The directory that was probed
        workdir: String,
    },

    /// A named branch/tag/commit/ref does not exist.
    #[error("reference not found: {reference}")]
    ReferenceNotFound {
        /// The reference that failed to resolve
        reference: String,
    },

    /// Operation cannot proceed due to an existing conflicting state
    /// (existing worktree, diverged branches, merge conflict).
    #[error("conflicting repository state: {detail}")]
    Conflict {
        /// Description of the conflicting state
        detail: String,
    },

    /// The factory could not produce a provider meeting the requested
    /// type/capability constraints.
    #[error("no suitable provider: {detail}")]
    ProviderUnavailable {
        /// Why resolution failed
        detail: String,
    },

    /// Caller-supplied input failed structural or security validation
    /// before any process was invoked.
    #[error("invalid input: {detail}")]
    Validation {
        /// Description of the rejected input
        detail: String,
    },

    /// Catch-all for a failed invocation that matches no more specific kind.
    #[error("operation failed: `{command}` exited {exit_code:?} in {workdir}: {stderr}")]
    OperationFailed {
        /// The sanitized command line (display only, never re-executed)
        command: String,
        /// Exit code, if the process exited at all
        exit_code: Option<i32>,
        /// Excerpt of stderr for diagnostics
        stderr: String,
        /// Working directory of the invocation
        workdir: String,
    },
}

impl VcsError {
    /// Stable kind identifier for the agent-facing protocol.
    pub fn kind(&self) -> &'static str {
        match self {
            VcsError::ToolUnavailable { .. } => "tool_unavailable",
            VcsError::NotARepository { .. } => "not_a_repository",
            VcsError::ReferenceNotFound { .. } => "reference_not_found",
            VcsError::Conflict { .. } => "conflict",
            VcsError::ProviderUnavailable { .. } => "provider_unavailable",
            VcsError::Validation { .. } => "validation_error",
            VcsError::OperationFailed { .. } => "operation_failed",
        }
    }

    /// An internal defect of this layer (parser contract violation,
    /// missing sub-invocation output), reported as a failed operation with
    /// an internal-error marker rather than as a repository-state problem.
    pub fn internal(command: &str, workdir: &Path, detail: &str) -> Self {
        VcsError::OperationFailed {
            command: command.to_string(),
            exit_code: None,
            stderr: format!("internal: {detail}"),
            workdir: workdir.display().to_string(),
        }
    }
}

/// Stderr substrings that indicate a missing reference.
///
/// Kept per operation family where git's phrasing differs: revision lookup,
/// pathspec resolution, and remote ref lookup all report absence differently.
const REFERENCE_NOT_FOUND_PATTERNS: &[&str] = &[
    "unknown revision",
    "bad revision",
    "did not match any file(s) known to git",
    "couldn't find remote ref",
    "not a valid ref",
    "no such ref",
];

/// Substrings that indicate a conflicting existing state.
///
/// Merge and rebase print their conflict notices on stdout, so conflict
/// matching runs over both streams.
const CONFLICT_PATTERNS: &[&str] = &[
    "already exists",
    "is already used by worktree",
    "is already checked out",
    "CONFLICT",
    "Automatic merge failed",
    "could not apply",
    "needs merge",
    "would be overwritten",
    "not possible to fast-forward",
    "non-fast-forward",
];

/// Classify a failed invocation into exactly one error kind.
///
/// Precedence: not-a-repository, then conflict, then missing reference,
/// then the catch-all. Spawn failures never reach this function; the
/// executor reports them separately and they map to
/// [`VcsError::ToolUnavailable`].
pub fn classify(invocation: &RawInvocation, workdir: &Path) -> VcsError {
    let stderr = invocation.stderr.trim();
    let stdout = invocation.stdout.trim();
    let command = invocation.command_line();
    let workdir_display = workdir.display().to_string();

    if stderr.contains("not a git repository") {
        return VcsError::NotARepository {
            workdir: workdir_display,
        };
    }

    if CONFLICT_PATTERNS
        .iter()
        .any(|p| stderr.contains(p) || stdout.contains(p))
    {
        return VcsError::Conflict {
            detail: excerpt(if stderr.is_empty() { stdout } else { stderr }),
        };
    }

    if REFERENCE_NOT_FOUND_PATTERNS.iter().any(|p| stderr.contains(p)) {
        return VcsError::ReferenceNotFound {
            reference: quoted_token(stderr).unwrap_or_else(|| excerpt(stderr)),
        };
    }

    VcsError::OperationFailed {
        command,
        exit_code: invocation.exit_code,
        stderr: excerpt(stderr),
        workdir: workdir_display,
    }
}

/// First single-quoted token in a message, e.g. the ref name in
/// `fatal: couldn't find remote ref 'nope'`.
fn quoted_token(message: &str) -> Option<String> {
    let start = message.find('\'')?;
    let rest = &message[start + 1..];
    let end = rest.find('\'')?;
    if end == 0 {
        return None;
    }
    Some(rest[..end].to_string())
}

/// Truncate a message to the diagnostic excerpt length on a char boundary.
fn excerpt(message: &str) -> String {
    if message.len() <= STDERR_EXCERPT_LEN {
        return message.to_string();
    }
    let mut cut = STDERR_EXCERPT_LEN;
    while !message.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &message[..cut])
}
