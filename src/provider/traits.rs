//! provider::traits
//!
//! The provider contract: one method per repository operation.
//!
//! # Design
//!
//! Every backend (CLI today; library-embedded or remote-API by design)
//! implements [`VcsProvider`]. Methods take an immutable options bag and a
//! borrowed [`OperationContext`] and return a typed result or a
//! [`VcsError`]; result shapes are identical across backends. Provider
//! instances are cached and shared, so every method must be safe to call
//! concurrently with itself and with the other methods on the same
//! instance - implementations hold no per-repository mutable state.
//!
//! Capability gating happens in the factory; operation methods only perform
//! the base layer's defensive re-assertion (see [`super::base`]).

use async_trait::async_trait;

use crate::context::OperationContext;
use crate::error::VcsError;
use crate::types::*;

use super::capabilities::CapabilitySet;

/// The backend kinds a provider can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Backed by the `git` binary through subprocess invocations.
    Cli,
    /// In-memory provider with scripted results, for tests and dry wiring.
    Mock,
}

impl ProviderKind {
    /// Stable key used in configuration and cache keys.
    pub const fn as_key(self) -> &'static str {
        match self {
            ProviderKind::Cli => "cli",
            ProviderKind::Mock => "mock",
        }
    }

    /// Parse a provider kind from its key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "cli" => Some(ProviderKind::Cli),
            "mock" => Some(ProviderKind::Mock),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

/// The full operation surface every provider implements.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; instances are shared across
/// concurrent operations without external locking. Ordering guarantees for
/// concurrent mutations of one working directory are the underlying tool's,
/// not this layer's.
///
/// # Errors
///
/// Every method fails with exactly one [`VcsError`] kind; no raw process or
/// parser error crosses this boundary.
#[async_trait]
pub trait VcsProvider: Send + Sync {
    /// The backend kind of this provider.
    fn kind(&self) -> ProviderKind;

    /// The capabilities this provider declares. Static for the lifetime of
    /// the instance.
    fn capabilities(&self) -> &CapabilitySet;

    /// Whether the backend is currently usable. A provider whose tool could
    /// not be started reports `false` from then on.
    async fn health_check(&self) -> bool;

    /// Working-tree status.
    async fn status(
        &self,
        opts: StatusOptions,
        ctx: &OperationContext,
    ) -> Result<StatusResult, VcsError>;

    /// Stage files.
    async fn add(&self, opts: AddOptions, ctx: &OperationContext) -> Result<AddResult, VcsError>;

    /// Create a commit.
    async fn commit(
        &self,
        opts: CommitOptions,
        ctx: &OperationContext,
    ) -> Result<CommitResult, VcsError>;

    /// List history.
    async fn log(&self, opts: LogOptions, ctx: &OperationContext) -> Result<LogResult, VcsError>;

    /// Show a single revision with its patch.
    async fn show(&self, opts: ShowOptions, ctx: &OperationContext)
        -> Result<ShowResult, VcsError>;

    /// Diff revisions, the index, or the working tree.
    async fn diff(&self, opts: DiffOptions, ctx: &OperationContext)
        -> Result<DiffResult, VcsError>;

    /// List, create, or delete branches.
    async fn branch(
        &self,
        opts: BranchOptions,
        ctx: &OperationContext,
    ) -> Result<BranchResult, VcsError>;

    /// Check out a branch or revision.
    async fn checkout(
        &self,
        opts: CheckoutOptions,
        ctx: &OperationContext,
    ) -> Result<CheckoutResult, VcsError>;

    /// Merge a branch into the current one.
    async fn merge(
        &self,
        opts: MergeOptions,
        ctx: &OperationContext,
    ) -> Result<MergeResult, VcsError>;

    /// Rebase the current branch.
    async fn rebase(
        &self,
        opts: RebaseOptions,
        ctx: &OperationContext,
    ) -> Result<RebaseResult, VcsError>;

    /// Apply commits onto the current branch.
    async fn cherry_pick(
        &self,
        opts: CherryPickOptions,
        ctx: &OperationContext,
    ) -> Result<CherryPickResult, VcsError>;

    /// List or modify remotes.
    async fn remote(
        &self,
        opts: RemoteOptions,
        ctx: &OperationContext,
    ) -> Result<RemoteResult, VcsError>;

    /// Fetch from a remote.
    async fn fetch(
        &self,
        opts: FetchOptions,
        ctx: &OperationContext,
    ) -> Result<TransferResult, VcsError>;

    /// Push to a remote.
    async fn push(
        &self,
        opts: PushOptions,
        ctx: &OperationContext,
    ) -> Result<TransferResult, VcsError>;

    /// Pull from a remote.
    async fn pull(
        &self,
        opts: PullOptions,
        ctx: &OperationContext,
    ) -> Result<TransferResult, VcsError>;

    /// List, create, or delete tags.
    async fn tag(&self, opts: TagOptions, ctx: &OperationContext) -> Result<TagResult, VcsError>;

    /// Stash operations.
    async fn stash(
        &self,
        opts: StashOptions,
        ctx: &OperationContext,
    ) -> Result<StashResult, VcsError>;

    /// Worktree operations.
    async fn worktree(
        &self,
        opts: WorktreeOptions,
        ctx: &OperationContext,
    ) -> Result<WorktreeResult, VcsError>;

    /// Reset HEAD.
    async fn reset(
        &self,
        opts: ResetOptions,
        ctx: &OperationContext,
    ) -> Result<ResetResult, VcsError>;

    /// Annotate a file line by line.
    async fn blame(
        &self,
        opts: BlameOptions,
        ctx: &OperationContext,
    ) -> Result<BlameResult, VcsError>;

    /// Read the reference log.
    async fn reflog(
        &self,
        opts: ReflogOptions,
        ctx: &OperationContext,
    ) -> Result<ReflogResult, VcsError>;

    /// Remove untracked files.
    async fn clean(
        &self,
        opts: CleanOptions,
        ctx: &OperationContext,
    ) -> Result<CleanResult, VcsError>;

    /// Initialize a repository in the context's working directory.
    async fn init(&self, opts: InitOptions, ctx: &OperationContext)
        -> Result<InitResult, VcsError>;

    /// Clone a repository into the context's working directory.
    async fn clone_repo(
        &self,
        opts: CloneOptions,
        ctx: &OperationContext,
    ) -> Result<CloneResult, VcsError>;
}
