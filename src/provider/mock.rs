//! provider::mock
//!
//! In-memory provider with scripted results, for deterministic tests.
//!
//! # Design
//!
//! The mock implements the full contract. Listing operations return canned
//! results configured up front; mutations record themselves and return
//! defaults. A scripted failure makes the next operation fail with the given
//! error, which is how error-path handling is tested without a repository.
//!
//! The declared capability set is configurable, which is what the factory
//! gating tests rely on: a mock declaring no optional capabilities stands in
//! for a backend that cannot blame or stash.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::context::OperationContext;
use crate::error::VcsError;
use crate::types::*;

use super::base;
use super::capabilities::{Capability, CapabilitySet};
use super::traits::{ProviderKind, VcsProvider};

/// Mock provider.
///
/// Thread-safe via internal `Arc<Mutex<...>>`; clones share state.
#[derive(Debug, Clone)]
pub struct MockProvider {
    capabilities: CapabilitySet,
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    healthy: bool,
    fail_next: Option<VcsError>,
    recorded: Vec<String>,
    status: StatusResult,
    diff: DiffResult,
    log: LogResult,
    blame: BlameResult,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a healthy mock declaring no optional capabilities.
    pub fn new() -> Self {
        Self {
            capabilities: CapabilitySet::new(),
            inner: Arc::new(Mutex::new(Inner {
                healthy: true,
                ..Inner::default()
            })),
        }
    }

    /// Replace the declared capability set.
    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Configure the canned status result.
    pub fn with_status(self, status: StatusResult) -> Self {
        self.inner.lock().unwrap().status = status;
        self
    }

    /// Configure the canned diff result.
    pub fn with_diff(self, diff: DiffResult) -> Self {
        self.inner.lock().unwrap().diff = diff;
        self
    }

    /// Configure the canned log result.
    pub fn with_log(self, log: LogResult) -> Self {
        self.inner.lock().unwrap().log = log;
        self
    }

    /// Configure the canned blame result.
    pub fn with_blame(self, blame: BlameResult) -> Self {
        self.inner.lock().unwrap().blame = blame;
        self
    }

    /// Make the next operation fail with `error`.
    pub fn fail_next(&self, error: VcsError) {
        self.inner.lock().unwrap().fail_next = Some(error);
    }

    /// Make the health check report unhealthy.
    pub fn set_unhealthy(&self) {
        self.inner.lock().unwrap().healthy = false;
    }

    /// Operations recorded so far, in call order.
    pub fn recorded(&self) -> Vec<String> {
        self.inner.lock().unwrap().recorded.clone()
    }

    fn begin(&self, operation: &str, ctx: &OperationContext) -> Result<(), VcsError> {
        base::record_operation(operation, ctx);
        let mut inner = self.inner.lock().unwrap();
        inner.recorded.push(operation.to_string());
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }
        Ok(())
    }
}

#[async_trait]
impl VcsProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Mock
    }

    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    async fn health_check(&self) -> bool {
        self.inner.lock().unwrap().healthy
    }

    async fn status(
        &self,
        _opts: StatusOptions,
        ctx: &OperationContext,
    ) -> Result<StatusResult, VcsError> {
        self.begin("status", ctx)?;
        Ok(self.inner.lock().unwrap().status.clone())
    }

    async fn add(&self, opts: AddOptions, ctx: &OperationContext) -> Result<AddResult, VcsError> {
        self.begin("add", ctx)?;
        Ok(AddResult { staged: opts.paths })
    }

    async fn commit(
        &self,
        opts: CommitOptions,
        ctx: &OperationContext,
    ) -> Result<CommitResult, VcsError> {
        self.begin("commit", ctx)?;
        if opts.sign {
            base::ensure_capability(&self.capabilities, Capability::Signing)?;
        }
        Ok(CommitResult {
            hash: "0".repeat(40),
            branch: "main".to_string(),
            subject: opts.message.lines().next().unwrap_or("").to_string(),
        })
    }

    async fn log(&self, _opts: LogOptions, ctx: &OperationContext) -> Result<LogResult, VcsError> {
        self.begin("log", ctx)?;
        Ok(self.inner.lock().unwrap().log.clone())
    }

    async fn show(
        &self,
        opts: ShowOptions,
        ctx: &OperationContext,
    ) -> Result<ShowResult, VcsError> {
        self.begin("show", ctx)?;
        let log = self.inner.lock().unwrap().log.clone();
        let entry = log.entries.into_iter().next().ok_or_else(|| {
            VcsError::ReferenceNotFound {
                reference: opts.revision,
            }
        })?;
        Ok(ShowResult {
            entry,
            diff: String::new(),
        })
    }

    async fn diff(
        &self,
        _opts: DiffOptions,
        ctx: &OperationContext,
    ) -> Result<DiffResult, VcsError> {
        self.begin("diff", ctx)?;
        Ok(self.inner.lock().unwrap().diff.clone())
    }

    async fn branch(
        &self,
        _opts: BranchOptions,
        ctx: &OperationContext,
    ) -> Result<BranchResult, VcsError> {
        self.begin("branch", ctx)?;
        Ok(BranchResult::default())
    }

    async fn checkout(
        &self,
        opts: CheckoutOptions,
        ctx: &OperationContext,
    ) -> Result<CheckoutResult, VcsError> {
        self.begin("checkout", ctx)?;
        Ok(CheckoutResult {
            target: opts.target,
            created: opts.create,
        })
    }

    async fn merge(
        &self,
        _opts: MergeOptions,
        ctx: &OperationContext,
    ) -> Result<MergeResult, VcsError> {
        self.begin("merge", ctx)?;
        Ok(MergeResult::default())
    }

    async fn rebase(
        &self,
        _opts: RebaseOptions,
        ctx: &OperationContext,
    ) -> Result<RebaseResult, VcsError> {
        self.begin("rebase", ctx)?;
        Ok(RebaseResult::default())
    }

    async fn cherry_pick(
        &self,
        _opts: CherryPickOptions,
        ctx: &OperationContext,
    ) -> Result<CherryPickResult, VcsError> {
        self.begin("cherry_pick", ctx)?;
        base::ensure_capability(&self.capabilities, Capability::CherryPick)?;
        Ok(CherryPickResult::default())
    }

    async fn remote(
        &self,
        _opts: RemoteOptions,
        ctx: &OperationContext,
    ) -> Result<RemoteResult, VcsError> {
        self.begin("remote", ctx)?;
        Ok(RemoteResult::default())
    }

    async fn fetch(
        &self,
        opts: FetchOptions,
        ctx: &OperationContext,
    ) -> Result<TransferResult, VcsError> {
        self.begin("fetch", ctx)?;
        Ok(TransferResult {
            remote: opts.remote.unwrap_or_else(|| "origin".to_string()),
            detail: String::new(),
        })
    }

    async fn push(
        &self,
        opts: PushOptions,
        ctx: &OperationContext,
    ) -> Result<TransferResult, VcsError> {
        self.begin("push", ctx)?;
        Ok(TransferResult {
            remote: opts.remote.unwrap_or_else(|| "origin".to_string()),
            detail: String::new(),
        })
    }

    async fn pull(
        &self,
        opts: PullOptions,
        ctx: &OperationContext,
    ) -> Result<TransferResult, VcsError> {
        self.begin("pull", ctx)?;
        Ok(TransferResult {
            remote: opts.remote.unwrap_or_else(|| "origin".to_string()),
            detail: String::new(),
        })
    }

    async fn tag(&self, _opts: TagOptions, ctx: &OperationContext) -> Result<TagResult, VcsError> {
        self.begin("tag", ctx)?;
        Ok(TagResult::default())
    }

    async fn stash(
        &self,
        _opts: StashOptions,
        ctx: &OperationContext,
    ) -> Result<StashResult, VcsError> {
        self.begin("stash", ctx)?;
        base::ensure_capability(&self.capabilities, Capability::Stash)?;
        Ok(StashResult::default())
    }

    async fn worktree(
        &self,
        _opts: WorktreeOptions,
        ctx: &OperationContext,
    ) -> Result<WorktreeResult, VcsError> {
        self.begin("worktree", ctx)?;
        base::ensure_capability(&self.capabilities, Capability::Worktree)?;
        Ok(WorktreeResult::default())
    }

    async fn reset(
        &self,
        _opts: ResetOptions,
        ctx: &OperationContext,
    ) -> Result<ResetResult, VcsError> {
        self.begin("reset", ctx)?;
        Ok(ResetResult::default())
    }

    async fn blame(
        &self,
        _opts: BlameOptions,
        ctx: &OperationContext,
    ) -> Result<BlameResult, VcsError> {
        self.begin("blame", ctx)?;
        base::ensure_capability(&self.capabilities, Capability::Blame)?;
        Ok(self.inner.lock().unwrap().blame.clone())
    }

    async fn reflog(
        &self,
        _opts: ReflogOptions,
        ctx: &OperationContext,
    ) -> Result<ReflogResult, VcsError> {
        self.begin("reflog", ctx)?;
        base::ensure_capability(&self.capabilities, Capability::Reflog)?;
        Ok(ReflogResult::default())
    }

    async fn clean(
        &self,
        _opts: CleanOptions,
        ctx: &OperationContext,
    ) -> Result<CleanResult, VcsError> {
        self.begin("clean", ctx)?;
        base::ensure_capability(&self.capabilities, Capability::Clean)?;
        Ok(CleanResult::default())
    }

    async fn init(
        &self,
        opts: InitOptions,
        ctx: &OperationContext,
    ) -> Result<InitResult, VcsError> {
        self.begin("init", ctx)?;
        Ok(InitResult {
            workdir: ctx.workdir.display().to_string(),
            bare: opts.bare,
        })
    }

    async fn clone_repo(
        &self,
        opts: CloneOptions,
        ctx: &OperationContext,
    ) -> Result<CloneResult, VcsError> {
        self.begin("clone", ctx)?;
        Ok(CloneResult {
            directory: opts
                .directory
                .unwrap_or_else(|| ctx.workdir.display().to_string()),
        })
    }
}
