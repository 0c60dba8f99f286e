//! cli::provider
//!
//! The CLI-backed provider: every contract operation as
//! build → execute → parse → map.
//!
//! # Architecture
//!
//! Operations construct argument vectors through [`GitCommand`], run them
//! through the injected [`Executor`], parse stdout with the pure parsers in
//! [`super::parse`], and convert every failure through
//! [`crate::error::classify`]. The provider holds only execution
//! configuration; all repository state lives in the working directory named
//! by each call's context, so a cached instance serves concurrent calls
//! without locking.
//!
//! # Multi-step operations
//!
//! Some operations compose several invocations. Diff with untracked files
//! is the worked case: a primary diff, a stat pass for aggregate counts, an
//! untracked listing, and one `--no-index` comparison per untracked file.
//! For that comparison shape alone, exit code 1 means "inputs differ" and
//! is a success whose stdout is harvested; any other non-zero exit is still
//! classified as a failure. Callers should expect latency proportional to
//! the number of untracked files.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::BridgeConfig;
use crate::context::OperationContext;
use crate::error::{classify, VcsError};
use crate::exec::{ExecError, Executor, RawInvocation, SystemExecutor};
use crate::provider::base;
use crate::provider::capabilities::{Capability, CapabilitySet};
use crate::provider::traits::{ProviderKind, VcsProvider};
use crate::types::*;

use super::command::GitCommand;
use super::parse;

/// Provider backed by the `git` binary.
pub struct CliProvider {
    binary: PathBuf,
    capabilities: CapabilitySet,
    executor: Arc<dyn Executor>,
    /// Set when a spawn ever fails; the instance reports unhealthy from
    /// then on instead of re-probing a missing binary.
    tool_missing: AtomicBool,
}

impl CliProvider {
    /// Create a provider over the system executor.
    pub fn new(config: &BridgeConfig) -> Self {
        Self::with_executor(
            config,
            Arc::new(SystemExecutor::with_timeout(config.timeout())),
        )
    }

    /// Create a provider with an injected executor. Used by tests and by
    /// wiring that needs to decorate execution.
    pub fn with_executor(config: &BridgeConfig, executor: Arc<dyn Executor>) -> Self {
        Self {
            binary: config.binary.clone(),
            capabilities: CapabilitySet::all(),
            executor,
            tool_missing: AtomicBool::new(false),
        }
    }

    /// The binary this provider invokes.
    pub fn binary(&self) -> &std::path::Path {
        &self.binary
    }

    fn begin(&self, operation: &str, ctx: &OperationContext) -> Result<(), VcsError> {
        base::record_operation(operation, ctx);
        base::validate_workdir(&ctx.workdir)
    }

    /// Run one invocation and return its tagged outcome.
    async fn invoke(
        &self,
        command: &GitCommand,
        ctx: &OperationContext,
    ) -> Result<RawInvocation, VcsError> {
        let argv = command.render()?;
        match self.executor.run(&self.binary, &argv, &ctx.workdir, ctx).await {
            Ok(invocation) => Ok(invocation),
            Err(ExecError::Spawn { program, source }) => {
                self.tool_missing.store(true, Ordering::Relaxed);
                let error = VcsError::ToolUnavailable {
                    detail: format!("{program}: {source}"),
                };
                base::record_failure("spawn", ctx, &error);
                Err(error)
            }
            Err(ExecError::TimedOut { program, timeout }) => {
                let error = VcsError::OperationFailed {
                    command: argv.join(" "),
                    exit_code: None,
                    stderr: format!("{program} timed out after {timeout:?} and was terminated"),
                    workdir: ctx.workdir.display().to_string(),
                };
                base::record_failure("timeout", ctx, &error);
                Err(error)
            }
            Err(ExecError::Capture { program, source }) => Err(VcsError::OperationFailed {
                command: argv.join(" "),
                exit_code: None,
                stderr: format!("failed to capture output of {program}: {source}"),
                workdir: ctx.workdir.display().to_string(),
            }),
        }
    }

    /// Run one invocation and classify any non-zero exit.
    async fn invoke_ok(
        &self,
        command: &GitCommand,
        ctx: &OperationContext,
    ) -> Result<RawInvocation, VcsError> {
        let invocation = self.invoke(command, ctx).await?;
        if invocation.success() {
            return Ok(invocation);
        }
        let error = classify(&invocation, &ctx.workdir);
        base::record_failure("invoke", ctx, &error);
        Err(error)
    }
}

/// Preferred human-readable summary of an invocation: stdout when present,
/// stderr otherwise (several git commands report success on stderr).
fn summary(invocation: &RawInvocation) -> String {
    let stdout = invocation.stdout.trim();
    if stdout.is_empty() {
        invocation.stderr.trim().to_string()
    } else {
        stdout.to_string()
    }
}

/// Derive a clone target directory from its URL, the way git does.
fn directory_from_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

#[async_trait]
impl VcsProvider for CliProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Cli
    }

    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    async fn health_check(&self) -> bool {
        if self.tool_missing.load(Ordering::Relaxed) {
            return false;
        }
        let ctx = OperationContext::new(std::env::temp_dir());
        let command = GitCommand::new("--version");
        match self.invoke(&command, &ctx).await {
            Ok(invocation) => invocation.success(),
            Err(_) => false,
        }
    }

    async fn status(
        &self,
        opts: StatusOptions,
        ctx: &OperationContext,
    ) -> Result<StatusResult, VcsError> {
        self.begin("status", ctx)?;
        let command = GitCommand::new("status")
            .flag("--porcelain")
            .flag("--branch")
            .flag_if(!opts.include_untracked, "--untracked-files=no");
        let invocation = self.invoke_ok(&command, ctx).await?;
        Ok(parse::parse_status(&invocation.stdout))
    }

    async fn add(&self, opts: AddOptions, ctx: &OperationContext) -> Result<AddResult, VcsError> {
        self.begin("add", ctx)?;
        if opts.paths.is_empty() && !opts.all && !opts.update {
            return Err(VcsError::Validation {
                detail: "add requires paths, all, or update".to_string(),
            });
        }
        let command = GitCommand::new("add")
            .flag("--verbose")
            .flag_if(opts.all, "--all")
            .flag_if(opts.update, "--update")
            .pathspecs(opts.paths);
        let invocation = self.invoke_ok(&command, ctx).await?;
        Ok(AddResult {
            staged: parse::parse_added_paths(&invocation.stdout),
        })
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
        if opts.message.trim().is_empty() {
            return Err(VcsError::Validation {
                detail: "commit message must not be empty".to_string(),
            });
        }

        let command = GitCommand::new("commit")
            .flag_value("--message", &opts.message)
            .flag_if(opts.all, "--all")
            .flag_if(opts.amend, "--amend")
            .flag_if(opts.allow_empty, "--allow-empty")
            .flag_if(opts.sign, "--gpg-sign");
        let invocation = self.invoke_ok(&command, ctx).await?;

        let (branch, _, subject) =
            parse::parse_commit_summary(&invocation.stdout).ok_or_else(|| {
                VcsError::internal("commit", &ctx.workdir, "no commit summary in output")
            })?;

        let rev_parse = GitCommand::new("rev-parse").arg("HEAD");
        let head = self.invoke_ok(&rev_parse, ctx).await?;

        Ok(CommitResult {
            hash: head.stdout.trim().to_string(),
            branch,
            subject,
        })
    }

    async fn log(&self, opts: LogOptions, ctx: &OperationContext) -> Result<LogResult, VcsError> {
        self.begin("log", ctx)?;
        let mut command = GitCommand::new("log").flag_value("--format", parse::LOG_FORMAT);
        if let Some(n) = opts.max_count {
            command = command.flag_value("--max-count", n);
        }
        command = command.arg_opt(opts.range.as_deref());
        if let Some(path) = opts.path {
            command = command.pathspec(path);
        }
        let invocation = self.invoke_ok(&command, ctx).await?;
        Ok(LogResult {
            entries: parse::parse_log(&invocation.stdout),
        })
    }

    async fn show(
        &self,
        opts: ShowOptions,
        ctx: &OperationContext,
    ) -> Result<ShowResult, VcsError> {
        self.begin("show", ctx)?;
        let command = GitCommand::new("show")
            .flag_value("--format", parse::LOG_FORMAT)
            .flag("--patch")
            .arg(opts.revision);
        let invocation = self.invoke_ok(&command, ctx).await?;
        let (entry, diff) = parse::parse_show(&invocation.stdout).ok_or_else(|| {
            VcsError::internal("show", &ctx.workdir, "no commit record in output")
        })?;
        Ok(ShowResult { entry, diff })
    }

    async fn diff(
        &self,
        opts: DiffOptions,
        ctx: &OperationContext,
    ) -> Result<DiffResult, VcsError> {
        self.begin("diff", ctx)?;
        if opts.target.is_some() && opts.source.is_none() {
            return Err(VcsError::Validation {
                detail: "diff target requires a source".to_string(),
            });
        }

        let base_command = |subject: GitCommand| -> GitCommand {
            subject
                .flag_if(opts.staged, "--cached")
                .arg_opt(opts.source.as_deref())
                .arg_opt(opts.target.as_deref())
                .pathspecs(opts.paths.iter().cloned())
        };

        let mut primary = GitCommand::new("diff").flag_if(opts.name_only, "--name-only");
        if let Some(n) = opts.unified {
            primary = primary.flag_value("--unified", n);
        }
        let primary = base_command(primary);
        let invocation = self.invoke_ok(&primary, ctx).await?;
        let mut combined = invocation.stdout.clone();

        // Aggregate counts come from one stat pass over the same selection.
        // Wide columns keep the histogram unscaled and paths untruncated.
        let stat_command = base_command(GitCommand::new("diff").flag("--stat=600,500"));
        let stat_invocation = self.invoke_ok(&stat_command, ctx).await?;
        let stat = parse::parse_diff_stat(&stat_invocation.stdout);

        let mut files_changed = stat.files.len();
        let insertions = stat.total_additions;
        let deletions = stat.total_deletions;
        let has_binary = stat.has_binary();

        if opts.include_untracked {
            let listing = GitCommand::new("ls-files")
                .flag("--others")
                .flag("--exclude-standard");
            let listed = self.invoke_ok(&listing, ctx).await?;
            let untracked = parse::parse_lines(&listed.stdout);

            for file in &untracked {
                // `--no-index` between differing inputs exits 1 by design;
                // that is the success case for this invocation shape.
                let comparison = GitCommand::new("diff")
                    .flag("--no-index")
                    .pathspec("/dev/null")
                    .pathspec(file.clone());
                let outcome = self.invoke(&comparison, ctx).await?;
                match outcome.exit_code {
                    Some(0) => {}
                    Some(1) => {
                        if outcome.stdout.trim().is_empty() {
                            return Err(VcsError::internal(
                                "diff --no-index",
                                &ctx.workdir,
                                "comparison reported differences but produced no output",
                            ));
                        }
                        if !combined.is_empty() && !combined.ends_with('\n') {
                            combined.push('\n');
                        }
                        combined.push_str(&outcome.stdout);
                    }
                    _ => {
                        let error = classify(&outcome, &ctx.workdir);
                        base::record_failure("diff", ctx, &error);
                        return Err(error);
                    }
                }
                // Untracked files count as changed but contribute no
                // insertion/deletion counts to the stat pass above.
                files_changed += 1;
            }
        }

        Ok(DiffResult {
            diff: combined,
            files_changed,
            insertions,
            deletions,
            has_binary,
        })
    }

    async fn branch(
        &self,
        opts: BranchOptions,
        ctx: &OperationContext,
    ) -> Result<BranchResult, VcsError> {
        self.begin("branch", ctx)?;
        if opts.create.is_some() && opts.delete.is_some() {
            return Err(VcsError::Validation {
                detail: "branch cannot create and delete in one call".to_string(),
            });
        }

        if let Some(name) = opts.create {
            let command = GitCommand::new("branch")
                .arg(name)
                .arg_opt(opts.start_point.as_deref());
            self.invoke_ok(&command, ctx).await?;
            return Ok(BranchResult::default());
        }

        if let Some(name) = opts.delete {
            let command = GitCommand::new("branch")
                .flag("--delete")
                .flag_if(opts.force, "--force")
                .arg(name);
            self.invoke_ok(&command, ctx).await?;
            return Ok(BranchResult::default());
        }

        let command = GitCommand::new("branch")
            .flag("--list")
            .flag_value("--format", parse::BRANCH_FORMAT);
        let invocation = self.invoke_ok(&command, ctx).await?;
        Ok(BranchResult {
            branches: parse::parse_branch_list(&invocation.stdout),
        })
    }

    async fn checkout(
        &self,
        opts: CheckoutOptions,
        ctx: &OperationContext,
    ) -> Result<CheckoutResult, VcsError> {
        self.begin("checkout", ctx)?;
        let command = GitCommand::new("checkout")
            .flag_if(opts.create, "-b")
            .arg(opts.target.clone());
        self.invoke_ok(&command, ctx).await?;
        Ok(CheckoutResult {
            target: opts.target,
            created: opts.create,
        })
    }

    async fn merge(
        &self,
        opts: MergeOptions,
        ctx: &OperationContext,
    ) -> Result<MergeResult, VcsError> {
        self.begin("merge", ctx)?;
        let mut command = GitCommand::new("merge").flag_if(opts.no_ff, "--no-ff");
        if let Some(message) = &opts.message {
            command = command.flag_value("--message", message);
        }
        let command = command.arg(opts.source);
        let invocation = self.invoke_ok(&command, ctx).await?;
        Ok(MergeResult {
            fast_forward: invocation.stdout.contains("Fast-forward"),
            detail: summary(&invocation),
        })
    }

    async fn rebase(
        &self,
        opts: RebaseOptions,
        ctx: &OperationContext,
    ) -> Result<RebaseResult, VcsError> {
        self.begin("rebase", ctx)?;
        let modes =
            usize::from(opts.upstream.is_some()) + usize::from(opts.abort) + usize::from(opts.continue_rebase);
        if modes != 1 {
            return Err(VcsError::Validation {
                detail: "rebase takes exactly one of upstream, abort, continue".to_string(),
            });
        }
        let command = GitCommand::new("rebase")
            .flag_if(opts.abort, "--abort")
            .flag_if(opts.continue_rebase, "--continue")
            .arg_opt(opts.upstream.as_deref());
        let invocation = self.invoke_ok(&command, ctx).await?;
        Ok(RebaseResult {
            detail: summary(&invocation),
        })
    }

    async fn cherry_pick(
        &self,
        opts: CherryPickOptions,
        ctx: &OperationContext,
    ) -> Result<CherryPickResult, VcsError> {
        self.begin("cherry_pick", ctx)?;
        base::ensure_capability(&self.capabilities, Capability::CherryPick)?;
        if opts.commits.is_empty() && !opts.abort {
            return Err(VcsError::Validation {
                detail: "cherry-pick requires commits or abort".to_string(),
            });
        }
        let mut command = GitCommand::new("cherry-pick")
            .flag_if(opts.abort, "--abort")
            .flag_if(opts.no_commit, "--no-commit");
        for commit in opts.commits {
            command = command.arg(commit);
        }
        let invocation = self.invoke_ok(&command, ctx).await?;
        Ok(CherryPickResult {
            detail: summary(&invocation),
        })
    }

    async fn remote(
        &self,
        opts: RemoteOptions,
        ctx: &OperationContext,
    ) -> Result<RemoteResult, VcsError> {
        self.begin("remote", ctx)?;
        match opts.action {
            RemoteAction::List => {
                let command = GitCommand::new("remote").flag("--verbose");
                let invocation = self.invoke_ok(&command, ctx).await?;
                Ok(RemoteResult {
                    remotes: parse::parse_remote_list(&invocation.stdout),
                })
            }
            RemoteAction::Add { name, url } => {
                let command = GitCommand::new("remote").action("add").arg(name).arg(url);
                self.invoke_ok(&command, ctx).await?;
                Ok(RemoteResult::default())
            }
            RemoteAction::Remove { name } => {
                let command = GitCommand::new("remote").action("remove").arg(name);
                self.invoke_ok(&command, ctx).await?;
                Ok(RemoteResult::default())
            }
        }
    }

    async fn fetch(
        &self,
        opts: FetchOptions,
        ctx: &OperationContext,
    ) -> Result<TransferResult, VcsError> {
        self.begin("fetch", ctx)?;
        let remote = opts.remote.unwrap_or_else(|| "origin".to_string());
        let command = GitCommand::new("fetch")
            .flag_if(opts.prune, "--prune")
            .arg(remote.clone())
            .arg_opt(opts.refspec.as_deref());
        let invocation = self.invoke_ok(&command, ctx).await?;
        Ok(TransferResult {
            remote,
            detail: summary(&invocation),
        })
    }

    async fn push(
        &self,
        opts: PushOptions,
        ctx: &OperationContext,
    ) -> Result<TransferResult, VcsError> {
        self.begin("push", ctx)?;
        let remote = opts.remote.unwrap_or_else(|| "origin".to_string());
        let command = GitCommand::new("push")
            .flag_if(opts.force, "--force-with-lease")
            .flag_if(opts.set_upstream, "--set-upstream")
            .arg(remote.clone())
            .arg_opt(opts.refspec.as_deref());
        let invocation = self.invoke_ok(&command, ctx).await?;
        Ok(TransferResult {
            remote,
            detail: summary(&invocation),
        })
    }

    async fn pull(
        &self,
        opts: PullOptions,
        ctx: &OperationContext,
    ) -> Result<TransferResult, VcsError> {
        self.begin("pull", ctx)?;
        let remote = opts.remote.unwrap_or_else(|| "origin".to_string());
        let command = GitCommand::new("pull")
            .flag_if(opts.rebase, "--rebase")
            .arg(remote.clone())
            .arg_opt(opts.refspec.as_deref());
        let invocation = self.invoke_ok(&command, ctx).await?;
        Ok(TransferResult {
            remote,
            detail: summary(&invocation),
        })
    }

    async fn tag(&self, opts: TagOptions, ctx: &OperationContext) -> Result<TagResult, VcsError> {
        self.begin("tag", ctx)?;
        match opts.action {
            TagAction::List { pattern } => {
                let command = GitCommand::new("tag")
                    .flag("--list")
                    .arg_opt(pattern.as_deref());
                let invocation = self.invoke_ok(&command, ctx).await?;
                Ok(TagResult {
                    tags: parse::parse_lines(&invocation.stdout),
                })
            }
            TagAction::Create {
                name,
                target,
                message,
            } => {
                let mut command = GitCommand::new("tag");
                if let Some(message) = &message {
                    command = command.flag("--annotate").flag_value("--message", message);
                }
                let command = command.arg(name).arg_opt(target.as_deref());
                self.invoke_ok(&command, ctx).await?;
                Ok(TagResult::default())
            }
            TagAction::Delete { name } => {
                let command = GitCommand::new("tag").flag("--delete").arg(name);
                self.invoke_ok(&command, ctx).await?;
                Ok(TagResult::default())
            }
        }
    }

    async fn stash(
        &self,
        opts: StashOptions,
        ctx: &OperationContext,
    ) -> Result<StashResult, VcsError> {
        self.begin("stash", ctx)?;
        base::ensure_capability(&self.capabilities, Capability::Stash)?;
        match opts.action {
            StashAction::Push {
                message,
                include_untracked,
            } => {
                let mut command = GitCommand::new("stash")
                    .action("push")
                    .flag_if(include_untracked, "--include-untracked");
                if let Some(message) = &message {
                    command = command.flag_value("--message", message);
                }
                self.invoke_ok(&command, ctx).await?;
                Ok(StashResult::default())
            }
            StashAction::Pop { index } => {
                let command = stash_selector(GitCommand::new("stash").action("pop"), index);
                self.invoke_ok(&command, ctx).await?;
                Ok(StashResult::default())
            }
            StashAction::Apply { index } => {
                let command = stash_selector(GitCommand::new("stash").action("apply"), index);
                self.invoke_ok(&command, ctx).await?;
                Ok(StashResult::default())
            }
            StashAction::Drop { index } => {
                let command = stash_selector(GitCommand::new("stash").action("drop"), index);
                self.invoke_ok(&command, ctx).await?;
                Ok(StashResult::default())
            }
            StashAction::List => {
                let command = GitCommand::new("stash")
                    .action("list")
                    .flag_value("--format", parse::STASH_FORMAT);
                let invocation = self.invoke_ok(&command, ctx).await?;
                Ok(StashResult {
                    entries: parse::parse_stash_list(&invocation.stdout),
                })
            }
        }
    }

    async fn worktree(
        &self,
        opts: WorktreeOptions,
        ctx: &OperationContext,
    ) -> Result<WorktreeResult, VcsError> {
        self.begin("worktree", ctx)?;
        base::ensure_capability(&self.capabilities, Capability::Worktree)?;
        match opts.action {
            WorktreeAction::Add { path, branch } => {
                let mut command = GitCommand::new("worktree").action("add");
                if let Some(branch) = branch {
                    command = command.flag_arg("-b", branch);
                }
                let command = command.arg(path);
                self.invoke_ok(&command, ctx).await?;
                Ok(WorktreeResult::default())
            }
            WorktreeAction::Remove { path, force } => {
                let command = GitCommand::new("worktree")
                    .action("remove")
                    .flag_if(force, "--force")
                    .arg(path);
                self.invoke_ok(&command, ctx).await?;
                Ok(WorktreeResult::default())
            }
            WorktreeAction::List => {
                let command = GitCommand::new("worktree").action("list").flag("--porcelain");
                let invocation = self.invoke_ok(&command, ctx).await?;
                Ok(WorktreeResult {
                    worktrees: parse::parse_worktree_list(&invocation.stdout),
                })
            }
            WorktreeAction::Prune => {
                let command = GitCommand::new("worktree").action("prune");
                self.invoke_ok(&command, ctx).await?;
                Ok(WorktreeResult::default())
            }
        }
    }

    async fn reset(
        &self,
        opts: ResetOptions,
        ctx: &OperationContext,
    ) -> Result<ResetResult, VcsError> {
        self.begin("reset", ctx)?;
        let mode = match opts.mode {
            ResetMode::Soft => "--soft",
            ResetMode::Mixed => "--mixed",
            ResetMode::Hard => "--hard",
        };
        let command = GitCommand::new("reset")
            .flag(mode)
            .arg_opt(opts.target.as_deref());
        let invocation = self.invoke_ok(&command, ctx).await?;
        Ok(ResetResult {
            detail: summary(&invocation),
        })
    }

    async fn blame(
        &self,
        opts: BlameOptions,
        ctx: &OperationContext,
    ) -> Result<BlameResult, VcsError> {
        self.begin("blame", ctx)?;
        base::ensure_capability(&self.capabilities, Capability::Blame)?;
        let command = GitCommand::new("blame")
            .flag("--line-porcelain")
            .arg_opt(opts.revision.as_deref())
            .pathspec(opts.path);
        let invocation = self.invoke_ok(&command, ctx).await?;
        Ok(BlameResult {
            lines: parse::parse_blame(&invocation.stdout),
        })
    }

    async fn reflog(
        &self,
        opts: ReflogOptions,
        ctx: &OperationContext,
    ) -> Result<ReflogResult, VcsError> {
        self.begin("reflog", ctx)?;
        base::ensure_capability(&self.capabilities, Capability::Reflog)?;
        let mut command = GitCommand::new("reflog").flag_value("--format", parse::REFLOG_FORMAT);
        if let Some(n) = opts.max_count {
            command = command.flag_value("--max-count", n);
        }
        let invocation = self.invoke_ok(&command, ctx).await?;
        Ok(ReflogResult {
            entries: parse::parse_reflog(&invocation.stdout),
        })
    }

    async fn clean(
        &self,
        opts: CleanOptions,
        ctx: &OperationContext,
    ) -> Result<CleanResult, VcsError> {
        self.begin("clean", ctx)?;
        base::ensure_capability(&self.capabilities, Capability::Clean)?;
        let command = GitCommand::new("clean")
            .flag_if(opts.dry_run, "--dry-run")
            .flag_if(!opts.dry_run, "--force")
            .flag_if(opts.directories, "-d");
        let invocation = self.invoke_ok(&command, ctx).await?;
        Ok(CleanResult {
            removed: parse::parse_clean(&invocation.stdout),
        })
    }

    async fn init(
        &self,
        opts: InitOptions,
        ctx: &OperationContext,
    ) -> Result<InitResult, VcsError> {
        self.begin("init", ctx)?;
        let mut command = GitCommand::new("init").flag_if(opts.bare, "--bare");
        if let Some(branch) = &opts.initial_branch {
            command = command.flag_value("--initial-branch", branch);
        }
        self.invoke_ok(&command, ctx).await?;
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
        let mut command = GitCommand::new("clone");
        if let Some(depth) = opts.depth {
            command = command.flag_value("--depth", depth);
        }
        let command = command
            .arg(opts.url.clone())
            .arg_opt(opts.directory.as_deref());
        self.invoke_ok(&command, ctx).await?;
        Ok(CloneResult {
            directory: opts
                .directory
                .unwrap_or_else(|| directory_from_url(&opts.url)),
        })
    }
}

fn stash_selector(command: GitCommand, index: Option<usize>) -> GitCommand {
    match index {
        Some(index) => command.arg(format!("stash@{{{index}}}")),
        None => command,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ExecError;
    use std::path::Path;

    /// Executor returning scripted outcomes keyed by subcommand.
    struct ScriptedExecutor<F>(F);

    #[async_trait]
    impl<F> Executor for ScriptedExecutor<F>
    where
        F: Fn(&[String]) -> Result<RawInvocation, ExecError> + Send + Sync,
    {
        async fn run(
            &self,
            _program: &Path,
            argv: &[String],
            _cwd: &Path,
            _ctx: &OperationContext,
        ) -> Result<RawInvocation, ExecError> {
            (self.0)(argv)
        }
    }

    fn ok(argv: &[String], stdout: &str) -> Result<RawInvocation, ExecError> {
        Ok(RawInvocation {
            argv: argv.to_vec(),
            exit_code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        })
    }

    fn provider<F>(script: F) -> CliProvider
    where
        F: Fn(&[String]) -> Result<RawInvocation, ExecError> + Send + Sync + 'static,
    {
        CliProvider::with_executor(&BridgeConfig::default(), Arc::new(ScriptedExecutor(script)))
    }

    fn ctx() -> OperationContext {
        OperationContext::new(std::env::temp_dir())
    }

    const STATUS_OUT: &str = "## main\nA  added.txt\n M modified.txt\n?? new.txt\n";

    fn status_script(argv: &[String]) -> Result<RawInvocation, ExecError> {
        match argv.first().map(String::as_str) {
            Some("status") => ok(argv, STATUS_OUT),
            _ => ok(argv, ""),
        }
    }

    #[tokio::test]
    async fn status_parses_buckets() {
        let provider = provider(status_script);
        let status = provider
            .status(StatusOptions::default(), &ctx())
            .await
            .unwrap();
        assert_eq!(status.branch, "main");
        assert_eq!(status.staged, vec!["added.txt"]);
        assert_eq!(status.unstaged, vec!["modified.txt"]);
        assert_eq!(status.untracked, vec!["new.txt"]);
    }

    #[tokio::test]
    async fn identical_raw_output_yields_identical_results_across_instances() {
        // Result shape and content depend only on the raw output, not on
        // which provider instance produced it.
        let a = provider(status_script);
        let b = provider(status_script);
        let result_a = a.status(StatusOptions::default(), &ctx()).await.unwrap();
        let result_b = b.status(StatusOptions::default(), &ctx()).await.unwrap();
        assert_eq!(result_a, result_b);
    }

    #[tokio::test]
    async fn not_a_repository_is_classified() {
        let provider = provider(|argv| {
            Ok(RawInvocation {
                argv: argv.to_vec(),
                exit_code: Some(128),
                stdout: String::new(),
                stderr: "fatal: not a git repository (or any of the parent directories): .git"
                    .to_string(),
            })
        });
        let err = provider
            .diff(DiffOptions::default(), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, VcsError::NotARepository { .. }));
    }

    #[tokio::test]
    async fn spawn_failure_is_tool_unavailable_and_poisons_health() {
        let provider = provider(|_argv| {
            Err(ExecError::Spawn {
                program: "git".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            })
        });
        let err = provider
            .status(StatusOptions::default(), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, VcsError::ToolUnavailable { .. }));
        assert!(!provider.health_check().await);
    }

    #[tokio::test]
    async fn timeout_maps_to_operation_failed() {
        let provider = provider(|_argv| {
            Err(ExecError::TimedOut {
                program: "git".to_string(),
                timeout: std::time::Duration::from_secs(1),
            })
        });
        let err = provider
            .status(StatusOptions::default(), &ctx())
            .await
            .unwrap_err();
        match err {
            VcsError::OperationFailed { stderr, .. } => assert!(stderr.contains("timed out")),
            other => panic!("expected OperationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn diff_include_untracked_special_cases_exit_one() {
        let provider = provider(|argv| {
            let argv_vec = argv.to_vec();
            match argv.first().map(String::as_str) {
                Some("diff") if argv.contains(&"--no-index".to_string()) => Ok(RawInvocation {
                    argv: argv_vec,
                    exit_code: Some(1),
                    stdout: "diff --git a/new.txt b/new.txt\nnew file mode 100644\n+hello\n"
                        .to_string(),
                    stderr: String::new(),
                }),
                Some("diff") if argv.iter().any(|a| a.starts_with("--stat")) => Ok(RawInvocation {
                    argv: argv_vec,
                    exit_code: Some(0),
                    stdout: " a.txt | 2 ++\n 1 file changed, 2 insertions(+)\n".to_string(),
                    stderr: String::new(),
                }),
                Some("diff") => Ok(RawInvocation {
                    argv: argv_vec,
                    exit_code: Some(0),
                    stdout: "diff --git a/a.txt b/a.txt\n+x\n+y\n".to_string(),
                    stderr: String::new(),
                }),
                Some("ls-files") => Ok(RawInvocation {
                    argv: argv_vec,
                    exit_code: Some(0),
                    stdout: "new.txt\n".to_string(),
                    stderr: String::new(),
                }),
                _ => ok(argv, ""),
            }
        });

        let result = provider
            .diff(
                DiffOptions {
                    include_untracked: true,
                    ..Default::default()
                },
                &ctx(),
            )
            .await
            .unwrap();

        assert!(result.diff.contains("a/a.txt"));
        assert!(result.diff.contains("new.txt"));
        assert_eq!(result.files_changed, 2);
        assert_eq!(result.insertions, 2);
    }

    #[tokio::test]
    async fn diff_untracked_comparison_without_output_is_internal_error() {
        let provider = provider(|argv| {
            let argv_vec = argv.to_vec();
            match argv.first().map(String::as_str) {
                Some("diff") if argv.contains(&"--no-index".to_string()) => Ok(RawInvocation {
                    argv: argv_vec,
                    exit_code: Some(1),
                    stdout: String::new(),
                    stderr: String::new(),
                }),
                Some("ls-files") => Ok(RawInvocation {
                    argv: argv_vec,
                    exit_code: Some(0),
                    stdout: "new.txt\n".to_string(),
                    stderr: String::new(),
                }),
                _ => ok(argv, ""),
            }
        });

        let err = provider
            .diff(
                DiffOptions {
                    include_untracked: true,
                    ..Default::default()
                },
                &ctx(),
            )
            .await
            .unwrap_err();
        match err {
            VcsError::OperationFailed { stderr, .. } => assert!(stderr.contains("internal")),
            other => panic!("expected OperationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_commit_message_is_rejected_before_spawning() {
        let spawned = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&spawned);
        let provider = CliProvider::with_executor(
            &BridgeConfig::default(),
            Arc::new(ScriptedExecutor(move |argv: &[String]| {
                seen.store(true, Ordering::Relaxed);
                ok(argv, "")
            })),
        );
        let err = provider
            .commit(CommitOptions::default(), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, VcsError::Validation { .. }));
        assert!(!spawned.load(Ordering::Relaxed));
    }

    #[test]
    fn clone_directory_derives_from_url() {
        assert_eq!(directory_from_url("https://example.com/owner/repo.git"), "repo");
        assert_eq!(directory_from_url("git@example.com:owner/repo.git"), "repo");
        assert_eq!(directory_from_url("/local/path/repo"), "repo");
    }
}
