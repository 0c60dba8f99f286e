//! types
//!
//! Operation options and backend-independent result objects.
//!
//! # Design
//!
//! Every provider returns the same result shapes for the same operations;
//! nothing in here is specific to the CLI backend. Results are serializable
//! because they are the payload of the agent-facing protocol. Options are
//! immutable parameter bags, deserializable from inbound requests.
//!
//! Timestamps are UTC and parsed from epoch-second fields, never from
//! locale-formatted dates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Branch value reported for a detached HEAD.
pub const DETACHED_HEAD: &str = "HEAD";

// =============================================================================
// Status
// =============================================================================

/// Options for the status operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusOptions {
    /// Include untracked files in the result
    pub include_untracked: bool,
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self {
            include_untracked: true,
        }
    }
}

/// Working-tree status, bucketed by porcelain status code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResult {
    /// Current branch name, or [`DETACHED_HEAD`] when detached
    pub branch: String,
    /// Commits ahead of upstream, when an upstream is set
    pub ahead: Option<usize>,
    /// Commits behind upstream, when an upstream is set
    pub behind: Option<usize>,
    /// Paths with staged changes
    pub staged: Vec<String>,
    /// Paths with unstaged changes to tracked files
    pub unstaged: Vec<String>,
    /// Untracked paths
    pub untracked: Vec<String>,
    /// Paths with unresolved conflicts
    pub conflicted: Vec<String>,
}

impl StatusResult {
    /// Whether the working tree has no changes at all.
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.unstaged.is_empty()
            && self.untracked.is_empty()
            && self.conflicted.is_empty()
    }
}

// =============================================================================
// Add / Commit
// =============================================================================

/// Options for staging files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddOptions {
    /// Pathspecs to stage
    pub paths: Vec<String>,
    /// Stage all changes including untracked files (`--all`)
    pub all: bool,
    /// Stage only already-tracked files (`--update`)
    pub update: bool,
}

/// Result of staging files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddResult {
    /// Paths reported staged by the tool
    pub staged: Vec<String>,
}

/// Options for creating a commit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitOptions {
    /// Commit message
    pub message: String,
    /// Stage tracked modifications before committing (`--all`)
    pub all: bool,
    /// Amend the previous commit
    pub amend: bool,
    /// Allow a commit with no changes
    pub allow_empty: bool,
    /// GPG-sign the commit (requires the `Signing` capability)
    pub sign: bool,
}

/// Result of creating a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    /// Full hash of the new commit
    pub hash: String,
    /// Branch the commit landed on
    pub branch: String,
    /// First line of the commit message
    pub subject: String,
}

// =============================================================================
// Log / Show
// =============================================================================

/// Options for listing history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogOptions {
    /// Maximum number of entries
    pub max_count: Option<usize>,
    /// Revision or revision range (e.g. `main..feature`)
    pub range: Option<String>,
    /// Restrict history to one path
    pub path: Option<String>,
}

/// One commit in a history listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Full commit hash
    pub hash: String,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Author timestamp
    pub timestamp: DateTime<Utc>,
    /// First line of the message
    pub subject: String,
    /// Remainder of the message, empty when there is none
    pub body: String,
}

/// History listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogResult {
    /// Entries, most recent first
    pub entries: Vec<LogEntry>,
}

/// Options for showing a single revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowOptions {
    /// Revision to show
    pub revision: String,
}

/// A single revision with its patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowResult {
    /// Commit metadata
    pub entry: LogEntry,
    /// Patch text
    pub diff: String,
}

// =============================================================================
// Diff
// =============================================================================

/// Options for the diff operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Source revision; working tree when absent
    pub source: Option<String>,
    /// Target revision; requires `source`
    pub target: Option<String>,
    /// Compare the index instead of the working tree (`--cached`)
    pub staged: bool,
    /// Emit only changed file names
    pub name_only: bool,
    /// Context line count (`--unified=N`)
    pub unified: Option<u32>,
    /// Pathspec filters, always placed after the `--` separator
    pub paths: Vec<String>,
    /// Append synthetic added-file diffs for untracked files
    pub include_untracked: bool,
}

/// Combined diff with aggregate counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Combined diff text (primary diff, then untracked-file hunks in
    /// enumeration order)
    pub diff: String,
    /// Number of changed files, untracked files included
    pub files_changed: usize,
    /// Inserted lines over the primary diff
    pub insertions: usize,
    /// Deleted lines over the primary diff
    pub deletions: usize,
    /// Whether any changed file is binary
    pub has_binary: bool,
}

/// Per-file entry of a diff stat block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    /// Path as printed by the tool
    pub path: String,
    /// Added lines; 0 for binary files
    pub additions: usize,
    /// Deleted lines; 0 for binary files
    pub deletions: usize,
    /// Whether the file is binary
    pub binary: bool,
}

/// Parsed diff stat block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStat {
    /// Per-file stats in output order
    pub files: Vec<FileStat>,
    /// Sum of additions over non-binary files
    pub total_additions: usize,
    /// Sum of deletions over non-binary files
    pub total_deletions: usize,
}

impl DiffStat {
    /// Build a stat from per-file entries, computing consistent totals.
    pub fn from_files(files: Vec<FileStat>) -> Self {
        let total_additions = files.iter().map(|f| f.additions).sum();
        let total_deletions = files.iter().map(|f| f.deletions).sum();
        Self {
            files,
            total_additions,
            total_deletions,
        }
    }

    /// Whether any file in the stat is binary.
    pub fn has_binary(&self) -> bool {
        self.files.iter().any(|f| f.binary)
    }
}

// =============================================================================
// Branch / Checkout
// =============================================================================

/// Options for the branch operation.
///
/// With no `create`/`delete`, lists local branches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchOptions {
    /// Create a branch with this name
    pub create: Option<String>,
    /// Delete the branch with this name
    pub delete: Option<String>,
    /// Force the delete (`-D`)
    pub force: bool,
    /// Start point for a created branch; HEAD when absent
    pub start_point: Option<String>,
}

/// One local branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    /// Short branch name
    pub name: String,
    /// Commit the branch points at
    pub hash: String,
    /// Whether this is the checked-out branch
    pub is_current: bool,
}

/// Branch listing; empty for create/delete invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchResult {
    /// Local branches in output order
    pub branches: Vec<BranchInfo>,
}

/// Options for checking out a revision or branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOptions {
    /// Branch or revision to check out
    pub target: String,
    /// Create the branch first (`-b`)
    #[serde(default)]
    pub create: bool,
}

/// Result of a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResult {
    /// What was checked out
    pub target: String,
    /// Whether the branch was created by this call
    pub created: bool,
}

// =============================================================================
// Merge / Rebase / Cherry-pick
// =============================================================================

/// Options for merging a branch into the current one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Branch or revision to merge
    pub source: String,
    /// Always create a merge commit (`--no-ff`)
    #[serde(default)]
    pub no_ff: bool,
    /// Merge commit message override
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    /// Whether the merge was a fast-forward
    pub fast_forward: bool,
    /// Tool summary of the merge
    pub detail: String,
}

/// Options for rebasing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RebaseOptions {
    /// Upstream to rebase onto; required unless aborting/continuing
    pub upstream: Option<String>,
    /// Abort an in-progress rebase
    pub abort: bool,
    /// Continue an in-progress rebase
    pub continue_rebase: bool,
}

/// Result of a rebase step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebaseResult {
    /// Tool summary of the rebase
    pub detail: String,
}

/// Options for cherry-picking commits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CherryPickOptions {
    /// Commits to apply, in order
    pub commits: Vec<String>,
    /// Apply without committing (`--no-commit`)
    pub no_commit: bool,
    /// Abort an in-progress cherry-pick
    pub abort: bool,
}

/// Result of a cherry-pick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CherryPickResult {
    /// Tool summary of the cherry-pick
    pub detail: String,
}

// =============================================================================
// Remote / Fetch / Push / Pull
// =============================================================================

/// Remote sub-operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum RemoteAction {
    /// List configured remotes
    List,
    /// Add a remote
    Add {
        /// Remote name
        name: String,
        /// Remote URL
        url: String,
    },
    /// Remove a remote
    Remove {
        /// Remote name
        name: String,
    },
}

/// Options for the remote operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteOptions {
    /// What to do
    pub action: RemoteAction,
}

/// One configured remote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInfo {
    /// Remote name
    pub name: String,
    /// Fetch URL
    pub fetch_url: String,
    /// Push URL; equals the fetch URL unless configured separately
    pub push_url: String,
}

/// Remote listing; empty for add/remove invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteResult {
    /// Configured remotes
    pub remotes: Vec<RemoteInfo>,
}

/// Options for fetching from a remote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Remote name; `origin` when absent
    pub remote: Option<String>,
    /// Refspec to fetch
    pub refspec: Option<String>,
    /// Prune deleted remote refs
    pub prune: bool,
}

/// Options for pushing to a remote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PushOptions {
    /// Remote name; `origin` when absent
    pub remote: Option<String>,
    /// Refspec to push
    pub refspec: Option<String>,
    /// Force-push (`--force-with-lease`)
    pub force: bool,
    /// Set the upstream for the pushed branch
    pub set_upstream: bool,
}

/// Options for pulling from a remote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PullOptions {
    /// Remote name; `origin` when absent
    pub remote: Option<String>,
    /// Refspec to pull
    pub refspec: Option<String>,
    /// Rebase instead of merging
    pub rebase: bool,
}

/// Result of a fetch, push, or pull.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    /// Remote the transfer ran against
    pub remote: String,
    /// Tool summary of the transfer
    pub detail: String,
}

// =============================================================================
// Tag
// =============================================================================

/// Tag sub-operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum TagAction {
    /// List tags, optionally filtered by a glob pattern
    List {
        /// Glob pattern filter
        pattern: Option<String>,
    },
    /// Create a tag
    Create {
        /// Tag name
        name: String,
        /// Revision to tag; HEAD when absent
        target: Option<String>,
        /// Annotation message; lightweight tag when absent
        message: Option<String>,
    },
    /// Delete a tag
    Delete {
        /// Tag name
        name: String,
    },
}

/// Options for the tag operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagOptions {
    /// What to do
    pub action: TagAction,
}

/// Tag listing; empty for create/delete invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagResult {
    /// Tag names in output order
    pub tags: Vec<String>,
}

// =============================================================================
// Stash
// =============================================================================

/// Stash sub-operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum StashAction {
    /// Save working-tree changes to a new stash entry
    Push {
        /// Stash message
        message: Option<String>,
        /// Include untracked files
        include_untracked: bool,
    },
    /// Apply and drop the given entry (most recent when absent)
    Pop {
        /// Stash index
        index: Option<usize>,
    },
    /// Apply the given entry without dropping it
    Apply {
        /// Stash index
        index: Option<usize>,
    },
    /// Drop the given entry
    Drop {
        /// Stash index
        index: Option<usize>,
    },
    /// List stash entries
    List,
}

/// Options for the stash operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StashOptions {
    /// What to do
    pub action: StashAction,
}

/// One stash entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashEntry {
    /// Selector, e.g. `stash@{0}`
    pub selector: String,
    /// Commit hash of the stash
    pub hash: String,
    /// Branch the stash was taken on, when recorded in the message
    pub branch: Option<String>,
    /// Stash message
    pub message: String,
}

/// Stash listing; empty for push/pop/apply/drop invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashResult {
    /// Entries, most recent first
    pub entries: Vec<StashEntry>,
}

// =============================================================================
// Worktree
// =============================================================================

/// Worktree sub-operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum WorktreeAction {
    /// Add a linked worktree
    Add {
        /// Directory for the new worktree
        path: String,
        /// Branch to create for it
        branch: Option<String>,
    },
    /// Remove a linked worktree
    Remove {
        /// Directory of the worktree
        path: String,
        /// Remove even with local changes
        force: bool,
    },
    /// List worktrees
    List,
    /// Prune stale worktree records
    Prune,
}

/// Options for the worktree operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorktreeOptions {
    /// What to do
    pub action: WorktreeAction,
}

/// One worktree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeInfo {
    /// Worktree directory
    pub path: String,
    /// Checked-out commit
    pub head: Option<String>,
    /// Checked-out branch; absent when detached or bare
    pub branch: Option<String>,
    /// Whether this is the bare repository entry
    pub bare: bool,
    /// Whether HEAD is detached
    pub detached: bool,
}

/// Worktree listing; empty for add/remove/prune invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeResult {
    /// Worktrees, main worktree first
    pub worktrees: Vec<WorktreeInfo>,
}

// =============================================================================
// Reset / Blame / Reflog / Clean / Init / Clone
// =============================================================================

/// Reset mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetMode {
    /// Move HEAD only
    Soft,
    /// Move HEAD and reset the index
    #[default]
    Mixed,
    /// Move HEAD, reset the index and the working tree
    Hard,
}

/// Options for resetting HEAD.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetOptions {
    /// Revision to reset to; HEAD when absent
    pub target: Option<String>,
    /// Reset mode
    pub mode: ResetMode,
}

/// Result of a reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResult {
    /// Tool summary of the reset
    pub detail: String,
}

/// Options for blaming a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlameOptions {
    /// File to annotate
    pub path: String,
    /// Revision to annotate at; HEAD when absent
    #[serde(default)]
    pub revision: Option<String>,
}

/// One annotated source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlameLine {
    /// Commit that introduced the line
    pub hash: String,
    /// Author of that commit
    pub author: String,
    /// Author timestamp of that commit
    pub timestamp: DateTime<Utc>,
    /// 1-based line number in the annotated file
    pub line_no: usize,
    /// Line content
    pub content: String,
}

/// Blame annotation for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlameResult {
    /// One entry per source line, in file order
    pub lines: Vec<BlameLine>,
}

/// Options for reading the reflog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflogOptions {
    /// Maximum number of entries
    pub max_count: Option<usize>,
}

/// One reflog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflogEntry {
    /// Commit hash
    pub hash: String,
    /// Selector, e.g. `HEAD@{0}`
    pub selector: String,
    /// Reflog message
    pub message: String,
}

/// Reflog listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflogResult {
    /// Entries, most recent first
    pub entries: Vec<ReflogEntry>,
}

/// Options for removing untracked files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    /// Also remove untracked directories
    pub directories: bool,
    /// Report what would be removed without removing it
    pub dry_run: bool,
}

/// Result of a clean.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanResult {
    /// Paths removed (or that would be removed, for a dry run)
    pub removed: Vec<String>,
}

/// Options for initializing a repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InitOptions {
    /// Create a bare repository
    pub bare: bool,
    /// Name of the initial branch
    pub initial_branch: Option<String>,
}

/// Result of an init.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitResult {
    /// Directory the repository was initialized in
    pub workdir: String,
    /// Whether it is bare
    pub bare: bool,
}

/// Options for cloning a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneOptions {
    /// Source URL or path
    pub url: String,
    /// Target directory; derived from the URL when absent
    #[serde(default)]
    pub directory: Option<String>,
    /// Shallow-clone depth
    #[serde(default)]
    pub depth: Option<u32>,
}

/// Result of a clone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneResult {
    /// Directory the clone landed in
    pub directory: String,
}
