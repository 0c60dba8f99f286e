//! cli::parse
//!
//! Pure parsers from git's text output to typed results.
//!
//! # Design
//!
//! Every parser is a pure function with no execution dependency, so each is
//! unit-testable without a repository. Parsers are defensive: empty input
//! produces an empty-but-valid result, unrecognized lines are skipped, and
//! nothing in here panics on malformed text. Invocations are always made
//! with explicit machine-stable output flags (porcelain modes, `%x1f`/`%x1e`
//! field and record separators, epoch-second timestamps) so the layouts
//! parsed here do not move with locale or tool version.

use chrono::{DateTime, Utc};

use crate::types::{
    BlameLine, BranchInfo, DiffStat, FileStat, LogEntry, ReflogEntry, RemoteInfo, StashEntry,
    StatusResult, WorktreeInfo, DETACHED_HEAD,
};

/// Field separator used in custom format strings (`%x1f`).
pub const FIELD_SEP: char = '\u{1f}';

/// Record separator used in custom format strings (`%x1e`).
pub const RECORD_SEP: char = '\u{1e}';

/// Log format producing one [`RECORD_SEP`]-terminated record per commit.
pub const LOG_FORMAT: &str = "%H%x1f%an%x1f%ae%x1f%at%x1f%s%x1f%b%x1e";

/// Reflog format: hash, selector, reflog subject.
pub const REFLOG_FORMAT: &str = "%H%x1f%gd%x1f%gs";

/// Stash list format: selector, hash, stash subject.
pub const STASH_FORMAT: &str = "%gd%x1f%H%x1f%gs";

/// Branch list format for `--format`: short name, target, HEAD marker.
pub const BRANCH_FORMAT: &str = "%(refname:short)%1f%(objectname)%1f%(HEAD)";

// =============================================================================
// Status
// =============================================================================

/// Parse `status --porcelain --branch` output.
///
/// Lines are bucketed by their two-character status code; the branch is
/// read from the `## ` header line, with [`DETACHED_HEAD`] standing in for
/// a detached HEAD.
pub fn parse_status(text: &str) -> StatusResult {
    let mut result = StatusResult {
        branch: DETACHED_HEAD.to_string(),
        ..StatusResult::default()
    };

    for line in text.lines() {
        if let Some(header) = line.strip_prefix("## ") {
            parse_branch_header(header, &mut result);
            continue;
        }
        if line.len() < 4 {
            continue;
        }
        // Status codes are ASCII; skip lines where byte 2 is mid-character.
        if !line.is_char_boundary(2) {
            continue;
        }
        let (code, rest) = line.split_at(2);
        let path = entry_path(rest.get(1..).unwrap_or(""));
        if path.is_empty() {
            continue;
        }

        let mut chars = code.chars();
        let index = chars.next().unwrap_or(' ');
        let worktree = chars.next().unwrap_or(' ');

        match (index, worktree) {
            ('?', '?') => result.untracked.push(path),
            ('!', '!') => {}
            ('D', 'D') | ('A', 'A') | ('U', _) | (_, 'U') => result.conflicted.push(path),
            (x, y) => {
                if matches!(x, 'M' | 'A' | 'D' | 'R' | 'C' | 'T') {
                    result.staged.push(path.clone());
                }
                if matches!(y, 'M' | 'D' | 'T') {
                    result.unstaged.push(path);
                }
            }
        }
    }

    result
}

fn parse_branch_header(header: &str, result: &mut StatusResult) {
    // `HEAD (no branch)` is the detached marker; the sentinel is already set.
    if header.starts_with("HEAD") {
        return;
    }
    if let Some(name) = header.strip_prefix("No commits yet on ") {
        result.branch = name.trim().to_string();
        return;
    }

    let tracking = header.split(" [").next().unwrap_or(header);
    let name = tracking.split("...").next().unwrap_or(tracking);
    if !name.is_empty() {
        result.branch = name.to_string();
    }

    if let Some(bracket) = header.find('[') {
        let end = header
            .rfind(']')
            .filter(|i| *i > bracket)
            .unwrap_or(header.len());
        let counters = &header[bracket + 1..end];
        for part in counters.split(',') {
            let part = part.trim();
            if let Some(n) = part.strip_prefix("ahead ") {
                result.ahead = n.trim().parse().ok();
            } else if let Some(n) = part.strip_prefix("behind ") {
                result.behind = n.trim().parse().ok();
            }
        }
    }
}

/// Extract the effective path of a status entry, taking the rename target
/// and stripping porcelain quoting.
fn entry_path(raw: &str) -> String {
    let raw = match raw.split_once(" -> ") {
        Some((_, target)) => target,
        None => raw,
    };
    let raw = raw.trim();
    raw.strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .unwrap_or(raw)
        .to_string()
}

// =============================================================================
// Diff stat
// =============================================================================

/// Parse a `--stat` summary block.
///
/// Per-file lines look like `path | 12 ++++----`; binary files render as
/// `path | Bin 0 -> 1024 bytes` and contribute 0/0 while still counting
/// toward the file list. The trailing `N files changed, ...` summary line
/// is tolerated and skipped; totals are computed from the per-file entries
/// so they always agree with the list.
pub fn parse_diff_stat(text: &str) -> DiffStat {
    let mut files = Vec::new();

    for line in text.lines() {
        let Some((path_part, stat_part)) = line.rsplit_once(" | ") else {
            // Summary line or unrecognized text.
            continue;
        };
        let path = path_part.trim().to_string();
        if path.is_empty() {
            continue;
        }
        let stat_part = stat_part.trim();

        if stat_part.starts_with("Bin") {
            files.push(FileStat {
                path,
                additions: 0,
                deletions: 0,
                binary: true,
            });
            continue;
        }

        let additions = stat_part.chars().filter(|c| *c == '+').count();
        let deletions = stat_part.chars().filter(|c| *c == '-').count();
        files.push(FileStat {
            path,
            additions,
            deletions,
            binary: false,
        });
    }

    DiffStat::from_files(files)
}

// =============================================================================
// Log / Show
// =============================================================================

/// Parse [`LOG_FORMAT`] output into commit entries.
pub fn parse_log(text: &str) -> Vec<LogEntry> {
    text.split(RECORD_SEP)
        .filter_map(parse_log_record)
        .collect()
}

fn parse_log_record(record: &str) -> Option<LogEntry> {
    let record = record.trim_matches(|c| c == '\n' || c == '\r');
    if record.is_empty() {
        return None;
    }
    let mut fields = record.splitn(6, FIELD_SEP);
    let hash = fields.next()?.trim().to_string();
    if hash.is_empty() {
        return None;
    }
    let author_name = fields.next()?.to_string();
    let author_email = fields.next()?.to_string();
    let timestamp = parse_epoch(fields.next()?)?;
    let subject = fields.next()?.to_string();
    let body = fields.next().unwrap_or("").trim_end().to_string();
    Some(LogEntry {
        hash,
        author_name,
        author_email,
        timestamp,
        subject,
        body,
    })
}

/// Split `show` output into the commit record and the patch that follows
/// the record separator. Returns `None` when the record is unparsable.
pub fn parse_show(text: &str) -> Option<(LogEntry, String)> {
    let (record, patch) = text.split_once(RECORD_SEP)?;
    let entry = parse_log_record(record)?;
    Some((entry, patch.trim_start_matches('\n').to_string()))
}

fn parse_epoch(field: &str) -> Option<DateTime<Utc>> {
    let seconds: i64 = field.trim().parse().ok()?;
    DateTime::from_timestamp(seconds, 0)
}

// =============================================================================
// Blame
// =============================================================================

/// Parse `blame --line-porcelain` output.
///
/// Each source line is preceded by a `<hash> <orig> <final>` header and a
/// block of `key value` metadata; the content line itself starts with a
/// tab. Lines with incomplete metadata are skipped rather than failing the
/// whole annotation.
pub fn parse_blame(text: &str) -> Vec<BlameLine> {
    let mut lines = Vec::new();
    let mut hash: Option<String> = None;
    let mut line_no: usize = 0;
    let mut author = String::new();
    let mut timestamp: Option<DateTime<Utc>> = None;

    for line in text.lines() {
        if let Some(content) = line.strip_prefix('\t') {
            if let (Some(hash), Some(timestamp)) = (hash.take(), timestamp.take()) {
                lines.push(BlameLine {
                    hash,
                    author: std::mem::take(&mut author),
                    timestamp,
                    line_no,
                    content: content.to_string(),
                });
            }
            continue;
        }

        if let Some(value) = line.strip_prefix("author ") {
            author = value.to_string();
            continue;
        }
        if let Some(value) = line.strip_prefix("author-time ") {
            timestamp = parse_epoch(value);
            continue;
        }

        let mut parts = line.split_whitespace();
        if let Some(first) = parts.next() {
            if first.len() == 40 && first.chars().all(|c| c.is_ascii_hexdigit()) {
                hash = Some(first.to_string());
                line_no = parts.nth(1).and_then(|n| n.parse().ok()).unwrap_or(0);
            }
        }
    }

    lines
}

// =============================================================================
// Reflog / Stash
// =============================================================================

/// Parse [`REFLOG_FORMAT`] output.
pub fn parse_reflog(text: &str) -> Vec<ReflogEntry> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.splitn(3, FIELD_SEP);
            let hash = fields.next()?.trim().to_string();
            if hash.is_empty() {
                return None;
            }
            let selector = fields.next()?.to_string();
            let message = fields.next().unwrap_or("").to_string();
            Some(ReflogEntry {
                hash,
                selector,
                message,
            })
        })
        .collect()
}

/// Parse [`STASH_FORMAT`] output.
pub fn parse_stash_list(text: &str) -> Vec<StashEntry> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.splitn(3, FIELD_SEP);
            let selector = fields.next()?.trim().to_string();
            if selector.is_empty() {
                return None;
            }
            let hash = fields.next()?.to_string();
            let message = fields.next().unwrap_or("").to_string();
            let branch = stash_branch(&message);
            Some(StashEntry {
                selector,
                hash,
                branch,
                message,
            })
        })
        .collect()
}

/// Branch recorded in a stash subject (`WIP on main: ...` / `On main: ...`).
fn stash_branch(message: &str) -> Option<String> {
    let rest = message
        .strip_prefix("WIP on ")
        .or_else(|| message.strip_prefix("On "))?;
    let (branch, _) = rest.split_once(':')?;
    if branch.is_empty() {
        return None;
    }
    Some(branch.to_string())
}

// =============================================================================
// Worktree
// =============================================================================

/// Parse `worktree list --porcelain` output.
///
/// Worktrees are blank-line-separated attribute stanzas.
pub fn parse_worktree_list(text: &str) -> Vec<WorktreeInfo> {
    let mut worktrees = Vec::new();
    let mut current: Option<WorktreeInfo> = None;

    for line in text.lines() {
        if line.is_empty() {
            if let Some(info) = current.take() {
                worktrees.push(info);
            }
            continue;
        }

        if let Some(path) = line.strip_prefix("worktree ") {
            if let Some(info) = current.take() {
                worktrees.push(info);
            }
            current = Some(WorktreeInfo {
                path: path.to_string(),
                ..WorktreeInfo::default()
            });
            continue;
        }

        let Some(info) = current.as_mut() else {
            continue;
        };
        if let Some(head) = line.strip_prefix("HEAD ") {
            info.head = Some(head.to_string());
        } else if let Some(branch) = line.strip_prefix("branch ") {
            info.branch = Some(
                branch
                    .strip_prefix("refs/heads/")
                    .unwrap_or(branch)
                    .to_string(),
            );
        } else if line == "bare" {
            info.bare = true;
        } else if line == "detached" {
            info.detached = true;
        }
    }

    if let Some(info) = current.take() {
        worktrees.push(info);
    }
    worktrees
}

// =============================================================================
// Branch / Remote / plain listings
// =============================================================================

/// Parse [`BRANCH_FORMAT`] output.
pub fn parse_branch_list(text: &str) -> Vec<BranchInfo> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.splitn(3, FIELD_SEP);
            let name = fields.next()?.trim().to_string();
            if name.is_empty() {
                return None;
            }
            let hash = fields.next()?.to_string();
            let head_marker = fields.next().unwrap_or("");
            Some(BranchInfo {
                name,
                hash,
                is_current: head_marker.trim() == "*",
            })
        })
        .collect()
}

/// Parse `remote -v` output into one entry per remote, merging the fetch
/// and push lines.
pub fn parse_remote_list(text: &str) -> Vec<RemoteInfo> {
    let mut remotes: Vec<RemoteInfo> = Vec::new();

    for line in text.lines() {
        let mut parts = line.split_whitespace();
        let (Some(name), Some(url)) = (parts.next(), parts.next()) else {
            continue;
        };
        let kind = parts.next().unwrap_or("");

        let index = match remotes.iter().position(|r| r.name == name) {
            Some(index) => index,
            None => {
                remotes.push(RemoteInfo {
                    name: name.to_string(),
                    fetch_url: String::new(),
                    push_url: String::new(),
                });
                remotes.len() - 1
            }
        };
        let entry = &mut remotes[index];
        match kind {
            "(push)" => entry.push_url = url.to_string(),
            _ => {
                entry.fetch_url = url.to_string();
                if entry.push_url.is_empty() {
                    entry.push_url = url.to_string();
                }
            }
        }
    }

    remotes
}

/// Parse newline-separated listings (tags, `ls-files`, `--name-only`).
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `add --verbose` output (`add 'path'` per staged file).
pub fn parse_added_paths(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let rest = line.strip_prefix("add '")?;
            let path = rest.strip_suffix('\'')?;
            Some(path.to_string())
        })
        .collect()
}

/// Parse the `[branch hash] subject` summary line of `commit` output.
///
/// Returns `(branch, short_hash, subject)`.
pub fn parse_commit_summary(text: &str) -> Option<(String, String, String)> {
    let line = text.lines().find(|l| l.starts_with('['))?;
    let close = line.find(']')?;
    let inner = &line[1..close];
    let subject = line[close + 1..].trim().to_string();

    let tokens: Vec<&str> = inner
        .split_whitespace()
        .filter(|t| *t != "(root-commit)")
        .collect();
    let (&hash, branch_tokens) = tokens.split_last()?;
    if branch_tokens.is_empty() {
        return None;
    }
    Some((branch_tokens.join(" "), hash.to_string(), subject))
}

/// Parse `clean` output (`Removing path` / dry-run `Would remove path`).
pub fn parse_clean(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            line.strip_prefix("Removing ")
                .or_else(|| line.strip_prefix("Would remove "))
                .map(str::to_string)
        })
        .collect()
}
