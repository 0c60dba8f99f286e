//! Property-based tests for the command grammar and the output parsers.
//!
//! These tests use proptest to verify invariants hold across randomly
//! generated inputs: the argument-vector grammar keeps pathspecs behind
//! the separator for every combination of flags, refs, and paths, and the
//! parsers stay total on arbitrary text.

use proptest::prelude::*;

use gitbridge::cli::command::GitCommand;
use gitbridge::cli::parse;

/// Strategy for ref-shaped positional arguments (never option-shaped).
fn ref_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9/_.]{0,19}"
}

/// Strategy for pathspec arguments. Anything goes after the separator,
/// except the separator token itself and blanks.
fn pathspec() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_. /-]{1,20}".prop_filter("separator token and blank are excluded", |p| {
        p != "--" && !p.trim().is_empty()
    })
}

/// Strategy for a subset of plausible diff flags.
fn flags() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(
        prop::sample::select(vec!["--stat", "--cached", "--name-only", "--numstat"]),
        0..3,
    )
}

proptest! {
    /// The grammar invariant: at most one separator; every pathspec after
    /// it; every flag and ref before it.
    #[test]
    fn pathspecs_always_follow_the_separator(
        flags in flags(),
        refs in prop::collection::vec(ref_name(), 0..3),
        paths in prop::collection::vec(pathspec(), 0..4),
    ) {
        let mut command = GitCommand::new("diff");
        for flag in &flags {
            command = command.flag(flag);
        }
        for reference in &refs {
            command = command.arg(reference.clone());
        }
        command = command.pathspecs(paths.clone());

        let argv = command.render().unwrap();

        let separators = argv.iter().filter(|a| *a == "--").count();
        prop_assert!(separators <= 1);

        if paths.is_empty() {
            prop_assert_eq!(separators, 0);
        } else {
            let sep = argv.iter().position(|a| a == "--").unwrap();
            for path in &paths {
                let position = argv.iter().rposition(|a| a == path).unwrap();
                prop_assert!(position > sep, "pathspec {:?} before separator in {:?}", path, argv);
            }
            for reference in &refs {
                let position = argv.iter().position(|a| a == reference).unwrap();
                prop_assert!(position < sep, "ref {:?} after separator in {:?}", reference, argv);
            }
            for flag in &flags {
                let position = argv.iter().position(|a| a == flag).unwrap();
                prop_assert!(position < sep);
            }
        }
    }

    /// Option-shaped refs never survive to an argument vector.
    #[test]
    fn option_shaped_refs_are_rejected(suffix in "[a-z]{1,10}", dashes in 1..3usize) {
        let reference = format!("{}{}", "-".repeat(dashes), suffix);
        let rendered = GitCommand::new("diff").arg(reference).render();
        prop_assert!(rendered.is_err());
    }

    /// Rendering is deterministic: the same builder always yields the
    /// same vector.
    #[test]
    fn rendering_is_deterministic(
        refs in prop::collection::vec(ref_name(), 0..3),
        paths in prop::collection::vec(pathspec(), 0..3),
    ) {
        let command = GitCommand::new("log")
            .flag("--oneline")
            .pathspecs(paths);
        let command = refs.iter().fold(command, |c, r| c.arg(r.clone()));
        prop_assert_eq!(command.render().unwrap(), command.render().unwrap());
    }
}

// =============================================================================
// Diff-stat parsing
// =============================================================================

/// A generated per-file stat entry.
#[derive(Debug, Clone)]
struct StatEntry {
    name: String,
    additions: usize,
    deletions: usize,
    binary: bool,
}

fn stat_entry() -> impl Strategy<Value = StatEntry> {
    (
        "[a-z]{1,8}\\.(rs|txt|png)",
        0..200usize,
        0..200usize,
        any::<bool>(),
    )
        .prop_map(|(name, additions, deletions, binary)| StatEntry {
            name,
            additions,
            deletions,
            binary,
        })
}

/// Render entries the way `git diff --stat` does, with a trailing summary
/// line.
fn render_stat_block(entries: &[StatEntry]) -> String {
    let mut block = String::new();
    for entry in entries {
        if entry.binary {
            block.push_str(&format!(" {} | Bin 0 -> 1024 bytes\n", entry.name));
        } else {
            block.push_str(&format!(
                " {} | {} {}{}\n",
                entry.name,
                entry.additions + entry.deletions,
                "+".repeat(entry.additions),
                "-".repeat(entry.deletions),
            ));
        }
    }
    let text_changes: usize = entries
        .iter()
        .filter(|e| !e.binary)
        .map(|e| e.additions + e.deletions)
        .sum();
    block.push_str(&format!(
        " {} files changed, {} insertions(+), {} deletions(-)\n",
        entries.len(),
        text_changes,
        text_changes,
    ));
    block
}

proptest! {
    /// Totals always equal the sum of per-file counts over non-binary
    /// files; binary files contribute 0/0 and still count in `files`.
    #[test]
    fn diff_stat_totals_are_consistent(entries in prop::collection::vec(stat_entry(), 0..12)) {
        let stat = parse::parse_diff_stat(&render_stat_block(&entries));

        prop_assert_eq!(stat.files.len(), entries.len());

        let additions: usize = stat
            .files
            .iter()
            .filter(|f| !f.binary)
            .map(|f| f.additions)
            .sum();
        let deletions: usize = stat
            .files
            .iter()
            .filter(|f| !f.binary)
            .map(|f| f.deletions)
            .sum();
        prop_assert_eq!(stat.total_additions, additions);
        prop_assert_eq!(stat.total_deletions, deletions);
        prop_assert!(stat
            .files
            .iter()
            .filter(|f| f.binary)
            .all(|f| f.additions == 0 && f.deletions == 0));
    }

    /// Parsing the same block twice yields the same result.
    #[test]
    fn diff_stat_parsing_is_idempotent(entries in prop::collection::vec(stat_entry(), 0..8)) {
        let block = render_stat_block(&entries);
        prop_assert_eq!(parse::parse_diff_stat(&block), parse::parse_diff_stat(&block));
    }

    /// Parsers are total: arbitrary text, including multibyte and control
    /// characters, never panics them.
    #[test]
    fn parsers_tolerate_arbitrary_text(chars in prop::collection::vec(any::<char>(), 0..200)) {
        let text: String = chars.into_iter().collect();

        let _ = parse::parse_status(&text);
        let _ = parse::parse_diff_stat(&text);
        let _ = parse::parse_log(&text);
        let _ = parse::parse_show(&text);
        let _ = parse::parse_blame(&text);
        let _ = parse::parse_reflog(&text);
        let _ = parse::parse_stash_list(&text);
        let _ = parse::parse_worktree_list(&text);
        let _ = parse::parse_branch_list(&text);
        let _ = parse::parse_remote_list(&text);
        let _ = parse::parse_lines(&text);
        let _ = parse::parse_added_paths(&text);
        let _ = parse::parse_commit_summary(&text);
        let _ = parse::parse_clean(&text);
    }

    /// Status porcelain built from generated bucket contents parses back
    /// into the same buckets.
    #[test]
    fn status_buckets_round_trip(
        branch in "[a-z][a-z0-9-]{0,12}",
        staged in prop::collection::vec("[a-z]{1,8}\\.rs", 0..4),
        untracked in prop::collection::vec("[a-z]{1,8}\\.txt", 0..4),
    ) {
        let mut text = format!("## {branch}\n");
        for path in &staged {
            text.push_str(&format!("A  {path}\n"));
        }
        for path in &untracked {
            text.push_str(&format!("?? {path}\n"));
        }

        let result = parse::parse_status(&text);
        prop_assert_eq!(result.branch, branch);
        prop_assert_eq!(result.staged, staged);
        prop_assert_eq!(result.untracked, untracked);
        prop_assert!(result.unstaged.is_empty());
    }
}
