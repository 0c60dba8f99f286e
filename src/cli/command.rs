//! cli::command
//!
//! Argument-vector construction for git invocations.
//!
//! # Grammar
//!
//! Every invocation follows one fixed shape:
//!
//! ```text
//! [global flags] <subcommand> [flags] [refs] -- [pathspecs]
//! ```
//!
//! The ordering is load-bearing: a path filter placed before the `--`
//! separator is ambiguous with a ref and must never be emitted. The
//! separator appears exactly once when pathspecs are present and not at all
//! otherwise.
//!
//! Arguments are always independent vector elements handed to a non-shell
//! process invocation; nothing here concatenates caller input into a
//! shell-interpreted string, so shell metacharacters have no effect.
//! Positional refs are additionally rejected when they could be mistaken
//! for options.

use crate::error::VcsError;

/// Builder for one git argument vector.
///
/// # Example
///
/// ```
/// use gitbridge::cli::command::GitCommand;
///
/// let argv = GitCommand::new("diff")
///     .flag("--stat")
///     .arg("main")
///     .arg("feature")
///     .pathspec("src/")
///     .render()
///     .unwrap();
/// assert_eq!(argv, vec!["diff", "--stat", "main", "feature", "--", "src/"]);
/// ```
#[derive(Debug, Clone)]
pub struct GitCommand {
    subcommand: String,
    action: Option<String>,
    globals: Vec<String>,
    flags: Vec<String>,
    positionals: Vec<String>,
    pathspecs: Vec<String>,
}

impl GitCommand {
    /// Start a command for the given subcommand.
    pub fn new(subcommand: &str) -> Self {
        Self {
            subcommand: subcommand.to_string(),
            action: None,
            globals: Vec::new(),
            flags: Vec::new(),
            positionals: Vec::new(),
            pathspecs: Vec::new(),
        }
    }

    /// Set the sub-action of a compound subcommand (`stash push`,
    /// `worktree add`, `remote remove`), placed directly after the
    /// subcommand and before any flags.
    pub fn action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    /// Add a global flag, placed before the subcommand.
    pub fn global(mut self, flag: &str) -> Self {
        self.globals.push(flag.to_string());
        self
    }

    /// Add a subcommand flag verbatim, e.g. `--stat`.
    pub fn flag(mut self, flag: &str) -> Self {
        self.flags.push(flag.to_string());
        self
    }

    /// Add a subcommand flag when `condition` holds.
    pub fn flag_if(self, condition: bool, flag: &str) -> Self {
        if condition {
            self.flag(flag)
        } else {
            self
        }
    }

    /// Add a valued flag rendered as a single `--flag=value` element.
    ///
    /// Rendering as one element keeps the value attached to its flag no
    /// matter what it contains; a value starting with `-` cannot be
    /// reinterpreted as a separate option.
    pub fn flag_value(mut self, flag: &str, value: impl std::fmt::Display) -> Self {
        self.flags.push(format!("{flag}={value}"));
        self
    }

    /// Add a short flag whose value must be a separate element (`-b name`).
    pub fn flag_arg(mut self, flag: &str, value: impl Into<String>) -> Self {
        self.flags.push(flag.to_string());
        self.flags.push(value.into());
        self
    }

    /// Add a positional ref argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.positionals.push(value.into());
        self
    }

    /// Add a positional ref argument when present.
    pub fn arg_opt(self, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.arg(v),
            None => self,
        }
    }

    /// Add a pathspec, always emitted after the `--` separator.
    pub fn pathspec(mut self, value: impl Into<String>) -> Self {
        self.pathspecs.push(value.into());
        self
    }

    /// Add several pathspecs.
    pub fn pathspecs<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pathspecs.extend(values.into_iter().map(Into::into));
        self
    }

    /// Produce the final argument vector.
    ///
    /// # Errors
    ///
    /// `Validation` when a positional ref is empty, could be mistaken for
    /// an option, or any argument embeds a NUL byte.
    pub fn render(&self) -> Result<Vec<String>, VcsError> {
        for positional in &self.positionals {
            validate_ref(positional)?;
        }
        for pathspec in &self.pathspecs {
            if pathspec.contains('\0') {
                return Err(VcsError::Validation {
                    detail: "pathspec must not contain NUL".to_string(),
                });
            }
        }

        let mut argv = Vec::with_capacity(
            self.globals.len()
                + 1
                + self.flags.len()
                + self.positionals.len()
                + if self.pathspecs.is_empty() {
                    0
                } else {
                    1 + self.pathspecs.len()
                },
        );
        argv.extend(self.globals.iter().cloned());
        argv.push(self.subcommand.clone());
        if let Some(action) = &self.action {
            argv.push(action.clone());
        }
        argv.extend(self.flags.iter().cloned());
        argv.extend(self.positionals.iter().cloned());
        if !self.pathspecs.is_empty() {
            argv.push("--".to_string());
            argv.extend(self.pathspecs.iter().cloned());
        }
        Ok(argv)
    }
}

/// Validate a positional ref argument.
///
/// Refs are caller-controlled; one shaped like an option would change the
/// meaning of the invocation, so anything starting with `-` is rejected
/// here rather than passed through.
pub fn validate_ref(value: &str) -> Result<(), VcsError> {
    if value.is_empty() {
        return Err(VcsError::Validation {
            detail: "ref must not be empty".to_string(),
        });
    }
    if value.starts_with('-') {
        return Err(VcsError::Validation {
            detail: format!("ref must not begin with '-': {value}"),
        });
    }
    if value.contains('\0') {
        return Err(VcsError::Validation {
            detail: "ref must not contain NUL".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_command_is_just_the_subcommand() {
        let argv = GitCommand::new("status").render().unwrap();
        assert_eq!(argv, vec!["status"]);
    }

    #[test]
    fn ordering_follows_the_grammar() {
        let argv = GitCommand::new("log")
            .global("--no-pager")
            .flag("--max-count=3")
            .arg("main")
            .pathspec("src/lib.rs")
            .render()
            .unwrap();
        assert_eq!(
            argv,
            vec!["--no-pager", "log", "--max-count=3", "main", "--", "src/lib.rs"]
        );
    }

    #[test]
    fn separator_is_absent_without_pathspecs() {
        let argv = GitCommand::new("diff").arg("main").render().unwrap();
        assert!(!argv.contains(&"--".to_string()));
    }

    #[test]
    fn separator_appears_exactly_once_with_pathspecs() {
        let argv = GitCommand::new("diff")
            .pathspecs(["a.txt", "b.txt"])
            .render()
            .unwrap();
        let separators = argv.iter().filter(|a| *a == "--").count();
        assert_eq!(separators, 1);
        let sep_index = argv.iter().position(|a| a == "--").unwrap();
        assert_eq!(&argv[sep_index + 1..], ["a.txt", "b.txt"]);
    }

    #[test]
    fn flag_value_is_one_element() {
        let argv = GitCommand::new("diff")
            .flag_value("--unified", 5)
            .render()
            .unwrap();
        assert_eq!(argv, vec!["diff", "--unified=5"]);
    }

    #[test]
    fn compound_subcommand_places_the_action_before_flags() {
        let argv = GitCommand::new("stash")
            .action("push")
            .flag("--include-untracked")
            .flag_value("--message", "wip")
            .render()
            .unwrap();
        assert_eq!(
            argv,
            vec!["stash", "push", "--include-untracked", "--message=wip"]
        );
    }

    #[test]
    fn flag_arg_emits_two_elements() {
        let argv = GitCommand::new("worktree")
            .action("add")
            .flag_arg("-b", "feature")
            .arg("/tmp/wt")
            .render()
            .unwrap();
        assert_eq!(argv, vec!["worktree", "add", "-b", "feature", "/tmp/wt"]);
    }

    #[test]
    fn option_shaped_ref_is_rejected() {
        let err = GitCommand::new("checkout")
            .arg("--force")
            .render()
            .unwrap_err();
        assert!(matches!(err, VcsError::Validation { .. }));
    }

    #[test]
    fn empty_ref_is_rejected() {
        let err = GitCommand::new("checkout").arg("").render().unwrap_err();
        assert!(matches!(err, VcsError::Validation { .. }));
    }

    #[test]
    fn nul_in_pathspec_is_rejected() {
        let err = GitCommand::new("add")
            .pathspec("evil\0path")
            .render()
            .unwrap_err();
        assert!(matches!(err, VcsError::Validation { .. }));
    }

    #[test]
    fn option_shaped_pathspec_is_allowed_after_separator() {
        // After `--` git reads it as a path, so it is safe to pass through.
        let argv = GitCommand::new("add").pathspec("-weird-name").render().unwrap();
        assert_eq!(argv, vec!["add", "--", "-weird-name"]);
    }

    #[test]
    fn metacharacters_stay_inside_one_element() {
        let argv = GitCommand::new("commit")
            .flag_value("--message", "a; rm -rf $(HOME) `x`")
            .render()
            .unwrap();
        assert_eq!(argv.len(), 2);
        assert!(argv[1].contains("rm -rf"));
    }
}
