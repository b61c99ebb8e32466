// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Turn the raw path strings found in link declarations into concrete
//! absolute paths. Every path goes through the same pipeline: environment
//! variable expansion, leading tilde expansion, and then one of two resolution
//! modes.
//!
//! # Resolution Modes
//!
//! Sources are always addressed through their _real_ path, i.e., every
//! symlink along the way is followed. Targets on the other hand must be
//! addressed _literally_, because the thing we want to inspect or replace is
//! the symlink itself and not whatever it currently points to. See
//! [`Resolve`] for both modes.
//!
//! Neither mode fails because a path does not exist. Existence is a question
//! for the caller to answer.

use glob::MatchOptions;
use std::{
    env::VarError,
    path::{Component, Path, PathBuf},
};
use tracing::debug;

/// How far a path should be resolved after shell expansion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Resolve {
    /// Follow all symlinks to obtain the canonical path.
    ///
    /// Any trailing portion of the path that does not exist yet is appended
    /// as-is to the canonical form of the portion that does.
    #[default]
    Real,

    /// Make the path absolute and collapse `.` and `..` lexically without
    /// touching the file system.
    Absolute,
}

/// Normalize path string into an absolute path.
///
/// Performs environment variable and tilde expansion before resolving the
/// result according to `mode`.
///
/// # Errors
///
/// - Return [`PathError::ShellExpansion`] if an unset variable is referenced.
/// - Return [`PathError::Empty`] if expansion produces an empty string.
/// - Return [`PathError::CurrentDir`] if a relative path cannot be made
///   absolute.
pub fn normalize(path: impl AsRef<str>, mode: Resolve) -> Result<PathBuf> {
    let expanded = expand(path.as_ref())?;
    let absolute = absolute(&expanded)?;

    Ok(match mode {
        Resolve::Real => real_path(&absolute),
        Resolve::Absolute => absolute,
    })
}

/// Expand path string into every existing path it matches.
///
/// The path is fully normalized with [`Resolve::Real`] first, then treated as
/// a shell-style glob pattern. File names starting with a dot must be matched
/// literally, so `dir/*` never picks up hidden files. Matches come back sorted
/// so callers can rely on a stable placement order. A plain path without any
/// glob metacharacters yields itself when it exists.
///
/// # Errors
///
/// - Return [`PathError::Pattern`] if the expanded path is not a valid glob
///   pattern.
/// - Any error of [`normalize`].
pub fn expand_glob(path: impl AsRef<str>) -> Result<Vec<PathBuf>> {
    let pattern = normalize(path.as_ref(), Resolve::Real)?;
    let pattern = pattern.to_string_lossy().into_owned();
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let mut matches = Vec::new();
    let paths = glob::glob_with(&pattern, options).map_err(|err| PathError::Pattern {
        source: err,
        pattern: pattern.clone(),
    })?;
    for entry in paths {
        match entry {
            Ok(path) => matches.push(path),
            Err(err) => debug!("skip unreadable glob entry: {err}"),
        }
    }
    matches.sort();

    Ok(matches)
}

/// Create directory along with any missing parents.
///
/// Succeeds silently if the directory already exists.
///
/// # Errors
///
/// - Return [`PathError::CreateDir`] if some component of `path` exists but
///   is not a directory, or the directory cannot be created at all.
pub fn mkdir_p(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(());
    }

    mkdirp::mkdirp(path)
        .map(|_| ())
        .map_err(|err| PathError::CreateDir {
            source: err,
            path: path.to_path_buf(),
        })
}

fn expand(path: &str) -> Result<String> {
    let expanded = shellexpand::full(path)
        .map_err(|err| PathError::ShellExpansion {
            source: err,
            path: path.to_string(),
        })?
        .into_owned();

    if expanded.is_empty() {
        return Err(PathError::Empty {
            path: path.to_string(),
        });
    }

    Ok(expanded)
}

fn absolute(path: &str) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|err| PathError::CurrentDir {
        source: err,
        path: path.to_string(),
    })?;

    Ok(collapse(&absolute))
}

/// Resolve absolute path to its real path.
///
/// Follows every symlink of the portion of `path` that exists, and appends
/// the rest unchanged. Expects `path` to be absolute and free of `..`
/// components, as produced by [`normalize`].
pub fn real_path(path: &Path) -> PathBuf {
    if let Ok(real) = path.canonicalize() {
        return real;
    }

    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => real_path(parent).join(name),
        _ => path.to_path_buf(),
    }
}

fn collapse(path: &Path) -> PathBuf {
    let mut collapsed = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                collapsed.pop();
            }
            other => collapsed.push(other.as_os_str()),
        }
    }

    collapsed
}

/// Path normalization error types.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Shell expansion referenced a variable that is not set.
    #[error("failed to expand {path:?}")]
    ShellExpansion {
        #[source]
        source: shellexpand::LookupError<VarError>,
        path: String,
    },

    /// Shell expansion left nothing behind.
    #[error("path {path:?} expands to an empty string")]
    Empty { path: String },

    /// Relative path could not be anchored to the current directory.
    #[error("failed to make {path:?} absolute")]
    CurrentDir {
        #[source]
        source: std::io::Error,
        path: String,
    },

    /// Expanded path is not a valid glob pattern.
    #[error("invalid glob pattern {pattern:?}")]
    Pattern {
        #[source]
        source: glob::PatternError,
        pattern: String,
    },

    /// Directory could not be created.
    #[error("failed to create directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::{env, fs};

    #[sealed_test(env = [("HOME", "/home/blah")])]
    fn normalize_expands_tilde() -> anyhow::Result<()> {
        let result = normalize("~/.vimrc", Resolve::Absolute)?;
        assert_eq!(result, PathBuf::from("/home/blah/.vimrc"));

        Ok(())
    }

    #[sealed_test(env = [("DOTFILES", "/srv/dotfiles")])]
    fn normalize_expands_variables() -> anyhow::Result<()> {
        let result = normalize("$DOTFILES/shell/../vim/vimrc", Resolve::Absolute)?;
        assert_eq!(result, PathBuf::from("/srv/dotfiles/vim/vimrc"));

        Ok(())
    }

    #[sealed_test]
    fn normalize_rejects_unset_variable() {
        env::remove_var("DOTLINK_SURELY_UNSET");
        let result = normalize("$DOTLINK_SURELY_UNSET/file", Resolve::Absolute);
        assert!(matches!(result, Err(PathError::ShellExpansion { .. })));
    }

    #[test]
    fn normalize_rejects_empty_path() {
        let result = normalize("", Resolve::Real);
        assert!(matches!(result, Err(PathError::Empty { .. })));
    }

    #[sealed_test]
    fn normalize_makes_relative_path_absolute() -> anyhow::Result<()> {
        let cwd = env::current_dir()?;
        let result = normalize("./a/b/../c/", Resolve::Absolute)?;
        assert_eq!(result, cwd.join("a/c"));

        Ok(())
    }

    #[cfg(unix)]
    #[sealed_test]
    fn normalize_real_follows_symlinks_absolute_does_not() -> anyhow::Result<()> {
        let root = env::current_dir()?.canonicalize()?;
        fs::create_dir(root.join("real"))?;
        std::os::unix::fs::symlink(root.join("real"), root.join("alias"))?;

        let real = normalize("alias/missing", Resolve::Real)?;
        assert_eq!(real, root.join("real/missing"));

        let literal = normalize(root.join("alias").to_string_lossy(), Resolve::Absolute)?;
        assert_eq!(literal, root.join("alias"));

        Ok(())
    }

    #[sealed_test]
    fn expand_glob_sorts_and_skips_hidden_files() -> anyhow::Result<()> {
        let root = env::current_dir()?.canonicalize()?;
        fs::create_dir(root.join("vim"))?;
        fs::write(root.join("vim/vimrc"), "set nocompatible\n")?;
        fs::write(root.join("vim/plugin.vim"), "\" plugin\n")?;
        fs::write(root.join("vim/.netrwhist"), "")?;

        let result = expand_glob("vim/*")?;
        let expect = vec![root.join("vim/plugin.vim"), root.join("vim/vimrc")];
        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test]
    fn expand_glob_without_matches_is_empty() -> anyhow::Result<()> {
        assert_eq!(expand_glob("nothing/here/*")?, Vec::<PathBuf>::new());
        assert_eq!(expand_glob("nothing_here")?, Vec::<PathBuf>::new());

        Ok(())
    }

    #[sealed_test]
    fn mkdir_p_is_idempotent() -> anyhow::Result<()> {
        let root = env::current_dir()?;
        let nested = root.join("a/b/c");

        mkdir_p(&nested)?;
        assert!(nested.is_dir());
        mkdir_p(&nested)?;
        assert!(nested.is_dir());

        Ok(())
    }

    #[sealed_test]
    fn mkdir_p_fails_on_file_in_the_way() -> anyhow::Result<()> {
        let root = env::current_dir()?;
        fs::write(root.join("occupied"), "not a directory\n")?;

        let result = mkdir_p(root.join("occupied/sub"));
        assert!(matches!(result, Err(PathError::CreateDir { .. })));

        Ok(())
    }
}
