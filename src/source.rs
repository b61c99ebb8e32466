// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Link source resolution.
//!
//! A link source is declared as a path string that may or may not use glob
//! syntax. How the source was written decides how its target is treated:
//!
//! - A concrete path names exactly one file or directory. The target is taken
//!   verbatim, so `~/.vimrc = "vim/vimrc"` links `~/.vimrc` itself.
//! - A pattern that had to be expanded names a _set_ of paths, even if the set
//!   happens to hold a single entry. The target then becomes a directory that
//!   receives one link per matched path under that path's own file name.
//!
//! The distinction is carried by [`ResolvedSource`].

use crate::path::{expand_glob, normalize, PathError, Resolve};

use std::path::PathBuf;
use tracing::debug;

/// Result of resolving one link source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSource {
    /// Explicit one-to-one mapping onto the declared target.
    Single(PathBuf),

    /// Set of paths to place inside the declared target directory.
    Many(Vec<PathBuf>),
}

impl ResolvedSource {
    /// Coerce into directory-merge form.
    ///
    /// A [`ResolvedSource::Single`] becomes a one element
    /// [`ResolvedSource::Many`].
    pub fn into_many(self) -> Vec<PathBuf> {
        match self {
            Self::Single(path) => vec![path],
            Self::Many(paths) => paths,
        }
    }
}

/// Resolve source specifier into concrete paths.
///
/// # Errors
///
/// - Return [`SourceError::NoMatch`] if nothing on disk matches `spec`.
/// - Return [`SourceError::Path`] if `spec` cannot be normalized.
pub fn resolve_source(spec: impl AsRef<str>) -> Result<ResolvedSource> {
    let spec = spec.as_ref();
    let mut matches = expand_glob(spec)?;
    debug!("source {spec:?} matched {} path(s)", matches.len());

    if matches.is_empty() {
        return Err(SourceError::NoMatch {
            spec: spec.to_string(),
        });
    }

    // INVARIANT: A lone match only counts as explicit when no expansion
    // took place, i.e., the spec already named that exact path.
    if matches.len() == 1 && matches[0] == normalize(spec, Resolve::Real)? {
        return Ok(ResolvedSource::Single(matches.remove(0)));
    }

    Ok(ResolvedSource::Many(matches))
}

/// Source resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Source specifier matched nothing.
    #[error("bad symlink source {spec:?}: nothing matched")]
    NoMatch { spec: String },

    /// Source specifier could not be normalized.
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Friendly result alias :3
pub type Result<T, E = SourceError> = std::result::Result<T, E>;
