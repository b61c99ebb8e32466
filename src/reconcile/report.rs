// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Reconciliation outcome reporting.
//!
//! Every item processed during reconciliation produces exactly one
//! [`Outcome`]. How outcomes get presented is up to the [`Report`]
//! implementation handed to the reconciler.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Per-item result of reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Symlink was created.
    Created { target: PathBuf, source: PathBuf },

    /// Symlink already existed and pointed to the intended source.
    AlreadySatisfied { target: PathBuf },

    /// Target is occupied by something other than the intended symlink.
    Conflict {
        target: PathBuf,
        reason: ConflictReason,
    },

    /// Target was left alone during removal.
    Skipped {
        target: PathBuf,
        reason: SkipReason,
    },

    /// Symlink was removed.
    Removed { target: PathBuf },

    /// User answered no to a confirmation prompt.
    Declined { target: PathBuf },
}

impl Outcome {
    /// Path of the item the outcome belongs to.
    pub fn target(&self) -> &Path {
        match self {
            Self::Created { target, .. }
            | Self::AlreadySatisfied { target }
            | Self::Conflict { target, .. }
            | Self::Skipped { target, .. }
            | Self::Removed { target }
            | Self::Declined { target } => target.as_path(),
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Created { target, source } => write!(
                fmt,
                "created symlink {} --> {}",
                target.display(),
                source.display()
            ),
            Self::AlreadySatisfied { target } => write!(
                fmt,
                "skip {}, symlink exists and points to matching source",
                target.display()
            ),
            Self::Conflict { target, reason } => {
                write!(fmt, "conflict at {}: {reason}", target.display())
            }
            Self::Skipped { target, reason } => {
                write!(fmt, "skip {}: {reason}", target.display())
            }
            Self::Removed { target } => write!(fmt, "removed symlink {}", target.display()),
            Self::Declined { target } => write!(fmt, "declined {}", target.display()),
        }
    }
}

/// Why a symlink could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    /// Target is a regular file, directory, or mount point.
    NotASymlink,

    /// Target is a symlink to some other place.
    PointsElsewhere { current: PathBuf },
}

impl Display for ConflictReason {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NotASymlink => fmt.write_str("not a symlink"),
            Self::PointsElsewhere { current } => {
                write!(fmt, "points elsewhere ({})", current.display())
            }
        }
    }
}

/// Why a target was not removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Target is not a symlink.
    NotASymlink,
}

impl Display for SkipReason {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NotASymlink => fmt.write_str("not a symlink"),
        }
    }
}

/// Receive reconciliation outcomes.
pub trait Report {
    /// Handle outcome of one processed item.
    fn report(&mut self, outcome: &Outcome);
}

/// Collect outcomes in processing order.
impl Report for Vec<Outcome> {
    fn report(&mut self, outcome: &Outcome) {
        self.push(outcome.clone());
    }
}

/// Report outcomes through [`tracing`].
///
/// Conflicts and skips are warnings. No-op outcomes only show up at info
/// level when verbose.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter {
    verbose: bool,
}

impl TracingReporter {
    /// Construct new tracing reporter.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Report for TracingReporter {
    fn report(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Created { .. } | Outcome::Removed { .. } => info!("{outcome}"),
            Outcome::Conflict { .. } | Outcome::Skipped { .. } => warn!("{outcome}"),
            Outcome::AlreadySatisfied { .. } | Outcome::Declined { .. } if self.verbose => {
                info!("{outcome}")
            }
            Outcome::AlreadySatisfied { .. } | Outcome::Declined { .. } => debug!("{outcome}"),
        }
    }
}
