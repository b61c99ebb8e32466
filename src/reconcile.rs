// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Link reconciliation.
//!
//! Apply a [`LinkPlan`] to the file system, or take it back off again. Each
//! link in the plan is an independent file system operation. Nothing is
//! rolled back when a later operation fails, and nothing needs to be: running
//! reconciliation again converges on the same state.
//!
//! # Conflicts
//!
//! Reconciliation never overwrites or deletes anything that is not the exact
//! symlink it manages. When a target is occupied by a regular file,
//! directory, or a symlink pointing somewhere else, the occupant is left
//! untouched and a conflict gets reported instead. Conflicts do not stop the
//! remaining links from being processed.
//!
//! # Asymmetry
//!
//! Linking creates missing parent directories of a target. Unlinking only
//! ever removes the symlinks themselves, so those parent directories stay
//! behind.
//!
//! # See Also
//!
//! 1. [`Outcome`]
//! 2. [`Confirm`]

pub mod prompt;
pub mod report;

pub use prompt::{Confirm, FixedAnswer, InquirePrompter};
pub use report::{ConflictReason, Outcome, Report, SkipReason, TracingReporter};

use crate::{
    path::{mkdir_p, real_path, PathError},
    plan::{LinkPlan, ResolvedLink},
};

use inquire::InquireError;
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Knobs for reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Ask before creating directories, creating links, or removing links.
    pub confirm: bool,

    /// Answer yes to every question without asking.
    pub assume_yes: bool,

    /// Show the full plan and no-op outcomes.
    pub verbose: bool,
}

impl ReconcileOptions {
    /// Options that never prompt.
    pub fn unattended() -> Self {
        Self {
            confirm: false,
            ..Self::default()
        }
    }

    fn prompts(&self) -> bool {
        self.confirm && !self.assume_yes
    }
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            confirm: true,
            assume_yes: false,
            verbose: false,
        }
    }
}

/// Apply link plans to the file system.
#[derive(Debug)]
pub struct Reconciler<P = InquirePrompter, R = TracingReporter>
where
    P: Confirm,
    R: Report,
{
    options: ReconcileOptions,
    prompter: P,
    reporter: R,
}

impl Reconciler {
    /// Construct new reconciler that prompts on the terminal and reports
    /// through [`tracing`].
    pub fn interactive(options: ReconcileOptions) -> Self {
        Self::new(
            options,
            InquirePrompter::new(),
            TracingReporter::new(options.verbose),
        )
    }
}

impl<P, R> Reconciler<P, R>
where
    P: Confirm,
    R: Report,
{
    /// Construct new reconciler.
    pub fn new(options: ReconcileOptions, prompter: P, reporter: R) -> Self {
        Self {
            options,
            prompter,
            reporter,
        }
    }

    /// Reporter that received all outcomes so far.
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Consume reconciler, handing back its reporter.
    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// Create every symlink of plan in ascending target order.
    ///
    /// Existing symlinks that already point to their intended source are
    /// left as-is. Missing parent directories are created first.
    ///
    /// # Errors
    ///
    /// - Return [`ReconcileError::Internal`] if a planned source vanished.
    /// - Return [`ReconcileError::Path`] if a parent directory cannot be
    ///   created.
    /// - Return [`ReconcileError::Symlink`] if symlink creation fails for any
    ///   reason other than an occupied target.
    /// - Return [`ReconcileError::Inspect`] if an occupied target cannot be
    ///   inspected.
    /// - Return [`ReconcileError::Prompt`] if the user cannot be asked.
    #[instrument(skip(self, plan), level = "debug")]
    pub fn link(&mut self, plan: &LinkPlan) -> Result<()> {
        if self.options.verbose {
            info!("symlinks to create:\n{plan}");
        } else {
            debug!("symlinks to create:\n{plan}");
        }

        for link in plan {
            let outcome = self.link_one(link)?;
            self.reporter.report(&outcome);
        }

        Ok(())
    }

    /// Remove every symlink of plan in descending target order.
    ///
    /// Only targets that currently exist are considered. Targets that are not
    /// symlinks are skipped.
    ///
    /// # Errors
    ///
    /// - Return [`ReconcileError::Inspect`] if a target cannot be inspected.
    /// - Return [`ReconcileError::Remove`] if a symlink cannot be removed.
    /// - Return [`ReconcileError::Prompt`] if the user cannot be asked.
    #[instrument(skip(self, plan), level = "debug")]
    pub fn unlink(&mut self, plan: &LinkPlan) -> Result<()> {
        let targets = plan
            .targets()
            .rev()
            .filter(|target| fs::symlink_metadata(target).is_ok())
            .collect::<Vec<_>>();

        if self.options.verbose {
            info!("symlinks found to remove: {targets:#?}");
        } else {
            debug!("symlinks found to remove: {targets:#?}");
        }

        for target in targets {
            let outcome = self.unlink_one(target)?;
            self.reporter.report(&outcome);
        }

        Ok(())
    }

    fn link_one(&mut self, link: &ResolvedLink) -> Result<Outcome> {
        let ResolvedLink { target, source } = link;

        // INVARIANT: Planning only ever produces sources that exist.
        if !source.exists() {
            return Err(ReconcileError::Internal { link: link.clone() });
        }

        // Occupied targets never change, so there is nothing to ask about.
        if fs::symlink_metadata(target).is_ok() {
            return self.classify_occupied(link);
        }

        if let Some(parent) = target.parent().filter(|parent| !parent.is_dir()) {
            let question = format!(
                "Create target parent dir(s) {} for symlink {}?",
                parent.display(),
                target.display()
            );
            if !self.ask(&question)? {
                return Ok(Outcome::Declined {
                    target: target.clone(),
                });
            }
            debug!("create parent directory {}", parent.display());
            mkdir_p(parent)?;
        }

        if !self.ask(&format!("Create symlink {link}?"))? {
            return Ok(Outcome::Declined {
                target: target.clone(),
            });
        }

        match symlink(source, target) {
            Ok(()) => Ok(Outcome::Created {
                target: target.clone(),
                source: source.clone(),
            }),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => self.classify_occupied(link),
            Err(err) => Err(ReconcileError::Symlink {
                source: err,
                link: link.clone(),
            }),
        }
    }

    fn classify_occupied(&self, link: &ResolvedLink) -> Result<Outcome> {
        let ResolvedLink { target, source } = link;
        let inspect = |err: io::Error| ReconcileError::Inspect {
            source: err,
            target: target.clone(),
        };

        let metadata = fs::symlink_metadata(target).map_err(inspect)?;
        if !metadata.file_type().is_symlink() {
            return Ok(Outcome::Conflict {
                target: target.clone(),
                reason: ConflictReason::NotASymlink,
            });
        }

        // INVARIANT: Compare real paths regardless of verbosity.
        if real_path(target) == real_path(source) {
            return Ok(Outcome::AlreadySatisfied {
                target: target.clone(),
            });
        }

        let current = fs::read_link(target).map_err(inspect)?;
        Ok(Outcome::Conflict {
            target: target.clone(),
            reason: ConflictReason::PointsElsewhere { current },
        })
    }

    fn unlink_one(&mut self, target: &Path) -> Result<Outcome> {
        let metadata = fs::symlink_metadata(target).map_err(|err| ReconcileError::Inspect {
            source: err,
            target: target.to_path_buf(),
        })?;
        if !metadata.file_type().is_symlink() {
            return Ok(Outcome::Skipped {
                target: target.to_path_buf(),
                reason: SkipReason::NotASymlink,
            });
        }

        let question = format!(
            "Remove {} (points to {})?",
            target.display(),
            real_path(target).display()
        );
        if !self.ask(&question)? {
            return Ok(Outcome::Declined {
                target: target.to_path_buf(),
            });
        }

        remove_symlink(target).map_err(|err| ReconcileError::Remove {
            source: err,
            target: target.to_path_buf(),
        })?;

        Ok(Outcome::Removed {
            target: target.to_path_buf(),
        })
    }

    fn ask(&mut self, question: &str) -> Result<bool> {
        if !self.options.prompts() {
            return Ok(true);
        }

        Ok(self.prompter.confirm(question)?)
    }
}

#[cfg(unix)]
fn symlink(source: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn symlink(source: &Path, target: &Path) -> io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, target)
    } else {
        std::os::windows::fs::symlink_file(source, target)
    }
}

#[cfg(unix)]
fn remove_symlink(target: &Path) -> io::Result<()> {
    fs::remove_file(target)
}

// Directory symlinks on Windows must go through `remove_dir`.
#[cfg(windows)]
fn remove_symlink(target: &Path) -> io::Result<()> {
    use std::os::windows::fs::FileTypeExt;

    if fs::symlink_metadata(target)?.file_type().is_symlink_dir() {
        fs::remove_dir(target)
    } else {
        fs::remove_file(target)
    }
}

/// Reconciliation error types.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Plan contains a link whose source does not exist.
    #[error(
        "planned source {:?} of symlink {:?} does not exist",
        link.source.display(),
        link.target.display()
    )]
    Internal { link: ResolvedLink },

    /// Parent directory of a target could not be created.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Symlink could not be created.
    #[error("failed to create symlink {link}")]
    Symlink {
        #[source]
        source: io::Error,
        link: ResolvedLink,
    },

    /// Occupied target could not be inspected.
    #[error("failed to inspect {:?}", target.display())]
    Inspect {
        #[source]
        source: io::Error,
        target: PathBuf,
    },

    /// Symlink could not be removed.
    #[error("failed to remove symlink {:?}", target.display())]
    Remove {
        #[source]
        source: io::Error,
        target: PathBuf,
    },

    /// User could not be asked for confirmation.
    #[error(transparent)]
    Prompt(#[from] InquireError),
}

/// Friendly result alias :3
pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;
