// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Declarative symlink reconciliation.
//!
//! Dotlink takes a mapping of link targets to link sources, resolves it into
//! a deterministic [`LinkPlan`], and applies that plan to the file system
//! without ever overwriting something it does not own.
//!
//! # Pipeline
//!
//! 1. [`path`] normalizes raw path strings.
//! 2. [`source`] resolves each source into one path or a set of paths.
//! 3. [`plan`] merges everything into an ordered listing of symlinks.
//! 4. [`reconcile`] creates or removes those symlinks, reporting one
//!    [`Outcome`] per item.
//!
//! Configuration loading, prompting, and presentation sit at the edges so the
//! pipeline itself stays free of terminal I/O.

pub mod config;
pub mod path;
pub mod plan;
pub mod reconcile;
pub mod source;

pub use config::Config;
pub use plan::{LinkPlan, LinkPlanBuilder, LinkSpec, ResolvedLink};
pub use reconcile::{Outcome, ReconcileOptions, Reconciler};
pub use source::ResolvedSource;
