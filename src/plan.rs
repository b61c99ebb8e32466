// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Link planning.
//!
//! Turn a declarative set of [`LinkSpec`]s into a [`LinkPlan`]: a flat,
//! deterministically ordered listing of concrete symlinks to create or remove.
//! Planning never touches the file system beyond reading it.
//!
//! # Directory Merge
//!
//! When a source resolves to [`ResolvedSource::Many`], or when a spec omits
//! its target, the target is treated as a directory. Each source is then
//! linked inside that directory under its own file name. Whether each of
//! those per-file targets can actually be created is left to reconciliation.
//!
//! # Ordering
//!
//! Plans are sorted in ascending order of target path string. A link at
//! `~/.config` therefore always comes before a link nested at
//! `~/.config/nvim`, so the nested link lands inside whatever the first link
//! exposes. Siblings sharing a prefix may interleave, e.g., `~/.vim-extra`
//! sorts between `~/.vim` and `~/.vim/vimrc`.

use crate::{
    config::Config,
    path::{normalize, PathError, Resolve},
    source::{resolve_source, ResolvedSource, SourceError},
};

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Single declared link.
///
/// Either side may be missing. Empty strings count as missing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkSpec {
    pub target: Option<String>,
    pub source: Option<String>,
}

impl LinkSpec {
    /// Construct new link specification.
    pub fn new(target: Option<&str>, source: Option<&str>) -> Self {
        let present = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_owned);
        Self {
            target: present(target),
            source: present(source),
        }
    }

    /// Construct specification that addresses an existing link by its target
    /// alone.
    ///
    /// The source becomes the real path the target currently resolves to.
    ///
    /// # Errors
    ///
    /// - Return [`PathError`] if `target` cannot be normalized.
    pub fn unlink_target(target: impl AsRef<str>) -> Result<Self, PathError> {
        let target = target.as_ref();
        let source = normalize(target, Resolve::Real)?;
        let literal = normalize(target, Resolve::Absolute)?;

        Ok(Self::new(
            Some(literal.to_string_lossy().as_ref()),
            Some(source.to_string_lossy().as_ref()),
        ))
    }
}

/// One concrete symlink.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResolvedLink {
    /// Absolute path of the symlink itself.
    pub target: PathBuf,

    /// Absolute path the symlink points to.
    pub source: PathBuf,
}

impl Display for ResolvedLink {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{} --> {}", self.target.display(), self.source.display())
    }
}

/// Ordered listing of symlinks.
///
/// # Invariants
///
/// - Target paths are unique.
/// - Links are sorted in ascending byte order of target path string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkPlan {
    links: Vec<ResolvedLink>,
}

impl LinkPlan {
    /// Iterate over links in ascending target order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ResolvedLink> {
        self.links.iter()
    }

    /// Iterate over target paths in ascending order.
    pub fn targets(&self) -> impl DoubleEndedIterator<Item = &Path> {
        self.links.iter().map(|link| link.target.as_path())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl From<BTreeMap<PathBuf, PathBuf>> for LinkPlan {
    fn from(links: BTreeMap<PathBuf, PathBuf>) -> Self {
        let mut links = links
            .into_iter()
            .map(|(target, source)| ResolvedLink { target, source })
            .collect::<Vec<_>>();

        // INVARIANT: Order by raw path string, not by path component.
        links.sort_by(|a, b| a.target.as_os_str().cmp(b.target.as_os_str()));

        Self { links }
    }
}

impl<'a> IntoIterator for &'a LinkPlan {
    type Item = &'a ResolvedLink;
    type IntoIter = std::slice::Iter<'a, ResolvedLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

impl Display for LinkPlan {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        for link in &self.links {
            writeln!(fmt, "{link}")?;
        }

        Ok(())
    }
}

/// Build [`LinkPlan`] from declared links.
#[derive(Debug, Clone)]
pub struct LinkPlanBuilder {
    home: String,
    specs: Vec<LinkSpec>,
}

impl LinkPlanBuilder {
    /// Construct new builder with `home` as the default target directory.
    pub fn new(home: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            specs: Vec::new(),
        }
    }

    /// Construct new builder from home directory and link table of
    /// configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut builder = Self::new(config.home());
        builder.specs = config.link_specs();
        builder
    }

    /// Add link specification.
    ///
    /// Replaces any previously added specification with the same raw target.
    pub fn with_spec(mut self, spec: LinkSpec) -> Self {
        match self.specs.iter_mut().find(|s| s.target == spec.target) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
        self
    }

    /// Resolve all specifications into a plan.
    ///
    /// Later specifications win when two of them resolve to the same target.
    ///
    /// # Errors
    ///
    /// - Return [`PlanError::Spec`] if a specification lacks a source.
    /// - Return [`PlanError::Source`] if a source cannot be resolved.
    /// - Return [`PlanError::TargetNotDirectory`] if several sources must be
    ///   placed into a target that exists but is not a directory.
    /// - Return [`PlanError::Path`] if a target cannot be normalized.
    #[instrument(skip(self), level = "debug")]
    pub fn build(&self) -> Result<LinkPlan> {
        let mut links = BTreeMap::new();
        for spec in &self.specs {
            self.expand_spec(spec, &mut links)?;
        }

        let plan = LinkPlan::from(links);
        debug!("planned {} link(s)", plan.len());

        Ok(plan)
    }

    fn expand_spec(&self, spec: &LinkSpec, links: &mut BTreeMap<PathBuf, PathBuf>) -> Result<()> {
        let Some(source) = &spec.source else {
            return Err(PlanError::Spec {
                target: spec.target.clone(),
            });
        };
        let resolved = resolve_source(source)?;

        // INVARIANT: No target means writing _into_ home, never replacing it.
        let (target, resolved) = match &spec.target {
            Some(target) => (normalize(target, Resolve::Absolute)?, resolved),
            None => (
                normalize(&self.home, Resolve::Absolute)?,
                ResolvedSource::Many(resolved.into_many()),
            ),
        };

        match resolved {
            ResolvedSource::Single(source) => {
                debug!("plan {} --> {}", target.display(), source.display());
                links.insert(target, source);
            }
            ResolvedSource::Many(sources) => {
                if target.exists() && !target.is_dir() {
                    return Err(PlanError::TargetNotDirectory { target, sources });
                }

                for source in sources {
                    // INVARIANT: Glob matches are never `..` or a root, so a
                    // file name is always present.
                    let Some(name) = source.file_name() else {
                        continue;
                    };
                    let nested = target.join(name);
                    debug!("plan {} --> {}", nested.display(), source.display());
                    links.insert(nested, source);
                }
            }
        }

        Ok(())
    }
}

/// Link planning error types.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Target declared without a source.
    #[error("{} specified without a source", describe_target(.target))]
    Spec { target: Option<String> },

    /// Source could not be resolved.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Several sources must go into a target that is not a directory.
    #[error(
        "target {:?} already exists and is not a directory, cannot place {} source(s) into it",
        target.display(),
        sources.len()
    )]
    TargetNotDirectory {
        target: PathBuf,
        sources: Vec<PathBuf>,
    },

    /// Target could not be normalized.
    #[error(transparent)]
    Path(#[from] PathError),
}

fn describe_target(target: &Option<String>) -> String {
    match target {
        Some(target) => format!("target {target:?}"),
        None => "link".into(),
    }
}

/// Friendly result alias :3
pub type Result<T, E = PlanError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use simple_test_case::test_case;
    use std::{env, fs};

    fn sandbox() -> anyhow::Result<PathBuf> {
        let root = env::current_dir()?.canonicalize()?;
        fs::create_dir_all(root.join("repo/vim"))?;
        fs::create_dir_all(root.join("home"))?;
        fs::write(root.join("repo/rc"), "# rc\n")?;
        fs::write(root.join("repo/vim/vimrc"), "# vimrc\n")?;
        fs::write(root.join("repo/vim/plugin.vim"), "# plugin\n")?;

        Ok(root)
    }

    fn link(target: impl Into<PathBuf>, source: impl Into<PathBuf>) -> ResolvedLink {
        ResolvedLink {
            target: target.into(),
            source: source.into(),
        }
    }

    #[test_case(Some("~/.rc"), Some("repo/rc"), Some("~/.rc"), Some("repo/rc"); "both sides")]
    #[test_case(Some(""), Some("repo/*"), None, Some("repo/*"); "empty target")]
    #[test_case(Some("~/.rc"), Some(""), Some("~/.rc"), None; "empty source")]
    #[test]
    fn link_spec_drops_empty_sides(
        target: Option<&str>,
        source: Option<&str>,
        expect_target: Option<&str>,
        expect_source: Option<&str>,
    ) {
        let spec = LinkSpec::new(target, source);
        assert_eq!(spec.target.as_deref(), expect_target);
        assert_eq!(spec.source.as_deref(), expect_source);
    }

    #[sealed_test]
    fn explicit_link_keeps_target() -> anyhow::Result<()> {
        let root = sandbox()?;
        let plan = LinkPlanBuilder::new("home")
            .with_spec(LinkSpec::new(Some("home/.rc/"), Some("repo/rc")))
            .build()?;

        let expect = vec![link(root.join("home/.rc"), root.join("repo/rc"))];
        assert_eq!(plan.iter().cloned().collect::<Vec<_>>(), expect);

        Ok(())
    }

    #[sealed_test]
    fn glob_source_merges_into_target_directory() -> anyhow::Result<()> {
        let root = sandbox()?;
        let plan = LinkPlanBuilder::new("home")
            .with_spec(LinkSpec::new(Some("home/.vim"), Some("repo/vim/*")))
            .build()?;

        let expect = vec![
            link(root.join("home/.vim/plugin.vim"), root.join("repo/vim/plugin.vim")),
            link(root.join("home/.vim/vimrc"), root.join("repo/vim/vimrc")),
        ];
        assert_eq!(plan.iter().cloned().collect::<Vec<_>>(), expect);

        Ok(())
    }

    #[sealed_test]
    fn missing_target_links_into_home() -> anyhow::Result<()> {
        let root = sandbox()?;
        let plan = LinkPlanBuilder::new(root.join("home").to_string_lossy())
            .with_spec(LinkSpec::new(None, Some("repo/rc")))
            .build()?;

        let expect = vec![link(root.join("home/rc"), root.join("repo/rc"))];
        assert_eq!(plan.iter().cloned().collect::<Vec<_>>(), expect);

        Ok(())
    }

    #[sealed_test]
    fn target_without_source_is_rejected() -> anyhow::Result<()> {
        sandbox()?;
        let result = LinkPlanBuilder::new("home")
            .with_spec(LinkSpec::new(Some("home/.rc"), None))
            .build();
        assert!(matches!(result, Err(PlanError::Spec { .. })));

        Ok(())
    }

    #[sealed_test]
    fn unmatched_source_is_rejected() -> anyhow::Result<()> {
        sandbox()?;
        let result = LinkPlanBuilder::new("home")
            .with_spec(LinkSpec::new(Some("home/.emacs"), Some("repo/emacs/*")))
            .build();
        assert!(matches!(
            result,
            Err(PlanError::Source(SourceError::NoMatch { .. }))
        ));

        Ok(())
    }

    #[sealed_test]
    fn merge_into_regular_file_is_rejected() -> anyhow::Result<()> {
        let root = sandbox()?;
        fs::write(root.join("home/.vim"), "not a directory\n")?;

        let result = LinkPlanBuilder::new("home")
            .with_spec(LinkSpec::new(Some("home/.vim"), Some("repo/vim/*")))
            .build();
        assert!(matches!(result, Err(PlanError::TargetNotDirectory { .. })));

        // Planning must leave the file alone.
        assert_eq!(fs::read_to_string(root.join("home/.vim"))?, "not a directory\n");

        Ok(())
    }

    #[sealed_test]
    fn plan_orders_targets_by_path_string() -> anyhow::Result<()> {
        let root = sandbox()?;
        let plan = LinkPlanBuilder::new("home")
            .with_spec(LinkSpec::new(Some("home/.vim/vimrc"), Some("repo/rc")))
            .with_spec(LinkSpec::new(Some("home/.vim"), Some("repo/vim")))
            .with_spec(LinkSpec::new(Some("home/.vim-extra"), Some("repo/rc")))
            .build()?;

        let expect = vec![
            root.join("home/.vim"),
            root.join("home/.vim-extra"),
            root.join("home/.vim/vimrc"),
        ];
        assert_eq!(plan.targets().map(Path::to_path_buf).collect::<Vec<_>>(), expect);

        Ok(())
    }

    #[sealed_test]
    fn later_spec_wins_for_same_target() -> anyhow::Result<()> {
        let root = sandbox()?;
        let plan = LinkPlanBuilder::new("home")
            .with_spec(LinkSpec::new(Some("home/.vim"), Some("repo/vim/*")))
            .with_spec(LinkSpec::new(Some("home/.vim/vimrc"), Some("repo/rc")))
            .build()?;

        let expect = vec![
            link(root.join("home/.vim/plugin.vim"), root.join("repo/vim/plugin.vim")),
            link(root.join("home/.vim/vimrc"), root.join("repo/rc")),
        ];
        assert_eq!(plan.iter().cloned().collect::<Vec<_>>(), expect);

        Ok(())
    }

    #[sealed_test]
    fn override_replaces_config_entry_with_same_target() -> anyhow::Result<()> {
        let root = sandbox()?;
        let mut config = Config::new("home");
        config.links.insert("home/.rc".into(), "repo/emacs/*".into());

        let plan = LinkPlanBuilder::from_config(&config)
            .with_spec(LinkSpec::new(Some("home/.rc"), Some("repo/rc")))
            .build()?;

        let expect = vec![link(root.join("home/.rc"), root.join("repo/rc"))];
        assert_eq!(plan.iter().cloned().collect::<Vec<_>>(), expect);

        Ok(())
    }

    #[sealed_test]
    fn config_entries_apply_in_declaration_order() -> anyhow::Result<()> {
        let root = sandbox()?;
        let config: Config = indoc! {r#"
            [links]
            "home/.vim" = "repo/vim/*"
            "./home/.vim/vimrc" = "repo/rc"
        "#}
        .parse()?;

        let plan = LinkPlanBuilder::from_config(&config).build()?;
        let expect = vec![
            link(root.join("home/.vim/plugin.vim"), root.join("repo/vim/plugin.vim")),
            link(root.join("home/.vim/vimrc"), root.join("repo/rc")),
        ];
        assert_eq!(plan.iter().cloned().collect::<Vec<_>>(), expect);

        Ok(())
    }

    #[cfg(unix)]
    #[sealed_test]
    fn unlink_target_points_at_current_link_destination() -> anyhow::Result<()> {
        let root = sandbox()?;
        std::os::unix::fs::symlink(root.join("repo/rc"), root.join("home/.rc"))?;

        let spec = LinkSpec::unlink_target("home/.rc")?;
        let expect = LinkSpec::new(
            Some(root.join("home/.rc").to_string_lossy().as_ref()),
            Some(root.join("repo/rc").to_string_lossy().as_ref()),
        );
        assert_eq!(spec, expect);

        Ok(())
    }
}
