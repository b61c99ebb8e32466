// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dotlink::{
    config::Config,
    plan::{LinkPlan, LinkPlanBuilder, LinkSpec},
    reconcile::{ReconcileOptions, Reconciler},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{fs::read_to_string, path::PathBuf, process::exit};
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_CONFIG: &str = "dotfiles.toml";

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "dotlink [options] <dotlink-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Link configuration file [default: dotfiles.toml if present].
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Default target directory if configuration file sets no home.
    #[arg(long = "home-dir", global = true, value_name = "path")]
    pub home: Option<String>,

    /// Show full plans and no-op outcomes.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let config = load_config(self.config)?.with_fallback_home(self.home);
        debug!("using configuration:\n{config}");

        match self.command {
            Command::Link(opts) => run_link(config, opts, self.verbose),
            Command::Unlink(opts) => run_unlink(config, opts, self.verbose),
            Command::Plan(opts) => run_plan(config, opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Create symlinks.
    #[command(override_usage = "dotlink link [options]")]
    Link(LinkOptions),

    /// Remove symlinks.
    #[command(override_usage = "dotlink unlink [options]")]
    Unlink(UnlinkOptions),

    /// Show symlinks that would be managed without touching anything.
    #[command(override_usage = "dotlink plan [options]")]
    Plan(PlanOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct LinkOptions {
    /// Symlink source file or directory, may be a glob pattern.
    #[arg(short, long, value_name = "path")]
    pub source: Option<String>,

    /// Symlink target file or directory.
    #[arg(short, long, value_name = "path")]
    pub target: Option<String>,

    /// Ignore links declared in configuration file.
    #[arg(long)]
    pub skip_config: bool,

    /// Do not ask before creating anything.
    #[arg(long)]
    pub no_confirm: bool,

    /// Answer yes to all prompts.
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct UnlinkOptions {
    /// Symlink target to remove.
    #[arg(short, long, value_name = "path")]
    pub target: Option<String>,

    /// Ignore links declared in configuration file.
    #[arg(long)]
    pub skip_config: bool,

    /// Do not ask before removing anything.
    #[arg(long)]
    pub no_confirm: bool,

    /// Answer yes to all prompts.
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct PlanOptions {
    /// Symlink source file or directory, may be a glob pattern.
    #[arg(short, long, value_name = "path")]
    pub source: Option<String>,

    /// Symlink target file or directory.
    #[arg(short, long, value_name = "path")]
    pub target: Option<String>,

    /// Ignore links declared in configuration file.
    #[arg(long)]
    pub skip_config: bool,
}

fn main() {
    let cli = Cli::parse();

    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = cli.run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = match path {
        Some(path) => path,
        None if PathBuf::from(DEFAULT_CONFIG).is_file() => PathBuf::from(DEFAULT_CONFIG),
        None => return Ok(Config::default()),
    };

    let data = read_to_string(&path)
        .with_context(|| format!("failed to read configuration {:?}", path.display()))?;
    let config = data
        .parse::<Config>()
        .with_context(|| format!("failed to parse configuration {:?}", path.display()))?;

    Ok(config)
}

fn plan_builder(config: &Config, skip_config: bool) -> LinkPlanBuilder {
    if skip_config {
        LinkPlanBuilder::new(config.home())
    } else {
        LinkPlanBuilder::from_config(config)
    }
}

fn run_link(config: Config, opts: LinkOptions, verbose: bool) -> Result<()> {
    let mut builder = plan_builder(&config, opts.skip_config);
    if opts.target.is_some() || opts.source.is_some() {
        builder = builder.with_spec(LinkSpec::new(
            opts.target.as_deref(),
            opts.source.as_deref(),
        ));
    }
    let plan = builder.build()?;

    let options = ReconcileOptions {
        confirm: !opts.no_confirm,
        assume_yes: opts.yes,
        verbose,
    };
    Reconciler::interactive(options).link(&plan)?;

    Ok(())
}

fn run_unlink(config: Config, opts: UnlinkOptions, verbose: bool) -> Result<()> {
    let mut builder = plan_builder(&config, opts.skip_config);
    if let Some(target) = opts.target {
        builder = builder.with_spec(LinkSpec::unlink_target(target)?);
    }
    let plan = builder.build()?;

    let options = ReconcileOptions {
        confirm: !opts.no_confirm,
        assume_yes: opts.yes,
        verbose,
    };
    Reconciler::interactive(options).unlink(&plan)?;

    Ok(())
}

fn run_plan(config: Config, opts: PlanOptions) -> Result<()> {
    let mut builder = plan_builder(&config, opts.skip_config);
    if opts.target.is_some() || opts.source.is_some() {
        builder = builder.with_spec(LinkSpec::new(
            opts.target.as_deref(),
            opts.source.as_deref(),
        ));
    }
    let plan: LinkPlan = builder.build()?;
    print!("{plan}");

    Ok(())
}
