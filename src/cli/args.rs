//! Command-line surface and the invocation options derived from it.

use crate::config::Config;
use crate::domain::BumpKind;
use std::path::PathBuf;

fn parse_bump(raw: &str) -> Result<BumpKind, String> {
    raw.parse::<BumpKind>().map_err(|e| e.to_string())
}

#[derive(clap::Parser, Debug, Clone, Default, PartialEq)]
#[command(
    name = "release-flow",
    about = "Bump the version, write the changelog, tag, push and publish a release"
)]
pub struct Args {
    #[arg(value_name = "BUMP", value_parser = parse_bump, help = "Bump kind: major, minor, patch, hotfix or build")]
    pub increment: Option<BumpKind>,

    #[arg(long = "bump", value_name = "KIND", value_parser = parse_bump, help = "Bump kind (overrides the positional argument)")]
    pub bump: Option<BumpKind>,

    #[arg(long, help = "Non-interactive mode")]
    pub ci: bool,

    #[arg(long, help = "Preview what would happen without making changes")]
    pub dry_run: bool,

    #[arg(long, help = "Use the linear tag-and-push workflow")]
    pub no_git_flow: bool,

    #[arg(short = 'y', long, help = "Skip confirmation prompts")]
    pub yes: bool,

    #[arg(long, help = "Release the current version without bumping it")]
    pub no_increment: bool,

    #[arg(long, help = "Print the next version and exit")]
    pub release_version: bool,

    #[arg(long, help = "Only prompt for the version, confirm everything else")]
    pub only_version: bool,

    #[arg(long, help = "Print the changelog for the next release and exit")]
    pub changelog: bool,

    #[arg(short = 'V', long, help = "Verbose output")]
    pub verbose: bool,

    #[arg(short, long, value_name = "PATH", help = "Custom configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "ID", help = "Pre-release identifier (e.g. beta)")]
    pub preid: Option<String>,

    #[arg(long, help = "Print version information")]
    pub version: bool,
}

impl Args {
    /// `--bump` wins over the positional bump kind
    pub fn requested_bump(&self) -> Option<BumpKind> {
        self.bump.or(self.increment)
    }
}

/// What this invocation asked for, after configuration layering
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InvocationOptions {
    pub increment: Option<BumpKind>,
    pub ci: bool,
    pub dry_run: bool,
    pub git_flow: bool,
    pub yes: bool,
    pub preid: Option<String>,
    pub no_increment: bool,
    pub print_release_version: bool,
    pub print_changelog: bool,
    pub only_version: bool,
    pub verbose: bool,
}

impl InvocationOptions {
    /// Combine the resolved configuration with argv-only flags
    pub fn from_config(config: &Config, args: &Args) -> Self {
        InvocationOptions {
            increment: config.increment,
            ci: config.ci.unwrap_or(false),
            dry_run: config.dry_run,
            git_flow: config.workflow.git_flow,
            yes: config.yes,
            preid: config.preid.clone(),
            no_increment: args.no_increment,
            print_release_version: args.release_version,
            print_changelog: args.changelog,
            only_version: args.only_version,
            verbose: args.verbose,
        }
    }

    /// Info-only flags short-circuit the pipeline after one output
    pub fn is_info_only(&self) -> bool {
        self.print_release_version || self.print_changelog
    }

    /// Prompts cannot be shown
    pub fn non_interactive(&self) -> bool {
        self.ci || self.is_info_only()
    }

    /// Confirmation is implied
    pub fn auto_confirm(&self) -> bool {
        self.yes || self.only_version
    }
}
