//! CLI command definitions

use clap::{Parser, ValueEnum};
use review_domain::ReviewerKind;
use std::path::PathBuf;

/// Output format for workflow results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Final draft, every round and every review
    Full,
    /// Status, vote history and the final draft
    Summary,
    /// The workflow state as JSON
    Json,
}

/// CLI arguments for content-quorum
#[derive(Parser, Debug)]
#[command(name = "content-quorum")]
#[command(author, version, about = "Consensus review for marketing content")]
#[command(long_about = r#"
Content Quorum drafts a piece of content and has it reviewed by three
independent evaluators: brand tone, marketing/SEO, and security & compliance.

Each round works like this:
1. Draft: a provider writes (or rewrites) the content
2. Review: all evaluators review the draft in parallel
3. Vote: two or more major issues force a redraft; otherwise the draft passes

A workflow that still needs a redraft after --max-iterations rounds is
escalated to a human through a single-use approval link.

Configuration files are loaded from (in priority order):
1. CONTENT_QUORUM_* environment variables
2. --config <path>            Explicit config file
3. ./content-quorum.toml      Project-level config
4. ~/.config/content-quorum/config.toml   Global config

Example:
  content-quorum "Caring for silk" -k silk -k "silk care"
  content-quorum "Retirement planning basics" --category finance --wait
  content-quorum "Spring collection" -o json --reviewer brand_tone --reviewer marketing_seo
"#)]
pub struct Cli {
    /// Topic of the content to draft
    pub topic: Option<String>,

    /// Target keywords (can be specified multiple times)
    #[arg(short, long = "keyword", value_name = "KEYWORD")]
    pub keywords: Vec<String>,

    /// Redraft budget before escalating to a human
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<u32>,

    /// Content category (e.g. health, finance, fashion)
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Tone of voice for the draft
    #[arg(long, value_name = "TONE")]
    pub tone: Option<String>,

    /// Reviewers to run (default: all three)
    #[arg(long = "reviewer", value_name = "KIND")]
    pub reviewers: Vec<ReviewerKind>,

    /// Wait for a human decision when the workflow is escalated
    #[arg(long)]
    pub wait: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
