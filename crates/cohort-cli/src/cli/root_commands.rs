use std::path::PathBuf;

use clap::{Args, Subcommand};
use cohort_impact::{DEFAULT_ALPHA, DEFAULT_RIDGE};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Overlap of cohorts read from a SEGMENT,IDENTIFIER CSV file.
    Overlap(OverlapArgs),
    /// Fetch cohorts from the reporting API and report their overlap.
    Fetch(FetchArgs),
    /// Estimate the effect of an event on a daily series.
    Impact(ImpactArgs),
    /// Print the effective configuration.
    Config,
}

#[derive(Clone, Debug, Args)]
pub struct OverlapArgs {
    /// CSV file of SEGMENT,IDENTIFIER rows
    pub file: PathBuf,

    /// Include member identifiers in each cell
    #[arg(long)]
    pub members: bool,

    /// Shard the computation across all cores
    #[arg(long)]
    pub parallel: bool,

    /// The first row is data, not a header
    #[arg(long)]
    pub no_header: bool,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,
}

#[derive(Clone, Debug, Args)]
pub struct FetchArgs {
    /// Cohort definition NAME=FILTER; FILTER is a page-path regex, or
    /// exact:PATH / prefix:PATH (repeatable)
    #[arg(short, long = "cohort", value_name = "NAME=FILTER", required = true)]
    pub cohorts: Vec<String>,

    /// Start date: YYYY-MM-DD, today, yesterday, or NdaysAgo
    #[arg(long)]
    pub start: Option<String>,

    /// End date: YYYY-MM-DD, today, yesterday, or NdaysAgo
    #[arg(long)]
    pub end: Option<String>,

    /// Include member identifiers in each cell
    #[arg(long)]
    pub members: bool,

    /// Shard the computation across all cores
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ImpactArgs {
    /// CSV file: date column first, then numeric columns
    pub file: PathBuf,

    /// Pre-event period START:END (inclusive, YYYY-MM-DD)
    #[arg(long, value_name = "START:END")]
    pub pre: String,

    /// Post-event period START:END (inclusive, YYYY-MM-DD)
    #[arg(long, value_name = "START:END")]
    pub post: String,

    /// Response column (defaults to the first numeric column)
    #[arg(long)]
    pub response: Option<String>,

    /// Interval level: intervals cover 1 - alpha
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub alpha: f64,

    /// Prior precision on standardized regression coefficients
    #[arg(long, default_value_t = DEFAULT_RIDGE)]
    pub ridge: f64,

    /// Also print per-day effects in table output
    #[arg(long)]
    pub pointwise: bool,
}
