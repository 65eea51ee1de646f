use std::collections::HashSet;

use anyhow::{Context, bail};
use cohort_config::CohortsConfig;
use cohort_core::OverlapOptions;
use cohort_reporting::{CohortQuery, DateRange, ReportingClient};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::FetchArgs;
use crate::commands::overlap::{analyze, print_report};
use crate::progress::Progress;

/// Handle `cohorts fetch`.
pub async fn handle(args: &FetchArgs, config: &CohortsConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    if !config.analytics.is_configured() {
        bail!(
            "analytics is not configured: set analytics.service_account_path and analytics.view_id \
             in .cohorts/config.toml or COHORTS_ANALYTICS__SERVICE_ACCOUNT_PATH / COHORTS_ANALYTICS__VIEW_ID"
        );
    }

    let queries = build_queries(args, config)?;
    let client = ReportingClient::new(config.analytics.clone())
        .context("failed to create reporting client")?;

    let progress = Progress::spinner(&format!("fetching {} cohorts", queries.len()));
    let cohorts = match client.fetch_cohorts(&queries).await {
        Ok(cohorts) => {
            progress.finish_clear();
            cohorts
        }
        Err(error) => {
            progress.finish_err("fetch failed");
            return Err(error).context("failed to fetch cohorts");
        }
    };
    for cohort in &cohorts {
        tracing::info!(cohort = cohort.name(), members = cohort.len(), "fetched cohort");
    }

    let options = OverlapOptions {
        keep_members: args.members || config.general.keep_members,
    };
    let report = analyze(&cohorts, options, args.parallel)?;
    print_report(&report, flags)
}

/// Cohort queries for `args`, with the window defaulting to the configured one.
///
/// Cohort names must be unique.
fn build_queries(args: &FetchArgs, config: &CohortsConfig) -> anyhow::Result<Vec<CohortQuery>> {
    let start = args.start.as_deref().unwrap_or(&config.general.default_start_date);
    let end = args.end.as_deref().unwrap_or(&config.general.default_end_date);
    let range = DateRange::parse(start, end).context("invalid report window")?;

    let mut names = HashSet::new();
    let mut queries = Vec::with_capacity(args.cohorts.len());
    for definition in &args.cohorts {
        let query = CohortQuery::parse(definition, range)?;
        if !names.insert(query.name.clone()) {
            bail!("duplicate cohort name '{}'", query.name);
        }
        queries.push(query);
    }
    Ok(queries)
}
