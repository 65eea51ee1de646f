use cohort_config::CohortsConfig;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `cohorts config`.
pub fn handle(config: &CohortsConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    if !config.analytics.is_configured() {
        tracing::info!("analytics section is incomplete; `cohorts fetch` is unavailable");
    }
    output(&config.redacted(), flags.format)
}
