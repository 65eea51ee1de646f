use cohort_config::CohortsConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    config: &CohortsConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Overlap(args) => commands::overlap::handle(&args, config, flags),
        Commands::Fetch(args) => commands::fetch::handle(&args, config, flags).await,
        Commands::Impact(args) => commands::impact::handle(&args, flags),
        Commands::Config => commands::config::handle(config, flags),
    }
}
