use anyhow::Context;
use cohort_impact::{ImpactFrame, PrePostSplit, RegressionModel, estimate_impact};

use crate::cli::root_commands::ImpactArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::{self, impact::render_impact};

/// Handle `cohorts impact`.
pub fn handle(args: &ImpactArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let frame = ImpactFrame::from_path(&args.file, args.response.as_deref())
        .with_context(|| format!("failed to load {}", args.file.display()))?;
    let split = PrePostSplit::parse(&args.pre, &args.post)?;
    let model = RegressionModel::new(args.ridge)?;

    let estimate = estimate_impact(&frame, &split, &model, args.alpha)
        .context("impact estimation failed")?;
    if estimate.pre_rows < 3 * frame.predictors().len() {
        tracing::warn!(
            pre_rows = estimate.pre_rows,
            predictors = frame.predictors().len(),
            "short pre period for the number of predictors; intervals may be unreliable"
        );
    }

    match flags.format {
        OutputFormat::Table => {
            println!(
                "{}",
                render_impact(&estimate, args.pointwise, output::table_options())
            );
            Ok(())
        }
        format => output::output(&estimate, format),
    }
}
