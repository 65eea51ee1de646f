use anyhow::Context;
use cohort_config::CohortsConfig;
use cohort_core::{
    Cohort, OverlapOptions, OverlapReport, cohorts_from_rows, compute_overlap_parallel,
    compute_overlap_with,
};

use crate::cli::root_commands::OverlapArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::input::read_segment_rows;
use crate::output::{self, overlap::render_overlap};

/// Past this many cohorts, area-proportional diagrams of a report can only
/// approximate its cells.
const DIAGRAM_EXACT_LIMIT: usize = 3;

/// Handle `cohorts overlap`.
pub fn handle(args: &OverlapArgs, config: &CohortsConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let rows = read_segment_rows(&args.file, !args.no_header, args.delimiter)?;
    let cohorts = cohorts_from_rows(rows);
    let options = OverlapOptions {
        keep_members: args.members || config.general.keep_members,
    };

    let report = analyze(&cohorts, options, args.parallel)?;
    print_report(&report, flags)
}

pub fn analyze(
    cohorts: &[Cohort],
    options: OverlapOptions,
    parallel: bool,
) -> anyhow::Result<OverlapReport<String>> {
    let report = if parallel {
        compute_overlap_parallel(cohorts, options)
    } else {
        compute_overlap_with(cohorts, options)
    };
    report.context("overlap analysis failed")
}

pub fn print_report(report: &OverlapReport<String>, flags: &GlobalFlags) -> anyhow::Result<()> {
    if report.cohorts().len() > DIAGRAM_EXACT_LIMIT {
        tracing::warn!(
            cohorts = report.cohorts().len(),
            "more than {DIAGRAM_EXACT_LIMIT} cohorts: proportional diagrams of this report are approximate"
        );
    }

    match flags.format {
        OutputFormat::Table => {
            println!("{}", render_overlap(report, output::table_options()));
            Ok(())
        }
        format => output::output(report, format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cohorts() -> Vec<Cohort> {
        let rows = [("a", "1"), ("a", "2"), ("b", "2"), ("b", "3"), ("c", "3")];
        cohorts_from_rows(rows.map(|(s, id)| (s, id.to_string())))
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let options = OverlapOptions::default();
        let sequential = analyze(&cohorts(), options, false).unwrap();
        let parallel = analyze(&cohorts(), options, true).unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.union_size(), 3);
    }

    #[test]
    fn empty_input_is_reported() {
        let err = analyze(&[], OverlapOptions::default(), false).unwrap_err();
        assert!(format!("{err:#}").contains("overlap analysis failed"));
    }
}
