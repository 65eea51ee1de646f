use cohort_core::{Identifier, OverlapReport};

use super::table::{Align, Table, TableOptions};

/// Cohort sizes, then one row per overlap cell, then the union size.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn render_overlap<T: Identifier + ToString>(report: &OverlapReport<T>, options: TableOptions) -> String {
    let mut sizes = Table::new(&[
        ("cohort", Align::Left),
        ("size", Align::Right),
        ("exclusive", Align::Right),
    ]);
    for cohort in report.cohorts() {
        let exclusive = report.exclusive_size(&cohort.name).unwrap_or(0);
        sizes.push(vec![
            cohort.name.clone(),
            cohort.size.to_string(),
            exclusive.to_string(),
        ]);
    }

    let with_members = report.cells().iter().any(|cell| cell.members.is_some());
    let mut columns = vec![
        ("cohorts", Align::Left),
        ("degree", Align::Right),
        ("count", Align::Right),
        ("share", Align::Right),
    ];
    if with_members {
        columns.push(("members", Align::Left));
    }

    let mut cells = Table::new(&columns);
    for cell in report.cells() {
        let share = if report.union_size() == 0 {
            0.0
        } else {
            cell.count as f64 * 100.0 / report.union_size() as f64
        };
        let mut row = vec![
            cell.signature.to_string(),
            cell.signature.degree().to_string(),
            cell.count.to_string(),
            format!("{share:.1}%"),
        ];
        if let Some(members) = &cell.members {
            row.push(members.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "));
        }
        cells.push(row);
    }

    format!(
        "{}\n\n{}\n\nunion: {}",
        sizes.render(options),
        cells.render(options),
        report.union_size()
    )
}
