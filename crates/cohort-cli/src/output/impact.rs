use cohort_impact::{ImpactEstimate, Interval};

use super::table::{Align, Table, TableOptions};

fn number(value: f64) -> String {
    format!("{value:.2}")
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn interval_row(label: &str, interval: &Interval, fmt: fn(f64) -> String) -> Vec<String> {
    vec![
        label.to_string(),
        fmt(interval.estimate),
        fmt(interval.lower),
        fmt(interval.upper),
    ]
}

/// Effect summary and fit details; per-day effects when `pointwise`.
#[must_use]
pub fn render_impact(estimate: &ImpactEstimate, pointwise: bool, options: TableOptions) -> String {
    let mut summary = Table::new(&[
        ("measure", Align::Left),
        ("estimate", Align::Right),
        ("lower", Align::Right),
        ("upper", Align::Right),
    ]);
    summary.push(vec![
        String::from("actual total"),
        number(estimate.actual_total),
    ]);
    summary.push(interval_row("predicted total", &estimate.predicted_total, number));
    summary.push(interval_row("cumulative effect", &estimate.cumulative, number));
    summary.push(interval_row("average effect", &estimate.average, number));
    if let Some(relative) = &estimate.relative {
        summary.push(interval_row("relative effect", relative, percent));
    }

    let mut details = Table::new(&[("detail", Align::Left), ("value", Align::Left)]);
    let verdict = if estimate.significant {
        "significant"
    } else {
        "not significant"
    };
    for (key, value) in [
        ("response", estimate.response.clone()),
        ("model", estimate.model.clone()),
        ("pre rows", estimate.pre_rows.to_string()),
        ("post rows", estimate.post_rows.to_string()),
        ("interval", percent(1.0 - estimate.alpha)),
        ("tail probability", format!("{:.4}", estimate.tail_probability)),
        ("result", verdict.to_string()),
    ] {
        details.push(vec![key.to_string(), value]);
    }

    let mut out = format!("{}\n\n{}", summary.render(options), details.render(options));

    if pointwise {
        let mut days = Table::new(&[
            ("date", Align::Left),
            ("actual", Align::Right),
            ("predicted", Align::Right),
            ("effect", Align::Right),
            ("lower", Align::Right),
            ("upper", Align::Right),
        ]);
        for point in &estimate.pointwise {
            days.push(vec![
                point.date.to_string(),
                number(point.actual),
                number(point.predicted.estimate),
                number(point.effect.estimate),
                number(point.effect.lower),
                number(point.effect.upper),
            ]);
        }
        out.push_str("\n\n");
        out.push_str(&days.render(options));
    }
    out
}
