//! Runs the `cohorts` binary against files in a scratch project.

use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

fn cohorts(project: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cohorts"))
        .arg("--project")
        .arg(project)
        .args(args)
        .env_remove("COHORTS_LOG")
        .output()
        .expect("binary runs")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is json")
}

#[test]
fn overlap_reports_cells_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let rows = dir.path().join("rows.csv");
    std::fs::write(
        &rows,
        "segment,client_id\nblog,1\nblog,2\nblog,3\npricing,3\npricing,4\nblog,1\n",
    )
    .unwrap();

    let out = cohorts(dir.path(), &["overlap", rows.to_str().unwrap(), "--format", "raw"]);
    let report = stdout_json(&out);

    assert_eq!(report["union_size"], 4);
    assert_eq!(
        report["cohorts"],
        serde_json::json!([{"name": "blog", "size": 3}, {"name": "pricing", "size": 2}])
    );
    let cells = report["cells"].as_array().unwrap();
    let counts: Vec<_> = cells
        .iter()
        .map(|c| (c["signature"].clone(), c["count"].as_u64().unwrap()))
        .collect();
    assert_eq!(
        counts,
        vec![
            (serde_json::json!(["blog"]), 2),
            (serde_json::json!(["pricing"]), 1),
            (serde_json::json!(["blog", "pricing"]), 1),
        ]
    );
    assert!(cells.iter().all(|c| c.get("members").is_none()));
}

#[test]
fn overlap_table_with_members() {
    let dir = tempfile::tempdir().unwrap();
    let rows = dir.path().join("rows.csv");
    std::fs::write(&rows, "a,x\nb,x\nb,y\n").unwrap();

    let out = cohorts(
        dir.path(),
        &[
            "overlap",
            rows.to_str().unwrap(),
            "--no-header",
            "--members",
            "--format",
            "table",
            "--color",
            "never",
        ],
    );
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.lines().any(|l| l.starts_with("a & b") && l.ends_with('x')));
    assert!(text.trim_end().ends_with("union: 2"));
}

#[test]
fn impact_estimates_known_jump() {
    let dir = tempfile::tempdir().unwrap();
    let series = dir.path().join("series.csv");
    let mut csv = String::from("date,signups\n");
    for day in 1..=20 {
        let value = if day > 14 { 30 } else { 10 + day % 2 };
        csv.push_str(&format!("2020-01-{day:02},{value}\n"));
    }
    std::fs::write(&series, csv).unwrap();

    let out = cohorts(
        dir.path(),
        &[
            "impact",
            series.to_str().unwrap(),
            "--pre",
            "2020-01-01:2020-01-14",
            "--post",
            "2020-01-15:2020-01-20",
        ],
    );
    let estimate = stdout_json(&out);
    assert_eq!(estimate["post_rows"], 6);
    assert_eq!(estimate["significant"], true);
    let cumulative = estimate["cumulative"]["estimate"].as_f64().unwrap();
    assert!((cumulative - 117.0).abs() < 1e-9, "{cumulative}");
}

#[test]
fn config_prints_redacted_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join(".cohorts");
    std::fs::create_dir(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "[analytics]\nservice_account_path = \"/secret/dir/sa.json\"\nview_id = \"42\"\n",
    )
    .unwrap();

    let config = stdout_json(&cohorts(dir.path(), &["config"]));
    assert_eq!(config["analytics"]["view_id"], "42");
    let path = config["analytics"]["service_account_path"].as_str().unwrap();
    assert!(path.ends_with("sa.json"));
    assert!(!path.contains("secret"));
}

#[test]
fn failures_exit_nonzero_with_prefixed_message() {
    let dir = tempfile::tempdir().unwrap();
    let out = cohorts(dir.path(), &["overlap", "missing.csv"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.starts_with("cohorts error:"), "{stderr}");
    assert!(stderr.contains("missing.csv"));
}

#[test]
fn header_only_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let rows = dir.path().join("rows.csv");
    std::fs::write(&rows, "segment,id\n").unwrap();
    let out = cohorts(dir.path(), &["overlap", rows.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
}
