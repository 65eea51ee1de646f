use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod impact;
pub mod overlap;
pub mod table;

use table::{Align, Table, TableOptions};

/// Render a serializable response to a string in the requested format.
///
/// Table output for an object lists its leaves as dotted `key = value` rows.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
        OutputFormat::Table => {
            let mut table = Table::new(&[("key", Align::Left), ("value", Align::Left)]);
            flatten("", &serde_json::to_value(value)?, &mut table);
            Ok(table.render(table_options()))
        }
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

pub fn table_options() -> TableOptions {
    let prefs = ui::prefs();
    TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn flatten(prefix: &str, value: &Value, table: &mut Table) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, table);
            }
        }
        leaf => table.push(vec![prefix.to_string(), value_to_cell(leaf)]),
    }
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        Value::Array(items) => items.iter().map(value_to_cell).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Inner {
        scopes: Vec<&'static str>,
        path: Option<&'static str>,
    }

    #[derive(Serialize)]
    struct Example {
        name: &'static str,
        size: u32,
        inner: Inner,
    }

    fn example() -> Example {
        Example {
            name: "blog",
            size: 7,
            inner: Inner {
                scopes: vec!["a", "b"],
                path: None,
            },
        }
    }

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&example(), OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["name"], "blog");
        assert_eq!(parsed["size"], 7);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&example(), OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
        assert!(serde_json::from_str::<serde_json::Value>(&out).is_ok());
    }

    #[test]
    fn table_render_flattens_nested_keys() {
        let out = render(&example(), OutputFormat::Table).expect("table render should work");
        assert!(out.lines().next().is_some_and(|line| line.starts_with("key")));
        assert!(out.lines().any(|line| line.starts_with("inner.scopes") && line.ends_with("a, b")));
        assert!(out.lines().any(|line| line.starts_with("inner.path") && line.ends_with('-')));
    }
}
