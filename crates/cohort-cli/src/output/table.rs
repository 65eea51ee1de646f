#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Align {
    Left,
    Right,
}

/// An aligned plain-text table.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Table {
    #[must_use]
    pub fn new(columns: &[(&str, Align)]) -> Self {
        Self {
            headers: columns.iter().map(|(name, _)| (*name).to_string()).collect(),
            align: columns.iter().map(|(_, align)| *align).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing trailing cells render as `-`.
    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    #[must_use]
    pub fn render(&self, options: TableOptions) -> String {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(index))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(header.chars().count())
            })
            .collect();

        self.fit_widths(&mut widths, options.max_width);

        let header_line = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(header, width)| pad(&truncate_text(header, *width), *width, Align::Left, None))
            .collect::<Vec<_>>()
            .join("  ");
        let divider = "-".repeat(header_line.trim_end().chars().count());

        let mut lines = Vec::with_capacity(2 + self.rows.len());
        lines.push(header_line.trim_end().to_string());
        lines.push(divider);
        for row in &self.rows {
            let line = widths
                .iter()
                .zip(&self.align)
                .enumerate()
                .map(|(index, (width, align))| {
                    let value = row.get(index).map_or("-", String::as_str);
                    let text = truncate_text(value, *width);
                    let color = if options.color { status_color(&text) } else { None };
                    pad(&text, *width, *align, color)
                })
                .collect::<Vec<_>>()
                .join("  ");
            lines.push(line.trim_end().to_string());
        }
        lines.join("\n")
    }

    /// Shrink the widest columns, never below their header, until the table
    /// fits `max_width`.
    fn fit_widths(&self, widths: &mut [usize], max_width: Option<usize>) {
        let Some(max_width) = max_width else {
            return;
        };

        let separators = widths.len().saturating_sub(1) * 2;
        let mut total = widths.iter().sum::<usize>() + separators;
        while total > max_width {
            let candidate = widths
                .iter()
                .enumerate()
                .filter(|(idx, width)| **width > self.headers[*idx].chars().count())
                .max_by_key(|(_, width)| **width)
                .map(|(idx, _)| idx);

            let Some(idx) = candidate else {
                break;
            };
            widths[idx] -= 1;
            total -= 1;
        }
    }
}

fn truncate_text(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }

    let mut out: String = value.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn pad(value: &str, width: usize, align: Align, color: Option<&str>) -> String {
    let fill = " ".repeat(width.saturating_sub(value.chars().count()));
    let text = match color {
        Some(code) => format!("\u{1b}[{code}m{value}\u{1b}[0m"),
        None => value.to_string(),
    };
    match align {
        Align::Left => format!("{text}{fill}"),
        Align::Right => format!("{fill}{text}"),
    }
}

fn status_color(value: &str) -> Option<&'static str> {
    match value {
        "significant" => Some("32"),
        "not significant" => Some("33"),
        _ => None,
    }
}
