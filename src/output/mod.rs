use std::io::{self, Write};

use colored::Colorize;
use serde::Serialize;
use tracing::warn;

use crate::pager::Page;
use crate::query::Sort;
use crate::record::{format_date, Field, Record};
use crate::session::{QueryState, Render, ViewMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

const TITLE_WIDTH: usize = 40;
const CELL_WIDTH: usize = 16;
const ID_WIDTH: usize = 10;

/// Columns of the table view; the middle column follows the filter field.
pub fn table_columns(filter_field: Field) -> [Field; 6] {
    let category = match filter_field {
        Field::Country | Field::Category => filter_field,
        _ => Field::Region,
    };
    [
        Field::Id,
        Field::Title,
        category,
        Field::Status,
        Field::Severity,
        Field::Date,
    ]
}

fn column_cap(field: Field) -> usize {
    match field {
        Field::Id => ID_WIDTH,
        Field::Title => TITLE_WIDTH,
        Field::Date => 10,
        _ => CELL_WIDTH,
    }
}

fn one_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pads or truncates `value` to exactly `width` characters.
fn fit(value: &str, width: usize) -> String {
    let count = value.chars().count();
    if count <= width {
        return format!("{value:<width$}");
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn header_label(field: Field, sort: &Sort) -> String {
    if sort.key == field {
        format!("{} {}", field.label(), sort.direction.arrow())
    } else {
        field.label().to_string()
    }
}

pub fn write_table<W: Write>(
    out: &mut W,
    items: &[&Record],
    state: &QueryState,
) -> io::Result<()> {
    let columns = table_columns(state.criteria.filter_field);
    let sort = &state.criteria.sort;

    let widths: Vec<usize> = columns
        .iter()
        .map(|field| {
            let header = header_label(*field, sort).chars().count();
            let widest = items
                .iter()
                .map(|r| one_line(&r.text(*field)).chars().count())
                .max()
                .unwrap_or(0);
            header.max(widest.min(column_cap(*field)))
        })
        .collect();

    let header = columns
        .iter()
        .zip(widths.iter())
        .map(|(field, width)| fit(&header_label(*field, sort), *width))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", header.bold())?;

    for record in items {
        let row = columns
            .iter()
            .zip(widths.iter())
            .map(|(field, width)| fit(&one_line(&record.text(*field)), *width))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(out, "{row}")?;
    }
    Ok(())
}

pub fn write_cards<W: Write>(
    out: &mut W,
    items: &[&Record],
    state: &QueryState,
) -> io::Result<()> {
    let category = table_columns(state.criteria.filter_field)[2];
    for record in items {
        writeln!(out, "{}", record.title.bold())?;
        let badges = [
            record.text(category).into_owned(),
            record.status.clone(),
            record.severity.clone(),
            format_date(record.date),
        ]
        .iter()
        .filter(|b| !b.is_empty())
        .map(|b| format!("[{b}]"))
        .collect::<Vec<_>>()
        .join(" ");
        writeln!(out, "  {}", badges.cyan())?;
        if !record.description.is_empty() {
            writeln!(out, "  {}", one_line(&record.description))?;
        }
        writeln!(out, "  {}", format!("ID: {}", record.id).dimmed())?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn footer_line(page: &Page<'_>, page_size: usize) -> String {
    if page.total == 0 {
        return "0 results".to_string();
    }
    let mut line = format!(
        "{}–{} of {} · page {}/{} · {}/page",
        page.range_start, page.range_end, page.total, page.page, page.total_pages, page_size
    );
    if !page.is_first() {
        line.push_str(" · ‹ prev");
    }
    if !page.is_last() {
        line.push_str(" · next ›");
    }
    line
}

#[derive(Serialize)]
struct JsonView<'p, 'a> {
    view: ViewMode,
    query: &'p str,
    filter: String,
    sort: Sort,
    page_size: usize,
    #[serde(flatten)]
    page: &'p Page<'a>,
}

pub fn write_json<W: Write>(out: &mut W, page: &Page<'_>, state: &QueryState) -> io::Result<()> {
    let view = JsonView {
        view: state.view,
        query: &state.criteria.text,
        filter: state.criteria.filter.to_string(),
        sort: state.criteria.sort,
        page_size: state.page_size,
        page,
    };
    serde_json::to_writer_pretty(&mut *out, &view).map_err(io::Error::from)?;
    writeln!(out)
}

pub fn write_filter_options<W: Write>(
    out: &mut W,
    options: &[String],
    state: &QueryState,
) -> io::Result<()> {
    let active = state.criteria.filter.to_string();
    for option in std::iter::once("all".to_string()).chain(options.iter().cloned()) {
        if option.eq_ignore_ascii_case(&active) {
            writeln!(out, "* {}", option.bold())?;
        } else {
            writeln!(out, "  {option}")?;
        }
    }
    Ok(())
}

/// Renders every recomputed page to a writer.
pub struct TerminalRenderer<W> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_page(&mut self, page: &Page<'_>, state: &QueryState) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(&mut self.out, page, state)?,
            OutputFormat::Text => {
                match state.view {
                    ViewMode::Table => write_table(&mut self.out, &page.items, state)?,
                    ViewMode::Cards => write_cards(&mut self.out, &page.items, state)?,
                }
                writeln!(self.out, "{}", footer_line(page, state.page_size).dimmed())?;
            }
        }
        self.out.flush()
    }
}

impl<W: Write> Render for TerminalRenderer<W> {
    fn render(&mut self, page: &Page<'_>, state: &QueryState) {
        if let Err(e) = self.write_page(page, state) {
            warn!(error = %e, "failed to write page");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pager::paginate;
    use crate::record::{normalize, NormalizeOptions};
    use serde_json::json;

    fn sample() -> Vec<Record> {
        normalize(
            &json!([
                {"id": "A-1", "title": "Bloqueo de vía principal", "region": "Norte",
                 "status": "Abierto", "severity": "Alta", "date": "2024-01-01",
                 "description": "Manifestación\ncon cierre"},
                {"id": "A-2", "title": "Hurto", "region": "Sur"}
            ]),
            &NormalizeOptions::default(),
        )
    }

    fn rendered(format: OutputFormat, state: &QueryState) -> String {
        colored::control::set_override(false);
        let data = sample();
        let refs: Vec<&Record> = data.iter().collect();
        let page = paginate(&refs, state.page, state.page_size);
        let mut renderer = TerminalRenderer::new(Vec::new(), format);
        renderer.render(&page, state);
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn table_marks_the_sorted_column() {
        let out = rendered(OutputFormat::Text, &QueryState::default());
        let header = out.lines().next().unwrap();
        assert!(header.starts_with("ID"));
        assert!(header.contains("Date ▼"));
        assert!(out.contains("Bloqueo de vía principal"));
        assert!(out.trim_end().ends_with("1–2 of 2 · page 1/1 · 20/page"));
    }

    #[test]
    fn cards_show_badges_and_flattened_description() {
        let state = QueryState {
            view: ViewMode::Cards,
            ..Default::default()
        };
        let out = rendered(OutputFormat::Text, &state);
        assert!(out.contains("[Norte] [Abierto] [Alta] [2024-01-01]"));
        assert!(out.contains("Manifestación con cierre"));
        assert!(out.contains("ID: A-2"));
    }

    #[test]
    fn json_carries_page_metadata() {
        let out = rendered(OutputFormat::Json, &QueryState::default());
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["total"], json!(2));
        assert_eq!(value["page"], json!(1));
        assert_eq!(value["filter"], json!("all"));
        assert_eq!(value["sort"]["key"], json!("date"));
        assert_eq!(value["items"][0]["id"], json!("A-1"));
    }

    #[test]
    fn empty_footer() {
        let page = paginate(&[], 1, 20);
        assert_eq!(footer_line(&page, 20), "0 results");
    }

    #[test]
    fn footer_offers_navigation_away_from_the_ends() {
        let data = normalize(
            &serde_json::Value::Array((0..5).map(|i| json!({"id": i})).collect()),
            &NormalizeOptions::default(),
        );
        let refs: Vec<&Record> = data.iter().collect();
        assert_eq!(
            footer_line(&paginate(&refs, 1, 2), 2),
            "1–2 of 5 · page 1/3 · 2/page · next ›"
        );
        assert_eq!(
            footer_line(&paginate(&refs, 2, 2), 2),
            "3–4 of 5 · page 2/3 · 2/page · ‹ prev · next ›"
        );
        assert_eq!(
            footer_line(&paginate(&refs, 3, 2), 2),
            "5–5 of 5 · page 3/3 · 2/page · ‹ prev"
        );
    }

    #[test]
    fn fit_truncates_with_ellipsis() {
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("ab", 4), "ab  ");
    }

    #[test]
    fn output_format_parse() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("xml"), None);
    }
}
