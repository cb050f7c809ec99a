use std::fs;
use std::path::Path;

use flex_core::errors::FlexError;

use super::{ensure_parent, io_error, serde_error, Fidelity, FormatCodec};
use crate::scalar::Scalar;
use crate::table::TabularDocument;

/// Renders a `<table>` page. Loading extracts the first table on a best-effort
/// basis: cell text is re-parsed, so string cells that look like numbers come
/// back as numbers and empty strings come back missing.
#[derive(Debug, Clone, Default)]
pub struct HtmlCodec {
    title: Option<String>,
}

impl HtmlCodec {
    pub fn new(title: Option<String>) -> Self {
        Self { title }
    }
}

impl FormatCodec for HtmlCodec {
    fn name(&self) -> &str {
        "html"
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::Lossy
    }

    fn save(&self, doc: &TabularDocument, path: &Path) -> Result<(), FlexError> {
        ensure_parent(path)?;
        fs::write(path, render(doc, self.title.as_deref().unwrap_or("flex runs")))
            .map_err(|err| io_error("html-write", path, err))
    }

    fn load(&self, path: &Path) -> Result<TabularDocument, FlexError> {
        let html = fs::read_to_string(path).map_err(|err| io_error("html-read", path, err))?;
        let rows = extract_first_table(&html)
            .ok_or_else(|| serde_error("html-no-table", path, "no <table> element found"))?;
        let mut rows = rows.into_iter();
        let Some((_, header)) = rows.next() else {
            return Ok(TabularDocument::empty());
        };
        let width = header.len();
        let body = rows
            .map(|(_, cells)| {
                let mut parsed: Vec<Scalar> = cells.iter().map(|c| Scalar::parse_text(c)).collect();
                parsed.resize(width, Scalar::Missing);
                parsed
            })
            .collect();
        TabularDocument::from_cells(header, body)
    }
}

fn render(doc: &TabularDocument, title: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>");
    out.push_str(&escape(title));
    out.push_str("</title></head>\n<body>\n<table class=\"flex-runs\">\n  <thead>\n    <tr>");
    for column in doc.columns() {
        out.push_str(&format!("<th>{}</th>", escape(column)));
    }
    out.push_str("</tr>\n  </thead>\n  <tbody>\n");
    for row in doc.cells() {
        out.push_str("    <tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", escape(&cell.to_text())));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("  </tbody>\n</table>\n</body>\n</html>\n");
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Rows of the first table as `(is_header, cells)`. The header is the first
/// row; `<th>` is not required.
fn extract_first_table(html: &str) -> Option<Vec<(bool, Vec<String>)>> {
    // ascii lowercasing keeps byte offsets aligned with `html`
    let lower = html.to_ascii_lowercase();
    let start = lower.find("<table")?;
    let end = lower[start..]
        .find("</table>")
        .map_or(lower.len(), |offset| start + offset);

    let mut rows = Vec::new();
    let mut cursor = start;
    while let Some(offset) = lower[cursor..end].find("<tr") {
        let row_start = cursor + offset;
        let row_end = lower[row_start..end]
            .find("</tr>")
            .map_or(end, |offset| row_start + offset);
        let cells = extract_cells(&html[row_start..row_end], &lower[row_start..row_end]);
        if !cells.is_empty() {
            let is_header = cells.iter().all(|(header, _)| *header);
            rows.push((is_header, cells.into_iter().map(|(_, text)| text).collect()));
        }
        cursor = row_end;
        if cursor >= end {
            break;
        }
        cursor += 1;
    }
    Some(rows)
}

fn extract_cells(row: &str, lower: &str) -> Vec<(bool, String)> {
    let mut cells = Vec::new();
    let mut cursor = 0;
    loop {
        let next_th = lower[cursor..].find("<th");
        let next_td = lower[cursor..].find("<td");
        let (offset, is_header) = match (next_th, next_td) {
            (Some(th), Some(td)) if th < td => (th, true),
            (_, Some(td)) => (td, false),
            (Some(th), None) => (th, true),
            (None, None) => break,
        };
        let open = cursor + offset;
        let Some(content_start) = lower[open..].find('>').map(|gt| open + gt + 1) else {
            break;
        };
        let close_tag = if is_header { "</th>" } else { "</td>" };
        let content_end = lower[content_start..]
            .find(close_tag)
            .map_or(lower.len(), |offset| content_start + offset);
        cells.push((
            is_header,
            unescape(strip_tags(&row[content_start..content_end]).trim()),
        ));
        cursor = content_end;
    }
    cells
}

fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            other if !in_tag => out.push(other),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::Record;

    #[test]
    fn rendered_table_is_extracted_again() {
        let doc = TabularDocument::from_rows([
            Record::new().with("name", "a<b").with("lr", 0.1),
            Record::new().with("name", "c").with("epochs", 3),
        ]);
        let rows = extract_first_table(&render(&doc, "t")).expect("table");
        assert_eq!(rows.len(), 3);
        assert!(rows[0].0);
        assert_eq!(rows[0].1, ["name", "lr", "epochs"]);
        assert_eq!(rows[1].1, ["a<b", "0.1", ""]);
    }

    #[test]
    fn tolerates_uppercase_and_attributes() {
        let html = "<TABLE border=1><TR><TH>a</TH><TH>b</TH></TR><TR><TD class=x>1</TD><TD><b>two</b></TD></TR></TABLE>";
        let rows = extract_first_table(html).expect("table");
        assert_eq!(rows[1].1, ["1", "two"]);
    }
}
