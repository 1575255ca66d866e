//! HTML rendering of paginated labels
//!
//! Produces one self-contained document styled for A4 printing. Every page is
//! a `.page` block holding a 2 × 7 CSS grid; every slot becomes a `.label`
//! block, blank slots included, so each printed page has the same footprint.

use crate::label::{Label, LabelLine};
use crate::layout::{GridSpec, Page, Slot};
use crate::schema::LineRole;

const STYLESHEET: &str = r#"
@page {
    size: A4;
    margin: 10mm;
}
body {
    font-family: Arial, sans-serif;
    margin: 0;
    padding: 0;
}
.page {
    width: 210mm;
    height: 297mm;
    padding: 10mm;
    box-sizing: border-box;
    page-break-after: always;
}
.label-container {
    display: grid;
    grid-template-columns: repeat(__COLUMNS__, 1fr);
    grid-template-rows: repeat(__ROWS__, 1fr);
    gap: 5mm;
    height: 100%;
}
.label {
    border: 1px solid black;
    padding: 2mm;
    width: 90mm;
    height: 35mm;
    box-sizing: border-box;
    page-break-inside: avoid;
    font-size: 8pt;
    display: flex;
    flex-direction: column;
    position: relative;
}
.info-row {
    display: flex;
    justify-content: space-between;
    align-items: flex-start;
    margin-bottom: 1mm;
    flex-wrap: wrap;
}
.info-item {
    flex: 1 1 auto;
    min-width: 45%;
    margin-bottom: 1mm;
    line-height: 1.2;
}
.material-name {
    width: 100%;
    word-break: break-all;
    white-space: normal;
    line-height: 1.2;
    margin-bottom: 1mm;
    margin-top: 1mm;
}
.contract-no {
    font-weight: bold;
    margin-bottom: 1mm;
    font-size: 9pt;
}
.plain {
    line-height: 1.2;
    margin-bottom: 1mm;
}
.supplier {
    position: absolute;
    bottom: 2mm;
    right: 2mm;
    font-size: 7pt;
}
"#;

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_line(html: &mut String, line: &LabelLine) {
    let joined = || escape_html(&line.items.join(" "));
    match line.role {
        LineRole::Heading => {
            html.push_str(&format!("<div class=\"contract-no\">{}</div>", joined()));
        }
        LineRole::Info => {
            html.push_str("<div class=\"info-row\">");
            for item in &line.items {
                html.push_str(&format!("<div class=\"info-item\">{}</div>", escape_html(item)));
            }
            html.push_str("</div>");
        }
        LineRole::Wrap => {
            html.push_str(&format!("<div class=\"material-name\">{}</div>", joined()));
        }
        LineRole::Footer => {
            html.push_str(&format!("<div class=\"supplier\">{}</div>", joined()));
        }
        LineRole::Plain => {
            html.push_str(&format!("<div class=\"plain\">{}</div>", joined()));
        }
    }
}

fn render_label(html: &mut String, label: &Label) {
    html.push_str("<div class=\"label\">");
    for line in &label.lines {
        render_line(html, line);
    }
    html.push_str("</div>");
}

/// Render pages laid out on `grid` into a complete HTML document.
pub fn render_pages(pages: &[Page<Label>], grid: GridSpec) -> String {
    let style = STYLESHEET
        .replace("__COLUMNS__", &grid.columns.to_string())
        .replace("__ROWS__", &grid.rows.to_string());

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>labels</title>\n<style>");
    html.push_str(&style);
    html.push_str("</style>\n</head>\n<body>\n");

    for page in pages {
        html.push_str("<div class=\"page\"><div class=\"label-container\">");
        for slot in &page.slots {
            match slot {
                Slot::Filled(label) => render_label(&mut html, label),
                Slot::Blank => html.push_str("<div class=\"label\"></div>"),
            }
        }
        html.push_str("</div></div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::paginate;

    fn label(text: &str) -> Label {
        Label {
            lines: vec![
                LabelLine {
                    role: LineRole::Heading,
                    items: vec![format!("合同编号：{}", text)],
                },
                LabelLine {
                    role: LineRole::Info,
                    items: vec!["序号：1".into(), "计划号：P".into()],
                },
                LabelLine {
                    role: LineRole::Footer,
                    items: vec!["供应商：横店华达彩印".into()],
                },
            ],
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>A&B</b>"), "&lt;b&gt;A&amp;B&lt;/b&gt;");
        assert_eq!(escape_html("物料\"名称\""), "物料&quot;名称&quot;");
    }

    #[test]
    fn test_single_page_has_fourteen_label_blocks() {
        let pages = paginate(vec![label("A"), label("B")], GridSpec::A4_LABELS);
        let html = render_pages(&pages, GridSpec::A4_LABELS);
        assert_eq!(html.matches("<div class=\"page\">").count(), 1);
        assert_eq!(html.matches("<div class=\"label\">").count(), 14);
        assert_eq!(html.matches("<div class=\"label\"></div>").count(), 12);
        assert!(html.contains("<div class=\"contract-no\">合同编号：A</div>"));
        assert!(html.contains("<div class=\"info-item\">计划号：P</div>"));
        assert!(html.contains("<div class=\"supplier\">供应商：横店华达彩印</div>"));
    }

    #[test]
    fn test_stylesheet_matches_grid() {
        let html = render_pages(&[], GridSpec::A4_LABELS);
        assert!(html.contains("grid-template-columns: repeat(2, 1fr);"));
        assert!(html.contains("grid-template-rows: repeat(7, 1fr);"));
        assert!(html.contains("size: A4;"));
        assert!(!html.contains("<div class=\"page\">"));
    }

    #[test]
    fn test_values_are_escaped() {
        let pages = paginate(vec![label("<script>")], GridSpec::A4_LABELS);
        let html = render_pages(&pages, GridSpec::A4_LABELS);
        assert!(html.contains("合同编号：&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
