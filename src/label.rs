//! Label content assembly
//!
//! A [`Label`] is the text of one sticker: an ordered list of lines, each a
//! list of already formatted items. Assembly is a pure lookup over a compiled
//! template; no values are derived.

use crate::normalize::{FilteredRow, FilteredRowSet};
use crate::schema::{CAPTION_SEPARATOR, CompiledItem, CompiledTemplate, LineRole};

#[derive(Debug, Clone, PartialEq)]
pub struct LabelLine {
    pub role: LineRole,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub lines: Vec<LabelLine>,
}

impl Label {
    /// All item texts in reading order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().flat_map(|l| l.items.iter().map(String::as_str))
    }
}

/// Build the label for one row.
///
/// Field positions come from a template compiled against the same schema the
/// row was validated with, so an out-of-range position is a bug, not bad input.
pub fn assemble(template: &CompiledTemplate, row: &FilteredRow) -> Label {
    let lines = template
        .lines
        .iter()
        .map(|line| LabelLine {
            role: line.role,
            items: line
                .items
                .iter()
                .map(|item| match item {
                    CompiledItem::Field { position, caption } => {
                        format!("{}{}{}", caption, CAPTION_SEPARATOR, row.values[*position])
                    }
                    CompiledItem::Text(text) => text.clone(),
                })
                .collect(),
        })
        .collect();
    Label { lines }
}

pub fn assemble_all(template: &CompiledTemplate, rows: &FilteredRowSet) -> Vec<Label> {
    rows.rows.iter().map(|row| assemble(template, row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::CellValue;
    use crate::schema::LabelSchema;

    fn pdf_row() -> FilteredRow {
        FilteredRow {
            source_row: 2,
            values: vec![
                CellValue::text("C-88"),
                CellValue::text("P-1"),
                CellValue::text("二号仓"),
                CellValue::text("M-7"),
                CellValue::text("瓦楞纸箱 (大)"),
                CellValue::Float(1200.0),
                CellValue::text("2024-05-01"),
            ],
        }
    }

    #[test]
    fn test_pdf_label_lines() {
        let template = LabelSchema::pdf_labels().compile_template().unwrap();
        let label = assemble(&template, &pdf_row());
        let lines: Vec<Vec<&str>> = label
            .lines
            .iter()
            .map(|l| l.items.iter().map(String::as_str).collect())
            .collect();
        assert_eq!(
            lines,
            vec![
                vec!["供应商：横店华达彩印"],
                vec!["合同号：C-88", "计划号：P-1"],
                vec!["送达仓库：二号仓"],
                vec!["材料货号：M-7"],
                vec!["物料名称：瓦楞纸箱 (大)"],
                vec!["采购数量：1200", "交货日期：2024-05-01"],
                vec!["RoHS"],
            ]
        );
    }

    #[test]
    fn test_html_label_uses_completion_as_contract_heading() {
        let template = LabelSchema::html_labels().compile_template().unwrap();
        let mut values = vec![CellValue::text("v"); 8];
        values[0] = CellValue::text("HT-2024-01");
        values[4] = CellValue::Empty;
        let label = assemble(&template, &FilteredRow { source_row: 2, values });

        assert_eq!(label.lines[0].role, LineRole::Heading);
        assert_eq!(label.lines[0].items, vec!["合同编号：HT-2024-01"]);
        // missing values print as an empty value
        assert_eq!(label.lines[2].items[1], "材料货号：");
        assert_eq!(label.lines.last().unwrap().items, vec!["供应商：横店华达彩印"]);
    }

    #[test]
    fn test_values_trace_back_to_cells() {
        let template = LabelSchema::pdf_labels().compile_template().unwrap();
        let row = pdf_row();
        let label = assemble(&template, &row);
        for value in &row.values {
            let shown = value.display();
            assert!(label.texts().any(|t| t.ends_with(&shown)), "{shown} not on label");
        }
    }
}
