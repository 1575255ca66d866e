//! Label schema configuration
//!
//! A [`LabelSchema`] names the spreadsheet columns a run depends on, how rows
//! are filtered, which field carries the delivery date and how each label is
//! laid out. The two built-in schemas reproduce the HTML and PDF label sheets;
//! any other schema can be loaded from JSON.

use crate::error::{LabelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Current schema format version. Files with any other version are rejected.
pub const SCHEMA_VERSION: u32 = 1;

pub const SUPPLIER_TEXT: &str = "供应商：横店华达彩印";
pub const COMPLIANCE_MARKER: &str = "RoHS";

/// Full-width colon used between a caption and its value.
pub const CAPTION_SEPARATOR: char = '：';

/// One required spreadsheet column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Stable identifier used by the row filter and the template
    pub id: String,
    /// Header text exactly as it appears in the sheet (a trailing `*` is part of the name)
    pub column: String,
    /// Default caption printed on the label
    pub label: String,
}

impl FieldSpec {
    pub fn new(id: &str, column: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            column: column.to_string(),
            label: label.to_string(),
        }
    }
}

/// Which rows survive validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowFilter {
    /// Drop a row only when every required field is missing
    AllEmpty,
    /// Drop a row when the key field is missing
    KeyMissing { field: String },
}

/// Visual role of a label line. Renderers map roles to their own styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineRole {
    Heading,
    Info,
    Wrap,
    Footer,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemSpec {
    /// `<caption>：<value>`; the caption defaults to the field's label
    Field {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    /// Static text printed as-is
    Text { text: String },
}

impl ItemSpec {
    pub fn field(field: &str) -> Self {
        ItemSpec::Field {
            field: field.to_string(),
            caption: None,
        }
    }

    pub fn captioned(field: &str, caption: &str) -> Self {
        ItemSpec::Field {
            field: field.to_string(),
            caption: Some(caption.to_string()),
        }
    }

    pub fn text(text: &str) -> Self {
        ItemSpec::Text {
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSpec {
    pub role: LineRole,
    pub items: Vec<ItemSpec>,
}

impl LineSpec {
    pub fn new(role: LineRole, items: Vec<ItemSpec>) -> Self {
        Self { role, items }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSchema {
    pub version: u32,
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub row_filter: RowFilter,
    #[serde(default)]
    pub date_field: Option<String>,
    #[serde(default)]
    pub normalize_dates: bool,
    pub template: Vec<LineSpec>,
}

/// A template whose field references are positions into the schema's field list.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTemplate {
    pub lines: Vec<CompiledLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledLine {
    pub role: LineRole,
    pub items: Vec<CompiledItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompiledItem {
    Field { position: usize, caption: String },
    Text(String),
}

impl LabelSchema {
    /// Schema of the A4 HTML sheet: 8 columns, rows dropped only when fully empty.
    pub fn html_labels() -> Self {
        Self {
            version: SCHEMA_VERSION,
            name: "html-labels".to_string(),
            fields: vec![
                FieldSpec::new("completion", "完成", "完成"),
                FieldSpec::new("contract_no", "合同序号*", "序号"),
                FieldSpec::new("plan_no", "计划号", "计划号"),
                FieldSpec::new("warehouse", "送达仓库", "送达仓库"),
                FieldSpec::new("material_code", "材料货号*", "材料货号"),
                FieldSpec::new("material_name", "物料名称", "物料名称"),
                FieldSpec::new("quantity", "采购数量*", "采购数量"),
                FieldSpec::new("delivery_date", "交货日期", "交货日期"),
            ],
            row_filter: RowFilter::AllEmpty,
            date_field: Some("delivery_date".to_string()),
            normalize_dates: true,
            template: vec![
                LineSpec::new(
                    LineRole::Heading,
                    vec![ItemSpec::captioned("completion", "合同编号")],
                ),
                LineSpec::new(
                    LineRole::Info,
                    vec![
                        ItemSpec::field("contract_no"),
                        ItemSpec::field("plan_no"),
                        ItemSpec::field("quantity"),
                    ],
                ),
                LineSpec::new(
                    LineRole::Info,
                    vec![ItemSpec::field("warehouse"), ItemSpec::field("material_code")],
                ),
                LineSpec::new(LineRole::Wrap, vec![ItemSpec::field("material_name")]),
                LineSpec::new(LineRole::Info, vec![ItemSpec::field("delivery_date")]),
                LineSpec::new(LineRole::Footer, vec![ItemSpec::text(SUPPLIER_TEXT)]),
            ],
        }
    }

    /// Schema of the PDF sheet: 7 columns keyed on the contract number.
    pub fn pdf_labels() -> Self {
        Self {
            version: SCHEMA_VERSION,
            name: "pdf-labels".to_string(),
            fields: vec![
                FieldSpec::new("contract_no", "合同序号*", "合同号"),
                FieldSpec::new("plan_no", "计划号", "计划号"),
                FieldSpec::new("warehouse", "送达仓库", "送达仓库"),
                FieldSpec::new("material_code", "材料货号*", "材料货号"),
                FieldSpec::new("material_name", "物料名称", "物料名称"),
                FieldSpec::new("quantity", "采购数量*", "采购数量"),
                FieldSpec::new("delivery_date", "交货日期", "交货日期"),
            ],
            row_filter: RowFilter::KeyMissing {
                field: "contract_no".to_string(),
            },
            date_field: Some("delivery_date".to_string()),
            normalize_dates: false,
            template: vec![
                LineSpec::new(LineRole::Plain, vec![ItemSpec::text(SUPPLIER_TEXT)]),
                LineSpec::new(
                    LineRole::Plain,
                    vec![ItemSpec::field("contract_no"), ItemSpec::field("plan_no")],
                ),
                LineSpec::new(LineRole::Plain, vec![ItemSpec::field("warehouse")]),
                LineSpec::new(LineRole::Plain, vec![ItemSpec::field("material_code")]),
                LineSpec::new(LineRole::Plain, vec![ItemSpec::field("material_name")]),
                LineSpec::new(
                    LineRole::Plain,
                    vec![ItemSpec::field("quantity"), ItemSpec::field("delivery_date")],
                ),
                LineSpec::new(LineRole::Plain, vec![ItemSpec::text(COMPLIANCE_MARKER)]),
            ],
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let schema: Self = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let schema = Self::from_json(&content)?;
        log::info!("Loaded label schema '{}' from {}", schema.name, path.as_ref().display());
        Ok(schema)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Spreadsheet headers of the required fields, in order.
    pub fn required_columns(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.column.as_str()).collect()
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    pub fn date_position(&self) -> Option<usize> {
        self.date_field.as_deref().and_then(|id| self.position_of(id))
    }

    /// Check the schema is self-consistent.
    pub fn validate(&self) -> Result<()> {
        if self.version != SCHEMA_VERSION {
            return Err(LabelError::InvalidSchema(format!(
                "unsupported schema version {} (expected {})",
                self.version, SCHEMA_VERSION
            )));
        }
        if self.fields.is_empty() {
            return Err(LabelError::InvalidSchema("no required fields".into()));
        }

        let mut ids = HashSet::new();
        let mut columns = HashSet::new();
        for field in &self.fields {
            if !ids.insert(field.id.as_str()) {
                return Err(LabelError::InvalidSchema(format!(
                    "duplicate field id '{}'",
                    field.id
                )));
            }
            if !columns.insert(field.column.as_str()) {
                return Err(LabelError::InvalidSchema(format!(
                    "duplicate column '{}'",
                    field.column
                )));
            }
        }

        if let RowFilter::KeyMissing { field } = &self.row_filter {
            self.require_field(field, "row filter")?;
        }
        if let Some(field) = &self.date_field {
            self.require_field(field, "date field")?;
        }
        self.compile_template().map(|_| ())
    }

    /// Resolve template field references to positions.
    pub fn compile_template(&self) -> Result<CompiledTemplate> {
        let mut lines = Vec::with_capacity(self.template.len());
        for line in &self.template {
            let mut items = Vec::with_capacity(line.items.len());
            for item in &line.items {
                items.push(match item {
                    ItemSpec::Field { field, caption } => {
                        let position = self.require_field(field, "template")?;
                        let caption = caption
                            .clone()
                            .unwrap_or_else(|| self.fields[position].label.clone());
                        CompiledItem::Field { position, caption }
                    }
                    ItemSpec::Text { text } => CompiledItem::Text(text.clone()),
                });
            }
            lines.push(CompiledLine {
                role: line.role,
                items,
            });
        }
        Ok(CompiledTemplate { lines })
    }

    fn require_field(&self, id: &str, used_by: &str) -> Result<usize> {
        self.position_of(id).ok_or_else(|| {
            LabelError::InvalidSchema(format!("{} references unknown field '{}'", used_by, id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_schemas_validate() {
        LabelSchema::html_labels().validate().unwrap();
        LabelSchema::pdf_labels().validate().unwrap();
    }

    #[test]
    fn test_builtin_required_columns() {
        let html = LabelSchema::html_labels();
        assert_eq!(
            html.required_columns(),
            vec!["完成", "合同序号*", "计划号", "送达仓库", "材料货号*", "物料名称", "采购数量*", "交货日期"]
        );
        let pdf = LabelSchema::pdf_labels();
        assert_eq!(pdf.fields.len(), 7);
        assert_eq!(pdf.required_columns()[0], "合同序号*");
    }

    #[test]
    fn test_pdf_template_has_seven_lines() {
        let compiled = LabelSchema::pdf_labels().compile_template().unwrap();
        assert_eq!(compiled.lines.len(), 7);
        assert_eq!(
            compiled.lines[6].items,
            vec![CompiledItem::Text(COMPLIANCE_MARKER.to_string())]
        );
    }

    #[test]
    fn test_caption_override() {
        let compiled = LabelSchema::html_labels().compile_template().unwrap();
        assert_eq!(
            compiled.lines[0].items[0],
            CompiledItem::Field {
                position: 0,
                caption: "合同编号".to_string()
            }
        );
    }

    #[test]
    fn test_json_roundtrip_keeps_schema() {
        let schema = LabelSchema::pdf_labels();
        let json = schema.to_json_pretty().unwrap();
        assert!(json.contains("\"kind\": \"key_missing\""));
        assert_eq!(LabelSchema::from_json(&json).unwrap(), schema);
    }

    #[test]
    fn test_rejects_unknown_template_field() {
        let mut schema = LabelSchema::html_labels();
        schema.template.push(LineSpec::new(LineRole::Plain, vec![ItemSpec::field("colour")]));
        let err = schema.validate().unwrap_err();
        assert!(matches!(err, LabelError::InvalidSchema(msg) if msg.contains("colour")));
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut schema = LabelSchema::html_labels();
        schema.version = 7;
        assert!(matches!(schema.validate(), Err(LabelError::InvalidSchema(_))));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut schema = LabelSchema::pdf_labels();
        schema.fields.push(FieldSpec::new("plan_no", "备注", "备注"));
        assert!(matches!(schema.validate(), Err(LabelError::InvalidSchema(_))));
    }

    #[test]
    fn test_rejects_unknown_key_field() {
        let mut schema = LabelSchema::pdf_labels();
        schema.row_filter = RowFilter::KeyMissing {
            field: "order".into(),
        };
        assert!(matches!(schema.validate(), Err(LabelError::InvalidSchema(_))));
    }
}
