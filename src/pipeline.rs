//! End-to-end label runs
//!
//! Each function performs one invocation: ingest the upload, validate and
//! normalize it, paginate, render and wrap the result in an [`Artifact`].
//! Any error aborts the run before anything is rendered.

use crate::delivery::Artifact;
use crate::error::Result;
use crate::html_renderer;
use crate::ingest::{self, SourceTable};
use crate::label::assemble_all;
use crate::layout::{GridSpec, LabelsPerRow, arrange_rows, paginate};
use crate::normalize::{FilteredRowSet, validate_and_normalize};
use crate::pdf_generator::{self, LabelSheetOptions};
use crate::schema::LabelSchema;
use std::path::Path;

/// Ingest and validate an upload held in memory.
pub fn prepare(bytes: &[u8], schema: &LabelSchema) -> Result<FilteredRowSet> {
    let table = ingest::read_first_sheet(bytes)?;
    prepare_table(&table, schema)
}

pub fn prepare_table(table: &SourceTable, schema: &LabelSchema) -> Result<FilteredRowSet> {
    let rows = validate_and_normalize(table, schema)?;
    log::info!("{} (schema '{}')", rows.summary(), schema.name);
    Ok(rows)
}

/// An HTML sheet and the number of printed pages in it.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlSheet {
    pub artifact: Artifact,
    pub pages: usize,
}

/// Render validated rows as the A4 HTML label sheet.
pub fn render_html(rows: &FilteredRowSet, schema: &LabelSchema) -> Result<HtmlSheet> {
    let template = schema.compile_template()?;
    let grid = GridSpec::A4_LABELS;
    let pages = paginate(assemble_all(&template, rows), grid);
    log::info!("Rendering {} labels on {} HTML pages", rows.len(), pages.len());
    Ok(HtmlSheet {
        artifact: Artifact::html(html_renderer::render_pages(&pages, grid)),
        pages: pages.len(),
    })
}

/// Render validated rows as the PDF label table.
pub fn render_pdf(rows: &FilteredRowSet, schema: &LabelSchema, per_row: LabelsPerRow) -> Result<Artifact> {
    let template = schema.compile_template()?;
    let runs = arrange_rows(assemble_all(&template, rows), per_row);
    log::info!(
        "Rendering {} labels in {} rows of {}",
        rows.len(),
        runs.len(),
        per_row.get()
    );
    let document = pdf_generator::render_label_sheet(&runs, per_row, &LabelSheetOptions::default());
    Ok(Artifact::pdf(document))
}

pub fn html_labels(bytes: &[u8], schema: &LabelSchema) -> Result<Artifact> {
    let rows = prepare(bytes, schema)?;
    Ok(render_html(&rows, schema)?.artifact)
}

pub fn pdf_labels(bytes: &[u8], schema: &LabelSchema, per_row: LabelsPerRow) -> Result<Artifact> {
    let rows = prepare(bytes, schema)?;
    render_pdf(&rows, schema, per_row)
}

pub fn html_labels_from_path<P: AsRef<Path>>(path: P, schema: &LabelSchema) -> Result<Artifact> {
    let rows = prepare_table(&ingest::read_first_sheet_from_path(path)?, schema)?;
    Ok(render_html(&rows, schema)?.artifact)
}

pub fn pdf_labels_from_path<P: AsRef<Path>>(
    path: P,
    schema: &LabelSchema,
    per_row: LabelsPerRow,
) -> Result<Artifact> {
    let rows = prepare_table(&ingest::read_first_sheet_from_path(path)?, schema)?;
    render_pdf(&rows, schema, per_row)
}
