// Performance benchmarks for label generation
//
// Run benchmarks with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use polabels::html_renderer;
use polabels::ingest::{CellValue, SourceTable};
use polabels::label::assemble_all;
use polabels::layout::{GridSpec, LabelsPerRow, arrange_rows, paginate};
use polabels::normalize::validate_and_normalize;
use polabels::pdf_generator::{self, LabelSheetOptions};
use polabels::schema::LabelSchema;

fn order_table(schema: &LabelSchema, rows: usize) -> SourceTable {
    let columns = schema.required_columns().into_iter().map(String::from).collect();
    let width = schema.fields.len();
    let rows = (0..rows)
        .map(|i| {
            let mut values: Vec<CellValue> = (0..width)
                .map(|col| CellValue::Text(format!("物料{}-{}", i, col)))
                .collect();
            values[width - 1] = CellValue::Text(format!("2024/{}/{}", i % 12 + 1, i % 28 + 1));
            values
        })
        .collect();
    SourceTable::new(columns, rows)
}

/// Benchmark validation with date normalization
fn bench_validation(c: &mut Criterion) {
    let schema = LabelSchema::html_labels();
    let mut group = c.benchmark_group("validate_and_normalize");

    for size in [14usize, 140, 1400] {
        let table = order_table(&schema, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, table| {
            b.iter(|| validate_and_normalize(black_box(table), &schema))
        });
    }

    group.finish();
}

/// Benchmark the HTML sheet
fn bench_html_sheet(c: &mut Criterion) {
    let schema = LabelSchema::html_labels();
    let template = schema.compile_template().unwrap();
    let rows = validate_and_normalize(&order_table(&schema, 140), &schema).unwrap();

    c.bench_function("html_sheet_140", |b| {
        b.iter(|| {
            let pages = paginate(assemble_all(&template, black_box(&rows)), GridSpec::A4_LABELS);
            html_renderer::render_pages(&pages, GridSpec::A4_LABELS)
        })
    });
}

/// Benchmark the PDF label table for each row width
fn bench_pdf_sheet(c: &mut Criterion) {
    let schema = LabelSchema::pdf_labels();
    let template = schema.compile_template().unwrap();
    let rows = validate_and_normalize(&order_table(&schema, 140), &schema).unwrap();
    let options = LabelSheetOptions::default();

    let mut group = c.benchmark_group("pdf_sheet_140");

    for per_row in 1..=3u8 {
        let per_row = LabelsPerRow::new(per_row).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(per_row.get()), &per_row, |b, &per_row| {
            b.iter(|| {
                let runs = arrange_rows(assemble_all(&template, black_box(&rows)), per_row);
                pdf_generator::render_label_sheet(&runs, per_row, &options)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_validation, bench_html_sheet, bench_pdf_sheet);
criterion_main!(benches);
