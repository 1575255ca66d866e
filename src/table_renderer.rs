//! Table measurement for PDF label cells
//!
//! This module provides a trait-based approach to laying out the small nested
//! tables that make up one PDF label: wrapping cell text to a column width,
//! measuring row heights and placing text inside a cell.

/// Horizontal placement of text within a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Configuration for table styling
#[derive(Debug, Clone)]
pub struct TableStyle {
    /// Font size of cell text (in points)
    pub font_size: f32,
    /// Distance between baselines of wrapped lines (in points)
    pub leading: f32,
    /// Padding above and below cell text (in points)
    pub padding_vertical: f32,
    /// Padding left and right of cell text (in points)
    pub padding_horizontal: f32,
    /// Outer border width (in points)
    pub border_width: f32,
    /// Inner grid line width (in points)
    pub grid_line_width: f32,
    /// Outer border color (RGB 0-1)
    pub border_color: (f32, f32, f32),
    /// Inner grid line color (RGB 0-1)
    pub grid_color: (f32, f32, f32),
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            leading: 12.0,
            padding_vertical: 3.0,
            padding_horizontal: 6.0,
            border_width: 1.0,
            grid_line_width: 0.5,
            border_color: (0.0, 0.0, 0.0),
            grid_color: (0.5, 0.5, 0.5),
        }
    }
}

/// Represents a single table cell with its content and alignment
#[derive(Debug, Clone)]
pub struct TableCell {
    pub content: String,
    pub alignment: TableAlignment,
    /// Number of grid columns this cell covers
    pub span: usize,
}

impl TableCell {
    pub fn new(content: String, alignment: TableAlignment) -> Self {
        Self {
            content,
            alignment,
            span: 1,
        }
    }

    pub fn left(content: &str) -> Self {
        Self::new(content.to_string(), TableAlignment::Left)
    }

    pub fn with_span(mut self, span: usize) -> Self {
        self.span = span.max(1);
        self
    }
}

/// Represents a table row containing multiple cells
#[derive(Debug, Clone)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    /// Lay `items` over `columns` grid columns. A row with fewer items than
    /// columns stretches its last cell over the remainder.
    pub fn spread(items: &[String], columns: usize) -> Self {
        let count = items.len();
        let cells = items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let span = if idx + 1 == count {
                    columns.saturating_sub(idx).max(1)
                } else {
                    1
                };
                TableCell::left(item).with_span(span)
            })
            .collect();
        Self { cells }
    }
}

/// Measured table dimensions for layout
#[derive(Debug, Clone)]
pub struct TableDimensions {
    pub column_widths: Vec<f32>,
    pub row_heights: Vec<f32>,
    /// Wrapped lines of every cell, indexed `[row][cell]`
    pub cell_lines: Vec<Vec<WrappedLines>>,
    pub total_width: f32,
    pub total_height: f32,
    pub num_cols: usize,
    pub num_rows: usize,
}

/// Line wrapping result for a cell
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLines {
    pub lines: Vec<String>,
    pub line_count: usize,
}

impl WrappedLines {
    pub fn new(lines: Vec<String>) -> Self {
        let line_count = lines.len();
        Self { lines, line_count }
    }

    pub fn empty() -> Self {
        Self::new(vec![String::new()])
    }
}

/// Advance width of one character of the label font, in points.
///
/// The CJK font used for labels has half-width ASCII glyphs and full-width
/// glyphs for everything else.
pub fn char_width(c: char, font_size: f32) -> f32 {
    if c.is_ascii() {
        font_size * 0.5
    } else {
        font_size
    }
}

pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(|c| char_width(c, font_size)).sum()
}

/// Greedily wrap one line of text (no `\n`) to `max_width` points.
fn wrap_segment(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    if text_width(text, font_size) <= max_width {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;

    for c in text.chars() {
        let w = char_width(c, font_size);
        if current_width + w > max_width && !current.is_empty() {
            lines.push(current.trim_end().to_string());
            current = String::new();
            current_width = 0.0;
            if c == ' ' {
                continue;
            }
        }
        current.push(c);
        current_width += w;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Trait for table rendering strategies
///
/// This allows different table measurement implementations to be plugged in.
pub trait TableRenderer {
    /// Measure a table whose column widths are fixed
    fn calculate_dimensions(
        &self,
        rows: &[TableRow],
        style: &TableStyle,
        column_widths: &[f32],
    ) -> TableDimensions;

    /// Wrap text into lines that fit `max_width` points
    fn wrap_text(&self, text: &str, max_width: f32, font_size: f32) -> WrappedLines;

    /// Calculate the X position for text based on alignment
    fn calculate_text_x(
        &self,
        alignment: &TableAlignment,
        cell_x: f32,
        cell_width: f32,
        text_width: f32,
        padding: f32,
    ) -> f32;
}

/// Default implementation of table rendering
#[derive(Debug, Default)]
pub struct DefaultTableRenderer;

impl TableRenderer for DefaultTableRenderer {
    fn calculate_dimensions(
        &self,
        rows: &[TableRow],
        style: &TableStyle,
        column_widths: &[f32],
    ) -> TableDimensions {
        let num_cols = column_widths.len();
        let num_rows = rows.len();
        let mut row_heights = Vec::with_capacity(num_rows);
        let mut cell_lines = Vec::with_capacity(num_rows);

        for row in rows {
            let mut col = 0;
            let mut max_lines = 1;
            let mut wrapped_row = Vec::with_capacity(row.cells.len());
            for cell in &row.cells {
                let end = (col + cell.span).min(num_cols);
                let width: f32 = column_widths[col.min(num_cols)..end].iter().sum();
                let wrapped = self.wrap_text(
                    &cell.content,
                    width - style.padding_horizontal * 2.0,
                    style.font_size,
                );
                max_lines = max_lines.max(wrapped.line_count);
                wrapped_row.push(wrapped);
                col = end;
            }
            row_heights.push(
                style.font_size
                    + (max_lines - 1) as f32 * style.leading
                    + style.padding_vertical * 2.0
                    + (style.leading - style.font_size),
            );
            cell_lines.push(wrapped_row);
        }

        let total_width: f32 = column_widths.iter().sum();
        let total_height: f32 = row_heights.iter().sum();

        TableDimensions {
            column_widths: column_widths.to_vec(),
            row_heights,
            cell_lines,
            total_width,
            total_height,
            num_cols,
            num_rows,
        }
    }

    fn wrap_text(&self, text: &str, max_width: f32, font_size: f32) -> WrappedLines {
        // hard line breaks typed into the cell (Alt+Enter) always start a new line
        let lines: Vec<String> = text
            .split('\n')
            .flat_map(|segment| {
                let segment = segment.strip_suffix('\r').unwrap_or(segment);
                wrap_segment(segment, max_width, font_size)
            })
            .collect();

        if lines.is_empty() {
            return WrappedLines::empty();
        }

        WrappedLines::new(lines)
    }

    fn calculate_text_x(
        &self,
        alignment: &TableAlignment,
        cell_x: f32,
        cell_width: f32,
        text_width: f32,
        padding: f32,
    ) -> f32 {
        match alignment {
            TableAlignment::Left => cell_x + padding,
            TableAlignment::Center => cell_x + (cell_width - text_width) / 2.0,
            TableAlignment::Right => cell_x + cell_width - padding - text_width,
        }
    }
}
