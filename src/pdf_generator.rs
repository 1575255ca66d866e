use crate::label::Label;
use crate::layout::{LabelsPerRow, Run, Slot};
use crate::table_renderer::{
    DefaultTableRenderer, TableRenderer, TableRow, TableStyle, text_width,
};

// --- Page layout ---

/// A4 in PDF points.
pub const A4_WIDTH: f32 = 595.2756;
pub const A4_HEIGHT: f32 = 841.8898;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl PageLayout {
    /// A4 portrait with 30pt margins on every side.
    pub fn a4() -> Self {
        Self::a4_with_margin(30.0)
    }

    pub fn a4_with_margin(margin: f32) -> Self {
        PageLayout {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin_left: margin,
            margin_right: margin,
            margin_top: margin,
            margin_bottom: margin,
        }
    }

    pub fn content_top(&self) -> f32 {
        self.height - self.margin_top
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4()
    }
}

/// Geometry of the outer label table and the nested per-label tables.
#[derive(Debug, Clone)]
pub struct LabelSheetOptions {
    pub layout: PageLayout,
    /// Left/right padding of each outer cell
    pub cell_padding_horizontal: f32,
    /// Top/bottom padding of each outer cell
    pub cell_padding_vertical: f32,
    /// Style of the nested label tables
    pub label_style: TableStyle,
}

impl Default for LabelSheetOptions {
    fn default() -> Self {
        Self {
            layout: PageLayout::a4(),
            cell_padding_horizontal: 5.0,
            cell_padding_vertical: 3.0,
            label_style: TableStyle::default(),
        }
    }
}

// --- Low-level PDF object model ---

pub struct PdfGenerator {
    pub objects: Vec<PdfObj>,
    pub next_id: u32,
}

#[derive(Debug)]
pub struct PdfObj {
    pub id: u32,
    pub generation: u32,
    pub content: String,
    pub is_stream: bool,
    pub stream_data: Option<Vec<u8>>,
}

impl PdfGenerator {
    pub fn new() -> Self {
        PdfGenerator {
            objects: Vec::new(),
            next_id: 1,
        }
    }

    pub fn add_object(&mut self, content: String) -> u32 {
        let id = self.next_id;
        self.objects.push(PdfObj {
            id,
            generation: 0,
            content,
            is_stream: false,
            stream_data: None,
        });
        self.next_id += 1;
        id
    }

    pub fn add_stream_object(&mut self, dictionary: String, data: Vec<u8>) -> u32 {
        let id = self.next_id;
        self.objects.push(PdfObj {
            id,
            generation: 0,
            content: dictionary,
            is_stream: true,
            stream_data: Some(data),
        });
        self.next_id += 1;
        id
    }

    /// Serialize every object, the xref table and a trailer pointing at `root`.
    pub fn generate(&self, root: u32) -> Vec<u8> {
        let mut pdf = Vec::new();

        // PDF header
        pdf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let mut offsets = Vec::with_capacity(self.objects.len());
        for obj in &self.objects {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} {} obj\n", obj.id, obj.generation).as_bytes());
            pdf.extend_from_slice(obj.content.as_bytes());

            if obj.is_stream {
                if let Some(data) = &obj.stream_data {
                    pdf.extend_from_slice(b"stream\n");
                    pdf.extend_from_slice(data);
                    pdf.extend_from_slice(b"\nendstream\n");
                }
            }

            pdf.extend_from_slice(b"endobj\n");
        }

        // xref table
        let xref_offset = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n", self.objects.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }

        // trailer
        pdf.extend_from_slice(b"trailer\n<<\n");
        pdf.extend_from_slice(format!("/Size {}\n", self.objects.len() + 1).as_bytes());
        pdf.extend_from_slice(format!("/Root {} 0 R\n", root).as_bytes());
        pdf.extend_from_slice(b">>\nstartxref\n");
        pdf.extend_from_slice(format!("{}\n", xref_offset).as_bytes());
        pdf.extend_from_slice(b"%%EOF\n");

        pdf
    }
}

impl Default for PdfGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode text for the `UniGB-UCS2-H` CMap as a hex string operand.
///
/// Characters outside the Basic Multilingual Plane have no UCS-2 code and
/// are shown as `?`.
pub fn encode_ucs2_hex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 4 + 2);
    out.push('<');
    for c in text.chars() {
        let code = u16::try_from(c as u32).unwrap_or('?' as u16);
        out.push_str(&format!("{:04X}", code));
    }
    out.push('>');
    out
}

// --- Drawing surface (collects per-page content streams) ---

struct SheetCanvas {
    pages: Vec<Vec<u8>>,
    current: Vec<u8>,
}

impl SheetCanvas {
    fn new() -> Self {
        SheetCanvas {
            pages: Vec::new(),
            current: Vec::new(),
        }
    }

    fn op(&mut self, op: &str) {
        self.current.extend_from_slice(op.as_bytes());
        self.current.push(b'\n');
    }

    fn text(&mut self, x: f32, y: f32, font_size: f32, text: &str) {
        self.op(&format!(
            "BT /F1 {} Tf {:.2} {:.2} Td {} Tj ET",
            font_size,
            x,
            y,
            encode_ucs2_hex(text)
        ));
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: (f32, f32, f32)) {
        self.op(&format!(
            "q {} w {} {} {} RG {:.2} {:.2} m {:.2} {:.2} l S Q",
            width, color.0, color.1, color.2, from.0, from.1, to.0, to.1
        ));
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, width: f32, color: (f32, f32, f32)) {
        self.op(&format!(
            "q {} w {} {} {} RG {:.2} {:.2} {:.2} {:.2} re S Q",
            width, color.0, color.1, color.2, x, y, w, h
        ));
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
    }

    fn finish(mut self) -> Vec<Vec<u8>> {
        self.pages.push(self.current);
        self.pages
    }
}

// --- Label tables ---

/// Nested table rows for one label: one row per label line.
fn label_table_rows(label: &Label) -> (Vec<TableRow>, usize) {
    let columns = label
        .lines
        .iter()
        .map(|l| l.items.len())
        .max()
        .unwrap_or(0)
        .max(2);
    let rows = label
        .lines
        .iter()
        .map(|line| TableRow::spread(&line.items, columns))
        .collect();
    (rows, columns)
}

/// Draw one label as a bordered, grid-lined table whose top-left corner is `(x, top)`.
fn draw_label(
    canvas: &mut SheetCanvas,
    renderer: &dyn TableRenderer,
    style: &TableStyle,
    rows: &[TableRow],
    column_widths: &[f32],
    x: f32,
    top: f32,
) {
    let dims = renderer.calculate_dimensions(rows, style, column_widths);
    let mut y = top;

    for (r, row) in rows.iter().enumerate() {
        let height = dims.row_heights[r];
        if r > 0 {
            canvas.line((x, y), (x + dims.total_width, y), style.grid_line_width, style.grid_color);
        }

        let mut col = 0;
        let mut cell_x = x;
        for (c, cell) in row.cells.iter().enumerate() {
            let end = (col + cell.span).min(dims.num_cols);
            let cell_width: f32 = column_widths[col..end].iter().sum();
            if c > 0 {
                canvas.line((cell_x, y), (cell_x, y - height), style.grid_line_width, style.grid_color);
            }

            let baseline = y - style.padding_vertical - style.font_size;
            for (i, text) in dims.cell_lines[r][c].lines.iter().enumerate() {
                if text.is_empty() {
                    continue;
                }
                let tx = renderer.calculate_text_x(
                    &cell.alignment,
                    cell_x,
                    cell_width,
                    text_width(text, style.font_size),
                    style.padding_horizontal,
                );
                canvas.text(tx, baseline - i as f32 * style.leading, style.font_size, text);
            }

            cell_x += cell_width;
            col = end;
        }
        y -= height;
    }

    canvas.rect(
        x,
        top - dims.total_height,
        dims.total_width,
        dims.total_height,
        style.border_width,
        style.border_color,
    );
}

/// Lay runs of labels out as one continuous table flowing over A4 pages and
/// return the per-page content streams.
fn layout_sheet(runs: &[Run<Label>], per_row: LabelsPerRow, options: &LabelSheetOptions) -> Vec<Vec<u8>> {
    let renderer = DefaultTableRenderer;
    let layout = &options.layout;
    let style = &options.label_style;
    let label_width = layout.content_width() / per_row.get() as f32;
    let inner_width = label_width - options.cell_padding_horizontal * 2.0;

    let mut canvas = SheetCanvas::new();
    let mut y = layout.content_top();

    for run in runs {
        // measure every filled cell first; the run is as tall as its tallest label
        let mut measured = Vec::with_capacity(run.cells.len());
        for slot in &run.cells {
            measured.push(match slot {
                Slot::Filled(label) => {
                    let (rows, columns) = label_table_rows(label);
                    let widths = vec![inner_width / columns as f32; columns];
                    let height = renderer.calculate_dimensions(&rows, style, &widths).total_height;
                    Some((rows, widths, height))
                }
                Slot::Blank => None,
            });
        }
        let tallest = measured
            .iter()
            .flatten()
            .map(|(_, _, h)| *h)
            .fold(0.0_f32, f32::max);
        let run_height = tallest + options.cell_padding_vertical * 2.0;

        if y - run_height < layout.margin_bottom && y < layout.content_top() {
            canvas.new_page();
            y = layout.content_top();
        }

        for (idx, cell) in measured.iter().enumerate() {
            if let Some((rows, widths, height)) = cell {
                let x = layout.margin_left + idx as f32 * label_width + options.cell_padding_horizontal;
                // vertically centred inside the outer cell
                let top = y - options.cell_padding_vertical - (tallest - height) / 2.0;
                draw_label(&mut canvas, &renderer, style, rows, widths, x, top);
            }
        }
        y -= run_height;
    }

    canvas.finish()
}

const FONT_NAME: &str = "STSong-Light";

/// Assemble final PDF from per-page content streams
fn assemble_pdf(page_streams: &[Vec<u8>], layout: &PageLayout) -> Vec<u8> {
    let mut generator = PdfGenerator::new();

    let descriptor_id = generator.add_object(format!(
        "<< /Type /FontDescriptor\n\
         /FontName /{}\n\
         /Flags 6\n\
         /FontBBox [-25 -254 1000 880]\n\
         /ItalicAngle 0\n\
         /Ascent 880\n\
         /Descent -120\n\
         /CapHeight 880\n\
         /StemV 93\n\
         >>\n",
        FONT_NAME
    ));
    let cid_font_id = generator.add_object(format!(
        "<< /Type /Font\n\
         /Subtype /CIDFontType0\n\
         /BaseFont /{}\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (GB1) /Supplement 2 >>\n\
         /FontDescriptor {} 0 R\n\
         /DW 1000\n\
         /W [1 95 500]\n\
         >>\n",
        FONT_NAME, descriptor_id
    ));
    let font_id = generator.add_object(format!(
        "<< /Type /Font\n\
         /Subtype /Type0\n\
         /BaseFont /{}\n\
         /Encoding /UniGB-UCS2-H\n\
         /DescendantFonts [{} 0 R]\n\
         >>\n",
        FONT_NAME, cid_font_id
    ));

    // Layout: for each page: content_stream_obj, page_obj; then pages_obj, catalog_obj
    let pages_obj_id = font_id + (page_streams.len() as u32) * 2 + 1;
    let mut page_ids = Vec::with_capacity(page_streams.len());

    for page_stream in page_streams {
        let content_id = generator.add_stream_object(
            format!("<< /Length {} >>\n", page_stream.len()),
            page_stream.clone(),
        );

        let page_dict = format!(
            "<< /Type /Page\n\
             /Parent {} 0 R\n\
             /MediaBox [0 0 {:.4} {:.4}]\n\
             /Contents {} 0 R\n\
             /Resources << /Font << /F1 {} 0 R >> >>\n\
             >>\n",
            pages_obj_id, layout.width, layout.height, content_id, font_id
        );
        page_ids.push(generator.add_object(page_dict));
    }

    let kids: Vec<String> = page_ids.iter().map(|id| format!("{} 0 R", id)).collect();
    let pages_id = generator.add_object(format!(
        "<< /Type /Pages\n\
         /Kids [{}]\n\
         /Count {}\n\
         >>\n",
        kids.join(" "),
        page_ids.len()
    ));
    debug_assert_eq!(pages_id, pages_obj_id);

    let catalog_id = generator.add_object(format!(
        "<< /Type /Catalog\n\
         /Pages {} 0 R\n\
         >>\n",
        pages_id
    ));

    generator.generate(catalog_id)
}

/// Render runs of labels into a complete PDF document.
///
/// An empty run list still yields a valid document with one blank page.
pub fn render_label_sheet(runs: &[Run<Label>], per_row: LabelsPerRow, options: &LabelSheetOptions) -> Vec<u8> {
    let page_streams = layout_sheet(runs, per_row, options);
    log::debug!("Laid out {} label rows on {} PDF pages", runs.len(), page_streams.len());
    assemble_pdf(&page_streams, &options.layout)
}
