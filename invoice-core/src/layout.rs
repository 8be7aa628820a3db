use std::io::Write;

use chrono::NaiveDate;

use crate::canvas::{Color, DocumentCanvas, ImageId};
use crate::error::RenderError;
use crate::fonts::{BuiltinFont, FontRef, TextStyle};
use crate::format::{format_currency, format_date};
use crate::invoice::InvoiceRecord;
use crate::text::wrap_text;
use crate::typeface::{self, TypefaceSource};

/// ISO A4 in points.
pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;
/// Page margin on all sides.
pub const MARGIN: f64 = 50.0;

// ── palette ───────────────────────────────────────────────────────

const PRIMARY: Color = Color::rgb(0.13, 0.16, 0.23);
const ACCENT: Color = Color::rgb(0.23, 0.45, 0.87);
const DARK_GRAY: Color = Color::gray(0.2);
const MEDIUM_GRAY: Color = Color::gray(0.45);
const LIGHT_GRAY: Color = Color::gray(0.62);
const HEADER_TINT: Color = Color::rgb(0.95, 0.96, 0.98);
const BORDER_GRAY: Color = Color::gray(0.78);
/// Near-white stripe for odd table rows.
const STRIPE_TINT: Color = Color::gray(0.98);

// ── geometry ──────────────────────────────────────────────────────

const HEADER_BAND_HEIGHT: f64 = 120.0;
const LOGO_SIZE: f64 = 80.0;
const DETAILS_BOX_WIDTH: f64 = 180.0;
const DETAILS_BOX_HEIGHT: f64 = 50.0;
const TABLE_HEADER_HEIGHT: f64 = 40.0;
const ROW_HEIGHT: f64 = 35.0;
const TOTALS_BOX_WIDTH: f64 = 200.0;
const TOTALS_BOX_HEIGHT: f64 = 60.0;
const FOOTER_BASELINE: f64 = 60.0;
/// Line advance for section labels.
const LABEL_LINE: f64 = 15.0;
/// Line advance for detail lines under a label.
const DETAIL_LINE: f64 = 12.0;
/// Line pitch for wrapped notes text.
const NOTE_LINE: f64 = 12.0;

/// Fraction of the table width given to each column: description,
/// quantity, unit price, total.
const COLUMN_RATIOS: [f64; 4] = [0.50, 0.15, 0.175, 0.175];

/// Vertical position of the layout pass. Threaded through each band
/// by value; bands return the cursor for the band below them.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cursor {
    y: f64,
}

impl Cursor {
    fn advance(self, dy: f64) -> Cursor {
        Cursor { y: self.y - dy }
    }
}

/// The regular, bold and oblique faces resolved for one render.
#[derive(Debug, Clone, Copy)]
struct FontSet {
    regular: FontRef,
    bold: FontRef,
    oblique: FontRef,
}

impl FontSet {
    const BUILTIN: FontSet = FontSet {
        regular: FontRef::Builtin(BuiltinFont::Courier),
        bold: FontRef::Builtin(BuiltinFont::CourierBold),
        oblique: FontRef::Builtin(BuiltinFont::CourierOblique),
    };

    fn regular(&self, size: f64) -> TextStyle {
        TextStyle::new(self.regular, size)
    }

    fn bold(&self, size: f64) -> TextStyle {
        TextStyle::new(self.bold, size)
    }

    fn oblique(&self, size: f64) -> TextStyle {
        TextStyle::new(self.oblique, size)
    }
}

/// Renders an [`InvoiceRecord`] to a single-page A4 PDF.
///
/// One synchronous top-down pass with a vertical cursor; no content
/// reflows and no second page is ever started. A record with more
/// line items than fit the page overflows the canvas silently, so
/// callers keep item counts small.
#[derive(Debug, Clone)]
pub struct Renderer {
    typefaces: TypefaceSource,
    compress: bool,
    generated_on: Option<NaiveDate>,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer {
            typefaces: TypefaceSource::default(),
            compress: true,
            generated_on: None,
        }
    }
}

impl Renderer {
    pub fn new() -> Self {
        Renderer::default()
    }

    /// Where to acquire the regular and bold faces.
    pub fn typeface_source(mut self, source: TypefaceSource) -> Self {
        self.typefaces = source;
        self
    }

    /// Toggle content-stream compression. On by default.
    pub fn compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Pin the "Generated on" footer date. Defaults to the local
    /// calendar date at render time.
    pub fn generated_on(mut self, date: NaiveDate) -> Self {
        self.generated_on = Some(date);
        self
    }

    /// Render the record to PDF bytes. Fails only if the logo cannot
    /// be decoded or the document cannot be serialized; typeface
    /// acquisition problems fall back to the builtin family and never
    /// abort the render.
    pub fn render(&self, record: &InvoiceRecord) -> Result<Vec<u8>, RenderError> {
        let mut canvas = DocumentCanvas::new(Vec::new())?;
        canvas.set_compression(self.compress);
        canvas.set_info("Title", &format!("Invoice {}", record.invoice_number));

        let fonts = self.resolve_fonts(&mut canvas);

        let logo = match &record.logo {
            Some(logo) => Some(canvas.load_image(logo.bytes.clone())?),
            None => None,
        };

        canvas.begin_page(PAGE_WIDTH, PAGE_HEIGHT);

        let cursor = Cursor {
            y: PAGE_HEIGHT - MARGIN,
        };
        let cursor = draw_header_band(&mut canvas, record, logo, &fonts, cursor);
        let cursor = draw_parties_band(&mut canvas, record, &fonts, cursor);
        let (cursor, subtotal) = draw_items_table(&mut canvas, record, &fonts, cursor);
        let cursor = draw_notes(&mut canvas, record, &fonts, cursor);
        draw_totals_box(&mut canvas, subtotal, &fonts, cursor);
        draw_footer(&mut canvas, record, &fonts, self.render_date());

        canvas.end_page()?;
        let bytes = canvas.end_document()?;
        log::debug!(
            "rendered invoice {} ({} items, {} bytes)",
            record.invoice_number,
            record.items.len(),
            bytes.len(),
        );
        Ok(bytes)
    }

    fn render_date(&self) -> NaiveDate {
        self.generated_on
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Resolve the font set, embedding the remote family when it can
    /// be acquired and substituting the builtin trio otherwise.
    fn resolve_fonts<W: Write>(&self, canvas: &mut DocumentCanvas<W>) -> FontSet {
        match &self.typefaces {
            TypefaceSource::Builtin => FontSet::BUILTIN,
            TypefaceSource::Remote {
                regular_url,
                bold_url,
            } => typeface::attempt_or(
                || {
                    let (regular, bold) = typeface::fetch_pair(regular_url, bold_url)?;
                    let regular = canvas.embed_typeface(regular)?;
                    let bold = canvas.embed_typeface(bold)?;
                    Ok(FontSet {
                        regular: FontRef::Embedded(regular),
                        bold: FontRef::Embedded(bold),
                        // Only regular and bold are fetched; the
                        // oblique slot always uses the builtin face.
                        oblique: FontRef::Builtin(BuiltinFont::CourierOblique),
                    })
                },
                FontSet::BUILTIN,
            ),
        }
    }
}

// ── bands ─────────────────────────────────────────────────────────

/// Tinted band across the top: logo, company heading and the
/// bordered invoice-details box.
fn draw_header_band<W: Write>(
    canvas: &mut DocumentCanvas<W>,
    record: &InvoiceRecord,
    logo: Option<ImageId>,
    fonts: &FontSet,
    cursor: Cursor,
) -> Cursor {
    let band_bottom = PAGE_HEIGHT - HEADER_BAND_HEIGHT;

    canvas.save_state();
    canvas.set_fill_color(HEADER_TINT);
    canvas.fill_rect(0.0, band_bottom, PAGE_WIDTH, HEADER_BAND_HEIGHT);
    canvas.restore_state();

    if let Some(image) = logo {
        canvas.place_image(image, MARGIN, band_bottom + 20.0, LOGO_SIZE, LOGO_SIZE);
    }

    let company = display_or(&record.company_name, "Your Company Name");
    canvas.save_state();
    canvas.set_fill_color(PRIMARY);
    canvas.place_text(company, MARGIN + LOGO_SIZE + 20.0, band_bottom + 55.0, &fonts.bold(20.0));
    canvas.restore_state();

    let box_x = PAGE_WIDTH - MARGIN - DETAILS_BOX_WIDTH;
    let box_top = PAGE_HEIGHT - 30.0;
    canvas.save_state();
    canvas.set_fill_color(Color::gray(1.0));
    canvas.fill_rect(box_x, box_top - DETAILS_BOX_HEIGHT, DETAILS_BOX_WIDTH, DETAILS_BOX_HEIGHT);
    canvas.set_stroke_color(BORDER_GRAY);
    canvas.set_line_width(1.0);
    canvas.stroke_rect(box_x, box_top - DETAILS_BOX_HEIGHT, DETAILS_BOX_WIDTH, DETAILS_BOX_HEIGHT);
    canvas.set_fill_color(DARK_GRAY);
    canvas.place_text(
        &format!("Invoice #{}", record.invoice_number),
        box_x + 10.0,
        box_top - 20.0,
        &fonts.bold(10.0),
    );
    canvas.place_text(
        &format!("Date: {}", format_date(record.invoice_date)),
        box_x + 10.0,
        box_top - 38.0,
        &fonts.regular(9.0),
    );
    canvas.restore_state();

    cursor.advance(100.0)
}

/// Two independent columns: who the invoice is from and who it bills.
/// Absent optional lines draw nothing and consume no space.
fn draw_parties_band<W: Write>(
    canvas: &mut DocumentCanvas<W>,
    record: &InvoiceRecord,
    fonts: &FontSet,
    cursor: Cursor,
) -> Cursor {
    let label = fonts.bold(10.0);
    let detail = fonts.regular(10.0);

    let mut left = cursor;
    canvas.save_state();
    canvas.set_fill_color(MEDIUM_GRAY);
    canvas.place_text(
        &format!("Due: {}", format_date(record.due_date)),
        MARGIN,
        left.y,
        &detail,
    );
    canvas.restore_state();
    left = left.advance(LABEL_LINE);

    canvas.set_fill_color(DARK_GRAY);
    canvas.place_text("From:", MARGIN, left.y, &label);
    left = left.advance(LABEL_LINE);
    canvas.place_text(
        display_or(&record.company_name, "Your Company Name"),
        MARGIN,
        left.y,
        &detail,
    );
    left = left.advance(DETAIL_LINE);
    for line in contact_lines(&record.company_email, &record.company_phone) {
        canvas.place_text(line, MARGIN, left.y, &detail);
        left = left.advance(DETAIL_LINE);
    }

    let right_x = PAGE_WIDTH / 2.0 + 20.0;
    let mut right = cursor;
    canvas.place_text("Bill To:", right_x, right.y, &label);
    right = right.advance(LABEL_LINE);
    canvas.place_text(
        display_or(&record.client_name, "Client Company Inc."),
        right_x,
        right.y,
        &detail,
    );
    right = right.advance(DETAIL_LINE);
    for line in contact_lines(&record.client_email, &record.client_phone) {
        canvas.place_text(line, right_x, right.y, &detail);
        right = right.advance(DETAIL_LINE);
    }

    Cursor { y: left.y.min(right.y) }.advance(40.0)
}

/// The line-item grid: tinted header row, fixed-height striped data
/// rows, hairline row separators and vertical column rules. Returns
/// the cursor below the table and the accumulated subtotal.
fn draw_items_table<W: Write>(
    canvas: &mut DocumentCanvas<W>,
    record: &InvoiceRecord,
    fonts: &FontSet,
    cursor: Cursor,
) -> (Cursor, f64) {
    let table_x = MARGIN;
    let table_width = PAGE_WIDTH - 2.0 * MARGIN;
    let header_top = cursor.y;

    // Column left edges, then the table's right edge.
    let mut edges = Vec::with_capacity(COLUMN_RATIOS.len() + 1);
    let mut x = table_x;
    for ratio in COLUMN_RATIOS {
        edges.push(x);
        x += table_width * ratio;
    }
    edges.push(table_x + table_width);

    canvas.save_state();
    canvas.set_fill_color(HEADER_TINT);
    canvas.fill_rect(
        table_x,
        header_top - TABLE_HEADER_HEIGHT,
        table_width,
        TABLE_HEADER_HEIGHT,
    );
    canvas.restore_state();

    let header_style = fonts.bold(10.0);
    let header_baseline = header_top - 25.0;
    canvas.set_fill_color(DARK_GRAY);
    canvas.place_text("Description", edges[0] + 10.0, header_baseline, &header_style);
    canvas.place_text("Qty", edges[1] + 10.0, header_baseline, &header_style);
    place_right_aligned(canvas, "Unit Price", edges[3] - 10.0, header_baseline, &header_style);
    place_right_aligned(canvas, "Total", edges[4] - 10.0, header_baseline, &header_style);

    let body_style = fonts.regular(10.0);
    let mut subtotal = 0.0;
    for (index, item) in record.items.iter().enumerate() {
        let row_top = header_top - TABLE_HEADER_HEIGHT - index as f64 * ROW_HEIGHT;
        let row_bottom = row_top - ROW_HEIGHT;

        if index % 2 == 1 {
            canvas.save_state();
            canvas.set_fill_color(STRIPE_TINT);
            canvas.fill_rect(table_x, row_bottom, table_width, ROW_HEIGHT);
            canvas.restore_state();
        }

        canvas.save_state();
        canvas.set_stroke_color(BORDER_GRAY);
        canvas.set_line_width(0.5);
        canvas.line(table_x, row_bottom, table_x + table_width, row_bottom);
        canvas.restore_state();

        let baseline = row_top - 21.0;
        canvas.set_fill_color(DARK_GRAY);
        canvas.place_text(&item.description, edges[0] + 10.0, baseline, &body_style);
        canvas.place_text(&item.quantity.to_string(), edges[1] + 10.0, baseline, &body_style);
        place_right_aligned(
            canvas,
            &format_currency(item.unit_price),
            edges[3] - 10.0,
            baseline,
            &body_style,
        );
        place_right_aligned(
            canvas,
            &format_currency(item.total),
            edges[4] - 10.0,
            baseline,
            &body_style,
        );

        subtotal += item.total;
    }

    let table_bottom = header_top - TABLE_HEADER_HEIGHT - record.items.len() as f64 * ROW_HEIGHT;

    canvas.save_state();
    canvas.set_stroke_color(BORDER_GRAY);
    canvas.set_line_width(0.5);
    for &edge in &edges {
        canvas.line(edge, header_top, edge, table_bottom);
    }
    canvas.restore_state();

    (Cursor { y: table_bottom }.advance(30.0), subtotal)
}

/// Optional free-text notes, word-wrapped at 9pt into the column
/// left of the totals box.
fn draw_notes<W: Write>(
    canvas: &mut DocumentCanvas<W>,
    record: &InvoiceRecord,
    fonts: &FontSet,
    cursor: Cursor,
) -> Cursor {
    let notes = match record.notes.as_deref() {
        Some(text) if !text.trim().is_empty() => text,
        _ => return cursor,
    };

    let mut cursor = cursor;
    canvas.set_fill_color(DARK_GRAY);
    canvas.place_text("Notes:", MARGIN, cursor.y, &fonts.bold(10.0));
    cursor = cursor.advance(LABEL_LINE);

    let style = fonts.regular(9.0);
    let wrap_width = PAGE_WIDTH - 2.0 * MARGIN - 200.0;
    let lines = wrap_text(notes, wrap_width, |s| canvas.measure_text(s, &style));

    canvas.save_state();
    canvas.set_fill_color(MEDIUM_GRAY);
    for line in &lines {
        canvas.place_text(line, MARGIN, cursor.y, &style);
        cursor = cursor.advance(NOTE_LINE);
    }
    canvas.restore_state();
    cursor
}

/// Bordered accent box with the accumulated total, anchored at the
/// right margin.
fn draw_totals_box<W: Write>(
    canvas: &mut DocumentCanvas<W>,
    subtotal: f64,
    fonts: &FontSet,
    cursor: Cursor,
) {
    let box_x = PAGE_WIDTH - MARGIN - TOTALS_BOX_WIDTH;
    let box_top = cursor.y;
    let box_bottom = box_top - TOTALS_BOX_HEIGHT;

    canvas.save_state();
    canvas.set_stroke_color(ACCENT);
    canvas.set_line_width(1.5);
    canvas.stroke_rect(box_x, box_bottom, TOTALS_BOX_WIDTH, TOTALS_BOX_HEIGHT);

    canvas.set_fill_color(DARK_GRAY);
    canvas.place_text("Total Due:", box_x + 12.0, box_top - 24.0, &fonts.bold(12.0));

    let amount = format_currency(subtotal);
    let amount_style = fonts.bold(12.0);
    canvas.set_fill_color(ACCENT);
    place_right_aligned(
        canvas,
        &amount,
        box_x + TOTALS_BOX_WIDTH - 12.0,
        box_top - 45.0,
        &amount_style,
    );
    canvas.restore_state();
}

/// Footer rule, optional UPI payment line, and the generation stamp.
fn draw_footer<W: Write>(
    canvas: &mut DocumentCanvas<W>,
    record: &InvoiceRecord,
    fonts: &FontSet,
    render_date: NaiveDate,
) {
    canvas.save_state();
    canvas.set_stroke_color(BORDER_GRAY);
    canvas.set_line_width(0.5);
    canvas.line(
        MARGIN,
        FOOTER_BASELINE + 20.0,
        PAGE_WIDTH - MARGIN,
        FOOTER_BASELINE + 20.0,
    );
    canvas.restore_state();

    if let Some(upi) = present(&record.upi_id) {
        canvas.save_state();
        canvas.set_fill_color(DARK_GRAY);
        canvas.place_text(
            &format!("UPI ID: {}", upi),
            MARGIN,
            FOOTER_BASELINE,
            &fonts.regular(9.0),
        );
        canvas.restore_state();
    }

    let stamp = format!("Generated on {}", format_date(render_date));
    let style = fonts.oblique(9.0);
    canvas.save_state();
    canvas.set_fill_color(LIGHT_GRAY);
    place_right_aligned(canvas, &stamp, PAGE_WIDTH - MARGIN, FOOTER_BASELINE, &style);
    canvas.restore_state();
}

// ── helpers ───────────────────────────────────────────────────────

/// Substitute a placeholder for empty display names.
fn display_or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

/// An optional field counts as present only when it has content.
/// Empty strings behave exactly like `None`: nothing is drawn and no
/// vertical space is consumed.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// The email and phone lines of a party column, skipping absent and
/// empty fields.
fn contact_lines<'a>(
    email: &'a Option<String>,
    phone: &'a Option<String>,
) -> impl Iterator<Item = &'a str> {
    present(email).into_iter().chain(present(phone))
}

/// Place text so its right edge lands on `right_x`.
fn place_right_aligned<W: Write>(
    canvas: &mut DocumentCanvas<W>,
    text: &str,
    right_x: f64,
    y: f64,
    style: &TextStyle,
) {
    let width = canvas.measure_text(text, style);
    canvas.place_text(text, right_x - width, y, style);
}
