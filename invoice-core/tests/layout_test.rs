use chrono::NaiveDate;
use invoice_core::{
    InvoiceItem, InvoiceRecord, Logo, RenderError, Renderer, TypefaceSource,
};

/// Check whether a byte pattern exists in the buffer.
fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

fn position(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Offline renderer with deterministic output: builtin fonts, no
/// compression, pinned footer date.
fn renderer() -> Renderer {
    Renderer::new()
        .typeface_source(TypefaceSource::Builtin)
        .compression(false)
        .generated_on(date(2024, 8, 1))
}

/// The reference two-item record: subtotal $700.00.
fn two_item_record() -> InvoiceRecord {
    let mut record = InvoiceRecord::new("INV-2024-042", date(2024, 7, 24), date(2024, 8, 23));
    record.company_name = "Acme Studio".to_string();
    record.company_email = Some("billing@acmestudio.com".to_string());
    record.client_name = "Globex Inc.".to_string();
    record.client_email = Some("accounts@globex.com".to_string());
    record.items = vec![
        InvoiceItem::new("1", "Service Fee", 1.0, 500.0),
        InvoiceItem::new("2", "Consulting Hours", 2.0, 100.0),
    ];
    record
}

/// Encode a small RGB PNG in memory for logo fixtures.
fn tiny_png() -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, 4, 4);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[0x30_u8; 48]).unwrap();
    }
    bytes
}

// -------------------------------------------------------
// Document shape
// -------------------------------------------------------

#[test]
fn render_produces_a_single_a4_page() {
    let bytes = renderer().render(&two_item_record()).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.7"));
    assert!(contains(&bytes, b"/Type /Catalog"));
    assert!(contains(&bytes, b"/Count 1"));
    assert!(contains(&bytes, b"595.28 841.89"));
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.ends_with("%%EOF\n"));
}

#[test]
fn title_carries_the_invoice_number() {
    let bytes = renderer().render(&two_item_record()).unwrap();
    assert!(contains(&bytes, b"(Invoice INV-2024-042)"));
}

// -------------------------------------------------------
// End-to-end reference scenario
// -------------------------------------------------------

#[test]
fn two_item_invoice_totals_seven_hundred() {
    let bytes = renderer().render(&two_item_record()).unwrap();
    assert!(contains(&bytes, b"(Total Due:) Tj"));
    assert!(contains(&bytes, b"($700.00) Tj"));
}

#[test]
fn items_render_in_record_order() {
    let bytes = renderer().render(&two_item_record()).unwrap();
    let first = position(&bytes, b"(Service Fee) Tj").expect("first row");
    let second = position(&bytes, b"(Consulting Hours) Tj").expect("second row");
    assert!(first < second);
}

#[test]
fn row_shading_alternates_starting_unshaded() {
    // The stripe tint appears once for two rows (row index 1 only).
    let bytes = renderer().render(&two_item_record()).unwrap();
    assert_eq!(count(&bytes, b"0.98 0.98 0.98 rg"), 1);

    // With four rows, indices 1 and 3 are shaded.
    let mut record = two_item_record();
    record.items.push(InvoiceItem::new("3", "Hosting", 1.0, 25.0));
    record.items.push(InvoiceItem::new("4", "Support", 1.0, 75.0));
    let bytes = renderer().render(&record).unwrap();
    assert_eq!(count(&bytes, b"0.98 0.98 0.98 rg"), 2);
}

#[test]
fn item_cells_format_quantity_and_currency() {
    let mut record = two_item_record();
    record.items[1].quantity = 2.5;
    record.items[1].unit_price = 100.0;
    record.items[1].total = 250.0;
    let bytes = renderer().render(&record).unwrap();

    assert!(contains(&bytes, b"(2.5) Tj"));
    assert!(contains(&bytes, b"($500.00) Tj"));
    assert!(contains(&bytes, b"($100.00) Tj"));
    assert!(contains(&bytes, b"($250.00) Tj"));
}

#[test]
fn subtotal_trusts_supplied_totals() {
    let mut record = two_item_record();
    // Stale total: quantity * unit_price would give 200.
    record.items[1].total = 150.0;
    let bytes = renderer().render(&record).unwrap();
    assert!(contains(&bytes, b"($650.00) Tj"));
}

#[test]
fn dates_render_in_long_english_form() {
    let bytes = renderer().render(&two_item_record()).unwrap();
    assert!(contains(&bytes, b"(Date: July 24, 2024) Tj"));
    assert!(contains(&bytes, b"(Due: August 23, 2024) Tj"));
    assert!(contains(&bytes, b"(Generated on August 1, 2024) Tj"));
}

// -------------------------------------------------------
// Optional fields
// -------------------------------------------------------

#[test]
fn empty_names_fall_back_to_placeholders() {
    let mut record = two_item_record();
    record.company_name = String::new();
    record.client_name = "  ".to_string();
    let bytes = renderer().render(&record).unwrap();
    assert!(contains(&bytes, b"(Your Company Name) Tj"));
    assert!(contains(&bytes, b"(Client Company Inc.) Tj"));
}

#[test]
fn absent_optionals_draw_nothing() {
    let record = two_item_record();
    let bytes = renderer().render(&record).unwrap();
    assert!(!contains(&bytes, b"(UPI ID:"));
    assert!(!contains(&bytes, b"(Notes:) Tj"));
}

#[test]
fn present_optionals_are_drawn() {
    let mut record = two_item_record();
    record.company_phone = Some("+1 555 0100".to_string());
    record.upi_id = Some("acme@upi".to_string());
    record.notes = Some("Payment is due within 30 days.".to_string());
    let bytes = renderer().render(&record).unwrap();

    assert!(contains(&bytes, b"(+1 555 0100) Tj"));
    assert!(contains(&bytes, b"(UPI ID: acme@upi) Tj"));
    assert!(contains(&bytes, b"(Notes:) Tj"));
    assert!(contains(&bytes, b"(Payment is due within 30 days.) Tj"));
}

#[test]
fn empty_optionals_behave_exactly_like_absent_ones() {
    let absent = renderer().render(&two_item_record()).unwrap();

    let mut record = two_item_record();
    record.company_phone = Some(String::new());
    record.client_phone = Some("   ".to_string());
    record.upi_id = Some(String::new());
    record.notes = Some(" ".to_string());
    let empty = renderer().render(&record).unwrap();

    assert_eq!(absent, empty);
}

#[test]
fn long_notes_wrap_across_lines() {
    let mut record = two_item_record();
    record.notes = Some(
        "Payment is due within 30 days of the invoice date. Late payments \
         accrue interest at 1.5 percent per month. Please include the \
         invoice number with your remittance."
            .to_string(),
    );
    let bytes = renderer().render(&record).unwrap();
    assert!(contains(&bytes, b"(Notes:) Tj"));
    // Wrapped text shows up as several short runs, not one long one.
    assert!(!contains(&bytes, b"(Payment is due within 30 days of the invoice date. Late"));
    assert!(contains(&bytes, b"(Payment is due within"));
}

// -------------------------------------------------------
// Logo handling
// -------------------------------------------------------

#[test]
fn png_logo_is_embedded_at_fixed_size() {
    let mut record = two_item_record();
    record.logo = Some(Logo {
        bytes: tiny_png(),
        media_type: "image/png".to_string(),
    });
    let bytes = renderer().render(&record).unwrap();

    assert!(contains(&bytes, b"/Subtype /Image"));
    assert!(contains(&bytes, b"/Im1 Do"));
    assert!(contains(&bytes, b"80 0 0 80 50 741.89 cm"));
}

#[test]
fn logo_media_type_is_advisory_only() {
    // Declared JPEG, actually PNG: the sniffer wins.
    let mut record = two_item_record();
    record.logo = Some(Logo {
        bytes: tiny_png(),
        media_type: "image/jpeg".to_string(),
    });
    let bytes = renderer().render(&record).unwrap();
    assert!(contains(&bytes, b"/Im1 Do"));
    assert!(!contains(&bytes, b"/DCTDecode"));
}

#[test]
fn undecodable_logo_aborts_the_render() {
    let mut record = two_item_record();
    record.logo = Some(Logo {
        bytes: vec![0x00, 0x01, 0x02, 0x03],
        media_type: "image/png".to_string(),
    });
    let result = renderer().render(&record);
    assert!(matches!(result, Err(RenderError::ImageDecode(_))));
}

// -------------------------------------------------------
// Typeface fallback
// -------------------------------------------------------

#[test]
fn unreachable_font_host_still_renders_with_builtins() {
    // Port 9 (discard) refuses connections immediately.
    let source = TypefaceSource::Remote {
        regular_url: "http://127.0.0.1:9/regular.ttf".to_string(),
        bold_url: "http://127.0.0.1:9/bold.ttf".to_string(),
    };
    let bytes = Renderer::new()
        .typeface_source(source)
        .compression(false)
        .generated_on(date(2024, 8, 1))
        .render(&two_item_record())
        .unwrap();

    assert!(contains(&bytes, b"/BaseFont /Courier"));
    assert!(contains(&bytes, b"($700.00) Tj"));
}

// -------------------------------------------------------
// Isolation between renders
// -------------------------------------------------------

#[test]
fn repeated_renders_are_identical() {
    let record = two_item_record();
    let renderer = renderer();
    let first = renderer.render(&record).unwrap();
    let second = renderer.render(&record).unwrap();
    assert_eq!(first, second);
}

#[test]
fn many_items_overflow_without_error() {
    // No pagination: the render succeeds even when rows run past the
    // bottom of the page.
    let mut record = two_item_record();
    record.items = (0..40)
        .map(|i| InvoiceItem::new(i.to_string(), format!("Line {}", i), 1.0, 10.0))
        .collect();
    let bytes = renderer().render(&record).unwrap();
    assert!(contains(&bytes, b"($400.00) Tj"));
}
