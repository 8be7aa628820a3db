//! Sample invoice — renders a realistic record to disk.
//!
//! Stands in for the collaborating UI layer: build a record, render
//! it, write the bytes under the suggested download filename.
//!
//! Run with:
//!   cargo run --bin sample_invoice -p invoice-demos
use chrono::NaiveDate;
use invoice_core::{InvoiceItem, InvoiceRecord, Renderer};

fn main() {
    let mut record = InvoiceRecord::new(
        "INV-2024-0042",
        NaiveDate::from_ymd_opt(2024, 7, 24).expect("valid date"),
        NaiveDate::from_ymd_opt(2024, 8, 23).expect("valid date"),
    );
    record.company_name = "NovaPeak Solutions".to_string();
    record.company_email = Some("info@novapeak.io".to_string());
    record.company_phone = Some("(415) 555-9200".to_string());
    record.client_name = "Acme Corporation".to_string();
    record.client_email = Some("accounts@acme.com".to_string());
    record.upi_id = Some("novapeak@upi".to_string());
    record.items = vec![
        InvoiceItem::new("1", "Web Development Services", 40.0, 150.0),
        InvoiceItem::new("2", "UI/UX Design", 20.0, 125.0),
        InvoiceItem::new("3", "Server Setup & Configuration", 1.0, 500.0),
        InvoiceItem::new("4", "Monthly Maintenance", 3.0, 200.0),
    ];
    record.notes = Some(
        "Payment is due within 30 days. Please include the invoice number \
         with your remittance."
            .to_string(),
    );

    // Tries the remote monospace family first and falls back to the
    // builtin Courier faces when offline.
    match Renderer::new().render(&record) {
        Ok(bytes) => {
            let path = record.pdf_filename();
            std::fs::write(&path, &bytes).expect("write PDF");
            println!("Written to {} ({} bytes)", path, bytes.len());
        }
        Err(err) => {
            eprintln!("render failed: {}", err);
            std::process::exit(1);
        }
    }
}
