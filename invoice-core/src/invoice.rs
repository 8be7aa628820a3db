use chrono::NaiveDate;

/// One line item. `total` is maintained by the caller whenever
/// quantity or unit price changes; rendering trusts it and only sums
/// it into the running subtotal.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceItem {
    pub id: String,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
}

impl InvoiceItem {
    /// Create an item with `total` computed from quantity and unit
    /// price, the way the editing layer keeps it in sync.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        quantity: f64,
        unit_price: f64,
    ) -> Self {
        InvoiceItem {
            id: id.into(),
            description: description.into(),
            quantity,
            unit_price,
            total: quantity * unit_price,
        }
    }
}

/// A user-supplied logo. The media type is what the upload form
/// declared; the renderer sniffs the real format from the bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Logo {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

/// Everything the layout engine needs to render one invoice. Built
/// by the collaborating UI layer immediately before rendering;
/// treated as immutable for the duration of the render.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRecord {
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub company_name: String,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    /// Carried in form state but not rendered anywhere.
    pub agency_name: Option<String>,
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub upi_id: Option<String>,
    pub items: Vec<InvoiceItem>,
    pub logo: Option<Logo>,
    pub notes: Option<String>,
}

impl InvoiceRecord {
    /// A record with the given identity and every optional field
    /// absent. Callers fill in the rest field by field.
    pub fn new(
        invoice_number: impl Into<String>,
        invoice_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        InvoiceRecord {
            invoice_number: invoice_number.into(),
            invoice_date,
            due_date,
            company_name: String::new(),
            company_email: None,
            company_phone: None,
            agency_name: None,
            client_name: String::new(),
            client_email: None,
            client_phone: None,
            upi_id: None,
            items: Vec::new(),
            logo: None,
            notes: None,
        }
    }

    /// Sum of the items' `total` fields. Never recomputed from
    /// quantity and unit price.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(|item| item.total).sum()
    }

    /// Suggested download filename for the rendered document.
    pub fn pdf_filename(&self) -> String {
        format!("Invoice-{}.pdf", self.invoice_number)
    }
}
