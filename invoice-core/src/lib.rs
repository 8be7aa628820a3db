//! Invoice PDF rendering: an [`InvoiceRecord`] in, finished A4 PDF
//! bytes out. Layout is a single top-down pass over one fixed page;
//! there is no pagination, so oversized item lists overflow the
//! canvas silently.

pub mod canvas;
pub mod error;
pub mod fonts;
pub mod format;
pub mod images;
pub mod invoice;
pub mod layout;
pub mod objects;
pub mod text;
pub mod truetype;
pub mod typeface;
pub mod writer;

pub use canvas::{Color, DocumentCanvas, ImageId};
pub use error::{FontEmbedError, ImageDecodeError, RenderError};
pub use fonts::{BuiltinFont, FontRef, TextStyle, TypefaceId};
pub use invoice::{InvoiceItem, InvoiceRecord, Logo};
pub use layout::{Renderer, MARGIN, PAGE_HEIGHT, PAGE_WIDTH};
pub use typeface::TypefaceSource;
