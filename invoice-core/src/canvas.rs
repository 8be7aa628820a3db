use std::io::{self, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{FontEmbedError, RenderError};
use crate::fonts::{FontRef, TextStyle, TypefaceId};
use crate::images::{self, ImageFormat};
use crate::objects::{ObjId, PdfObject};
use crate::truetype::Typeface;
use crate::writer::{escape_pdf_string, format_coord, PdfWriter};

const CATALOG_OBJ: ObjId = ObjId(1, 0);
const PAGES_OBJ: ObjId = ObjId(2, 0);
const FONT_REGULAR_OBJ: ObjId = ObjId(3, 0);
const FONT_BOLD_OBJ: ObjId = ObjId(4, 0);
const FONT_OBLIQUE_OBJ: ObjId = ObjId(5, 0);
const FIRST_DYNAMIC_OBJ: u32 = 6;

/// RGB color, each component in 0.0 to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    pub const fn gray(level: f64) -> Self {
        Color {
            r: level,
            g: level,
            b: level,
        }
    }
}

/// Handle to an image registered with [`DocumentCanvas::load_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageId(pub(crate) usize);

struct LoadedImage {
    name: String,
    obj: ObjId,
}

struct PageBuilder {
    width: f64,
    height: f64,
    ops: Vec<u8>,
}

/// A drawing surface over one or more PDF pages.
///
/// Coordinates use PDF's bottom-left origin. Page content flushes to
/// the writer on `end_page`; fonts are written by `end_document`,
/// once the set of used glyphs is final. The builtin Courier family
/// (F1 regular, F2 bold, F3 oblique) is always available; additional
/// TrueType faces can be embedded with [`embed_typeface`].
///
/// [`embed_typeface`]: DocumentCanvas::embed_typeface
pub struct DocumentCanvas<W: Write> {
    writer: PdfWriter<W>,
    info: Vec<(String, String)>,
    compress: bool,
    page_ids: Vec<ObjId>,
    page: Option<PageBuilder>,
    typefaces: Vec<Typeface>,
    images: Vec<LoadedImage>,
    next_obj: u32,
}

impl<W: Write> DocumentCanvas<W> {
    /// Create a canvas writing to the given target. The header and
    /// the builtin font objects are written immediately.
    pub fn new(out: W) -> io::Result<Self> {
        let mut writer = PdfWriter::new(out);
        writer.write_header()?;

        for (id, base) in [
            (FONT_REGULAR_OBJ, "Courier"),
            (FONT_BOLD_OBJ, "Courier-Bold"),
            (FONT_OBLIQUE_OBJ, "Courier-Oblique"),
        ] {
            let font = PdfObject::dict(vec![
                ("Type", PdfObject::name("Font")),
                ("Subtype", PdfObject::name("Type1")),
                ("BaseFont", PdfObject::name(base)),
            ]);
            writer.write_object(id, &font)?;
        }

        Ok(DocumentCanvas {
            writer,
            info: Vec::new(),
            compress: false,
            page_ids: Vec::new(),
            page: None,
            typefaces: Vec::new(),
            images: Vec::new(),
            next_obj: FIRST_DYNAMIC_OBJ,
        })
    }

    /// Set a document info entry (e.g. "Title", "Creator").
    pub fn set_info(&mut self, key: &str, value: &str) -> &mut Self {
        self.info.push((key.to_string(), value.to_string()));
        self
    }

    /// Enable or disable FlateDecode compression of content streams,
    /// raw image pixels and embedded font programs.
    pub fn set_compression(&mut self, compress: bool) -> &mut Self {
        self.compress = compress;
        self
    }

    fn alloc(&mut self) -> ObjId {
        let id = ObjId(self.next_obj, 0);
        self.next_obj += 1;
        id
    }

    fn ops(&mut self) -> &mut Vec<u8> {
        &mut self
            .page
            .as_mut()
            .expect("drawing operation with no open page")
            .ops
    }

    fn push_ops(&mut self, text: &str) -> &mut Self {
        self.ops().extend_from_slice(text.as_bytes());
        self
    }

    // ── pages ──────────────────────────────────────────────────────

    /// Begin a new page with the given size in points. An open page
    /// is closed automatically.
    pub fn begin_page(&mut self, width: f64, height: f64) -> &mut Self {
        if self.page.is_some() {
            // end_page surfaces any write error on the next call.
            let _ = self.end_page();
        }
        self.page = Some(PageBuilder {
            width,
            height,
            ops: Vec::new(),
        });
        self
    }

    /// Close the current page, flushing its content stream and page
    /// dictionary to the writer.
    pub fn end_page(&mut self) -> io::Result<()> {
        let page = self
            .page
            .take()
            .expect("end_page called with no open page");

        let content_id = self.alloc();
        let page_id = self.alloc();

        let content = if self.compress {
            PdfObject::stream(
                vec![("Filter", PdfObject::name("FlateDecode"))],
                deflate(&page.ops)?,
            )
        } else {
            PdfObject::stream(vec![], page.ops)
        };
        self.writer.write_object(content_id, &content)?;

        let page_dict = PdfObject::dict(vec![
            ("Type", PdfObject::name("Page")),
            ("Parent", PdfObject::Reference(PAGES_OBJ)),
            (
                "MediaBox",
                PdfObject::array(vec![
                    PdfObject::Integer(0),
                    PdfObject::Integer(0),
                    PdfObject::Real(page.width),
                    PdfObject::Real(page.height),
                ]),
            ),
            ("Contents", PdfObject::Reference(content_id)),
            ("Resources", self.resources()),
        ]);
        self.writer.write_object(page_id, &page_dict)?;
        self.page_ids.push(page_id);
        Ok(())
    }

    fn resources(&self) -> PdfObject {
        let mut fonts: Vec<(String, PdfObject)> = vec![
            ("F1".to_string(), PdfObject::Reference(FONT_REGULAR_OBJ)),
            ("F2".to_string(), PdfObject::Reference(FONT_BOLD_OBJ)),
            ("F3".to_string(), PdfObject::Reference(FONT_OBLIQUE_OBJ)),
        ];
        for face in &self.typefaces {
            fonts.push((
                face.resource_name().to_string(),
                PdfObject::Reference(face.font_obj),
            ));
        }

        let mut entries = vec![("Font".to_string(), PdfObject::Dictionary(fonts))];
        if !self.images.is_empty() {
            let xobjects = self
                .images
                .iter()
                .map(|img| (img.name.clone(), PdfObject::Reference(img.obj)))
                .collect();
            entries.push(("XObject".to_string(), PdfObject::Dictionary(xobjects)));
        }
        PdfObject::Dictionary(entries)
    }

    // ── graphics state ─────────────────────────────────────────────

    pub fn save_state(&mut self) -> &mut Self {
        self.push_ops("q\n")
    }

    pub fn restore_state(&mut self) -> &mut Self {
        self.push_ops("Q\n")
    }

    pub fn set_fill_color(&mut self, color: Color) -> &mut Self {
        let ops = format!(
            "{} {} {} rg\n",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b),
        );
        self.push_ops(&ops)
    }

    pub fn set_stroke_color(&mut self, color: Color) -> &mut Self {
        let ops = format!(
            "{} {} {} RG\n",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b),
        );
        self.push_ops(&ops)
    }

    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        let ops = format!("{} w\n", format_coord(width));
        self.push_ops(&ops)
    }

    // ── paths ──────────────────────────────────────────────────────

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        let ops = format!("{} {} m\n", format_coord(x), format_coord(y));
        self.push_ops(&ops)
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        let ops = format!("{} {} l\n", format_coord(x), format_coord(y));
        self.push_ops(&ops)
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.push_ops("S\n")
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        let ops = format!(
            "{} {} {} {} re\n",
            format_coord(x),
            format_coord(y),
            format_coord(width),
            format_coord(height),
        );
        self.push_ops(&ops)
    }

    pub fn fill(&mut self) -> &mut Self {
        self.push_ops("f\n")
    }

    /// Fill a rectangle with the current fill color.
    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.rect(x, y, width, height).fill()
    }

    /// Stroke a rectangle outline with the current stroke state.
    pub fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.rect(x, y, width, height).stroke()
    }

    /// Stroke a straight line between two points.
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> &mut Self {
        self.move_to(x1, y1).line_to(x2, y2).stroke()
    }

    // ── text ───────────────────────────────────────────────────────

    /// Place a run of text with its baseline at (x, y).
    pub fn place_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) -> &mut Self {
        let (font_name, show_op) = match style.font {
            FontRef::Builtin(font) => (
                font.pdf_name().to_string(),
                format!("({}) Tj\n", escape_pdf_string(text)),
            ),
            FontRef::Embedded(id) => {
                let face = &mut self.typefaces[id.0];
                (
                    face.resource_name().to_string(),
                    format!("{} Tj\n", face.encode_text_hex(text)),
                )
            }
        };
        let ops = format!(
            "BT\n/{} {} Tf\n{} {} Td\n{}ET\n",
            font_name,
            format_coord(style.size),
            format_coord(x),
            format_coord(y),
            show_op,
        );
        self.push_ops(&ops)
    }

    /// Width of `text` in points when drawn with `style`.
    pub fn measure_text(&self, text: &str, style: &TextStyle) -> f64 {
        match style.font {
            FontRef::Builtin(font) => font.measure_text(text, style.size),
            FontRef::Embedded(id) => self.typefaces[id.0].measure_text(text, style.size),
        }
    }

    // ── fonts ──────────────────────────────────────────────────────

    /// Register a TrueType face for use on subsequent pages. The font
    /// program is written out by `end_document`.
    pub fn embed_typeface(&mut self, data: Vec<u8>) -> Result<TypefaceId, FontEmbedError> {
        let index = self.typefaces.len();
        // F1..F3 are the builtins.
        let resource_name = format!("F{}", index + 4);
        let font_obj = self.alloc();
        let face = Typeface::from_bytes(data, resource_name, font_obj)?;
        self.typefaces.push(face);
        Ok(TypefaceId(index))
    }

    // ── images ─────────────────────────────────────────────────────

    /// Sniff, decode and register image bytes. The image XObject is
    /// written immediately; the returned handle places it on any page.
    pub fn load_image(&mut self, bytes: Vec<u8>) -> Result<ImageId, RenderError> {
        let decoded = images::decode_image(bytes)?;

        let smask_obj = match decoded.alpha {
            Some(ref alpha) => {
                let id = self.alloc();
                let stream = self.image_stream(
                    decoded.width,
                    decoded.height,
                    "DeviceGray",
                    ImageFormat::Png,
                    alpha,
                    None,
                )?;
                self.writer.write_object(id, &stream)?;
                Some(id)
            }
            None => None,
        };

        let obj = self.alloc();
        let stream = self.image_stream(
            decoded.width,
            decoded.height,
            decoded.color_space.pdf_name(),
            decoded.format,
            &decoded.data,
            smask_obj,
        )?;
        self.writer.write_object(obj, &stream)?;

        let index = self.images.len();
        self.images.push(LoadedImage {
            name: format!("Im{}", index + 1),
            obj,
        });
        Ok(ImageId(index))
    }

    fn image_stream(
        &self,
        width: u32,
        height: u32,
        color_space: &str,
        format: ImageFormat,
        data: &[u8],
        smask: Option<ObjId>,
    ) -> io::Result<PdfObject> {
        let mut entries = vec![
            ("Type", PdfObject::name("XObject")),
            ("Subtype", PdfObject::name("Image")),
            ("Width", PdfObject::Integer(width as i64)),
            ("Height", PdfObject::Integer(height as i64)),
            ("ColorSpace", PdfObject::name(color_space)),
            ("BitsPerComponent", PdfObject::Integer(8)),
        ];
        let payload = match format {
            // JPEG streams stay as-is; DCTDecode is the image codec.
            ImageFormat::Jpeg => {
                entries.push(("Filter", PdfObject::name("DCTDecode")));
                data.to_vec()
            }
            ImageFormat::Png if self.compress => {
                entries.push(("Filter", PdfObject::name("FlateDecode")));
                deflate(data)?
            }
            ImageFormat::Png => data.to_vec(),
        };
        if let Some(id) = smask {
            entries.push(("SMask", PdfObject::Reference(id)));
        }
        Ok(PdfObject::stream(entries, payload))
    }

    /// Draw a registered image at (x, y) with the given display size.
    pub fn place_image(
        &mut self,
        image: ImageId,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> &mut Self {
        let name = self.images[image.0].name.clone();
        let ops = format!(
            "q\n{} 0 0 {} {} {} cm\n/{} Do\nQ\n",
            format_coord(width),
            format_coord(height),
            format_coord(x),
            format_coord(y),
            name,
        );
        self.push_ops(&ops)
    }

    // ── finishing ──────────────────────────────────────────────────

    /// Finish the document: embedded fonts, info dictionary, pages
    /// tree, catalog, xref and trailer. Returns the writer.
    pub fn end_document(mut self) -> io::Result<W> {
        if self.page.is_some() {
            self.end_page()?;
        }

        self.write_typeface_objects()?;

        let info_id = if self.info.is_empty() {
            None
        } else {
            let id = self.alloc();
            let entries: Vec<(&str, PdfObject)> = self
                .info
                .iter()
                .map(|(k, v)| (k.as_str(), PdfObject::string(v)))
                .collect();
            let info_obj = PdfObject::dict(entries);
            self.writer.write_object(id, &info_obj)?;
            Some(id)
        };

        let kids: Vec<PdfObject> = self
            .page_ids
            .iter()
            .map(|id| PdfObject::Reference(*id))
            .collect();
        let pages = PdfObject::dict(vec![
            ("Type", PdfObject::name("Pages")),
            ("Kids", PdfObject::Array(kids)),
            ("Count", PdfObject::Integer(self.page_ids.len() as i64)),
        ]);
        self.writer.write_object(PAGES_OBJ, &pages)?;

        let catalog = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::Reference(PAGES_OBJ)),
        ]);
        self.writer.write_object(CATALOG_OBJ, &catalog)?;

        self.writer.write_xref_and_trailer(CATALOG_OBJ, info_id)?;
        Ok(self.writer.into_inner())
    }

    /// Write the Type0 / CIDFontType2 object graph for every
    /// embedded face.
    fn write_typeface_objects(&mut self) -> io::Result<()> {
        let faces = std::mem::take(&mut self.typefaces);
        for face in &faces {
            let cid_id = self.alloc();
            let desc_id = self.alloc();
            let file_id = self.alloc();
            let tounicode_id = self.alloc();

            let raw = face.font_data();
            let mut file_dict = vec![("Length1", PdfObject::Integer(raw.len() as i64))];
            let file_data = if self.compress {
                file_dict.push(("Filter", PdfObject::name("FlateDecode")));
                deflate(raw)?
            } else {
                raw.to_vec()
            };
            self.writer
                .write_object(file_id, &PdfObject::stream(file_dict, file_data))?;

            let mut descriptor = face.descriptor_entries();
            descriptor.push(("FontFile2", PdfObject::Reference(file_id)));
            self.writer
                .write_object(desc_id, &PdfObject::dict(descriptor))?;

            let cid_font = PdfObject::dict(vec![
                ("Type", PdfObject::name("Font")),
                ("Subtype", PdfObject::name("CIDFontType2")),
                ("BaseFont", PdfObject::name(face.postscript_name())),
                (
                    "CIDSystemInfo",
                    PdfObject::dict(vec![
                        ("Registry", PdfObject::string("Adobe")),
                        ("Ordering", PdfObject::string("Identity")),
                        ("Supplement", PdfObject::Integer(0)),
                    ]),
                ),
                ("FontDescriptor", PdfObject::Reference(desc_id)),
                ("DW", PdfObject::Integer(face.default_width_pdf())),
                ("W", PdfObject::Array(face.widths_array())),
                ("CIDToGIDMap", PdfObject::name("Identity")),
            ]);
            self.writer.write_object(cid_id, &cid_font)?;

            self.writer
                .write_object(tounicode_id, &PdfObject::stream(vec![], face.tounicode_cmap()))?;

            let type0 = PdfObject::dict(vec![
                ("Type", PdfObject::name("Font")),
                ("Subtype", PdfObject::name("Type0")),
                ("BaseFont", PdfObject::name(face.postscript_name())),
                ("Encoding", PdfObject::name("Identity-H")),
                ("DescendantFonts", PdfObject::array(vec![PdfObject::Reference(cid_id)])),
                ("ToUnicode", PdfObject::Reference(tounicode_id)),
            ]);
            self.writer.write_object(face.font_obj, &type0)?;
        }
        Ok(())
    }
}

fn deflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
