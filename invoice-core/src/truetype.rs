use std::collections::{BTreeMap, BTreeSet};

use crate::error::FontEmbedError;
use crate::objects::{ObjId, PdfObject};

/// An embedded TrueType face: parsed metrics plus the raw font
/// program, ready for Type0/CIDFontType2 embedding.
pub struct Typeface {
    postscript_name: String,
    data: Vec<u8>,
    units_per_em: u16,
    ascent: i16,
    descent: i16,
    bbox: [i16; 4],
    cap_height: i16,
    italic_angle: f64,
    flags: u32,
    stem_v: i16,
    /// Unicode codepoint to glyph ID.
    cmap: BTreeMap<u32, u16>,
    /// Glyph ID to advance width in font units.
    widths: BTreeMap<u16, u16>,
    default_width: u16,
    /// Glyphs shown so far; drives the /W array and ToUnicode CMap.
    used: BTreeSet<u16>,
    /// Glyph ID back to a representative codepoint.
    unicode: BTreeMap<u16, u32>,
    resource_name: String,
    /// Reserved object id for the top-level Type0 font dictionary,
    /// so page resources can reference it before it is written.
    pub(crate) font_obj: ObjId,
}

impl Typeface {
    /// Parse raw `.ttf` bytes.
    pub fn from_bytes(
        data: Vec<u8>,
        resource_name: String,
        font_obj: ObjId,
    ) -> Result<Self, FontEmbedError> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| FontEmbedError::Parse(e.to_string()))?;

        let units_per_em = face.units_per_em();
        let ascent = face.ascender();
        let descent = face.descender();
        let gbox = face.global_bounding_box();
        let cap_height = face.capital_height().unwrap_or(ascent);
        let italic_angle = face.italic_angle() as f64;
        let flags = descriptor_flags(&face);
        let stem_v = estimate_stem_v(&face);

        let postscript_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME && n.is_unicode())
            .and_then(|n| n.to_string())
            .unwrap_or_else(|| "Embedded".to_string());

        let mut cmap = BTreeMap::new();
        let mut unicode = BTreeMap::new();
        let subtables = face
            .tables()
            .cmap
            .ok_or_else(|| FontEmbedError::Parse("font has no cmap table".to_string()))?;
        for subtable in subtables.subtables {
            if !subtable.is_unicode() {
                continue;
            }
            subtable.codepoints(|cp| {
                if let Some(gid) = subtable.glyph_index(cp) {
                    cmap.insert(cp, gid.0);
                    unicode.entry(gid.0).or_insert(cp);
                }
            });
        }

        let mut widths = BTreeMap::new();
        for gid in 0..face.number_of_glyphs() {
            let advance = face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0);
            widths.insert(gid, advance);
        }
        let default_width = widths.get(&0).copied().unwrap_or(0);

        Ok(Typeface {
            postscript_name,
            data,
            units_per_em,
            ascent,
            descent,
            bbox: [gbox.x_min, gbox.y_min, gbox.x_max, gbox.y_max],
            cap_height,
            italic_angle,
            flags,
            stem_v,
            cmap,
            widths,
            default_width,
            used: BTreeSet::new(),
            unicode,
            resource_name,
            font_obj,
        })
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    pub(crate) fn font_data(&self) -> &[u8] {
        &self.data
    }

    /// Scale a raw font-unit value to PDF text space (1/1000 em).
    fn to_pdf_units(&self, value: i32) -> i64 {
        value as i64 * 1000 / self.units_per_em as i64
    }

    /// Width of a character in 1/1000 em units.
    pub fn char_width(&self, ch: char) -> u16 {
        let gid = self.cmap.get(&(ch as u32)).copied().unwrap_or(0);
        let raw = self.widths.get(&gid).copied().unwrap_or(self.default_width);
        (raw as u32 * 1000 / self.units_per_em as u32) as u16
    }

    /// Width of a string in points at the given size.
    pub fn measure_text(&self, text: &str, font_size: f64) -> f64 {
        let total: u32 = text.chars().map(|ch| self.char_width(ch) as u32).sum();
        total as f64 * font_size / 1000.0
    }

    /// Encode text for a content stream as hex glyph IDs, recording
    /// each glyph as used: `<004A006F0062>`.
    pub fn encode_text_hex(&mut self, text: &str) -> String {
        let mut hex = String::with_capacity(text.len() * 4 + 2);
        hex.push('<');
        for ch in text.chars() {
            let gid = self.cmap.get(&(ch as u32)).copied().unwrap_or(0);
            self.used.insert(gid);
            hex.push_str(&format!("{:04X}", gid));
        }
        hex.push('>');
        hex
    }

    /// The /W widths array for glyphs used so far, as runs of
    /// consecutive glyph IDs: `[gid [w1 w2 ...] gid [w ...]]`.
    pub(crate) fn widths_array(&self) -> Vec<PdfObject> {
        let glyphs: Vec<u16> = self.used.iter().copied().collect();
        let mut result = Vec::new();
        let mut i = 0;
        while i < glyphs.len() {
            let start = glyphs[i];
            let mut run = Vec::new();
            let mut j = i;
            while j < glyphs.len() && glyphs[j] == start + (j - i) as u16 {
                let raw = self
                    .widths
                    .get(&glyphs[j])
                    .copied()
                    .unwrap_or(self.default_width);
                run.push(PdfObject::Integer(self.to_pdf_units(raw as i32)));
                j += 1;
            }
            result.push(PdfObject::Integer(start as i64));
            result.push(PdfObject::Array(run));
            i = j;
        }
        result
    }

    pub(crate) fn default_width_pdf(&self) -> i64 {
        self.to_pdf_units(self.default_width as i32)
    }

    /// Values for the font descriptor dictionary, scaled to 1/1000 em.
    pub(crate) fn descriptor_entries(&self) -> Vec<(&'static str, PdfObject)> {
        vec![
            ("Type", PdfObject::name("FontDescriptor")),
            ("FontName", PdfObject::name(&self.postscript_name)),
            ("Flags", PdfObject::Integer(self.flags as i64)),
            (
                "FontBBox",
                PdfObject::array(
                    self.bbox
                        .iter()
                        .map(|&v| PdfObject::Integer(self.to_pdf_units(v as i32)))
                        .collect(),
                ),
            ),
            ("ItalicAngle", PdfObject::Real(self.italic_angle)),
            ("Ascent", PdfObject::Integer(self.to_pdf_units(self.ascent as i32))),
            (
                "Descent",
                PdfObject::Integer(self.to_pdf_units(self.descent as i32)),
            ),
            (
                "CapHeight",
                PdfObject::Integer(self.to_pdf_units(self.cap_height as i32)),
            ),
            ("StemV", PdfObject::Integer(self.stem_v as i64)),
        ]
    }

    /// Build the ToUnicode CMap stream so extracted text maps back to
    /// the original characters.
    pub(crate) fn tounicode_cmap(&self) -> Vec<u8> {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo\n\
             << /Registry (Adobe)\n\
             /Ordering (UCS)\n\
             /Supplement 0\n\
             >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n\
             <0000> <FFFF>\n\
             endcodespacerange\n",
        );

        let mappings: Vec<(u16, u32)> = self
            .used
            .iter()
            .filter_map(|&gid| self.unicode.get(&gid).map(|&cp| (gid, cp)))
            .collect();

        // PDF caps each bfchar block at 100 entries.
        for chunk in mappings.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for &(gid, cp) in chunk {
                cmap.push_str(&format!("<{:04X}> <{:04X}>\n", gid, cp));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str(
            "endcmap\n\
             CMapName currentdict /CMap defineresource pop\n\
             end\n\
             end\n",
        );
        cmap.into_bytes()
    }
}

fn descriptor_flags(face: &ttf_parser::Face) -> u32 {
    let mut flags = 0u32;
    if face.is_monospaced() {
        flags |= 1; // FixedPitch
    }
    flags |= 32; // Nonsymbolic
    if face.is_italic() {
        flags |= 64; // Italic
    }
    flags
}

fn estimate_stem_v(face: &ttf_parser::Face) -> i16 {
    // Approximation from the weight class; TrueType fonts carry no
    // stem width of their own.
    let w = face.weight().to_number() as f64 / 1000.0;
    (10.0 + 220.0 * w * w) as i16
}
