/// Index into the document's embedded typeface list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypefaceId(pub usize);

/// Unified font reference: a builtin PDF font or an embedded
/// TrueType face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontRef {
    Builtin(BuiltinFont),
    Embedded(TypefaceId),
}

impl From<BuiltinFont> for FontRef {
    fn from(font: BuiltinFont) -> Self {
        FontRef::Builtin(font)
    }
}

/// The builtin Courier family. These are among the 14 standard PDF
/// fonts, available in every viewer without embedding, and serve as
/// the fallback when the remote typeface cannot be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuiltinFont {
    Courier,
    CourierBold,
    CourierOblique,
}

/// All Courier glyphs share one advance width, in 1/1000 em units.
const COURIER_WIDTH: u16 = 600;

impl BuiltinFont {
    /// PDF resource name used in content streams.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            BuiltinFont::Courier => "F1",
            BuiltinFont::CourierBold => "F2",
            BuiltinFont::CourierOblique => "F3",
        }
    }

    /// PDF BaseFont name.
    pub fn pdf_base_name(&self) -> &'static str {
        match self {
            BuiltinFont::Courier => "Courier",
            BuiltinFont::CourierBold => "Courier-Bold",
            BuiltinFont::CourierOblique => "Courier-Oblique",
        }
    }

    /// Advance width of a character in 1/1000 em units. Courier is
    /// monospaced, so every character measures the same.
    pub fn char_width(&self, _ch: char) -> u16 {
        COURIER_WIDTH
    }

    /// Width of a string in points at the given size.
    pub fn measure_text(&self, text: &str, font_size: f64) -> f64 {
        let total: u32 = text.chars().map(|ch| self.char_width(ch) as u32).sum();
        total as f64 * font_size / 1000.0
    }
}

/// Line height for a font size, using the conventional 1.2x leading.
pub fn line_height(font_size: f64) -> f64 {
    font_size * 1.2
}

/// Font and size for a run of text.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub font: FontRef,
    pub size: f64,
}

impl TextStyle {
    pub fn new(font: impl Into<FontRef>, size: f64) -> Self {
        TextStyle {
            font: font.into(),
            size,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            font: FontRef::Builtin(BuiltinFont::Courier),
            size: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courier_is_uniform_width() {
        assert_eq!(BuiltinFont::Courier.char_width('i'), 600);
        assert_eq!(BuiltinFont::Courier.char_width('W'), 600);
        assert_eq!(BuiltinFont::CourierBold.char_width('.'), 600);
    }

    #[test]
    fn measure_scales_with_size_and_length() {
        // 3 chars * 600/1000 * 10pt
        assert_eq!(BuiltinFont::Courier.measure_text("abc", 10.0), 18.0);
        assert_eq!(BuiltinFont::Courier.measure_text("", 10.0), 0.0);
        assert_eq!(BuiltinFont::CourierBold.measure_text("ab", 9.0), 10.8);
    }

    #[test]
    fn resource_names_are_stable() {
        assert_eq!(BuiltinFont::Courier.pdf_name(), "F1");
        assert_eq!(BuiltinFont::CourierOblique.pdf_base_name(), "Courier-Oblique");
    }
}
