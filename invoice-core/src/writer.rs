use std::collections::HashMap;
use std::io::{self, Write};

use crate::objects::{ObjId, PdfObject};

/// Low-level PDF serializer. Writes objects to any `Write` target
/// while tracking the byte offset of every indirect object for the
/// cross-reference table.
pub struct PdfWriter<W: Write> {
    out: W,
    offset: usize,
    xref: Vec<(u32, usize)>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(out: W) -> Self {
        PdfWriter {
            out,
            offset: 0,
            xref: Vec::new(),
        }
    }

    fn put(&mut self, data: &[u8]) -> io::Result<()> {
        self.out.write_all(data)?;
        self.offset += data.len();
        Ok(())
    }

    fn put_str(&mut self, s: &str) -> io::Result<()> {
        self.put(s.as_bytes())
    }

    /// PDF 1.7 header plus the binary-detection comment line.
    pub fn write_header(&mut self) -> io::Result<()> {
        self.put_str("%PDF-1.7\n")?;
        // Four bytes >= 128 so transfer tools treat the file as binary.
        self.put(b"%\xe2\xe3\xcf\xd3\n")
    }

    /// Write an indirect object, recording its offset for the xref table.
    pub fn write_object(&mut self, id: ObjId, obj: &PdfObject) -> io::Result<()> {
        self.xref.push((id.0, self.offset));
        self.put_str(&format!("{} {} obj\n", id.0, id.1))?;
        self.write_value(obj)?;
        self.put_str("\nendobj\n")
    }

    fn write_value(&mut self, obj: &PdfObject) -> io::Result<()> {
        match obj {
            PdfObject::Null => self.put_str("null"),
            PdfObject::Boolean(true) => self.put_str("true"),
            PdfObject::Boolean(false) => self.put_str("false"),
            PdfObject::Integer(n) => self.put_str(&n.to_string()),
            PdfObject::Real(v) => self.put_str(&format_real(*v)),
            PdfObject::Name(name) => {
                self.put_str("/")?;
                self.put_str(name)
            }
            PdfObject::LiteralString(s) => {
                self.put_str("(")?;
                self.put_str(&escape_pdf_string(s))?;
                self.put_str(")")
            }
            PdfObject::Array(items) => {
                self.put_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.put_str(" ")?;
                    }
                    self.write_value(item)?;
                }
                self.put_str("]")
            }
            PdfObject::Dictionary(entries) => {
                self.write_dict_open(entries)?;
                self.put_str(" >>")
            }
            PdfObject::Stream { dict, data } => {
                self.write_dict_open(dict)?;
                self.put_str(&format!(" /Length {} >>\nstream\n", data.len()))?;
                self.put(data)?;
                self.put_str("\nendstream")
            }
            PdfObject::Reference(id) => self.put_str(&format!("{} {} R", id.0, id.1)),
        }
    }

    fn write_dict_open(&mut self, entries: &[(String, PdfObject)]) -> io::Result<()> {
        self.put_str("<<")?;
        for (key, val) in entries {
            self.put_str(" /")?;
            self.put_str(key)?;
            self.put_str(" ")?;
            self.write_value(val)?;
        }
        Ok(())
    }

    /// Write the xref table, trailer, startxref and %%EOF marker.
    pub fn write_xref_and_trailer(
        &mut self,
        root_id: ObjId,
        info_id: Option<ObjId>,
    ) -> io::Result<()> {
        let xref_offset = self.offset;

        self.xref.sort_by_key(|&(num, _)| num);
        let size = self.xref.last().map(|&(num, _)| num).unwrap_or(0) + 1;

        self.put_str("xref\n")?;
        self.put_str(&format!("0 {}\n", size))?;

        // Object 0 is the head of the free list. Every entry must be
        // exactly 20 bytes including the CRLF.
        self.put(b"0000000000 65535 f\r\n")?;

        let offsets: HashMap<u32, usize> = self.xref.iter().copied().collect();
        for obj_num in 1..size {
            match offsets.get(&obj_num) {
                Some(&off) => self.put(format!("{:010} 00000 n\r\n", off).as_bytes())?,
                None => self.put(b"0000000000 00000 f\r\n")?,
            }
        }

        self.put_str("trailer\n")?;
        self.put_str(&format!(
            "<< /Size {} /Root {} {} R",
            size, root_id.0, root_id.1
        ))?;
        if let Some(info) = info_id {
            self.put_str(&format!(" /Info {} {} R", info.0, info.1))?;
        }
        self.put_str(" >>\n")?;

        self.put_str(&format!("startxref\n{}\n%%EOF\n", xref_offset))
    }

    /// Consume the writer and return the underlying output.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Escape characters with special meaning inside a literal string.
pub fn escape_pdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            _ => out.push(c),
        }
    }
    out
}

/// Format a number for content streams and object values: integers
/// without a fraction, reals trimmed of trailing zeros, never in
/// scientific notation.
pub fn format_coord(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.4}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn format_real(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{:.1}", v)
    } else {
        let s = format!("{:.6}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_starts_with_version_and_binary_comment() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_header().unwrap();
        assert!(buf.starts_with(b"%PDF-1.7\n"));
        assert!(buf[10] >= 128 && buf[11] >= 128);
    }

    #[test]
    fn dictionary_serializes_in_order() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        let obj = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::Reference(ObjId(2, 0))),
        ]);
        w.write_object(ObjId(1, 0), &obj).unwrap();
        let out = String::from_utf8_lossy(&buf);
        assert!(out.contains("<< /Type /Catalog /Pages 2 0 R >>"));
    }

    #[test]
    fn stream_carries_length_entry() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        let obj = PdfObject::stream(vec![], b"0 0 100 50 re f".to_vec());
        w.write_object(ObjId(3, 0), &obj).unwrap();
        let out = String::from_utf8_lossy(&buf);
        assert!(out.contains("/Length 15"));
        assert!(out.contains("stream\n0 0 100 50 re f\nendstream"));
    }

    #[test]
    fn literal_string_is_escaped() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_object(ObjId(1, 0), &PdfObject::string("a(b)c\\d"))
            .unwrap();
        let out = String::from_utf8_lossy(&buf);
        assert!(out.contains("(a\\(b\\)c\\\\d)"));
    }

    #[test]
    fn xref_entries_are_twenty_bytes() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_header().unwrap();
        w.write_object(ObjId(1, 0), &PdfObject::name("Catalog"))
            .unwrap();
        w.write_xref_and_trailer(ObjId(1, 0), None).unwrap();

        let marker = b"xref\n0 2\n";
        let pos = buf
            .windows(marker.len())
            .position(|win| win == marker)
            .unwrap();
        let entries = &buf[pos + marker.len()..];
        assert_eq!(&entries[18..20], b"\r\n");
        assert_eq!(&entries[38..40], b"\r\n");
    }

    #[test]
    fn trailer_references_root_and_info() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_header().unwrap();
        w.write_object(ObjId(1, 0), &PdfObject::name("Catalog"))
            .unwrap();
        w.write_object(ObjId(2, 0), &PdfObject::dict(vec![]))
            .unwrap();
        w.write_xref_and_trailer(ObjId(1, 0), Some(ObjId(2, 0)))
            .unwrap();
        let out = String::from_utf8_lossy(&buf);
        assert!(out.contains("/Root 1 0 R"));
        assert!(out.contains("/Info 2 0 R"));
        assert!(out.ends_with("%%EOF\n"));
    }

    #[test]
    fn escape_handles_parens_and_backslash() {
        assert_eq!(escape_pdf_string("plain"), "plain");
        assert_eq!(escape_pdf_string("a(b)"), "a\\(b\\)");
        assert_eq!(escape_pdf_string("a\\b"), "a\\\\b");
    }

    #[test]
    fn coord_formatting_drops_trailing_zeros() {
        assert_eq!(format_coord(50.0), "50");
        assert_eq!(format_coord(595.28), "595.28");
        assert_eq!(format_coord(841.89), "841.89");
        assert_eq!(format_coord(12.5), "12.5");
    }
}
