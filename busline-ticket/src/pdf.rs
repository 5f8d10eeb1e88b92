//! Just enough PDF to print a one page ticket: text in the two standard
//! Helvetica faces and filled rectangles, no embedded fonts or images.
//! Text is written in WinAnsiEncoding, the code page those faces declare.

use std::fmt::Write as _;

/// A4 in points
pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub fn hex(value: u32) -> Self {
        Rgb(
            ((value >> 16) & 0xff) as f32 / 255.0,
            ((value >> 8) & 0xff) as f32 / 255.0,
            (value & 0xff) as f32 / 255.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone)]
enum Op {
    Rect { x: f32, y: f32, w: f32, h: f32, color: Rgb },
    Text { x: f32, y: f32, font: Font, size: f32, color: Rgb, text: String },
}

/// One page of drawing operations, origin bottom-left
#[derive(Debug, Default)]
pub struct Page {
    ops: Vec<Op>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) -> &mut Self {
        self.ops.push(Op::Rect { x, y, w, h, color });
        self
    }

    pub fn text(&mut self, x: f32, y: f32, font: Font, size: f32, color: Rgb, text: &str) -> &mut Self {
        self.ops.push(Op::Text {
            x,
            y,
            font,
            size,
            color,
            text: text.to_string(),
        });
        self
    }

    fn content_stream(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for op in &self.ops {
            match op {
                Op::Rect { x, y, w, h, color } => out.extend_from_slice(
                    format!(
                        "{:.3} {:.3} {:.3} rg {:.2} {:.2} {:.2} {:.2} re f\n",
                        color.0, color.1, color.2, x, y, w, h
                    )
                    .as_bytes(),
                ),
                Op::Text { x, y, font, size, color, text } => {
                    out.extend_from_slice(
                        format!(
                            "BT {:.3} {:.3} {:.3} rg /{} {:.1} Tf {:.2} {:.2} Td (",
                            color.0,
                            color.1,
                            color.2,
                            font.resource(),
                            size,
                            x,
                            y
                        )
                        .as_bytes(),
                    );
                    out.extend(escape(text));
                    out.extend_from_slice(b") Tj ET\n");
                }
            }
        }
        out
    }

    /// Serialize as a complete single page PDF file
    pub fn to_pdf(&self) -> Vec<u8> {
        let content = self.content_stream();
        let mut content_object = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        content_object.extend(content);
        content_object.extend_from_slice(b"endstream");

        let objects: [Vec<u8>; 6] = [
            b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
            b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_vec(),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 5 0 R /F2 6 0 R >> >> /Contents 4 0 R >>",
                PAGE_WIDTH, PAGE_HEIGHT
            )
            .into_bytes(),
            content_object,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_vec(),
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>".to_vec(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            pdf.extend_from_slice(body);
            pdf.extend_from_slice(b"\nendobj\n");
        }

        let xref_at = pdf.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = write!(tail, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            tail,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        );
        pdf.extend_from_slice(tail.as_bytes());

        pdf
    }
}

/// WinAnsiEncoding byte for a character, if the standard fonts can show it.
fn win_ansi(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => return None,
    };
    Some(byte)
}

/// PDF literal string in WinAnsi bytes. Accented Latin letters outside the
/// code page fall back to their base letter, anything else becomes '?'.
fn escape(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            _ => out.push(win_ansi(c).or_else(|| base_letter(c)).unwrap_or(b'?')),
        }
    }
    out
}

/// Base letter of a Latin Extended-A character (U+0100..U+017F).
fn base_letter(c: char) -> Option<u8> {
    const EXTENDED_A: &[u8; 128] = b"AaAaAaCcCcCcCcDdDdEeEeEeEeEeGgGgGgGgHhHhIiIiIiIiIiJjJjKkkLlLlLlLlLlNnNnNnnNnOoOoOoOoRrRrRrSsSsSsSsTtTtTtUuUuUuUuUuUuWwYyYZzZzZzs";
    let index = (c as u32).checked_sub(0x100)?;
    EXTENDED_A.get(index as usize).copied()
}
