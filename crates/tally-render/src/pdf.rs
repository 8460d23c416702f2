//! Paginated A4 PDF output.

use std::borrow::Cow;
use std::io::BufWriter;

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rect, Rgb,
};
use tally_core::InvoiceDocument;
use tracing::debug;

use crate::error::{RenderError, Result};
use crate::theme::{Colour, Theme, INK, MUTED, WHITE};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT: f32 = 15.0;
const RIGHT: f32 = 195.0;
const TOP: f32 = 282.0;
const BOTTOM: f32 = 20.0;
const PT_TO_MM: f32 = 0.3528;

const COL_QTY: f32 = 130.0;
const COL_PRICE: f32 = 162.0;
const DESCRIPTION_CHARS: usize = 58;
const PARAGRAPH_CHARS: usize = 95;

/// A rendered PDF.
#[derive(Debug, Clone)]
pub struct Pdf {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

/// Lays out `document` on as many A4 pages as its line items need.
pub fn render_pdf(document: &InvoiceDocument) -> Result<Pdf> {
    let title = format!("{} {}", document.title, document.invoice_number);
    let (doc, page, layer) = PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Pdf(format!("{e:?}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| RenderError::Pdf(format!("{e:?}")))?;

    let pages = {
        let mut writer = PageWriter {
            layer: doc.get_page(page).get_layer(layer),
            doc: &doc,
            regular,
            bold,
            theme: Theme::for_template(document.template),
            y: TOP,
            pages: 1,
            continued: format!("{} {} (continued)", document.title, document.invoice_number),
        };
        writer.draw(document);
        writer.pages
    };

    let mut out = BufWriter::new(Vec::new());
    doc.save(&mut out)
        .map_err(|e| RenderError::Pdf(format!("{e:?}")))?;
    let bytes = out.into_inner().map_err(|e| e.into_error())?;

    debug!(invoice = %document.invoice_number, pages, size = bytes.len(), "pdf rendered");
    Ok(Pdf { bytes, pages })
}

/// Approximate width of Helvetica text, about half an em per glyph.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * PT_TO_MM
}

/// Glyphs the built-in fonts encode in 0x80..0x9F.
const WIN_ANSI_EXTRAS: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

fn encodable(c: char) -> bool {
    let code = u32::from(c);
    code < 0x80 || (0xA0..=0xFF).contains(&code) || WIN_ANSI_EXTRAS.contains(c)
}

/// Rewrites `text` into what the built-in Helvetica can draw.
///
/// Currency signs outside WinAnsi become their ISO code; any other
/// unsupported glyph becomes `?`.
pub(crate) fn win_ansi(text: &str) -> Cow<'_, str> {
    if text.chars().all(encodable) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '₹' => out.push_str("INR "),
            '₦' => out.push_str("NGN "),
            c if encodable(c) => out.push(c),
            _ => out.push('?'),
        }
    }
    Cow::Owned(out)
}

/// Splits text into lines of at most `max` characters at word boundaries.
/// Words longer than `max` are split.
pub(crate) fn wrap(text: &str, max: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                lines.push(word.drain(..max).collect());
            }
            let word: String = word.into_iter().collect();
            if word.is_empty() {
                continue;
            }
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > max {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        lines.push(line);
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

fn colour(c: Colour) -> Color {
    Color::Rgb(Rgb::new(c.r, c.g, c.b, None))
}

#[derive(Clone, Copy)]
enum Weight {
    Regular,
    Bold,
}

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    theme: Theme,
    y: f32,
    pages: usize,
    continued: String,
}

impl PageWriter<'_> {
    fn draw(&mut self, document: &InvoiceDocument) {
        self.header(document);
        self.parties(document);
        self.table(document);
        self.totals(document);
        self.payment(document);
        self.paragraph("Notes", document.notes.as_deref());
        self.paragraph("Terms", document.terms.as_deref());
        if document.signature.is_some() {
            self.signature_line(&document.from.name);
        }
    }

    fn text(&self, text: &str, size: f32, x: f32, y: f32, weight: Weight) {
        let font = match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        };
        self.layer.use_text(win_ansi(text), size, Mm(x), Mm(y), font);
    }

    fn text_right(&self, text: &str, size: f32, right: f32, y: f32, weight: Weight) {
        let width = text_width(&win_ansi(text), size);
        self.text(text, size, right - width, y, weight);
    }

    fn fill(&self, c: Colour) {
        self.layer.set_fill_color(colour(c));
    }

    fn rule(&self, y: f32) {
        self.layer.set_outline_color(colour(self.theme.accent));
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(LEFT), Mm(y)), false),
                (Point::new(Mm(RIGHT), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    /// Starts a new page when fewer than `height` millimetres are left.
    /// Returns whether a page was added.
    fn ensure_space(&mut self, height: f32) -> bool {
        if self.y - height >= BOTTOM {
            return false;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {}", self.pages + 1));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
        self.y = TOP;

        self.fill(MUTED);
        self.text(&self.continued, 9.0, LEFT, self.y, Weight::Regular);
        self.y -= 10.0;
        true
    }

    fn header(&mut self, document: &InvoiceDocument) {
        let title = document.title.to_uppercase();
        if self.theme.header_band {
            self.fill(self.theme.accent);
            self.layer.add_rect(
                Rect::new(Mm(0.0), Mm(PAGE_HEIGHT - 32.0), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT))
                    .with_mode(PaintMode::Fill),
            );
            self.fill(WHITE);
            self.text(&title, 24.0, LEFT, PAGE_HEIGHT - 18.0, Weight::Bold);
            self.text_right(&document.invoice_number, 12.0, RIGHT, PAGE_HEIGHT - 18.0, Weight::Bold);
            self.text_right(&document.status, 9.0, RIGHT, PAGE_HEIGHT - 24.0, Weight::Regular);
            self.y = PAGE_HEIGHT - 44.0;
            self.party(&document.from.name, &document.from.lines, LEFT);
        } else {
            self.fill(self.theme.accent);
            self.text_right(&title, 24.0, RIGHT, TOP, Weight::Bold);
            self.fill(INK);
            self.text_right(&document.invoice_number, 12.0, RIGHT, TOP - 8.0, Weight::Bold);
            self.fill(MUTED);
            self.text_right(&document.status, 9.0, RIGHT, TOP - 13.0, Weight::Regular);
            self.y = TOP;
            self.party(&document.from.name, &document.from.lines, LEFT);
        }
        self.y -= 6.0;
    }

    /// Writes a name and its lines at `x`, moving the cursor below them.
    fn party(&mut self, name: &str, lines: &[String], x: f32) {
        self.fill(INK);
        self.text(name, 13.0, x, self.y, Weight::Bold);
        self.y -= 6.0;
        self.fill(MUTED);
        for line in lines {
            self.text(line, 9.5, x, self.y, Weight::Regular);
            self.y -= 4.5;
        }
    }

    fn parties(&mut self, document: &InvoiceDocument) {
        let top = self.y;
        self.fill(self.theme.accent);
        self.text("BILL TO", 9.0, LEFT, top, Weight::Bold);
        self.y = top - 6.0;
        self.party(&document.bill_to.name, &document.bill_to.lines, LEFT);
        let left_bottom = self.y;

        let details = [
            ("Issue date", document.issue_date.as_str()),
            ("Due date", document.due_date.as_str()),
            ("Currency", document.currency.as_str()),
        ];
        let mut y = top - 6.0;
        for (label, value) in details {
            self.fill(MUTED);
            self.text(label, 9.5, 120.0, y, Weight::Regular);
            self.fill(INK);
            self.text_right(value, 9.5, RIGHT, y, Weight::Bold);
            y -= 5.0;
        }

        self.y = left_bottom.min(y) - 8.0;
    }

    fn table_header(&mut self) {
        self.fill(self.theme.accent);
        self.text("Description", 9.5, LEFT, self.y, Weight::Bold);
        self.text_right("Qty", 9.5, COL_QTY, self.y, Weight::Bold);
        self.text_right("Unit price", 9.5, COL_PRICE, self.y, Weight::Bold);
        self.text_right("Amount", 9.5, RIGHT, self.y, Weight::Bold);
        if self.theme.table_rules {
            self.rule(self.y - 2.5);
        }
        self.y -= self.theme.row_height + 1.0;
    }

    fn table(&mut self, document: &InvoiceDocument) {
        self.ensure_space(20.0);
        self.table_header();

        let row_height = self.theme.row_height;
        for row in &document.rows {
            let lines = wrap(&row.description, DESCRIPTION_CHARS);
            let height = row_height + 4.5 * lines.len().saturating_sub(1) as f32;
            if self.ensure_space(height) {
                self.table_header();
            }

            self.fill(INK);
            self.text_right(&row.quantity, 9.5, COL_QTY, self.y, Weight::Regular);
            self.text_right(&row.unit_price, 9.5, COL_PRICE, self.y, Weight::Regular);
            self.text_right(&row.amount, 9.5, RIGHT, self.y, Weight::Regular);
            let mut y = self.y;
            for line in &lines {
                self.text(line, 9.5, LEFT, y, Weight::Regular);
                y -= 4.5;
            }
            self.y -= height;
        }

        if self.theme.table_rules {
            self.rule(self.y + row_height - 3.0);
        }
        self.y -= 4.0;
    }

    fn totals(&mut self, document: &InvoiceDocument) {
        self.ensure_space(7.0 * document.totals.len() as f32 + 12.0);
        let last = document.totals.len().saturating_sub(1);
        for (i, row) in document.totals.iter().enumerate() {
            let (weight, size) = if i == last { (Weight::Bold, 11.0) } else { (Weight::Regular, 9.5) };
            self.fill(MUTED);
            self.text(&row.label, size, 130.0, self.y, weight);
            self.fill(INK);
            self.text_right(&row.amount, size, RIGHT, self.y, weight);
            self.y -= 6.0;
        }

        self.y -= 2.0;
        self.fill(self.theme.accent);
        self.text("Amount due", 12.0, 130.0, self.y, Weight::Bold);
        self.text_right(&document.amount_due, 12.0, RIGHT, self.y, Weight::Bold);
        self.y -= 14.0;
    }

    fn payment(&mut self, document: &InvoiceDocument) {
        let Some(payment) = &document.payment else {
            return;
        };
        self.ensure_space(10.0 + 5.0 * payment.lines.len() as f32);
        self.fill(self.theme.accent);
        self.text("PAYMENT DETAILS", 9.0, LEFT, self.y, Weight::Bold);
        self.y -= 5.5;
        self.fill(INK);
        self.text(&format!("{} ({})", payment.label, payment.gateway), 9.5, LEFT, self.y, Weight::Bold);
        self.y -= 5.0;
        for line in &payment.lines {
            self.fill(MUTED);
            self.text(&line.label, 9.5, LEFT, self.y, Weight::Regular);
            self.fill(INK);
            self.text(&line.value, 9.5, LEFT + 40.0, self.y, Weight::Regular);
            self.y -= 5.0;
        }
        self.y -= 6.0;
    }

    fn paragraph(&mut self, heading: &str, body: Option<&str>) {
        let Some(body) = body else {
            return;
        };
        self.ensure_space(16.0);
        self.fill(self.theme.accent);
        self.text(&heading.to_uppercase(), 9.0, LEFT, self.y, Weight::Bold);
        self.y -= 5.5;
        self.fill(INK);
        for line in wrap(body, PARAGRAPH_CHARS) {
            self.ensure_space(5.0);
            self.fill(INK);
            self.text(&line, 9.5, LEFT, self.y, Weight::Regular);
            self.y -= 4.5;
        }
        self.y -= 6.0;
    }

    fn signature_line(&mut self, name: &str) {
        self.ensure_space(24.0);
        self.y -= 12.0;
        self.layer.set_outline_color(colour(INK));
        self.layer.set_outline_thickness(0.3);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(RIGHT - 60.0), Mm(self.y)), false),
                (Point::new(Mm(RIGHT), Mm(self.y)), false),
            ],
            is_closed: false,
        });
        self.fill(MUTED);
        self.text(&format!("Authorized signature, {name}"), 8.5, RIGHT - 60.0, self.y - 4.5, Weight::Regular);
        self.y -= 10.0;
    }
}
