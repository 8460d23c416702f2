//! Visual parameters of the document templates.

use tally_core::DocumentTemplate;

/// An sRGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Colour {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Returns the colour as a CSS hex string.
    pub fn hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", channel(self.r), channel(self.g), channel(self.b))
    }
}

pub const INK: Colour = Colour::new(0.13, 0.13, 0.13);
pub const MUTED: Colour = Colour::new(0.45, 0.45, 0.45);
pub const WHITE: Colour = Colour::new(1.0, 1.0, 1.0);

/// How a template lays out a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Colour of the title, headings and rules.
    pub accent: Colour,
    /// Title in a filled band across the top, business block below it.
    /// Otherwise the business block sits left and the title right.
    pub header_band: bool,
    /// Horizontal rules around the line item table.
    pub table_rules: bool,
    /// Vertical distance between table rows, in millimetres.
    pub row_height: f32,
}

impl Theme {
    pub fn for_template(template: DocumentTemplate) -> Self {
        match template {
            DocumentTemplate::Classic => Self {
                accent: Colour::new(0.12, 0.23, 0.42),
                header_band: false,
                table_rules: true,
                row_height: 6.0,
            },
            DocumentTemplate::Modern => Self {
                accent: Colour::new(0.05, 0.55, 0.52),
                header_band: true,
                table_rules: true,
                row_height: 7.0,
            },
            DocumentTemplate::Minimal => Self {
                accent: INK,
                header_band: false,
                table_rules: false,
                row_height: 8.0,
            },
        }
    }
}
