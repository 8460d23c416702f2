//! # tally-render
//!
//! Turns an assembled [`tally_core::InvoiceDocument`] into something a
//! client can download or look at.
//!
//! - [`render_pdf`] lays the document out on A4 pages with printpdf,
//!   repeating the table header when line items overflow a page.
//! - [`render_html`] builds a standalone preview page with ironhtml.
//!
//! Both follow the [`Theme`] of the invoice's template.

mod error;
mod html;
mod pdf;
#[cfg(test)]
mod testing;
mod theme;

pub use error::{RenderError, Result};
pub use html::render_html;
pub use pdf::{render_pdf, Pdf};
pub use theme::{Colour, Theme};
