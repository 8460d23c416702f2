//! HTML preview of an invoice document.

use ironhtml::typed::{Document, Element};
use ironhtml_elements::{Body, Div, Head, Html, Img, Meta, Style, Title, H1, H3, P};
use tally_core::InvoiceDocument;

use crate::theme::{Theme, INK, MUTED};

/// Escapes HTML special characters.
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn css(theme: &Theme) -> String {
    let accent = theme.accent.hex();
    let ink = INK.hex();
    let muted = MUTED.hex();
    let header = if theme.header_band {
        format!(".header {{ background: {accent}; color: #fff; padding: 24px 32px; margin: -32px -32px 24px; }}\n.header h1 {{ color: #fff; }}")
    } else {
        ".header { display: flex; flex-direction: row-reverse; justify-content: space-between; }".to_string()
    };
    let rules = if theme.table_rules {
        format!("th {{ border-bottom: 2px solid {accent}; }}\ntd {{ border-bottom: 1px solid #ddd; }}")
    } else {
        String::new()
    };
    format!(
        "body {{ font-family: Helvetica, Arial, sans-serif; color: {ink}; margin: 0; }}\n\
.page {{ max-width: 794px; margin: 0 auto; padding: 32px; }}\n\
h1 {{ color: {accent}; margin: 0; letter-spacing: 1px; }}\n\
h3 {{ color: {accent}; font-size: 12px; text-transform: uppercase; margin: 16px 0 4px; }}\n\
.muted {{ color: {muted}; }}\n\
.parties {{ display: flex; justify-content: space-between; margin: 24px 0; }}\n\
table {{ width: 100%; border-collapse: collapse; }}\n\
th {{ color: {accent}; text-align: left; }}\n\
th, td {{ padding: {pad}px 4px; }}\n\
.num {{ text-align: right; }}\n\
.totals {{ margin-left: auto; width: 40%; margin-top: 16px; }}\n\
.due {{ color: {accent}; font-weight: bold; font-size: 18px; }}\n\
.logo {{ max-height: 64px; }}\n\
.signature {{ max-height: 48px; display: block; margin-top: 32px; }}\n\
{header}\n{rules}",
        pad = (theme.row_height * 1.2).round(),
    )
}

fn party(label: Option<&str>, name: &str, lines: &[String]) -> String {
    let heading = label
        .map(|l| format!("<h3>{}</h3>", escape(l)))
        .unwrap_or_default();
    let lines: String = lines
        .iter()
        .map(|l| format!("<div class=\"muted\">{}</div>", escape(l)))
        .collect();
    format!("<div>{heading}<strong>{}</strong>{lines}</div>", escape(name))
}

fn details(doc: &InvoiceDocument) -> String {
    let rows: String = [
        ("Issue date", &doc.issue_date),
        ("Due date", &doc.due_date),
        ("Status", &doc.status),
        ("Currency", &doc.currency),
    ]
    .iter()
    .map(|(label, value)| {
        format!(
            "<tr><td class=\"muted\">{label}</td><td class=\"num\"><strong>{}</strong></td></tr>",
            escape(value)
        )
    })
    .collect();
    format!("<table class=\"details\" style=\"width: auto\">{rows}</table>")
}

fn line_items(doc: &InvoiceDocument) -> String {
    let rows: String = doc
        .rows
        .iter()
        .map(|row| {
            format!(
                "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
                escape(&row.description),
                escape(&row.quantity),
                escape(&row.unit_price),
                escape(&row.amount),
            )
        })
        .collect();
    format!(
        "<table class=\"items\"><thead><tr><th>Description</th><th class=\"num\">Qty</th>\
<th class=\"num\">Unit price</th><th class=\"num\">Amount</th></tr></thead><tbody>{rows}</tbody></table>"
    )
}

fn totals(doc: &InvoiceDocument) -> String {
    let last = doc.totals.len().saturating_sub(1);
    let rows: String = doc
        .totals
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let (open, close) = if i == last { ("<strong>", "</strong>") } else { ("", "") };
            format!(
                "<tr><td class=\"muted\">{open}{}{close}</td><td class=\"num\">{open}{}{close}</td></tr>",
                escape(&row.label),
                escape(&row.amount),
            )
        })
        .collect();
    format!(
        "<table class=\"totals\">{rows}<tr class=\"due\"><td>Amount due</td><td class=\"num\">{}</td></tr></table>",
        escape(&doc.amount_due)
    )
}

fn payment(doc: &InvoiceDocument) -> String {
    let Some(payment) = &doc.payment else {
        return String::new();
    };
    let lines: String = payment
        .lines
        .iter()
        .map(|line| {
            format!(
                "<tr><td class=\"muted\">{}</td><td>{}</td></tr>",
                escape(&line.label),
                escape(&line.value)
            )
        })
        .collect();
    format!(
        "<h3>Payment details</h3><div><strong>{} ({})</strong></div><table style=\"width: auto\">{lines}</table>",
        escape(&payment.label),
        escape(&payment.gateway),
    )
}

fn paragraph(div: Element<Div>, heading: &str, body: Option<&str>) -> Element<Div> {
    match body {
        Some(body) => div
            .child::<H3, _>(|h| h.text(heading))
            .children(body.lines(), |line, p: Element<P>| p.text(line)),
        None => div,
    }
}

/// Renders `document` as a standalone HTML page styled by its template.
pub fn render_html(document: &InvoiceDocument) -> String {
    let theme = Theme::for_template(document.template);
    let page_title = format!("{} {}", document.title, document.invoice_number);
    let css = css(&theme);

    Document::new()
        .doctype()
        .root::<Html, _>(|html| {
            html.attr("lang", "en")
                .child::<Head, _>(|head| {
                    head.child::<Meta, _>(|m| m.attr("charset", "UTF-8"))
                        .child::<Title, _>(|t| t.text(&page_title))
                        .child::<Style, _>(|s| s.raw(&css))
                })
                .child::<Body, _>(|body| {
                    body.child::<Div, _>(|page| {
                        let page = page
                            .class(&format!("page template-{}", document.template.as_str()))
                            .child::<Div, _>(|header| {
                                let header = header.class("header").child::<Div, _>(|d| {
                                    d.child::<H1, _>(|h| h.text(&document.title.to_uppercase()))
                                        .child::<Div, _>(|n| n.text(&document.invoice_number))
                                });
                                match &document.logo {
                                    Some(logo) => header.child::<Img, _>(|img| {
                                        img.class("logo").attr("src", logo).attr("alt", "Logo")
                                    }),
                                    None => header,
                                }
                            })
                            .child::<Div, _>(|d| {
                                d.class("parties")
                                    .raw(&party(None, &document.from.name, &document.from.lines))
                                    .raw(&details(document))
                            })
                            .child::<Div, _>(|d| {
                                d.raw(&party(
                                    Some("Bill to"),
                                    &document.bill_to.name,
                                    &document.bill_to.lines,
                                ))
                            })
                            .child::<Div, _>(|d| d.raw(&line_items(document)))
                            .child::<Div, _>(|d| d.raw(&totals(document)))
                            .child::<Div, _>(|d| d.raw(&payment(document)))
                            .child::<Div, _>(|d| paragraph(d, "Notes", document.notes.as_deref()))
                            .child::<Div, _>(|d| paragraph(d, "Terms", document.terms.as_deref()));
                        match &document.signature {
                            Some(signature) => page.child::<Img, _>(|img| {
                                img.class("signature")
                                    .attr("src", signature)
                                    .attr("alt", "Signature")
                            }),
                            None => page,
                        }
                    })
                })
        })
        .build()
}
