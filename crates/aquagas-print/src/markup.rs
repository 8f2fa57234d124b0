//! Printable HTML for the lightweight path.
//!
//! Produces one standalone page (A4 landscape) with the two vias as
//! bordered panels. Filler rows carry `&nbsp;` in every cell so their
//! borders survive printing.

use std::fmt::Write;

use aquagas_core::receipt::labels;
use aquagas_core::{ReceiptDocument, SaleLine, ViaContent};

const STYLE: &str = "\
@page { size: A4 landscape; margin: 5mm; }
body { margin: 0; font-family: Helvetica, Arial, sans-serif; font-size: 8pt; }
.page { display: flex; gap: 4mm; }
.via { flex: 1; border: 0.8mm solid #000; }
.via table { width: 100%; border-collapse: collapse; }
.via td, .via th { border: 0.3mm solid #000; padding: 0 2mm; height: 5.5mm; }
.header td { height: 22mm; }
.logo { width: 60%; text-align: center; }
.logo img { max-height: 15mm; max-width: 100%; }
.name { font-size: 16pt; font-weight: bold; }
.tagline { font-size: 9pt; font-style: italic; }
.address { font-size: 7pt; }
.title { text-align: center; font-weight: bold; font-size: 9pt; }
.num { text-align: right; }
.footer td { height: 16mm; }
.message { text-align: center; font-style: italic; }
";

/// Escapes text for HTML element and attribute content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Only image data URLs are emitted as `src`.
fn logo_src(via: &ViaContent) -> Option<&str> {
    via.company
        .logo
        .as_deref()
        .filter(|url| url.starts_with("data:image/") && url.contains(";base64,"))
}

fn item_row(html: &mut String, line: &SaleLine) {
    let _ = write!(
        html,
        "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
        escape(&line.name),
        line.qty,
        escape(&line.price.to_string()),
        escape(&line.line_total().to_string()),
    );
}

fn via_panel(html: &mut String, via: &ViaContent) {
    html.push_str("<div class=\"via\"><table>");

    html.push_str("<tr class=\"header\"><td class=\"logo\" colspan=\"2\">");
    match logo_src(via) {
        Some(src) => {
            let _ = write!(html, "<img src=\"{}\" alt=\"{}\">", escape(src), escape(&via.company.name));
        }
        None => {
            let _ = write!(
                html,
                "<div class=\"name\">{}</div><div class=\"tagline\">{}</div>",
                escape(&via.company.name),
                escape(&via.company.tagline)
            );
        }
    }
    html.push_str("</td><td class=\"address\" colspan=\"2\">");
    let address: Vec<String> = via.address_lines().iter().map(|l| escape(l)).collect();
    html.push_str(&address.join("<br>"));
    html.push_str("</td></tr>");

    let _ = write!(html, "<tr><td class=\"title\" colspan=\"4\">{}</td></tr>", escape(&via.heading()));
    for (label, value) in [(labels::CLIENT, &via.sale.client_name), (labels::DATE, &via.sale.date)] {
        let _ = write!(
            html,
            "<tr><td colspan=\"4\"><b>{}</b> {}</td></tr>",
            escape(label),
            escape(value)
        );
    }

    let _ = write!(
        html,
        "<tr><th>{}</th><th>{}</th><th>{}</th><th>{}</th></tr>",
        escape(labels::PRODUCT),
        escape(labels::QUANTITY),
        escape(labels::UNIT_PRICE),
        escape(labels::LINE_TOTAL)
    );

    for line in &via.sale.lines {
        item_row(html, line);
    }
    for _ in 0..via.empty_row_count {
        html.push_str("<tr><td>&nbsp;</td><td>&nbsp;</td><td>&nbsp;</td><td>&nbsp;</td></tr>");
    }

    let _ = write!(
        html,
        "<tr><th>{}</th><th class=\"num\">{}</th><th></th><th class=\"num\">{}</th></tr>",
        escape(labels::TOTALS),
        via.sale.total_quantity,
        escape(&via.sale.total.to_string())
    );

    let _ = write!(
        html,
        "<tr class=\"footer\"><td colspan=\"4\">{}<div class=\"message\">{}</div></td></tr>",
        escape(labels::SIGNATURE),
        escape(&via.company.footer_message)
    );

    html.push_str("</table></div>");
}

/// Renders `document` as a standalone printable HTML page.
pub fn render_markup(document: &ReceiptDocument) -> String {
    let mut html = String::with_capacity(16 * 1024);
    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"pt-BR\"><head><meta charset=\"utf-8\"><title>Nota de controle {}</title><style>{}</style></head><body><div class=\"page\">",
        escape(document.sale_number()),
        STYLE
    );
    for via in &document.vias {
        via_panel(&mut html, via);
    }
    html.push_str("</div></body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquagas_core::{compose, compose_blank, CompanyProfile, Money, Sale};
    use chrono::DateTime;

    fn sale(client_name: &str) -> Sale {
        Sale {
            id: 42,
            client_id: 3,
            client_name: client_name.to_string(),
            lines: vec![SaleLine {
                name: "Água Mineral 20L".to_string(),
                qty: 2,
                price: Money::from_cents(1800),
            }],
            payment_method: "Dinheiro".to_string(),
            shipping_method: "Entrega".to_string(),
            shipping_fee: Money::from_cents(500),
            subtotal: Money::from_cents(3600),
            total: Money::from_cents(4100),
            created_at: DateTime::parse_from_rfc3339("2026-01-10T09:00:00-03:00").unwrap(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
        assert_eq!(escape("Água"), "Água");
    }

    #[test]
    fn test_markup_contents() {
        let html = render_markup(&compose(&sale("Bar & Cia <Ltda>"), &CompanyProfile::default()));

        assert!(html.contains("size: A4 landscape"));
        assert!(html.contains("1ª Via - Distribuidora - Nota de controle N.º: 0042"));
        assert!(html.contains("2ª Via - Cliente - Nota de controle N.º: 0042"));
        assert!(html.contains("Bar &amp; Cia &lt;Ltda&gt;"));
        assert!(!html.contains("<Ltda>"));
        assert_eq!(html.matches("class=\"via\"").count(), 2);
        assert!(html.contains("R$ 36.00"));
        assert!(html.contains("R$ 41.00"));
    }

    #[test]
    fn test_filler_rows_have_nbsp_cells() {
        let html = render_markup(&compose(&sale("Maria"), &CompanyProfile::default()));
        let filler = "<tr><td>&nbsp;</td><td>&nbsp;</td><td>&nbsp;</td><td>&nbsp;</td></tr>";
        // 11 per via
        assert_eq!(html.matches(filler).count(), 22);
    }

    #[test]
    fn test_logo_replaces_name() {
        let company = CompanyProfile {
            logo: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
            ..CompanyProfile::default()
        };
        let html = render_markup(&compose_blank(&company));
        assert_eq!(html.matches("<img src=\"data:image/png;base64,iVBORw0KGgo=\"").count(), 2);
        assert!(!html.contains("class=\"name\""));
    }

    #[test]
    fn test_non_image_logo_is_ignored() {
        let company = CompanyProfile {
            logo: Some("javascript:alert(1)".to_string()),
            ..CompanyProfile::default()
        };
        let html = render_markup(&compose_blank(&company));
        assert!(!html.contains("<img"));
        assert!(html.contains("MORAIS"));
    }
}
