//! # Receipt Layout
//!
//! Places a [`ReceiptDocument`] on A4 landscape pages as plain drawing
//! primitives in millimetres. The PDF writer only translates them.
//!
//! ## Page Geometry
//! ```text
//!  5mm                 141.5mm               4mm          141.5mm          5mm
//! ┌─┬────────────────────────────────────────┬─┬────────────────────────────┬─┐
//! │ │┌──────────────────────┬───────────────┐│ │┌─────────────────┬────────┐│ │
//! │ ││ logo / name+tagline  │ address, Tel. ││ ││                 │        ││ │ header   22
//! │ │├──────────────────────┴───────────────┤│ │├─────────────────┴────────┤│ │
//! │ ││ 1ª Via - ... N.º: 0007               ││ ││ 2ª Via - ...             ││ │ title     6
//! │ ││ CLIENTE: ...                         ││ ││                          ││ │ client    6
//! │ ││ DATA: dd/mm/yyyy                     ││ ││                          ││ │ date      6
//! │ ││ Produto      │ Qtd. │ Unitário│ Total││ ││                          ││ │ header    6
//! │ ││ ...          │      │         │      ││ ││  rows × 5.5 (≥ 12 rows)  ││ │
//! │ ││ TOTAIS       │  3   │         │ R$ ..││ ││                          ││ │ totals    6
//! │ ││ ASSINATURA: ____   footer message    ││ ││                          ││ │ footer   16
//! │ │└──────────────────────────────────────┘│ │└──────────────────────────┘│ │
//! └─┴────────────────────────────────────────┴─┴────────────────────────────┴─┘
//! ```
//!
//! Coordinates have the origin at the top-left corner of the page with `y`
//! growing downwards; text positions are baselines.
//!
//! A page carries at most [`ROWS_PER_PAGE`] table rows. Longer tables
//! continue on new pages that repeat everything above the table; totals
//! and footer go on the last page only.

use std::sync::Arc;

use aquagas_core::receipt::labels;
use aquagas_core::{ReceiptDocument, SaleLine, ViaContent};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::warn;

use crate::error::{PrintError, PrintResult};

pub const PAGE_WIDTH_MM: f32 = 297.0;
pub const PAGE_HEIGHT_MM: f32 = 210.0;
pub const PAGE_MARGIN_MM: f32 = 5.0;
pub const PANEL_GAP_MM: f32 = 4.0;
pub const PANEL_WIDTH_MM: f32 = (PAGE_WIDTH_MM - 2.0 * PAGE_MARGIN_MM - PANEL_GAP_MM) / 2.0;

/// Table rows that fit on one page together with every fixed section.
pub const ROWS_PER_PAGE: usize = 22;

const HEADER_HEIGHT: f32 = 22.0;
const LINE_HEIGHT: f32 = 6.0;
const ROW_HEIGHT: f32 = 5.5;
const FOOTER_HEIGHT: f32 = 16.0;
const LOGO_CELL_SHARE: f32 = 0.6;
const LOGO_MAX_HEIGHT: f32 = 15.0;
const CELL_PADDING: f32 = 2.0;

/// Column shares of the item table: product, qty, unit, total.
const COLUMN_SHARES: [f32; 4] = [0.52, 0.12, 0.18, 0.18];

const OUTER_STROKE: f32 = 0.8;
const INNER_STROKE: f32 = 0.3;

const PT_TO_MM: f32 = 0.352_778;

// =============================================================================
// Primitives
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

/// One drawing operation, in millimetres from the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Text {
        x: f32,
        baseline: f32,
        size: f32,
        style: FontStyle,
        text: String,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        thickness: f32,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        thickness: f32,
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        data: Arc<[u8]>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// 1-based.
    pub number: usize,
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLayout {
    pub pages: Vec<PageLayout>,
}

impl ReceiptLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every text drawn on `page`, in drawing order.
    pub fn texts(&self, page: usize) -> Vec<&str> {
        self.pages
            .get(page)
            .map(|p| {
                p.primitives
                    .iter()
                    .filter_map(|prim| match prim {
                        Primitive::Text { text, .. } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

// =============================================================================
// Logo
// =============================================================================

/// A decoded company logo.
#[derive(Debug, Clone, PartialEq)]
pub struct Logo {
    pub data: Arc<[u8]>,
    pub width_px: u32,
    pub height_px: u32,
}

impl Logo {
    /// Decodes a `data:image/...;base64,...` URL and reads the image size.
    pub fn from_data_url(data_url: &str) -> PrintResult<Self> {
        let (_, payload) = data_url
            .split_once(";base64,")
            .ok_or_else(|| PrintError::Logo("not a base64 data URL".to_string()))?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| PrintError::Logo(e.to_string()))?;
        let image = printpdf::image_crate::load_from_memory(&bytes)
            .map_err(|e| PrintError::Logo(e.to_string()))?;

        Ok(Logo {
            width_px: image.width(),
            height_px: image.height(),
            data: Arc::from(bytes),
        })
    }

    /// Largest size with the image's aspect ratio inside `max_w × max_h`.
    fn fit(&self, max_w: f32, max_h: f32) -> (f32, f32) {
        if self.width_px == 0 || self.height_px == 0 {
            return (0.0, 0.0);
        }
        let aspect = self.width_px as f32 / self.height_px as f32;
        let height = max_h.min(max_w / aspect);
        (height * aspect, height)
    }
}

// =============================================================================
// Text Metrics
// =============================================================================

/// Approximate Helvetica advance width of `c` in em.
fn char_width_em(c: char) -> f32 {
    match c {
        '0'..='9' | '$' | '_' => 0.556,
        ' ' | '.' | ',' | ':' | ';' | '!' | '|' | 'i' | 'j' | 'l' | 'í' | '/' => 0.278,
        'f' | 't' | 'r' | '(' | ')' | '-' => 0.333,
        'm' | 'M' | 'W' => 0.833,
        'w' => 0.722,
        c if c.is_uppercase() => 0.667,
        _ => 0.556,
    }
}

/// Estimated width of `text` at `size` pt, in mm.
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().map(char_width_em).sum::<f32>() * size * PT_TO_MM
}

/// Cuts `text` to fit `max_width`, ending in `...` when shortened.
fn fit_text(text: &str, size: f32, max_width: f32) -> String {
    if text_width(text, size) <= max_width {
        return text.to_string();
    }

    let ellipsis = "...";
    let budget = max_width - text_width(ellipsis, size);
    let mut used = 0.0;
    let mut out = String::new();
    for c in text.chars() {
        let w = char_width_em(c) * size * PT_TO_MM;
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(ellipsis);
    out
}

/// Baseline that vertically centres `size` pt text in a band.
fn centred_baseline(top: f32, height: f32, size: f32) -> f32 {
    top + height / 2.0 + size * PT_TO_MM * 0.35
}

// =============================================================================
// Panel Writer
// =============================================================================

enum TableRow<'a> {
    Item(&'a SaleLine),
    Filler,
}

struct Panel<'a> {
    x: f32,
    y: f32,
    out: &'a mut Vec<Primitive>,
}

impl Panel<'_> {
    fn text(&mut self, x: f32, baseline: f32, size: f32, style: FontStyle, text: impl Into<String>) {
        self.out.push(Primitive::Text {
            x,
            baseline,
            size,
            style,
            text: text.into(),
        });
    }

    fn text_centred(&mut self, left: f32, width: f32, baseline: f32, size: f32, style: FontStyle, text: &str) {
        let text = fit_text(text, size, width - 2.0 * CELL_PADDING);
        let x = left + (width - text_width(&text, size)) / 2.0;
        self.text(x, baseline, size, style, text);
    }

    fn text_right(&mut self, right: f32, baseline: f32, size: f32, style: FontStyle, text: &str) {
        let x = right - CELL_PADDING - text_width(text, size);
        self.text(x, baseline, size, style, text);
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, thickness: f32) {
        self.out.push(Primitive::Rect {
            x,
            y,
            width,
            height,
            thickness,
        });
    }

    fn vline(&mut self, x: f32, top: f32, height: f32) {
        self.out.push(Primitive::Line {
            x1: x,
            y1: top,
            x2: x,
            y2: top + height,
            thickness: INNER_STROKE,
        });
    }

    /// Band spanning the whole panel width; returns its top.
    fn band(&mut self, height: f32) -> f32 {
        let top = self.y;
        self.rect(self.x, top, PANEL_WIDTH_MM, height, INNER_STROKE);
        self.y += height;
        top
    }

    fn column_edges(&self) -> [f32; 5] {
        let mut edges = [self.x; 5];
        for (i, share) in COLUMN_SHARES.iter().enumerate() {
            edges[i + 1] = edges[i] + share * PANEL_WIDTH_MM;
        }
        edges
    }

    fn column_dividers(&mut self, top: f32, height: f32) {
        let edges = self.column_edges();
        for x in &edges[1..4] {
            self.vline(*x, top, height);
        }
    }

    fn header(&mut self, via: &ViaContent, logo: Option<&Logo>) {
        let top = self.band(HEADER_HEIGHT);
        let logo_width = PANEL_WIDTH_MM * LOGO_CELL_SHARE;
        let divider = self.x + logo_width;
        self.vline(divider, top, HEADER_HEIGHT);

        match logo {
            Some(logo) => {
                let max_h = LOGO_MAX_HEIGHT.min(HEADER_HEIGHT - 2.0 * CELL_PADDING);
                let (w, h) = logo.fit(logo_width - 2.0 * CELL_PADDING, max_h);
                self.out.push(Primitive::Image {
                    x: self.x + (logo_width - w) / 2.0,
                    y: top + (HEADER_HEIGHT - h) / 2.0,
                    width: w,
                    height: h,
                    data: Arc::clone(&logo.data),
                });
            }
            None => {
                let x = self.x;
                self.text_centred(x, logo_width, top + 11.0, 16.0, FontStyle::Bold, &via.company.name);
                self.text_centred(x, logo_width, top + 17.0, 9.0, FontStyle::Italic, &via.company.tagline);
            }
        }

        let address_width = PANEL_WIDTH_MM - logo_width - 2.0 * CELL_PADDING;
        for (i, line) in via.address_lines().iter().enumerate() {
            let text = fit_text(line, 7.0, address_width);
            self.text(divider + CELL_PADDING, top + 7.0 + 5.0 * i as f32, 7.0, FontStyle::Regular, text);
        }
    }

    fn labelled_row(&mut self, label: &str, value: &str) {
        let top = self.band(LINE_HEIGHT);
        let baseline = centred_baseline(top, LINE_HEIGHT, 8.0);
        let x = self.x + CELL_PADDING;
        let label_width = text_width(label, 8.0) + 1.5;
        self.text(x, baseline, 8.0, FontStyle::Bold, label);

        let max = PANEL_WIDTH_MM - 2.0 * CELL_PADDING - label_width;
        self.text(x + label_width, baseline, 8.0, FontStyle::Regular, fit_text(value, 8.0, max));
    }

    fn table_header(&mut self) {
        let top = self.band(LINE_HEIGHT);
        self.column_dividers(top, LINE_HEIGHT);
        let baseline = centred_baseline(top, LINE_HEIGHT, 8.0);
        let edges = self.column_edges();

        self.text(edges[0] + CELL_PADDING, baseline, 8.0, FontStyle::Bold, labels::PRODUCT);
        for (i, label) in [labels::QUANTITY, labels::UNIT_PRICE, labels::LINE_TOTAL].iter().enumerate() {
            let col = i + 1;
            self.text_centred(edges[col], edges[col + 1] - edges[col], baseline, 8.0, FontStyle::Bold, label);
        }
    }

    fn table_row(&mut self, row: &TableRow<'_>) {
        let top = self.y;
        self.rect(self.x, top, PANEL_WIDTH_MM, ROW_HEIGHT, INNER_STROKE);
        self.column_dividers(top, ROW_HEIGHT);
        self.y += ROW_HEIGHT;

        if let TableRow::Item(line) = row {
            let baseline = centred_baseline(top, ROW_HEIGHT, 8.0);
            let edges = self.column_edges();
            let name_width = edges[1] - edges[0] - 2.0 * CELL_PADDING;

            self.text(edges[0] + CELL_PADDING, baseline, 8.0, FontStyle::Regular, fit_text(&line.name, 8.0, name_width));
            self.text_right(edges[2], baseline, 8.0, FontStyle::Regular, &line.qty.to_string());
            self.text_right(edges[3], baseline, 8.0, FontStyle::Regular, &line.price.to_string());
            self.text_right(edges[4], baseline, 8.0, FontStyle::Regular, &line.line_total().to_string());
        }
    }

    fn totals(&mut self, via: &ViaContent) {
        let top = self.band(LINE_HEIGHT);
        let edges = self.column_edges();
        self.vline(edges[1], top, LINE_HEIGHT);
        self.vline(edges[2], top, LINE_HEIGHT);
        let baseline = centred_baseline(top, LINE_HEIGHT, 8.0);

        self.text(edges[0] + CELL_PADDING, baseline, 8.0, FontStyle::Bold, labels::TOTALS);
        self.text_right(edges[2], baseline, 8.0, FontStyle::Bold, &via.sale.total_quantity.to_string());
        self.text_right(edges[4], baseline, 8.0, FontStyle::Bold, &via.sale.total.to_string());
    }

    fn footer(&mut self, via: &ViaContent) {
        let top = self.band(FOOTER_HEIGHT);
        let x = self.x;
        self.text(x + CELL_PADDING, top + 7.0, 8.0, FontStyle::Regular, labels::SIGNATURE);
        self.text_centred(x, PANEL_WIDTH_MM, top + 13.0, 8.0, FontStyle::Italic, &via.company.footer_message);
    }
}

// =============================================================================
// Layout
// =============================================================================

fn decode_logo(via: &ViaContent) -> Option<Logo> {
    let data_url = via.company.logo.as_deref()?;
    match Logo::from_data_url(data_url) {
        Ok(logo) => Some(logo),
        Err(e) => {
            warn!(error = %e, "Logo could not be decoded, using text header");
            None
        }
    }
}

fn table_rows(via: &ViaContent) -> Vec<TableRow<'_>> {
    via.sale
        .lines
        .iter()
        .map(TableRow::Item)
        .chain((0..via.empty_row_count).map(|_| TableRow::Filler))
        .collect()
}

/// Number of pages `via` needs.
pub fn page_count(via: &ViaContent) -> usize {
    via.table_row_count().div_ceil(ROWS_PER_PAGE).max(1)
}

fn layout_panel(
    via: &ViaContent,
    logo: Option<&Logo>,
    rows: &[TableRow<'_>],
    x: f32,
    page: usize,
    pages: usize,
    out: &mut Vec<Primitive>,
) {
    let mut panel = Panel {
        x,
        y: PAGE_MARGIN_MM,
        out,
    };

    panel.header(via, logo);

    let mut heading = via.heading();
    if pages > 1 {
        heading.push_str(&format!(" (pág. {}/{})", page, pages));
    }
    let top = panel.band(LINE_HEIGHT);
    panel.text_centred(x, PANEL_WIDTH_MM, centred_baseline(top, LINE_HEIGHT, 9.0), 9.0, FontStyle::Bold, &heading);

    panel.labelled_row(labels::CLIENT, &via.sale.client_name);
    panel.labelled_row(labels::DATE, &via.sale.date);
    panel.table_header();

    for row in rows {
        panel.table_row(row);
    }

    if page == pages {
        panel.totals(via);
        panel.footer(via);
    }

    let height = panel.y - PAGE_MARGIN_MM;
    panel.rect(x, PAGE_MARGIN_MM, PANEL_WIDTH_MM, height, OUTER_STROKE);
}

/// Lays out both vias side by side, paginating long tables.
///
/// Pure: the same document always yields the same layout.
pub fn layout(document: &ReceiptDocument) -> ReceiptLayout {
    let [first, second] = &document.vias;
    let first_logo = decode_logo(first);
    let second_logo = if second.company.logo == first.company.logo {
        first_logo.clone()
    } else {
        decode_logo(second)
    };

    let first_rows = table_rows(first);
    let second_rows = table_rows(second);
    let pages = page_count(first).max(page_count(second));

    let mut out = Vec::with_capacity(pages);
    for page in 1..=pages {
        let mut primitives = Vec::new();
        let range = |len: usize| {
            let start = ((page - 1) * ROWS_PER_PAGE).min(len);
            start..(page * ROWS_PER_PAGE).min(len)
        };

        let left_x = PAGE_MARGIN_MM;
        let right_x = PAGE_MARGIN_MM + PANEL_WIDTH_MM + PANEL_GAP_MM;
        layout_panel(first, first_logo.as_ref(), &first_rows[range(first_rows.len())], left_x, page, pages, &mut primitives);
        layout_panel(second, second_logo.as_ref(), &second_rows[range(second_rows.len())], right_x, page, pages, &mut primitives);

        out.push(PageLayout {
            number: page,
            primitives,
        });
    }

    ReceiptLayout { pages: out }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquagas_core::{compose, compose_blank, CompanyProfile, Money, Sale};
    use chrono::DateTime;

    fn sale(items: usize) -> Sale {
        let lines: Vec<SaleLine> = (0..items)
            .map(|i| SaleLine {
                name: format!("Produto {}", i + 1),
                qty: 1,
                price: Money::from_cents(1800),
            })
            .collect();
        let subtotal: Money = lines.iter().map(SaleLine::line_total).sum();
        Sale {
            id: 7,
            client_id: 1,
            client_name: "Maria Silva".to_string(),
            lines,
            payment_method: "PIX".to_string(),
            shipping_method: "Retirada".to_string(),
            shipping_fee: Money::zero(),
            subtotal,
            total: subtotal,
            created_at: DateTime::parse_from_rfc3339("2026-03-05T14:30:00-03:00").unwrap(),
        }
    }

    fn rect_count(page: &PageLayout) -> usize {
        page.primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Rect { .. }))
            .count()
    }

    #[test]
    fn test_panel_width() {
        assert!((PANEL_WIDTH_MM - 141.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_single_page_contents() {
        let doc = compose(&sale(2), &CompanyProfile::default());
        let layout = layout(&doc);
        assert_eq!(layout.page_count(), 1);

        let texts = layout.texts(0);
        assert!(texts.contains(&"1ª Via - Distribuidora - Nota de controle N.º: 0007"));
        assert!(texts.contains(&"2ª Via - Cliente - Nota de controle N.º: 0007"));
        assert_eq!(texts.iter().filter(|t| **t == "Maria Silva").count(), 2);
        assert_eq!(texts.iter().filter(|t| **t == "05/03/2026").count(), 2);
        assert_eq!(texts.iter().filter(|t| **t == "R$ 36.00").count(), 2);
        assert_eq!(texts.iter().filter(|t| **t == labels::SIGNATURE).count(), 2);
        assert!(texts.contains(&"Tel.: (27) 98893-2758 / (27) 99938-1129"));
    }

    #[test]
    fn test_filler_rows_keep_constant_height() {
        let small = layout(&compose(&sale(1), &CompanyProfile::default()));
        let full = layout(&compose(&sale(12), &CompanyProfile::default()));
        assert_eq!(rect_count(&small.pages[0]), rect_count(&full.pages[0]));
    }

    #[test]
    fn test_long_table_paginates_without_losing_items() {
        let doc = compose(&sale(30), &CompanyProfile::default());
        let layout = layout(&doc);
        assert_eq!(layout.page_count(), 2);

        let first = layout.texts(0);
        let second = layout.texts(1);
        assert!(first.iter().any(|t| t.ends_with("(pág. 1/2)")));
        assert!(second.iter().any(|t| t.ends_with("(pág. 2/2)")));

        // Totals only on the last page
        assert!(!first.contains(&labels::TOTALS));
        assert_eq!(second.iter().filter(|t| **t == labels::TOTALS).count(), 2);

        for i in 1..=30 {
            let name = format!("Produto {}", i);
            let copies = first.iter().chain(second.iter()).filter(|t| **t == name).count();
            assert_eq!(copies, 2, "{} should appear once per via", name);
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let doc = compose(&sale(5), &CompanyProfile::default());
        assert_eq!(layout(&doc), layout(&doc));
    }

    #[test]
    fn test_bad_logo_falls_back_to_text() {
        let company = CompanyProfile {
            logo: Some("data:image/png;base64,!!!".to_string()),
            ..CompanyProfile::default()
        };
        let layout = layout(&compose_blank(&company));

        assert!(layout.texts(0).contains(&"MORAIS"));
        assert!(!layout.pages[0]
            .primitives
            .iter()
            .any(|p| matches!(p, Primitive::Image { .. })));
    }

    #[test]
    fn test_fit_text() {
        assert_eq!(fit_text("Água", 8.0, 100.0), "Água");
        let cut = fit_text(&"Água Mineral ".repeat(20), 8.0, 40.0);
        assert!(cut.ends_with("..."));
        assert!(text_width(&cut, 8.0) <= 40.0);
    }

    #[test]
    fn test_logo_fit_keeps_aspect() {
        let logo = Logo {
            data: Arc::from(Vec::<u8>::new()),
            width_px: 400,
            height_px: 100,
        };
        let (w, h) = logo.fit(80.0, 15.0);
        assert!((h - 15.0).abs() < 1e-4);
        assert!((w - 60.0).abs() < 1e-4);

        let (w, h) = logo.fit(40.0, 15.0);
        assert!((w - 40.0).abs() < 1e-4);
        assert!((h - 10.0).abs() < 1e-4);
    }
}
