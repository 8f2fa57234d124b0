//! PDF artifact: writes a [`ReceiptLayout`] with printpdf.
//!
//! Layout coordinates are top-left based; PDF user space starts at the
//! bottom-left corner, so every `y` is flipped against the page height.

use std::io::BufWriter;

use aquagas_core::ReceiptDocument;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point, Rgb,
};
use tracing::{debug, warn};

use crate::error::{PrintError, PrintResult};
use crate::layout::{layout, FontStyle, Primitive, ReceiptLayout, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

/// DPI the logo is placed at before scaling to its layout box.
const IMAGE_DPI: f32 = 300.0;
const MM_PER_INCH: f32 = 25.4;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

fn flip(y: f32) -> Mm {
    Mm(PAGE_HEIGHT_MM - y)
}

fn polyline(layer: &PdfLayerReference, points: &[(f32, f32)], closed: bool, thickness: f32) {
    layer.set_outline_thickness(thickness);
    layer.add_line(Line {
        points: points
            .iter()
            .map(|(x, y)| (Point::new(Mm(*x), flip(*y)), false))
            .collect(),
        is_closed: closed,
    });
}

fn draw_image(layer: &PdfLayerReference, x: f32, y: f32, width: f32, height: f32, data: &[u8]) {
    let image = match printpdf::image_crate::load_from_memory(data) {
        Ok(image) => image,
        Err(e) => {
            warn!(error = %e, "Skipping logo that failed to decode");
            return;
        }
    };

    let natural_w = image.width() as f32 / IMAGE_DPI * MM_PER_INCH;
    let natural_h = image.height() as f32 / IMAGE_DPI * MM_PER_INCH;
    if natural_w <= 0.0 || natural_h <= 0.0 {
        return;
    }

    Image::from_dynamic_image(&image).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(flip(y + height)),
            dpi: Some(IMAGE_DPI),
            scale_x: Some(width / natural_w),
            scale_y: Some(height / natural_h),
            ..Default::default()
        },
    );
}

fn draw(layer: &PdfLayerReference, fonts: &Fonts, primitive: &Primitive) {
    match primitive {
        Primitive::Text {
            x,
            baseline,
            size,
            style,
            text,
        } => {
            layer.use_text(text.as_str(), *size, Mm(*x), flip(*baseline), fonts.get(*style));
        }
        Primitive::Line {
            x1,
            y1,
            x2,
            y2,
            thickness,
        } => polyline(layer, &[(*x1, *y1), (*x2, *y2)], false, *thickness),
        Primitive::Rect {
            x,
            y,
            width,
            height,
            thickness,
        } => polyline(
            layer,
            &[
                (*x, *y),
                (*x + *width, *y),
                (*x + *width, *y + *height),
                (*x, *y + *height),
            ],
            true,
            *thickness,
        ),
        Primitive::Image {
            x,
            y,
            width,
            height,
            data,
        } => draw_image(layer, *x, *y, *width, *height, data),
    }
}

/// Serialises a laid-out receipt into PDF bytes.
pub fn to_pdf(receipt: &ReceiptLayout, title: &str) -> PrintResult<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PrintError::Pdf(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| PrintError::Pdf(e.to_string()))?,
        italic: doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(|e| PrintError::Pdf(e.to_string()))?,
    };

    for (index, page) in receipt.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            doc.get_page(p).get_layer(l)
        };

        layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        for primitive in &page.primitives {
            draw(&layer, &fonts, primitive);
        }
    }

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer)
        .map_err(|e| PrintError::Pdf(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| PrintError::Pdf(e.to_string()))
}

/// Lays out and renders `document` as a PDF.
pub fn render_pdf(document: &ReceiptDocument) -> PrintResult<Vec<u8>> {
    let receipt = layout(document);
    let title = format!("Nota de controle {}", document.sale_number());
    let bytes = to_pdf(&receipt, &title)?;
    debug!(
        sale_number = %document.sale_number(),
        pages = receipt.page_count(),
        bytes = bytes.len(),
        "Rendered receipt PDF"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquagas_core::{compose_blank, CompanyProfile};

    #[test]
    fn test_render_blank_form() {
        let bytes = render_pdf(&compose_blank(&CompanyProfile::default())).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_empty_layout_still_saves() {
        let bytes = to_pdf(&ReceiptLayout { pages: Vec::new() }, "vazio").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_flip() {
        assert_eq!(flip(0.0).0, PAGE_HEIGHT_MM);
        assert_eq!(flip(PAGE_HEIGHT_MM).0, 0.0);
    }
}
