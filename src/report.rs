//! PDF inventory report rendering
//!
//! Letter-size report: a cover block with the engineer details, then one
//! section per asset with the photograph, metadata rows, and the wrapped
//! detailed description. Rendered fully in memory.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use printpdf::image_crate::GenericImageView;
use printpdf::{BuiltinFont, Image, ImageTransform, Mm, PdfDocument, PdfLayerReference};

use crate::error::ReportError;
use crate::models::AssetRecord;

const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 18.0;
const PHOTO_WIDTH_MM: f32 = 100.0;
const BODY_WRAP_CHARS: usize = 95;
// printpdf's default image resolution
const IMAGE_DPI: f32 = 300.0;

/// Render the inventory report for one engineer.
pub fn render_inventory_report(
    engineer_name: &str,
    engineer_category: &str,
    assets: &[AssetRecord],
) -> Result<Vec<u8>, ReportError> {
    let (doc, cover_page, cover_layer) = PdfDocument::new(
        "Asset Inventory Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "content",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(render_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(render_err)?;

    let cover = doc.get_page(cover_page).get_layer(cover_layer);
    let mut y = PAGE_HEIGHT_MM - 45.0;
    cover.use_text("ASSET INVENTORY REPORT", 22.0, Mm(38.0), Mm(y), &bold);
    y -= 18.0;

    let info = [
        ("Engineer Name:", engineer_name.to_string()),
        ("Category:", engineer_category.to_string()),
        ("Total Assets:", assets.len().to_string()),
        ("Report Date:", Utc::now().format("%B %d, %Y").to_string()),
    ];
    for (label, value) in info {
        cover.use_text(label, 12.0, Mm(MARGIN_MM), Mm(y), &bold);
        cover.use_text(value, 12.0, Mm(MARGIN_MM + 48.0), Mm(y), &regular);
        y -= 8.0;
    }

    for (idx, asset) in assets.iter().enumerate() {
        let (page, layer_idx) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
        let mut layer = doc.get_page(page).get_layer(layer_idx);
        let mut y = PAGE_HEIGHT_MM - 25.0;

        layer.use_text(
            format!("Asset #{}: {}", idx + 1, asset.asset_name),
            16.0,
            Mm(MARGIN_MM),
            Mm(y),
            &bold,
        );
        y -= 12.0;

        match place_photo(&layer, &asset.image_base64, y) {
            Some(next_y) => y = next_y,
            None => {
                layer.use_text("Image unavailable", 10.0, Mm(MARGIN_MM), Mm(y), &regular);
                y -= 10.0;
            }
        }

        let rows = [
            ("Manufacturer", asset.manufacturer.as_str()),
            ("Model", asset.model_number.as_str()),
            ("Condition", asset.condition.as_str()),
            ("Category", asset.category.as_str()),
        ];
        for (label, value) in rows {
            if value.is_empty() || value == "N/A" {
                continue;
            }
            layer.use_text(format!("{label}:"), 11.0, Mm(MARGIN_MM), Mm(y), &bold);
            layer.use_text(value, 11.0, Mm(MARGIN_MM + 35.0), Mm(y), &regular);
            y -= 7.0;
        }

        if !asset.detailed_description.is_empty() {
            y -= 4.0;
            layer.use_text("Detailed Description:", 11.0, Mm(MARGIN_MM), Mm(y), &bold);
            y -= 6.0;
            for line in wrap_text(&asset.detailed_description, BODY_WRAP_CHARS) {
                if y < MARGIN_MM + 8.0 {
                    let (next_page, next_layer) =
                        doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
                    layer = doc.get_page(next_page).get_layer(next_layer);
                    y = PAGE_HEIGHT_MM - 25.0;
                }
                layer.use_text(line, 10.0, Mm(MARGIN_MM), Mm(y), &regular);
                y -= 5.0;
            }
        }
    }

    doc.save_to_bytes().map_err(render_err)
}

/// Embed the asset photograph scaled to the report column. Returns the new
/// cursor position, or `None` when the stored image cannot be decoded.
fn place_photo(layer: &PdfLayerReference, image_base64: &str, y: f32) -> Option<f32> {
    if image_base64.is_empty() {
        return None;
    }
    let bytes = BASE64.decode(image_base64).ok()?;
    let decoded = printpdf::image_crate::load_from_memory(&bytes).ok()?;
    let (px_w, px_h) = decoded.dimensions();
    if px_w == 0 || px_h == 0 {
        return None;
    }

    let natural_w_mm = px_w as f32 * 25.4 / IMAGE_DPI;
    let natural_h_mm = px_h as f32 * 25.4 / IMAGE_DPI;
    let scale = PHOTO_WIDTH_MM / natural_w_mm;
    let height_mm = natural_h_mm * scale;

    let pdf_image = Image::from_dynamic_image(&decoded);
    pdf_image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN_MM)),
            translate_y: Some(Mm(y - height_mm)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(IMAGE_DPI),
            ..Default::default()
        },
    );

    Some(y - height_mm - 8.0)
}

/// Greedy word wrap on a character budget
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn render_err<E: std::fmt::Display>(err: E) -> ReportError {
    ReportError::Render(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);

        assert!(wrap_text("", 10).is_empty());
        // a single oversized word still lands on its own line
        assert_eq!(wrap_text("antidisestablishment", 5).len(), 1);
    }
}
