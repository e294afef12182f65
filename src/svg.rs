//! SVG post-processing: font-family sanitization and SVG→PNG rasterization.
//!
//! The pipeline itself stores diagram output as SVG markup; this module is
//! for shells that composite pixels instead of vectors.

use std::sync::Arc;

/// Lazily-loaded system font database for SVG text rendering.
///
/// Loading system fonts is expensive (~50ms), so it happens once and the
/// database is shared across all [`svg_to_png_bytes`] calls.
static FONTDB: std::sync::LazyLock<Arc<fontdb::Database>> = std::sync::LazyLock::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    log::debug!("loaded {} font faces from system", db.len());
    Arc::new(db)
});

/// Fixes malformed SVG font-family attributes containing unescaped inner
/// quotes.
///
/// Some renderers emit SVG like `font-family="Inter, "Segoe UI", sans-serif"`,
/// which is invalid XML. Inner `"` within the attribute value are replaced
/// with `'`.
pub(crate) fn sanitize_svg_font_family(svg: &str) -> String {
    const ATTR: &str = "font-family=\"";

    let mut out = String::with_capacity(svg.len());
    let mut rest = svg;
    while let Some(pos) = rest.find(ATTR) {
        let value_start = pos + ATTR.len();
        out.push_str(&rest[..value_start]);
        let value = &rest[value_start..];

        // The closing quote is the first one followed by a space, '/', '>',
        // or end of input; quotes before it are content.
        let close = value.match_indices('"').find_map(|(i, _)| {
            match value.as_bytes().get(i + 1).copied() {
                None | Some(b' ') | Some(b'/') | Some(b'>') => Some(i),
                _ => None,
            }
        });
        match close {
            Some(i) => {
                out.push_str(&value[..i].replace('"', "'"));
                out.push('"');
                rest = &value[i + 1..];
            }
            None => {
                out.push_str(value);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Converts an SVG string to PNG bytes using resvg.
///
/// `bg` sets the pixmap background color; defaults to white when `None`.
/// System fonts are loaded lazily via [`FONTDB`] so that `<text>` elements
/// render correctly.
///
/// Returns `None` if parsing fails, dimensions are invalid (zero or > 4096),
/// or rasterization/encoding fails.
pub fn svg_to_png_bytes(svg: &str, bg: Option<[u8; 3]>) -> Option<Vec<u8>> {
    use image::ImageEncoder;
    use image::codecs::png::PngEncoder;

    let svg = sanitize_svg_font_family(svg);

    let opts = resvg::usvg::Options {
        fontdb: FONTDB.clone(),
        ..Default::default()
    };
    let tree = match resvg::usvg::Tree::from_str(&svg, &opts) {
        Ok(t) => t,
        Err(e) => {
            log::debug!("SVG parse failed: {e}");
            return None;
        }
    };
    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;

    if width == 0 || height == 0 || width > 4096 || height > 4096 {
        log::debug!("SVG dimensions out of range: {width}x{height}");
        return None;
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)?;
    let [r, g, b] = bg.unwrap_or([255, 255, 255]);
    pixmap.fill(resvg::tiny_skia::Color::from_rgba8(r, g, b, 255));

    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::default(),
        &mut pixmap.as_mut(),
    );

    let mut png_buf = Vec::new();
    let encoder = PngEncoder::new(&mut png_buf);
    encoder
        .write_image(pixmap.data(), width, height, image::ExtendedColorType::Rgba8)
        .ok()?;

    log::debug!("SVG->PNG conversion: {width}x{height}, {} bytes", png_buf.len());
    Some(png_buf)
}
