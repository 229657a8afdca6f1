use std::path::Path;

use anyhow::Context as _;

use crate::dom::document::Document;
use crate::dom::svg::to_markup;
use crate::foundation::core::SceneName;
use crate::foundation::error::{TidesError, TidesResult};
use crate::illustrations::factory_for;

/// Largest raster edge accepted, in pixels.
pub const MAX_DIM: u32 = 16_384;

/// Straight-alpha RGBA8 image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Raster {
    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let px = self.rgba.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Number of pixels with non-zero alpha.
    pub fn covered(&self) -> usize {
        self.rgba.chunks_exact(4).filter(|px| px[3] > 0).count()
    }

    pub fn write_png(&self, path: impl AsRef<Path>) -> TidesResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        image::save_buffer_with_format(
            path,
            &self.rgba,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Standalone SVG markup of the illustration for `scene`.
pub fn scene_markup(scene: SceneName) -> TidesResult<String> {
    let factory = factory_for(scene)
        .ok_or_else(|| TidesError::setup(format!("scene '{scene}' has no illustration")))?;
    let mut dom = Document::new();
    let root = factory(&mut dom)?;
    Ok(to_markup(&dom, root))
}

pub fn parse_svg(markup: &str) -> TidesResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_str(markup, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Rasterize `tree`, scaled to `width` pixels wide when given, keeping the aspect ratio.
pub fn rasterize(tree: &usvg::Tree, width: Option<u32>) -> TidesResult<Raster> {
    let size = tree.size();
    let (base_w, base_h) = (size.width(), size.height());
    if !(base_w.is_finite() && base_h.is_finite()) || base_w <= 0.0 || base_h <= 0.0 {
        return Err(TidesError::validation("svg has invalid width/height"));
    }
    let scale = match width {
        Some(0) => return Err(TidesError::validation("raster width must be > 0")),
        Some(w) => w as f32 / base_w,
        None => 1.0,
    };
    let w = ((base_w * scale).round() as u32).max(1);
    let h = ((base_h * scale).round() as u32).max(1);
    if w > MAX_DIM || h > MAX_DIM {
        return Err(TidesError::validation(format!(
            "raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| TidesError::validation("failed to allocate pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(scale, scale);
    resvg::render(tree, xform, &mut pixmap.as_mut());

    let mut rgba = Vec::with_capacity((w * h * 4) as usize);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    tracing::debug!(width = w, height = h, "svg rasterized");
    Ok(Raster {
        width: w,
        height: h,
        rgba,
    })
}

/// Build, serialize and rasterize the illustration for `scene`.
pub fn render_scene(scene: SceneName, width: Option<u32>) -> TidesResult<Raster> {
    let markup = scene_markup(scene)?;
    let tree = parse_svg(&markup)?;
    rasterize(&tree, width)
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
