use kurbo::Rect;

use crate::dom::document::{Document, NodeId};

/// Vertical extent of an element in document coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Extent {
    pub top: f64,
    pub height: f64,
}

impl Extent {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(self) -> f64 {
        self.top + self.height
    }

    /// Unit-wide rectangle; only the vertical axis matters for visibility.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, self.top, 1.0, self.bottom())
    }

    /// Read the `data-top` / `data-height` layout attributes the page writes on sections and
    /// step markers.
    pub fn from_attrs(dom: &Document, node: NodeId) -> Option<Self> {
        let top = dom.attr(node, "data-top")?.parse::<f64>().ok()?;
        let height = dom.attr(node, "data-height")?.parse::<f64>().ok()?;
        (top.is_finite() && height.is_finite()).then_some(Self { top, height })
    }
}

/// The visible window of the document.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub scroll_y: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(scroll_y: f64, height: f64) -> Self {
        Self { scroll_y, height }
    }

    pub fn rect(self) -> Rect {
        Rect::new(0.0, self.scroll_y, 1.0, self.scroll_y + self.height)
    }

    /// Visible share of `extent`, in `[0, 1]`. Zero-height elements report 0.
    pub fn intersection_ratio(self, extent: Extent) -> f64 {
        if !(extent.height > 0.0) || !(self.height > 0.0) {
            return 0.0;
        }
        let visible = self.rect().intersect(extent.rect()).height();
        (visible / extent.height).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/geometry.rs"]
mod tests;
