//! Decorative scene illustrations.
//!
//! Every factory is pure: it builds a fresh, detached `svg` subtree and returns its root. Random
//! placement uses a fixed seed, so two calls produce equivalent trees.

use crate::dom::document::{Document, NodeId};
use crate::foundation::core::SceneName;
use crate::foundation::error::TidesResult;
use crate::viz::chart::set_num;

pub mod city;
pub mod forest;
pub mod lab;

/// Builds one detached illustration root.
pub type IllustrationFactory = fn(&mut Document) -> TidesResult<NodeId>;

/// Built-in factory for `scene`. The landing, dawn, orbit and air scenes have none.
pub fn factory_for(scene: SceneName) -> Option<IllustrationFactory> {
    match scene {
        SceneName::Forest => Some(forest::build),
        SceneName::City => Some(city::build),
        SceneName::Lab => Some(lab::build),
        SceneName::Cosmos | SceneName::Dawn | SceneName::Orbit | SceneName::Air => None,
    }
}

/// Top-to-bottom gradient direction.
pub(crate) const VERTICAL: [(&str, &str); 4] = [("x1", "0%"), ("y1", "0%"), ("x2", "0%"), ("y2", "100%")];
/// Left-to-right gradient direction.
pub(crate) const HORIZONTAL: [(&str, &str); 4] = [("x1", "0%"), ("y1", "0%"), ("x2", "100%"), ("y2", "0%")];

/// Detached `svg` root shared by all illustrations.
pub(crate) fn svg_root(dom: &mut Document, view_box: &str, class: &str) -> TidesResult<NodeId> {
    let svg = dom.create_element("svg");
    dom.set_attr(svg, "viewBox", view_box)?;
    dom.set_attr(svg, "class", class)?;
    dom.set_attr(svg, "aria-hidden", "true")?;
    Ok(svg)
}

/// Append `tag` with numeric geometry attributes followed by string attributes.
pub(crate) fn shape(
    dom: &mut Document,
    parent: NodeId,
    tag: &str,
    nums: &[(&str, f64)],
    attrs: &[(&str, &str)],
) -> TidesResult<NodeId> {
    let node = dom.append_new(parent, tag, &[])?;
    for (name, value) in nums {
        set_num(dom, node, name, *value)?;
    }
    for (name, value) in attrs {
        dom.set_attr(node, name, value)?;
    }
    Ok(node)
}

/// Append a gradient with `(offset, color, opacity)` stops.
pub(crate) fn gradient(
    dom: &mut Document,
    defs: NodeId,
    tag: &str,
    id: &str,
    attrs: &[(&str, &str)],
    stops: &[(&str, &str, Option<&str>)],
) -> TidesResult<NodeId> {
    let grad = dom.append_new(defs, tag, &[("id", id)])?;
    for (name, value) in attrs {
        dom.set_attr(grad, name, value)?;
    }
    for (offset, color, opacity) in stops {
        let stop = dom.append_new(grad, "stop", &[("offset", *offset), ("stop-color", *color)])?;
        if let Some(opacity) = opacity {
            dom.set_attr(stop, "stop-opacity", opacity)?;
        }
    }
    Ok(grad)
}

#[cfg(test)]
#[path = "../../tests/unit/illustrations/factories.rs"]
mod tests;
