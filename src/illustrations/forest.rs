use kurbo::{BezPath, Point};

use crate::dom::document::{Document, NodeId};
use crate::foundation::error::TidesResult;
use crate::foundation::math::{Rng64, fmt_num};
use crate::illustrations::{HORIZONTAL, VERTICAL, gradient, shape, svg_root};

const SEED: u64 = 0xf0_4e57;
const WIDTH: f64 = 1440.0;

/// Forest canopy: clouds, birds, mountain ridges and three layers of pines.
pub fn build(dom: &mut Document) -> TidesResult<NodeId> {
    let mut rng = Rng64::new(SEED);
    let svg = svg_root(dom, "0 0 1440 400", "illu illu-forest")?;
    defs(dom, svg)?;

    for (cx, cy, scale) in [(200.0, 80.0, 1.2), (600.0, 120.0, 0.9), (950.0, 60.0, 1.1), (1300.0, 100.0, 0.8)] {
        cloud(dom, svg, &mut rng, Point::new(cx, cy), scale)?;
    }

    for i in 0..12 {
        let x = 150.0 + i as f64 * 110.0;
        let y = 80.0 + (i % 3) as f64 * 30.0 + rng.range(0.0, 20.0);
        let mut bird = BezPath::new();
        bird.move_to((x, y));
        bird.quad_to((x - 8.0, y - 6.0), (x - 12.0, y));
        bird.quad_to((x - 4.0, y - 5.0), (x, y));
        bird.quad_to((x + 4.0, y - 5.0), (x + 12.0, y));
        bird.quad_to((x + 4.0, y + 6.0), (x, y));
        let d = bird.to_svg();
        let delay = format!("animation-delay: {}s", fmt_num(i as f64 * 0.5));
        shape(dom, svg, "path", &[], &[("d", d.as_str()), ("class", "forest-bird"), ("style", delay.as_str())])?;
    }

    let peaks = [
        (0.0, 240.0), (180.0, 180.0), (280.0, 200.0), (420.0, 150.0), (560.0, 170.0), (720.0, 130.0),
        (880.0, 160.0), (1040.0, 140.0), (1200.0, 170.0), (1360.0, 150.0), (1440.0, 180.0),
    ];
    let mut mountains = BezPath::new();
    mountains.move_to(peaks[0]);
    for p in &peaks[1..] {
        mountains.line_to(*p);
    }
    mountains.line_to((WIDTH, 400.0));
    mountains.line_to((0.0, 400.0));
    mountains.close_path();
    let d = mountains.to_svg();
    shape(
        dom,
        svg,
        "path",
        &[],
        &[("d", d.as_str()), ("class", "forest-mountains"), ("fill", "url(#mountainGradient)"), ("filter", "url(#dropShadow)")],
    )?;

    let mut ridge = BezPath::new();
    ridge.move_to((0.0, 260.0));
    ridge.curve_to((180.0, 220.0), (320.0, 240.0), (520.0, 230.0));
    ridge.curve_to((760.0, 215.0), (980.0, 250.0), (1200.0, 230.0));
    ridge.curve_to((1320.0, 220.0), (1440.0, 240.0), (1440.0, 400.0));
    ridge.line_to((0.0, 400.0));
    ridge.close_path();
    let d = ridge.to_svg();
    shape(
        dom,
        svg,
        "path",
        &[],
        &[("d", d.as_str()), ("class", "forest-ridge"), ("fill", "url(#ridgeGradient)"), ("filter", "url(#dropShadow)")],
    )?;

    shape(
        dom,
        svg,
        "rect",
        &[("x", 0.0), ("y", 300.0), ("width", WIDTH), ("height", 100.0)],
        &[("class", "forest-ground"), ("fill", "url(#groundGradient)")],
    )?;

    let mut x = 0.0;
    while x < WIDTH {
        shape(
            dom,
            svg,
            "ellipse",
            &[
                ("cx", x + 20.0 + rng.range(0.0, 40.0)),
                ("cy", 300.0),
                ("rx", 25.0 + rng.range(0.0, 15.0)),
                ("ry", 12.0 + rng.range(0.0, 8.0)),
            ],
            &[("class", "forest-bush"), ("fill", "url(#bushGradient)"), ("filter", "url(#dropShadow)")],
        )?;
        x += 80.0;
    }

    // Back to front: distant small pines, mid layer, foreground.
    for x in (30..1440).step_by(35) {
        pine(dom, svg, x as f64, 280.0, 80.0 + ((x * 7) % 30) as f64, 0.4)?;
    }
    for x in (50..1440).step_by(60) {
        pine(dom, svg, x as f64, 310.0, 110.0 + ((x * 13) % 40) as f64, 0.7)?;
    }
    for x in (25..1440).step_by(90) {
        pine(dom, svg, x as f64 + 15.0, 340.0, 140.0 + ((x * 17) % 35) as f64, 0.95)?;
    }
    Ok(svg)
}

fn defs(dom: &mut Document, svg: NodeId) -> TidesResult<()> {
    let defs = dom.append_new(svg, "defs", &[])?;
    gradient(dom, defs, "linearGradient", "trunkGradient", &HORIZONTAL, &[("0%", "#3d2817", None), ("50%", "#5a3d26", None), ("100%", "#2d1f12", None)])?;
    gradient(dom, defs, "linearGradient", "leafGradient", &VERTICAL, &[("0%", "#4a8c5a", None), ("50%", "#3a7549", None), ("100%", "#2d5d38", None)])?;
    gradient(
        dom,
        defs,
        "radialGradient",
        "cloudGradient",
        &[("cx", "40%"), ("cy", "30%")],
        &[("0%", "#d8e8e0", Some("0.5")), ("60%", "#c0d5d0", Some("0.4")), ("100%", "#a8c068", Some("0.3"))],
    )?;
    gradient(dom, defs, "linearGradient", "mountainGradient", &VERTICAL, &[("0%", "#2d5540", None), ("100%", "#1f3d2e", None)])?;
    gradient(dom, defs, "linearGradient", "ridgeGradient", &VERTICAL, &[("0%", "#3a5d48", None), ("100%", "#284535", None)])?;
    gradient(dom, defs, "linearGradient", "groundGradient", &VERTICAL, &[("0%", "#3d6048", None), ("100%", "#2a4535", None)])?;
    gradient(dom, defs, "radialGradient", "bushGradient", &[], &[("0%", "#4a7555", None), ("100%", "#2f5038", None)])?;

    let shadow = dom.append_new(
        defs,
        "filter",
        &[("id", "dropShadow"), ("x", "-50%"), ("y", "-50%"), ("width", "200%"), ("height", "200%")],
    )?;
    dom.append_new(shadow, "feGaussianBlur", &[("in", "SourceAlpha"), ("stdDeviation", "2")])?;
    dom.append_new(shadow, "feOffset", &[("dx", "2"), ("dy", "3"), ("result", "offsetblur")])?;
    dom.append_new(shadow, "feFlood", &[("flood-color", "#000000"), ("flood-opacity", "0.3")])?;
    dom.append_new(shadow, "feComposite", &[("in2", "offsetblur"), ("operator", "in")])?;
    let merge = dom.append_new(shadow, "feMerge", &[])?;
    dom.append_new(merge, "feMergeNode", &[])?;
    dom.append_new(merge, "feMergeNode", &[("in", "SourceGraphic")])?;
    Ok(())
}

fn cloud(dom: &mut Document, svg: NodeId, rng: &mut Rng64, c: Point, scale: f64) -> TidesResult<()> {
    let opacity = fmt_num(rng.range(0.3, 0.5));
    let g = dom.append_new(
        svg,
        "g",
        &[("class", "forest-cloud"), ("opacity", opacity.as_str()), ("filter", "url(#dropShadow)")],
    )?;
    for (dx, dy, rx, ry) in [(0.0, 0.0, 40.0, 20.0), (-25.0, 5.0, 30.0, 18.0), (28.0, 3.0, 35.0, 22.0)] {
        shape(
            dom,
            g,
            "ellipse",
            &[("cx", c.x + dx * scale), ("cy", c.y + dy * scale), ("rx", rx * scale), ("ry", ry * scale)],
            &[("fill", "url(#cloudGradient)")],
        )?;
    }
    Ok(())
}

fn pine(dom: &mut Document, svg: NodeId, x: f64, base: f64, h: f64, opacity: f64) -> TidesResult<()> {
    let opacity = fmt_num(opacity);
    let g = dom.append_new(
        svg,
        "g",
        &[("class", "pine sway"), ("opacity", opacity.as_str()), ("filter", "url(#dropShadow)")],
    )?;
    shape(
        dom,
        g,
        "rect",
        &[("x", x - 5.0), ("y", base - h * 0.2), ("width", 10.0), ("height", h * 0.25), ("rx", 2.0)],
        &[("class", "trunk"), ("fill", "url(#trunkGradient)")],
    )?;
    for (apex, spread, foot) in [(1.0, 18.0, 0.65), (0.75, 26.0, 0.45), (0.5, 32.0, 0.2)] {
        let points = format!(
            "{},{} {},{} {},{}",
            fmt_num(x),
            fmt_num(base - h * apex),
            fmt_num(x - spread),
            fmt_num(base - h * foot),
            fmt_num(x + spread),
            fmt_num(base - h * foot),
        );
        shape(dom, g, "polygon", &[], &[("points", points.as_str()), ("class", "leaf"), ("fill", "url(#leafGradient)")])?;
    }
    Ok(())
}
