use std::f64::consts::TAU;

use kurbo::{BezPath, Point};

use crate::dom::document::{Document, NodeId};
use crate::foundation::error::TidesResult;
use crate::foundation::math::{Rng64, fmt_num};
use crate::illustrations::{VERTICAL, gradient, shape, svg_root};

const SEED: u64 = 0x1ab_0b5;

/// Class of the beaker liquid; the bubble easter egg flashes its fill.
pub const LIQUID_CLASS: &str = "lab-liquid";
/// Liquid fill at rest.
pub const LIQUID_FILL: &str = "url(#liquidGradient)";

/// Laboratory bench: beaker with bubbles, molecules, DNA helices and a microscope.
pub fn build(dom: &mut Document) -> TidesResult<NodeId> {
    let mut rng = Rng64::new(SEED);
    let svg = svg_root(dom, "0 0 1440 360", "illu illu-lab")?;
    defs(dom, svg)?;

    shape(
        dom,
        svg,
        "rect",
        &[("x", 0.0), ("y", 0.0), ("width", 1440.0), ("height", 360.0)],
        &[("fill", "url(#greenStripes)"), ("opacity", "0.5")],
    )?;

    let beaker = dom.append_new(svg, "g", &[("class", "beaker"), ("transform", "translate(620,80)")])?;
    let mut glass = BezPath::new();
    glass.move_to((30.0, 0.0));
    glass.line_to((30.0, 60.0));
    glass.line_to((0.0, 200.0));
    glass.quad_to((0.0, 220.0), (20.0, 220.0));
    glass.line_to((180.0, 220.0));
    glass.quad_to((200.0, 220.0), (200.0, 200.0));
    glass.line_to((170.0, 60.0));
    glass.line_to((170.0, 0.0));
    let d = glass.to_svg();
    shape(
        dom,
        beaker,
        "path",
        &[],
        &[("d", d.as_str()), ("class", "beaker-glass"), ("fill", "none"), ("stroke", "#b8f2e6"), ("stroke-width", "3")],
    )?;
    shape(
        dom,
        beaker,
        "rect",
        &[("x", 12.0), ("y", 120.0), ("width", 176.0), ("height", 96.0), ("rx", 12.0)],
        &[("class", LIQUID_CLASS), ("fill", LIQUID_FILL), ("filter", "url(#labGlow)")],
    )?;
    for i in 0..12 {
        let delay = format!("animation-delay: {}s", fmt_num(i as f64 * 0.3));
        shape(
            dom,
            beaker,
            "circle",
            &[("cx", 30.0 + rng.range(0.0, 140.0)), ("cy", 140.0 + rng.range(0.0, 70.0)), ("r", rng.range(2.0, 6.0))],
            &[("class", "lab-bubble"), ("fill", "#e0fff8"), ("opacity", "0.7"), ("style", delay.as_str())],
        )?;
    }

    for (cx, cy, scale) in [(200.0, 120.0, 1.0), (420.0, 70.0, 0.8), (1050.0, 110.0, 1.1)] {
        molecule(dom, svg, Point::new(cx, cy), scale)?;
    }
    for x0 in [120.0, 1240.0] {
        helix(dom, svg, x0)?;
    }
    microscope(dom, svg)?;

    for i in 0..20 {
        let delay = format!("animation-delay: {}s", fmt_num(i as f64 * 0.2));
        shape(
            dom,
            svg,
            "circle",
            &[("cx", rng.range(0.0, 1440.0)), ("cy", rng.range(0.0, 300.0)), ("r", rng.range(1.0, 3.0))],
            &[("class", "lab-particle"), ("fill", "#9ef0d8"), ("opacity", "0.5"), ("style", delay.as_str())],
        )?;
    }

    shape(
        dom,
        svg,
        "rect",
        &[("x", 0.0), ("y", 300.0), ("width", 1440.0), ("height", 60.0)],
        &[("class", "lab-bench"), ("fill", "url(#benchGradient)")],
    )?;
    Ok(svg)
}

fn defs(dom: &mut Document, svg: NodeId) -> TidesResult<()> {
    let defs = dom.append_new(svg, "defs", &[])?;
    let stripes = dom.append_new(
        defs,
        "pattern",
        &[("id", "greenStripes"), ("width", "40"), ("height", "40"), ("patternUnits", "userSpaceOnUse")],
    )?;
    dom.append_new(stripes, "rect", &[("width", "40"), ("height", "40"), ("fill", "#0f2a24")])?;
    dom.append_new(stripes, "rect", &[("width", "20"), ("height", "40"), ("fill", "#12332c")])?;

    let glow = dom.append_new(defs, "filter", &[("id", "labGlow")])?;
    dom.append_new(glow, "feGaussianBlur", &[("stdDeviation", "4"), ("result", "blur")])?;
    let merge = dom.append_new(glow, "feMerge", &[])?;
    dom.append_new(merge, "feMergeNode", &[("in", "blur")])?;
    dom.append_new(merge, "feMergeNode", &[("in", "SourceGraphic")])?;

    gradient(dom, defs, "linearGradient", "liquidGradient", &VERTICAL, &[("0%", "#64ffda", Some("0.8")), ("100%", "#1de9b6", Some("0.9"))])?;
    gradient(dom, defs, "linearGradient", "benchGradient", &VERTICAL, &[("0%", "#37474f", None), ("100%", "#263238", None)])?;
    Ok(())
}

fn molecule(dom: &mut Document, svg: NodeId, center: Point, scale: f64) -> TidesResult<()> {
    let g = dom.append_new(svg, "g", &[("class", "molecule")])?;
    let atoms: Vec<Point> = (0..5)
        .map(|i| {
            let a = i as f64 / 5.0 * TAU;
            Point::new(center.x + 30.0 * scale * a.cos(), center.y + 30.0 * scale * a.sin())
        })
        .collect();
    for atom in &atoms {
        shape(
            dom,
            g,
            "line",
            &[("x1", center.x), ("y1", center.y), ("x2", atom.x), ("y2", atom.y)],
            &[("stroke", "#80cbc4"), ("stroke-width", "2")],
        )?;
    }
    shape(dom, g, "circle", &[("cx", center.x), ("cy", center.y), ("r", 9.0 * scale)], &[("fill", "#4db6ac")])?;
    for atom in &atoms {
        shape(dom, g, "circle", &[("cx", atom.x), ("cy", atom.y), ("r", 5.0 * scale)], &[("fill", "#b2dfdb")])?;
    }
    Ok(())
}

fn helix(dom: &mut Document, svg: NodeId, x0: f64) -> TidesResult<()> {
    let g = dom.append_new(svg, "g", &[("class", "dna-helix")])?;
    let mut left = BezPath::new();
    let mut right = BezPath::new();
    for i in 0..=24 {
        let y = 40.0 + i as f64 * 10.0;
        let phase = i as f64 / 24.0 * TAU * 1.5;
        let a = Point::new(x0 + 20.0 * phase.sin(), y);
        let b = Point::new(x0 - 20.0 * phase.sin(), y);
        if i == 0 {
            left.move_to(a);
            right.move_to(b);
        } else {
            left.line_to(a);
            right.line_to(b);
        }
        if i % 3 == 0 {
            shape(
                dom,
                g,
                "line",
                &[("x1", a.x), ("y1", y), ("x2", b.x), ("y2", y)],
                &[("stroke", "#a7ffeb"), ("stroke-width", "1.5"), ("opacity", "0.6")],
            )?;
        }
    }
    for strand in [left, right] {
        let d = strand.to_svg();
        shape(dom, g, "path", &[], &[("d", d.as_str()), ("fill", "none"), ("stroke", "#64ffda"), ("stroke-width", "2.5")])?;
    }
    Ok(())
}

fn microscope(dom: &mut Document, svg: NodeId) -> TidesResult<()> {
    let g = dom.append_new(svg, "g", &[("class", "microscope"), ("transform", "translate(900,140)")])?;
    shape(dom, g, "rect", &[("x", 0.0), ("y", 150.0), ("width", 90.0), ("height", 12.0), ("rx", 4.0)], &[("fill", "#546e7a")])?;
    shape(dom, g, "rect", &[("x", 60.0), ("y", 40.0), ("width", 12.0), ("height", 115.0)], &[("fill", "#607d8b")])?;
    shape(
        dom,
        g,
        "rect",
        &[("x", 20.0), ("y", 10.0), ("width", 18.0), ("height", 80.0), ("rx", 6.0)],
        &[("fill", "#78909c"), ("transform", "rotate(-20 29 50)")],
    )?;
    shape(dom, g, "rect", &[("x", 10.0), ("y", 110.0), ("width", 70.0), ("height", 6.0)], &[("fill", "#90a4ae")])?;
    Ok(())
}
