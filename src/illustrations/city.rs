use kurbo::BezPath;

use crate::dom::document::{Document, NodeId};
use crate::foundation::error::TidesResult;
use crate::foundation::math::{Rng64, fmt_num};
use crate::illustrations::{VERTICAL, gradient, shape, svg_root};

const SEED: u64 = 0xc1_7e5;
const WIDTH: f64 = 1440.0;
const GROUND: f64 = 360.0;

/// Building height at column `x`.
pub(crate) fn building_height(x: u32) -> f64 {
    200.0 + ((x * 37) % 120) as f64
}

/// Night skyline: moon, buildings with lit windows, street lamps, fog and meteors.
pub fn build(dom: &mut Document) -> TidesResult<NodeId> {
    let mut rng = Rng64::new(SEED);
    let svg = svg_root(dom, "0 0 1440 360", "illu illu-city")?;

    let defs = dom.append_new(svg, "defs", &[])?;
    gradient(dom, defs, "linearGradient", "skyGradient", &VERTICAL, &[("0%", "#0b1026", None), ("100%", "#1c2541", None)])?;
    gradient(dom, defs, "linearGradient", "bldgGradient", &VERTICAL, &[("0%", "#2b3a55", None), ("100%", "#141c2f", None)])?;
    gradient(
        dom,
        defs,
        "radialGradient",
        "moonGlow",
        &[],
        &[("0%", "#fffbe6", Some("0.6")), ("100%", "#fffbe6", Some("0"))],
    )?;

    shape(
        dom,
        svg,
        "rect",
        &[("x", 0.0), ("y", 0.0), ("width", WIDTH), ("height", GROUND)],
        &[("fill", "url(#skyGradient)")],
    )?;
    shape(dom, svg, "circle", &[("cx", 1320.0), ("cy", 80.0), ("r", 50.0)], &[("class", "moon-glow"), ("fill", "url(#moonGlow)")])?;
    shape(dom, svg, "circle", &[("cx", 1320.0), ("cy", 80.0), ("r", 35.0)], &[("class", "moon"), ("fill", "#f4f1de")])?;

    let mut silhouette = BezPath::new();
    silhouette.move_to((0.0, GROUND));
    let mut x = 0.0;
    while x <= WIDTH {
        silhouette.line_to((x, 260.0 + rng.range(0.0, 40.0)));
        x += 40.0;
    }
    silhouette.line_to((WIDTH, GROUND));
    silhouette.close_path();
    let d = silhouette.to_svg();
    shape(dom, svg, "path", &[], &[("d", d.as_str()), ("class", "city-silhouette"), ("fill", "#10162a"), ("opacity", "0.6")])?;

    let skyline = dom.append_new(svg, "g", &[("class", "skyline")])?;
    for x in (0..1440u32).step_by(52) {
        building(dom, skyline, x)?;
    }

    for x in (80..1440).step_by(160) {
        let x = x as f64;
        let lamp = dom.append_new(svg, "g", &[("class", "street-lamp")])?;
        shape(dom, lamp, "rect", &[("x", x - 1.5), ("y", GROUND - 50.0), ("width", 3.0), ("height", 50.0)], &[("fill", "#3a4660")])?;
        shape(dom, lamp, "circle", &[("cx", x), ("cy", GROUND - 52.0), ("r", 5.0)], &[("class", "lamp-light"), ("fill", "#ffe8a3")])?;
    }

    shape(
        dom,
        svg,
        "rect",
        &[("x", 0.0), ("y", GROUND - 8.0), ("width", WIDTH), ("height", 8.0)],
        &[("class", "city-ground"), ("fill", "#0a0f1e")],
    )?;

    for (cx, cy, rx) in [(300.0, 330.0, 260.0), (800.0, 340.0, 320.0), (1250.0, 325.0, 240.0)] {
        shape(
            dom,
            svg,
            "ellipse",
            &[("cx", cx), ("cy", cy), ("rx", rx), ("ry", 18.0)],
            &[("class", "city-fog"), ("fill", "#c8d3f5"), ("opacity", "0.08")],
        )?;
    }

    for i in 0..3 {
        let x = 200.0 + i as f64 * 420.0 + rng.range(0.0, 80.0);
        let y = 30.0 + rng.range(0.0, 40.0);
        let delay = format!("animation-delay: {}s", fmt_num(i as f64 * 2.5));
        shape(
            dom,
            svg,
            "line",
            &[("x1", x), ("y1", y), ("x2", x + 60.0), ("y2", y + 25.0)],
            &[("class", "meteor"), ("stroke", "#ffffff"), ("stroke-width", "1.5"), ("style", delay.as_str())],
        )?;
    }
    Ok(svg)
}

fn building(dom: &mut Document, skyline: NodeId, x: u32) -> TidesResult<()> {
    let h = building_height(x);
    let left = x as f64 + 6.0;
    let top = GROUND - h;
    let g = dom.append_new(skyline, "g", &[("class", "building")])?;
    shape(
        dom,
        g,
        "rect",
        &[("x", left), ("y", top), ("width", 40.0), ("height", h)],
        &[("class", "bldg"), ("fill", "url(#bldgGradient)")],
    )?;
    if h > 280.0 && x % 208 == 0 {
        shape(
            dom,
            g,
            "line",
            &[("x1", left + 20.0), ("y1", top), ("x2", left + 20.0), ("y2", top - 25.0)],
            &[("class", "antenna"), ("stroke", "#8892b0"), ("stroke-width", "2")],
        )?;
        shape(dom, g, "circle", &[("cx", left + 20.0), ("cy", top - 25.0), ("r", 2.5)], &[("class", "antenna-light"), ("fill", "#ff5470")])?;
    }
    if h > 250.0 && x % 156 == 0 {
        shape(
            dom,
            g,
            "rect",
            &[("x", left + 4.0), ("y", top + 12.0), ("width", 32.0), ("height", 6.0), ("rx", 3.0)],
            &[("class", "neon"), ("fill", "#ff2e88")],
        )?;
    }
    let mut wy = top + 24.0;
    while wy < GROUND - 14.0 {
        for col in 0..3 {
            if (wy as u32 + x + col) % 3 == 0 {
                shape(
                    dom,
                    g,
                    "rect",
                    &[("x", left + 6.0 + col as f64 * 11.0), ("y", wy), ("width", 6.0), ("height", 8.0)],
                    &[("class", "window"), ("fill", "#ffd97a")],
                )?;
            }
        }
        wy += 18.0;
    }
    Ok(())
}
