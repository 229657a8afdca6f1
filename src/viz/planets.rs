//! Planets: artists as planets orbiting the year, sized by song count and placed by energy.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use crate::dom::document::{DomEventKind, Document, Interaction, NodeId};
use crate::foundation::core::{Millis, Step, VizKey};
use crate::foundation::error::TidesResult;
use crate::foundation::math::fmt_num;
use crate::viz::chart::{Chart, ChartController, ChartCore, ChartTask, append_svg, ramp, set_num};
use crate::viz::contract::{UpdateOptions, VizEventKind};
use crate::viz::schedule::FrameHandle;

const PLASMA: [[u8; 3]; 5] = [
    [0x0d, 0x08, 0x87],
    [0x7e, 0x03, 0xa8],
    [0xcc, 0x47, 0x78],
    [0xf8, 0x95, 0x40],
    [0xf0, 0xf9, 0x21],
];
const DEFAULT_YEAR: &str = "2019";
const ORBIT_OPACITY: f64 = 0.3;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub name: String,
    pub song_count: u32,
    pub avg_danceability: f64,
    pub avg_energy: f64,
}

/// Artists keyed by year label.
pub type ArtistsByYear = BTreeMap<String, Vec<Artist>>;

#[derive(Clone, Debug)]
struct Planet {
    node: NodeId,
    name: String,
    base_angle: f64,
    distance: f64,
    /// Radians per millisecond.
    speed: f64,
}

/// Orbiting planet system with year switching.
#[derive(Debug)]
pub struct PlanetsChart {
    year: String,
    orbits: Option<NodeId>,
    planets_g: Option<NodeId>,
    planets: Vec<Planet>,
    orbit: Option<(FrameHandle, Millis)>,
}

impl Default for PlanetsChart {
    fn default() -> Self {
        Self {
            year: DEFAULT_YEAR.to_string(),
            orbits: None,
            planets_g: None,
            planets: Vec::new(),
            orbit: None,
        }
    }
}

pub type PlanetsViz = ChartController<PlanetsChart>;

impl PlanetsChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Year currently displayed.
    pub fn year(&self) -> &str {
        &self.year
    }

    /// Planet group node for `name`, if drawn.
    pub fn planet(&self, name: &str) -> Option<NodeId> {
        self.planets.iter().find(|p| p.name == name).map(|p| p.node)
    }

    fn center(core: &ChartCore<ArtistsByYear>) -> (f64, f64) {
        (core.options.width / 2.0, core.options.height / 2.0)
    }

    fn draw_year(&mut self, core: &mut ChartCore<ArtistsByYear>, dom: &mut Document) -> TidesResult<()> {
        let (Some(orbits_g), Some(planets_g)) = (self.orbits, self.planets_g) else {
            return Ok(());
        };
        dom.clear_children(orbits_g);
        dom.clear_children(planets_g);
        self.planets.clear();

        let (cx, cy) = Self::center(core);
        let min_radius = 80.0;
        let max_radius = (core.options.width.min(core.options.height) / 2.0 - 100.0).max(min_radius);
        let Some(artists) = core.data()?.get(&self.year) else {
            return Ok(());
        };
        let max_songs = artists.iter().map(|a| a.song_count).max().unwrap_or(1).max(1);
        let step = TAU / artists.len().max(1) as f64;

        for (i, artist) in artists.iter().enumerate() {
            let base_angle = i as f64 * step;
            let distance = min_radius + (max_radius - min_radius) * artist.avg_energy.clamp(0.0, 1.0);
            let size = if max_songs > 1 {
                let t = (f64::from(artist.song_count.saturating_sub(1)) / f64::from(max_songs - 1)).sqrt();
                15.0 + 35.0 * t
            } else {
                50.0
            };

            let orbit = dom.append_new(orbits_g, "circle", &[("class", "planet-orbit"), ("fill", "none")])?;
            set_num(dom, orbit, "cx", cx)?;
            set_num(dom, orbit, "cy", cy)?;
            set_num(dom, orbit, "r", distance)?;
            set_num(dom, orbit, "opacity", ORBIT_OPACITY)?;

            let planet = dom.append_new(
                planets_g,
                "g",
                &[("class", "planet"), ("data-name", artist.name.as_str())],
            )?;
            let circle = dom.append_new(planet, "circle", &[("cx", "0"), ("cy", "0")])?;
            set_num(dom, circle, "r", size)?;
            dom.set_attr(circle, "fill", &ramp(&PLASMA, artist.avg_danceability))?;
            let label = dom.append_new(planet, "text", &[("text-anchor", "middle"), ("dy", "-5")])?;
            dom.set_text(label, &artist.name)?;

            let placed = Planet {
                node: planet,
                name: artist.name.clone(),
                base_angle,
                distance,
                speed: 0.00005 / (distance / 100.0),
            };
            place(dom, &placed, cx, cy, 0.0)?;
            self.planets.push(placed);
        }

        for btn in dom.find_by_class(dom.body(), "year-btn") {
            if dom.attr(btn, "data-year") == Some(self.year.as_str()) {
                dom.add_class(btn, "active")?;
            } else {
                dom.remove_class(btn, "active")?;
            }
        }
        self.restart_orbit(core);
        Ok(())
    }

    fn restart_orbit(&mut self, core: &mut ChartCore<ArtistsByYear>) {
        if let Some((handle, _)) = self.orbit.take() {
            core.frames.cancel(handle);
        }
        if !core.options.reduced_motion && !self.planets.is_empty() {
            let handle = core.frames.every_frame(ChartTask::Animate("orbit"));
            self.orbit = Some((handle, core.frames.now()));
        }
    }

    fn switch_year(&mut self, core: &mut ChartCore<ArtistsByYear>, dom: &mut Document, year: &str) -> TidesResult<()> {
        if !core.data()?.contains_key(year) {
            tracing::debug!(year, "unknown year ignored");
            return Ok(());
        }
        self.year = year.to_string();
        self.draw_year(core, dom)?;
        core.emit(VizEventKind::StateChange);
        Ok(())
    }

    fn highlight_top(&mut self, core: &mut ChartCore<ArtistsByYear>, dom: &mut Document) -> TidesResult<()> {
        let Some(artists) = core.data()?.get(&self.year) else {
            return Ok(());
        };
        let mut ranked: Vec<&Artist> = artists.iter().collect();
        ranked.sort_by(|a, b| b.song_count.cmp(&a.song_count));
        let top: Vec<String> = ranked.iter().take(2).map(|a| a.name.clone()).collect();

        for planet in &self.planets {
            let lit = top.contains(&planet.name);
            set_num(dom, planet.node, "opacity", if lit { 1.0 } else { 0.3 })?;
        }
        core.highlights = top.clone();
        core.emit_with(
            VizEventKind::ArtistHighlight,
            serde_json::json!({ "year": self.year, "artists": top }),
        );
        Ok(())
    }

    fn set_orbit_opacity(&self, dom: &mut Document, opacity: f64) -> TidesResult<()> {
        if let Some(orbits_g) = self.orbits {
            for orbit in dom.find_by_class(orbits_g, "planet-orbit") {
                set_num(dom, orbit, "opacity", opacity)?;
            }
        }
        Ok(())
    }
}

fn place(dom: &mut Document, planet: &Planet, cx: f64, cy: f64, elapsed_ms: f64) -> TidesResult<()> {
    let angle = planet.base_angle + elapsed_ms * planet.speed;
    let x = cx + planet.distance * angle.cos();
    let y = cy + planet.distance * angle.sin();
    dom.set_attr(planet.node, "transform", &format!("translate({}, {})", fmt_num(x), fmt_num(y)))
}

fn artist(name: &str, song_count: u32, avg_danceability: f64, avg_energy: f64) -> Artist {
    Artist {
        name: name.to_string(),
        song_count,
        avg_danceability,
        avg_energy,
    }
}

impl Chart for PlanetsChart {
    type Data = ArtistsByYear;

    const KEY: VizKey = VizKey::Planets;
    const DATASET: &'static str = "data/artists_by_year.json";

    fn sample_data() -> Self::Data {
        BTreeMap::from([
            (
                "2019".to_string(),
                vec![
                    artist("Lil Nas X", 8, 0.85, 0.72),
                    artist("Billie Eilish", 12, 0.67, 0.45),
                    artist("Post Malone", 6, 0.72, 0.58),
                    artist("Lizzo", 5, 0.89, 0.81),
                ],
            ),
            (
                "2020".to_string(),
                vec![
                    artist("Doja Cat", 10, 0.82, 0.69),
                    artist("Megan Thee Stallion", 7, 0.91, 0.85),
                    artist("DaBaby", 8, 0.78, 0.73),
                    artist("Roddy Ricch", 6, 0.65, 0.52),
                ],
            ),
            (
                "2021".to_string(),
                vec![
                    artist("Olivia Rodrigo", 11, 0.58, 0.62),
                    artist("Dua Lipa", 9, 0.76, 0.71),
                    artist("The Weeknd", 7, 0.69, 0.58),
                    artist("Ariana Grande", 8, 0.73, 0.65),
                ],
            ),
            (
                "2022".to_string(),
                vec![
                    artist("Glass Animals", 6, 0.71, 0.55),
                    artist("Kate Bush", 4, 0.52, 0.48),
                    artist("Steve Lacy", 5, 0.78, 0.61),
                    artist("Jack Harlow", 7, 0.81, 0.74),
                ],
            ),
        ])
    }

    fn render(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        root: NodeId,
    ) -> TidesResult<()> {
        let years = dom.append_new(root, "div", &[("class", "year-selector")])?;
        for year in core.data()?.keys().cloned().collect::<Vec<_>>() {
            let btn = dom.append_new(
                years,
                "button",
                &[("class", "year-btn"), ("data-year", year.as_str())],
            )?;
            dom.set_text(btn, &year)?;
            dom.listen(
                btn,
                DomEventKind::Click,
                Interaction::Viz {
                    viz: VizKey::Planets,
                    action: format!("year:{year}"),
                },
            )?;
        }

        let svg = append_svg(
            dom,
            root,
            &core.options,
            "Planet system visualization showing artists as gravitational centers",
        )?;
        self.orbits = Some(dom.append_new(svg, "g", &[("id", "orbits")])?);
        self.planets_g = Some(dom.append_new(svg, "g", &[("id", "planets")])?);
        let (cx, cy) = Self::center(core);
        let sun = dom.append_new(svg, "circle", &[("class", "sun"), ("r", "40"), ("fill", "#FFEB3B")])?;
        set_num(dom, sun, "cx", cx)?;
        set_num(dom, sun, "cy", cy)?;

        if !core.data()?.contains_key(&self.year) {
            if let Some(first) = core.data()?.keys().next() {
                self.year = first.clone();
            }
        }
        self.draw_year(core, dom)
    }

    fn apply_step(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        _root: NodeId,
        step: Step,
        _options: &UpdateOptions,
    ) -> TidesResult<()> {
        match step.0 {
            3 => self.highlight_top(core, dom),
            4 => self.switch_year(core, dom, "2022"),
            _ => Ok(()),
        }
    }

    fn animate(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        _root: NodeId,
        name: &'static str,
        now: Millis,
    ) -> TidesResult<()> {
        if name != "orbit" {
            return Ok(());
        }
        let Some((_, started)) = self.orbit else {
            return Ok(());
        };
        let (cx, cy) = Self::center(core);
        let elapsed = now.0 - started.0;
        for planet in &self.planets {
            place(dom, planet, cx, cy, elapsed)?;
        }
        Ok(())
    }

    fn interact(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        _root: NodeId,
        action: &str,
    ) -> TidesResult<()> {
        match action.strip_prefix("year:") {
            Some(year) => self.switch_year(core, dom, year),
            None => Ok(()),
        }
    }

    fn motion_changed(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        _dom: &mut Document,
        _root: NodeId,
    ) -> TidesResult<()> {
        self.restart_orbit(core);
        Ok(())
    }

    fn transition_out(&mut self, _core: &mut ChartCore<Self::Data>, dom: &mut Document, _root: NodeId) {
        if let Err(err) = self.set_orbit_opacity(dom, 0.0) {
            tracing::warn!(error = %err, "orbit fade skipped");
        }
    }

    fn transition_in(&mut self, _core: &mut ChartCore<Self::Data>, dom: &mut Document, _root: NodeId) {
        if let Err(err) = self.set_orbit_opacity(dom, ORBIT_OPACITY) {
            tracing::warn!(error = %err, "orbit restore skipped");
        }
    }

    fn reset(&mut self) {
        self.orbits = None;
        self.planets_g = None;
        self.planets.clear();
        self.orbit = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viz/planets.rs"]
mod tests;
