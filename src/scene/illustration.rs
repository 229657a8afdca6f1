use kurbo::BezPath;

use crate::dom::document::{DomEventKind, Document, EggKind, Interaction, NodeId};
use crate::dom::task::DomTask;
use crate::foundation::core::{Millis, SceneName};
use crate::foundation::error::{TidesError, TidesResult};
use crate::foundation::math::{Rng64, fmt_num};
use crate::illustrations::lab::{LIQUID_CLASS, LIQUID_FILL};
use crate::scene::registry::SceneRegistry;
use crate::scene::store::{SceneChange, SceneSubscriber};
use crate::viz::schedule::FrameScheduler;

/// Container inside a host section that receives the illustration.
pub const CONTAINER_CLASS: &str = "scene-illustration";
/// Transparent hot zone carrying an easter-egg listener.
pub const EGG_ZONE_CLASS: &str = "egg-zone";

const EGG_SEED: u64 = 0xe66;
const LEAF_MS: f64 = 2000.0;
const BEACON_MS: f64 = 600.0;
const FLASH_MS: f64 = 300.0;
const BUBBLE_MS: f64 = 1000.0;
const BUBBLE_STAGGER_MS: f64 = 150.0;

/// Recorded attach/detach operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MountOp {
    Attach { scene: SceneName, node: NodeId },
    Detach { scene: SceneName, node: NodeId },
}

/// The one mounted illustration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveIllustration {
    pub scene: SceneName,
    pub node: NodeId,
    pub container: NodeId,
}

/// Keeps the decorative illustration in sync with the active scene.
///
/// At most one illustration is attached. A replacement is built first, then the previous node is
/// removed together with its listeners and timers, then the new node is attached and its
/// easter-egg zones are registered on its own subtree.
#[derive(Debug)]
pub struct IllustrationMounter {
    registry: SceneRegistry,
    active: Option<ActiveIllustration>,
    frames: FrameScheduler<DomTask>,
    reduced_motion: bool,
    rng: Rng64,
    log: Vec<MountOp>,
}

impl IllustrationMounter {
    pub fn new(registry: SceneRegistry) -> Self {
        Self {
            registry,
            active: None,
            frames: FrameScheduler::new(),
            reduced_motion: false,
            rng: Rng64::new(EGG_SEED),
            log: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<ActiveIllustration> {
        self.active
    }

    /// Attach/detach history.
    pub fn log(&self) -> &[MountOp] {
        &self.log
    }

    /// Live easter-egg timers.
    pub fn live_tasks(&self) -> usize {
        self.frames.live_count()
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    /// Create the illustration container in every host section that lacks one.
    ///
    /// Returns the number of containers created. Missing host sections are skipped.
    pub fn ensure_hosts(&self, dom: &mut Document) -> TidesResult<usize> {
        let mut created = 0;
        for (scene, host) in self.registry.illustrated_scenes() {
            let Some(section) = dom.element_by_id(host.as_str()) else {
                tracing::warn!(scene = %scene, host = %host, "illustration host section missing");
                continue;
            };
            if dom.first_by_class(section, CONTAINER_CLASS).is_none() {
                container(dom, section)?;
                created += 1;
            }
        }
        Ok(created)
    }

    /// Swap the illustration for `scene`.
    pub fn on_scene_change(&mut self, dom: &mut Document, scene: Option<SceneName>) -> TidesResult<()> {
        let Some((scene, factory)) =
            scene.and_then(|s| Some((s, self.registry.illustration_factory_for_scene(s)?)))
        else {
            self.detach_current(dom);
            return Ok(());
        };
        if self.active.is_some_and(|a| a.scene == scene) {
            return Ok(());
        }
        let host = self
            .registry
            .host_section_for_scene(scene)
            .and_then(|host| dom.element_by_id(host.as_str()));
        let Some(host) = host else {
            self.detach_current(dom);
            return Err(TidesError::setup(format!("no host section for scene '{scene}'")));
        };

        let node = match factory(dom) {
            Ok(node) => node,
            Err(err) => {
                self.detach_current(dom);
                return Err(err);
            }
        };
        self.detach_current(dom);
        let target = match dom.first_by_class(host, CONTAINER_CLASS) {
            Some(existing) => existing,
            None => container(dom, host)?,
        };
        dom.append_child(target, node)?;
        self.log.push(MountOp::Attach { scene, node });
        self.active = Some(ActiveIllustration {
            scene,
            node,
            container: target,
        });
        tracing::debug!(scene = %scene, "illustration attached");
        attach_eggs(dom, scene, node)
    }

    /// Remove the current illustration, its listeners and its timers.
    pub fn detach_current(&mut self, dom: &mut Document) {
        let Some(active) = self.active.take() else {
            return;
        };
        self.frames.cancel_all();
        dom.remove(active.node);
        self.log.push(MountOp::Detach {
            scene: active.scene,
            node: active.node,
        });
        tracing::debug!(scene = %active.scene, "illustration detached");
    }

    /// React to an easter-egg zone. Eggs of scenes that are no longer attached are ignored.
    pub fn handle_egg(&mut self, dom: &mut Document, egg: EggKind) -> TidesResult<()> {
        let Some(active) = self.active else {
            return Ok(());
        };
        match (egg, active.scene) {
            (EggKind::DropLeaf, SceneName::Forest) => self.drop_leaf(dom, active.node),
            (EggKind::Beacons, SceneName::City) => self.beacons(dom, active.node),
            (EggKind::Bubbles, SceneName::Lab) => self.bubbles(dom, active.node),
            _ => Ok(()),
        }
    }

    /// Run due cleanup timers.
    pub fn tick(&mut self, dom: &mut Document, now: Millis) {
        for fired in self.frames.advance(now) {
            if let Err(err) = fired.task.apply(dom) {
                tracing::warn!(%err, "illustration timer failed");
            }
        }
    }

    fn drop_leaf(&mut self, dom: &mut Document, svg: NodeId) -> TidesResult<()> {
        let x = self.rng.range(100.0, 1340.0);
        let mut leaf = BezPath::new();
        leaf.move_to((x, 0.0));
        leaf.quad_to((x + 10.0, 8.0), (x, 18.0));
        leaf.quad_to((x - 10.0, 8.0), (x, 0.0));
        let d = leaf.to_svg();
        let style = if self.reduced_motion {
            "opacity: 0.8; transform: translateY(120px)"
        } else {
            "animation: leaf-fall 2s ease-in forwards"
        };
        let node = dom.append_new(
            svg,
            "path",
            &[("class", "falling-leaf"), ("d", d.as_str()), ("fill", "#2a8a5f"), ("style", style)],
        )?;
        self.frames.after(LEAF_MS, DomTask::Remove(node));
        Ok(())
    }

    fn beacons(&mut self, dom: &mut Document, svg: NodeId) -> TidesResult<()> {
        let buildings = dom.find_by_class(svg, "bldg");
        if buildings.is_empty() {
            return Ok(());
        }
        for _ in 0..2 {
            let pick = (self.rng.next_u64() % buildings.len() as u64) as usize;
            let bldg = buildings[pick];
            let num = |name: &str| {
                dom.attr(bldg, name)
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(0.0)
            };
            let (cx, cy) = (num("x") + 20.0, num("y") - 5.0);
            let (cx, cy) = (fmt_num(cx), fmt_num(cy));
            let beacon = dom.append_new(
                svg,
                "circle",
                &[("class", "city-beacon"), ("cx", cx.as_str()), ("cy", cy.as_str()), ("r", "8")],
            )?;
            self.frames.after(BEACON_MS, DomTask::Remove(beacon));
        }
        Ok(())
    }

    fn bubbles(&mut self, dom: &mut Document, svg: NodeId) -> TidesResult<()> {
        if self.reduced_motion {
            let Some(liquid) = dom.first_by_class(svg, LIQUID_CLASS) else {
                return Ok(());
            };
            dom.set_attr(liquid, "fill", "rgba(100,255,240,0.6)")?;
            self.frames.after(
                FLASH_MS,
                DomTask::SetAttr {
                    node: liquid,
                    name: "fill",
                    value: LIQUID_FILL.to_string(),
                },
            );
            return Ok(());
        }
        for i in 0..3 {
            let cx = fmt_num(690.0 + i as f64 * 30.0);
            let r = fmt_num(5.0 + i as f64 * 2.0);
            let bubble = dom.append_new(
                svg,
                "circle",
                &[("class", "egg-bubble"), ("cx", cx.as_str()), ("cy", "250"), ("r", r.as_str())],
            )?;
            self.frames
                .after(BUBBLE_MS + i as f64 * BUBBLE_STAGGER_MS, DomTask::Remove(bubble));
        }
        Ok(())
    }
}

impl SceneSubscriber for IllustrationMounter {
    fn scene_changed(&mut self, dom: &mut Document, change: &SceneChange) -> TidesResult<()> {
        self.on_scene_change(dom, change.current)
    }
}

fn container(dom: &mut Document, host: NodeId) -> TidesResult<NodeId> {
    let div = dom.create_element("div");
    dom.set_attr(div, "class", CONTAINER_CLASS)?;
    dom.set_attr(div, "aria-hidden", "true")?;
    dom.prepend_child(host, div)?;
    Ok(div)
}

/// Register the scene's hot zones inside the illustration subtree.
fn attach_eggs(dom: &mut Document, scene: SceneName, svg: NodeId) -> TidesResult<()> {
    let (rect, kind, egg) = match scene {
        SceneName::Forest => ([0.0, 0.0, 1440.0, 300.0], DomEventKind::Click, EggKind::DropLeaf),
        SceneName::City => ([0.0, 0.0, 1440.0, 360.0], DomEventKind::MouseEnter, EggKind::Beacons),
        SceneName::Lab => ([650.0, 50.0, 140.0, 250.0], DomEventKind::Click, EggKind::Bubbles),
        _ => return Ok(()),
    };
    let [x, y, w, h] = rect.map(fmt_num);
    let zone = dom.append_new(
        svg,
        "rect",
        &[
            ("class", EGG_ZONE_CLASS),
            ("x", x.as_str()),
            ("y", y.as_str()),
            ("width", w.as_str()),
            ("height", h.as_str()),
            ("fill", "transparent"),
        ],
    )?;
    dom.listen(zone, kind, Interaction::Egg { egg })?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/illustration.rs"]
mod tests;
