use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::viz::data::{MemoryDataSource, OfflineDataSource};

#[derive(Debug, Default)]
struct Bars {
    renders: usize,
    steps: Vec<i64>,
    fail_render: bool,
    fail_step: Option<i64>,
    spinner: Option<crate::viz::schedule::FrameHandle>,
    frames: usize,
}

impl Chart for Bars {
    type Data = Vec<u32>;

    const KEY: VizKey = VizKey::Ranking;
    const DATASET: &'static str = "data/bars.json";

    fn sample_data() -> Self::Data {
        vec![1, 2, 3]
    }

    fn render(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        root: NodeId,
    ) -> TidesResult<()> {
        if self.fail_render {
            return Err(TidesError::lifecycle("render failed"));
        }
        self.renders += 1;
        for v in core.data()?.clone() {
            dom.append_new(root, "rect", &[("data-v", v.to_string().as_str())])?;
        }
        self.spinner = Some(core.frames.every_frame(ChartTask::Animate("spin")));
        Ok(())
    }

    fn apply_step(
        &mut self,
        _core: &mut ChartCore<Self::Data>,
        _dom: &mut Document,
        _root: NodeId,
        step: Step,
        _options: &UpdateOptions,
    ) -> TidesResult<()> {
        if self.fail_step == Some(step.0) {
            return Err(TidesError::lifecycle(format!("step {} exploded", step.0)));
        }
        self.steps.push(step.0);
        Ok(())
    }

    fn animate(
        &mut self,
        _core: &mut ChartCore<Self::Data>,
        _dom: &mut Document,
        _root: NodeId,
        _name: &'static str,
        _now: Millis,
    ) -> TidesResult<()> {
        self.frames += 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.spinner = None;
    }
}

fn page() -> Document {
    let mut dom = Document::new();
    let body = dom.body();
    dom.append_new(body, "div", &[("id", "viz-ranking")]).unwrap();
    dom
}

fn recorder(ctl: &mut ChartController<Bars>, kind: VizEventKind) -> Rc<RefCell<Vec<VizEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    ctl.on(kind, Box::new(move |e| sink.borrow_mut().push(e.clone())));
    log
}

#[test]
fn init_requires_mount_point() {
    let mut dom = Document::new();
    let mut ctl = ChartController::new(Bars::default());
    let err = ctl
        .init(&mut dom, "viz-ranking", VizOptions::default(), &OfflineDataSource)
        .unwrap_err();
    assert!(matches!(err, TidesError::Setup(_)));
    assert!(!ctl.is_data_ready());
}

#[test]
fn init_falls_back_to_sample_data() {
    let mut dom = page();
    let mut ctl = ChartController::new(Bars::default());
    let ready = recorder(&mut ctl, VizEventKind::DataReady);
    ctl.init(&mut dom, "viz-ranking", VizOptions::default(), &OfflineDataSource)
        .unwrap();
    assert_eq!(ctl.data(), Some(&vec![1, 2, 3]));
    assert_eq!(ctl.data_origin(), Some(DataOrigin::Fallback));
    assert_eq!(ready.borrow().len(), 1);
    assert_eq!(ready.borrow()[0].data["origin"], "fallback");
}

#[test]
fn init_prefers_remote_data() {
    let mut dom = page();
    let mut src = MemoryDataSource::new();
    src.insert("data/bars.json", "[7, 8]").unwrap();
    let mut ctl = ChartController::new(Bars::default());
    ctl.init(&mut dom, "viz-ranking", VizOptions::default(), &src)
        .unwrap();
    assert_eq!(ctl.data(), Some(&vec![7, 8]));
    assert_eq!(ctl.data_origin(), Some(DataOrigin::Remote));
}

#[test]
fn mount_is_idempotent() {
    let mut dom = page();
    let mut ctl = ChartController::new(Bars::default());
    let entered = recorder(&mut ctl, VizEventKind::EnterComplete);
    ctl.init(&mut dom, "viz-ranking", VizOptions::default(), &OfflineDataSource)
        .unwrap();
    ctl.mount(&mut dom).unwrap();
    ctl.mount(&mut dom).unwrap();
    assert_eq!(ctl.chart().renders, 1);
    assert_eq!(entered.borrow().len(), 1);
    let container = dom.element_by_id("viz-ranking").unwrap();
    assert_eq!(dom.children(container).len(), 1);
    assert!(ctl.is_mounted());
}

#[test]
fn mount_before_init_is_lifecycle_error() {
    let mut dom = page();
    let mut ctl = ChartController::new(Bars::default());
    assert!(matches!(
        ctl.mount(&mut dom).unwrap_err(),
        TidesError::Lifecycle(_)
    ));
}

#[test]
fn failed_render_leaves_no_nodes_and_can_retry() {
    let mut dom = page();
    let mut ctl = ChartController::new(Bars {
        fail_render: true,
        ..Bars::default()
    });
    ctl.init(&mut dom, "viz-ranking", VizOptions::default(), &OfflineDataSource)
        .unwrap();
    let before = dom.node_count();
    assert!(ctl.mount(&mut dom).is_err());
    assert_eq!(dom.node_count(), before);
    assert!(!ctl.is_mounted());
    assert_eq!(ctl.live_tasks(), 0);
}

#[test]
fn steps_before_mount_are_replayed_in_order() {
    let mut dom = page();
    let mut ctl = ChartController::new(Bars::default());
    let updates = recorder(&mut ctl, VizEventKind::UpdateComplete);
    ctl.init(&mut dom, "viz-ranking", VizOptions::default(), &OfflineDataSource)
        .unwrap();
    let opts = UpdateOptions::default();
    ctl.update(&mut dom, Step(7), &opts).unwrap();
    ctl.update(&mut dom, Step(8), &opts).unwrap();
    assert!(ctl.chart().steps.is_empty());

    ctl.mount(&mut dom).unwrap();
    assert_eq!(ctl.chart().steps, vec![7, 8]);
    assert_eq!(ctl.state().current_step, Some(Step(8)));
    assert_eq!(updates.borrow().len(), 2);
}

#[test]
fn failing_queued_step_does_not_fail_the_mount() {
    let mut dom = page();
    let mut ctl = ChartController::new(Bars {
        fail_step: Some(2),
        ..Bars::default()
    });
    let errors = recorder(&mut ctl, VizEventKind::Error);
    let updates = recorder(&mut ctl, VizEventKind::UpdateComplete);
    ctl.init(&mut dom, "viz-ranking", VizOptions::default(), &OfflineDataSource)
        .unwrap();
    let opts = UpdateOptions::default();
    for step in [1, 2, 3] {
        ctl.update(&mut dom, Step(step), &opts).unwrap();
    }

    ctl.mount(&mut dom).unwrap();
    assert!(ctl.is_mounted());
    assert_eq!(ctl.chart().steps, vec![1, 3]);
    assert_eq!(updates.borrow().len(), 2);
    let errors = errors.borrow();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].data["step"], 2);
}

#[test]
fn unmount_frees_nodes_and_frames() {
    let mut dom = page();
    let mut ctl = ChartController::new(Bars::default());
    let exited = recorder(&mut ctl, VizEventKind::ExitComplete);
    ctl.init(&mut dom, "viz-ranking", VizOptions::default(), &OfflineDataSource)
        .unwrap();
    let baseline = dom.node_count();
    ctl.mount(&mut dom).unwrap();
    ctl.tick(&mut dom, Millis(16.0)).unwrap();
    assert_eq!(ctl.chart().frames, 1);
    assert_eq!(ctl.live_tasks(), 1);

    ctl.unmount(&mut dom).unwrap();
    assert_eq!(dom.node_count(), baseline);
    assert_eq!(ctl.live_tasks(), 0);
    assert_eq!(exited.borrow().len(), 1);
    ctl.tick(&mut dom, Millis(32.0)).unwrap();
    assert_eq!(ctl.chart().frames, 1);

    ctl.unmount(&mut dom).unwrap();
    assert_eq!(exited.borrow().len(), 1);
}

#[test]
fn destroy_drops_data_and_subscribers() {
    let mut dom = page();
    let mut ctl = ChartController::new(Bars::default());
    ctl.init(&mut dom, "viz-ranking", VizOptions::default(), &OfflineDataSource)
        .unwrap();
    ctl.mount(&mut dom).unwrap();
    let exited = recorder(&mut ctl, VizEventKind::ExitComplete);
    ctl.destroy(&mut dom).unwrap();
    assert!(!ctl.is_data_ready());
    assert_eq!(exited.borrow().len(), 1);
    assert_eq!(ctl.state(), VisualizationState::default());
}

#[test]
fn resize_rerenders_and_reapplies_step() {
    let mut dom = page();
    let mut ctl = ChartController::new(Bars::default());
    ctl.init(&mut dom, "viz-ranking", VizOptions::default(), &OfflineDataSource)
        .unwrap();
    ctl.mount(&mut dom).unwrap();
    ctl.update(&mut dom, Step(7), &UpdateOptions::default())
        .unwrap();
    ctl.resize(&mut dom, 640.0, 480.0).unwrap();
    assert_eq!(ctl.chart().renders, 2);
    assert_eq!(ctl.chart().steps, vec![7, 7]);
    assert_eq!(ctl.live_tasks(), 1);
    assert!(ctl.resize(&mut dom, 0.0, 480.0).is_err());
}

#[test]
fn reduced_motion_is_reported_in_state() {
    let mut dom = page();
    let mut ctl = ChartController::new(Bars::default());
    ctl.init(&mut dom, "viz-ranking", VizOptions::default(), &OfflineDataSource)
        .unwrap();
    ctl.set_reduced_motion(&mut dom, true).unwrap();
    assert!(ctl.state().reduced_motion);
}

#[test]
fn counts_are_compacted() {
    assert_eq!(format_count(892_300.0), "892.3K");
    assert_eq!(format_count(1_500_000.0), "1.5M");
    assert_eq!(format_count(60.0), "60");
}

#[test]
fn stagger_offsets_each_item() {
    assert_eq!(staggered(0.0, 0, 50.0, 300.0), 0.0);
    assert_eq!(staggered(150.0, 0, 50.0, 300.0), 0.5);
    assert_eq!(staggered(150.0, 3, 50.0, 300.0), 0.0);
    assert_eq!(staggered(10_000.0, 3, 50.0, 300.0), 1.0);
}

#[test]
fn ramp_hits_endpoints_and_midpoints() {
    let stops = [[0, 0, 0], [255, 255, 255]];
    assert_eq!(ramp(&stops, 0.0), "#000000");
    assert_eq!(ramp(&stops, 1.0), "#ffffff");
    assert_eq!(ramp(&stops, 0.5), "#808080");
    assert_eq!(ramp(&[[1, 2, 3]], 0.7), "#010203");
}
