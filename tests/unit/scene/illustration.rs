use super::*;

fn page() -> (Document, IllustrationMounter) {
    let mut dom = Document::new();
    let body = dom.body();
    for id in ["section-fade", "section-spillover", "section-ingredients", "section-takeaway"] {
        dom.append_new(body, "section", &[("id", id)]).unwrap();
    }
    let mounter = IllustrationMounter::new(SceneRegistry::standard());
    (dom, mounter)
}

fn attached_illustrations(dom: &Document) -> usize {
    dom.find_by_class(dom.root(), "illu").len()
}

#[test]
fn ensure_hosts_creates_containers_once() {
    let (mut dom, mounter) = page();
    assert_eq!(mounter.ensure_hosts(&mut dom).unwrap(), 3);
    assert_eq!(mounter.ensure_hosts(&mut dom).unwrap(), 0);
    let fade = dom.element_by_id("section-fade").unwrap();
    let first = dom.children(fade)[0];
    assert!(dom.has_class(first, CONTAINER_CLASS));
    assert_eq!(dom.attr(first, "aria-hidden"), Some("true"));
}

#[test]
fn swap_detaches_before_attaching() {
    let (mut dom, mut mounter) = page();
    mounter.on_scene_change(&mut dom, Some(SceneName::Forest)).unwrap();
    let forest = mounter.current().unwrap().node;
    mounter.on_scene_change(&mut dom, Some(SceneName::City)).unwrap();
    let city = mounter.current().unwrap().node;

    assert_eq!(
        mounter.log(),
        &[
            MountOp::Attach { scene: SceneName::Forest, node: forest },
            MountOp::Detach { scene: SceneName::Forest, node: forest },
            MountOp::Attach { scene: SceneName::City, node: city },
        ]
    );
    assert!(!dom.contains(forest));
    assert_eq!(attached_illustrations(&dom), 1);
    let host = dom.element_by_id("section-spillover").unwrap();
    assert!(dom.subtree(host).contains(&city));
}

#[test]
fn scene_without_factory_clears_illustration() {
    let (mut dom, mut mounter) = page();
    mounter.on_scene_change(&mut dom, Some(SceneName::Lab)).unwrap();
    mounter.on_scene_change(&mut dom, Some(SceneName::Air)).unwrap();
    assert!(mounter.current().is_none());
    assert_eq!(attached_illustrations(&dom), 0);
    mounter.on_scene_change(&mut dom, None).unwrap();
    assert_eq!(mounter.log().len(), 2);
}

#[test]
fn same_scene_is_not_rebuilt() {
    let (mut dom, mut mounter) = page();
    mounter.on_scene_change(&mut dom, Some(SceneName::Forest)).unwrap();
    mounter.on_scene_change(&mut dom, Some(SceneName::Forest)).unwrap();
    assert_eq!(mounter.log().len(), 1);
}

#[test]
fn missing_host_is_a_setup_error_and_clears_previous() {
    let mut dom = Document::new();
    let body = dom.body();
    dom.append_new(body, "section", &[("id", "section-fade")]).unwrap();
    let mut mounter = IllustrationMounter::new(SceneRegistry::standard());
    mounter.on_scene_change(&mut dom, Some(SceneName::Forest)).unwrap();
    let err = mounter.on_scene_change(&mut dom, Some(SceneName::City)).unwrap_err();
    assert!(matches!(err, TidesError::Setup(_)));
    assert!(mounter.current().is_none());
    assert_eq!(attached_illustrations(&dom), 0);
}

#[test]
fn egg_listeners_live_inside_the_illustration() {
    let (mut dom, mut mounter) = page();
    mounter.on_scene_change(&mut dom, Some(SceneName::Forest)).unwrap();
    let svg = mounter.current().unwrap().node;
    assert_eq!(dom.listeners_within(svg), 1);
    assert_eq!(dom.listener_count(), 1);

    let zone = dom.first_by_class(svg, EGG_ZONE_CLASS).unwrap();
    let fired = dom.dispatch(zone, DomEventKind::Click);
    assert_eq!(fired, vec![Interaction::Egg { egg: EggKind::DropLeaf }]);

    mounter.on_scene_change(&mut dom, Some(SceneName::Lab)).unwrap();
    assert_eq!(dom.listener_count(), 1);
    mounter.on_scene_change(&mut dom, None).unwrap();
    assert_eq!(dom.listener_count(), 0);
}

#[test]
fn leaf_is_removed_after_its_fall() {
    let (mut dom, mut mounter) = page();
    mounter.on_scene_change(&mut dom, Some(SceneName::Forest)).unwrap();
    let svg = mounter.current().unwrap().node;
    mounter.handle_egg(&mut dom, EggKind::DropLeaf).unwrap();
    assert_eq!(dom.find_by_class(svg, "falling-leaf").len(), 1);
    assert_eq!(mounter.live_tasks(), 1);

    mounter.tick(&mut dom, Millis(1999.0));
    assert_eq!(dom.find_by_class(svg, "falling-leaf").len(), 1);
    mounter.tick(&mut dom, Millis(2000.0));
    assert!(dom.find_by_class(svg, "falling-leaf").is_empty());
    assert_eq!(mounter.live_tasks(), 0);
}

#[test]
fn eggs_for_other_scenes_are_ignored() {
    let (mut dom, mut mounter) = page();
    mounter.handle_egg(&mut dom, EggKind::Beacons).unwrap();
    mounter.on_scene_change(&mut dom, Some(SceneName::Forest)).unwrap();
    mounter.handle_egg(&mut dom, EggKind::Bubbles).unwrap();
    assert_eq!(mounter.live_tasks(), 0);
}

#[test]
fn beacons_sit_above_buildings() {
    let (mut dom, mut mounter) = page();
    mounter.on_scene_change(&mut dom, Some(SceneName::City)).unwrap();
    let svg = mounter.current().unwrap().node;
    mounter.handle_egg(&mut dom, EggKind::Beacons).unwrap();
    let beacons = dom.find_by_class(svg, "city-beacon");
    assert_eq!(beacons.len(), 2);
    for b in &beacons {
        let cy: f64 = dom.attr(*b, "cy").unwrap().parse().unwrap();
        assert!(cy < 360.0 - 200.0);
    }
    mounter.tick(&mut dom, Millis(600.0));
    assert!(dom.find_by_class(svg, "city-beacon").is_empty());
}

#[test]
fn reduced_motion_flashes_liquid_instead_of_bubbles() {
    let (mut dom, mut mounter) = page();
    mounter.set_reduced_motion(true);
    mounter.on_scene_change(&mut dom, Some(SceneName::Lab)).unwrap();
    let svg = mounter.current().unwrap().node;
    let liquid = dom.first_by_class(svg, LIQUID_CLASS).unwrap();

    mounter.handle_egg(&mut dom, EggKind::Bubbles).unwrap();
    assert!(dom.find_by_class(svg, "egg-bubble").is_empty());
    assert_eq!(dom.attr(liquid, "fill"), Some("rgba(100,255,240,0.6)"));
    mounter.tick(&mut dom, Millis(300.0));
    assert_eq!(dom.attr(liquid, "fill"), Some(LIQUID_FILL));
}

#[test]
fn bubbles_are_staggered_and_cleared_on_detach() {
    let (mut dom, mut mounter) = page();
    mounter.on_scene_change(&mut dom, Some(SceneName::Lab)).unwrap();
    let svg = mounter.current().unwrap().node;
    mounter.handle_egg(&mut dom, EggKind::Bubbles).unwrap();
    assert_eq!(dom.find_by_class(svg, "egg-bubble").len(), 3);
    mounter.tick(&mut dom, Millis(1000.0));
    assert_eq!(dom.find_by_class(svg, "egg-bubble").len(), 2);

    mounter.on_scene_change(&mut dom, Some(SceneName::Forest)).unwrap();
    assert_eq!(mounter.live_tasks(), 0);
}

#[test]
fn subscriber_follows_store_changes() {
    let (mut dom, mut mounter) = page();
    let change = SceneChange {
        previous: None,
        current: Some(SceneName::Forest),
    };
    mounter.scene_changed(&mut dom, &change).unwrap();
    assert_eq!(mounter.current().map(|a| a.scene), Some(SceneName::Forest));
}
