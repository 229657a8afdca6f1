use super::*;
use crate::scene::illustration::CONTAINER_CLASS;
use crate::viz::data::OfflineDataSource;

fn page() -> Page {
    Page::standard(&OfflineDataSource).unwrap()
}

fn by_id(page: &Page, id: &str) -> NodeId {
    page.dom().element_by_id(id).unwrap()
}

fn first(page: &Page, class: &str) -> NodeId {
    page.dom().first_by_class(page.dom().root(), class).unwrap()
}

#[test]
fn construction_enters_the_landing_section() {
    let page = page();
    assert_eq!(page.current_scene(), Some(SceneName::Cosmos));
    assert_eq!(page.announcement(), Some("Landing section entered - cosmos scene"));
    assert!(page.timeline().iter().any(|e| e.record
        == Record::Announcement {
            text: LOADED_ANNOUNCEMENT.to_string()
        }));
    let body = page.dom().body();
    assert_eq!(page.dom().attr(body, "data-scene"), Some("cosmos"));
    assert_eq!(page.dom().attr(body, "data-env"), Some("development"));
    assert!(page.dom().has_class(body, "bg-cosmos"));
    assert_eq!(page.dom().text(first(&page, "scene-chip")), Some("scene: cosmos"));
    assert_eq!(page.observer().watched_sections(), 7);
    assert_eq!(page.observer().watched_markers(), 12);
}

#[test]
fn scrolling_into_a_chapter_updates_page_state() {
    let mut page = page();
    page.scroll_to(900.0);
    assert_eq!(page.current_scene(), Some(SceneName::Dawn));
    assert!(page.orchestrator().has_mounted(VizKey::Stopwatch));

    let ignite = by_id(&page, "section-ignite");
    let rail = page.dom().first_by_class(ignite, "annotation").unwrap();
    assert_eq!(page.dom().text(rail), default_annotation(Step(2)));

    let body = page.dom().body();
    assert!(page.dom().has_class(body, "bg-dawn"));
    assert!(!page.dom().has_class(body, "bg-cosmos"));
    for link in page.dom().find_by_class(page.dom().root(), "nav-link") {
        let expected = if page.dom().attr(link, "data-section") == Some("section-ignite") {
            "true"
        } else {
            "false"
        };
        assert_eq!(page.dom().attr(link, "aria-current"), Some(expected));
    }
    assert_eq!(page.progress_percent(), 12.5);
    assert_eq!(page.dom().attr(first(&page, "progress-bar"), "style"), Some("width: 12.5%"));
}

#[test]
fn scroll_is_clamped_to_the_document() {
    let mut page = page();
    page.scroll_to(1e9);
    assert_eq!(page.scroll_y(), 7200.0);
    assert_eq!(page.progress_percent(), 100.0);
    assert_eq!(page.current_scene(), Some(SceneName::Lab));
    page.scroll_to(f64::NAN);
    assert_eq!(page.scroll_y(), 0.0);
}

#[test]
fn progress_is_zero_when_nothing_scrolls() {
    let mut manifest = PageManifest::standard();
    manifest.sections = vec![SectionSpec::new("only", 0.0, 400.0).with_scene(SceneName::Air)];
    let mut page = Page::new(manifest, &OfflineDataSource).unwrap();
    page.scroll_to(500.0);
    assert_eq!(page.progress_percent(), 0.0);
    assert_eq!(page.current_scene(), Some(SceneName::Air));
}

#[test]
fn kpis_count_up_with_stagger() {
    let mut page = page();
    page.scroll_to(900.0);
    let ignite = by_id(&page, "section-ignite");
    let kpis = page.dom().find_by_class(ignite, "kpi-value");
    assert_eq!(kpis.len(), 3);
    assert_eq!(page.dom().text(kpis[0]), Some("0.0"));
    assert_eq!(page.dom().text(kpis[1]), Some("0"));

    page.tick(Millis(500.0));
    let mid: f64 = page.dom().text(kpis[0]).unwrap().parse().unwrap();
    assert!(mid > 0.0 && mid < 892.3);

    page.tick(Millis(1200.0));
    let texts: Vec<&str> = kpis.iter().filter_map(|k| page.dom().text(*k)).collect();
    assert_eq!(texts, vec!["892.3", "15", "30"]);
}

#[test]
fn digit_keys_jump_to_chapters_in_production() {
    let mut manifest = PageManifest::standard();
    manifest.production = true;
    let mut page = Page::new(manifest, &OfflineDataSource).unwrap();
    assert!(page.dom().first_by_class(page.dom().root(), "scene-chip").is_none());

    page.key("3");
    assert_eq!(page.scroll_y(), 3300.0);
    assert_eq!(page.current_scene(), Some(SceneName::City));
    page.key("7");
    assert_eq!(page.current_scene(), Some(SceneName::City));
}

#[test]
fn dev_digit_forces_scene() {
    let mut page = page();
    page.key("7");
    assert_eq!(page.scroll_y(), 0.0);
    assert_eq!(page.current_scene(), Some(SceneName::Lab));
    assert_eq!(page.mounter().current().map(|a| a.scene), Some(SceneName::Lab));
    page.key("x");
    page.key("12");
    assert_eq!(page.current_scene(), Some(SceneName::Lab));
}

#[test]
fn ranking_detail_opens_once_and_escape_closes() {
    let mut page = page();
    let ranking = by_id(&page, "viz-ranking");
    let panel = first(&page, "detail-panel");
    page.click(ranking);
    assert_eq!(page.dom().attr(panel, "aria-hidden"), Some("false"));
    let title = page.dom().first_by_class(panel, "detail-title").unwrap();
    assert_eq!(page.dom().text(title), Some("Fade/Revival"));

    page.key("Escape");
    assert_eq!(page.dom().attr(panel, "aria-hidden"), Some("true"));
    page.click(ranking);
    assert_eq!(page.dom().attr(panel, "aria-hidden"), Some("true"));
}

#[test]
fn audio_preview_plays_only_when_unmuted() {
    let mut page = page();
    page.jump_to(&SectionId::new("section-spillover"));
    let sound = page
        .dom()
        .subtree(page.dom().root())
        .into_iter()
        .find(|n| page.dom().attr(*n, "data-id") == Some("sound1"))
        .unwrap();
    let preview = first(&page, "audio-preview");

    assert!(page.is_muted());
    page.hover(sound);
    assert!(!page.dom().has_class(preview, "playing"));

    assert!(!page.toggle_audio());
    assert_eq!(page.announcement(), Some("Audio unmuted"));
    page.hover(sound);
    assert!(page.dom().has_class(preview, "playing"));
    assert_eq!(page.dom().attr(preview, "data-sound"), Some("sound1"));
    page.tick(Millis(2000.0));
    assert!(!page.dom().has_class(preview, "playing"));
}

#[test]
fn reduced_motion_reaches_body_and_mounter() {
    let mut page = page();
    page.set_reduced_motion(true);
    assert!(page.dom().has_class(page.dom().body(), "reduced-motion"));
    assert!(page.mounter().reduced_motion());
    page.set_reduced_motion(false);
    assert!(!page.dom().has_class(page.dom().body(), "reduced-motion"));
}

#[test]
fn illustration_follows_scene_into_its_host() {
    let mut page = page();
    page.jump_to(&SectionId::new("section-fade"));
    let active = page.mounter().current().unwrap();
    assert_eq!(active.scene, SceneName::Forest);
    let host = by_id(&page, "section-fade");
    assert_eq!(page.dom().first_by_class(host, CONTAINER_CLASS), Some(active.container));
    assert!(page.timeline().iter().any(|e| matches!(
        e.record,
        Record::Illustration(MountOp::Attach {
            scene: SceneName::Forest,
            ..
        })
    )));
}

#[test]
fn quiz_open_is_announced() {
    let mut page = page();
    page.jump_to(&SectionId::new("section-ingredients"));
    let card = page
        .dom()
        .find_by_class(page.dom().root(), "ingredient-card")
        .into_iter()
        .next()
        .unwrap();
    page.click(card);
    assert!(page.announcement().unwrap().starts_with("Testing "));
}

#[test]
fn shutdown_releases_everything() {
    let mut page = page();
    page.jump_to(&SectionId::new("section-surge"));
    page.click(by_id(&page, "viz-planets"));
    page.jump_to(&SectionId::new("section-fade"));
    page.shutdown();
    assert_eq!(page.live_tasks(), 0);
    assert!(page.mounter().current().is_none());
    assert!(page.dom().find_by_class(page.dom().root(), "illu").is_empty());
}

#[test]
fn scene_layers_are_injected_once() {
    let mut dom = Document::new();
    build_document(&mut dom, &PageManifest::standard()).unwrap();
    assert_eq!(inject_scene_layers(&mut dom).unwrap(), 5);
    assert_eq!(inject_scene_layers(&mut dom).unwrap(), 0);
    let landing = dom.element_by_id("section-landing").unwrap();
    assert!(dom.has_class(dom.children(landing)[0], "scene--stars"));
}
