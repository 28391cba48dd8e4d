//! End-to-end scenarios for selection, the data pipeline and list navigation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lattice_grid::config::LatticeConfig;
use lattice_grid::model::{
    filter, group, sort, FilteringExpression, FilteringLogic, FilteringState, Item, Record,
    SelectionRegistry, SortingDirection, SortingExpression, StringCondition,
};
use lattice_grid::view::{
    ComboBox, ListItem, NavigationController, NavigationKey, SelectionMode, UniformViewport,
    Viewport,
};
use lattice_grid::IdGenerator;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn named(name: &str) -> Item {
    Item::Record(Record::new().with("name", name))
}

#[test]
fn test_registry_scenario() {
    let registry = SelectionRegistry::<String>::new();
    let selection = registry.select_items("g1", ["x".to_string(), "y".to_string()]);
    assert_eq!(selection.to_vec(), vec!["x", "y"]);

    let selection = registry.deselect_item("g1", &"x".to_string());
    assert_eq!(selection.to_vec(), vec!["y"]);
    assert!(!registry.is_selected("g1", &"x".to_string()));
}

#[test]
fn test_deselect_overlapping_keys() {
    let registry = SelectionRegistry::<i64>::new();
    registry.select_items("g1", [1, 2]);
    let before = registry.get_selection("g1");

    registry.select_items("g1", [3, 4, 2]);
    let after = registry.deselect_items("g1", [3, 4, 2]);
    assert_ne!(after, before);
    assert_eq!(after.to_vec(), vec![1]);

    registry.select_items("g2", [7, 8]);
    let after = registry.deselect_items("g2", [7, 8]);
    assert!(after.is_empty());
}

#[test]
fn test_round_trip_of_unselected_keys() {
    let registry = SelectionRegistry::<i64>::new();
    registry.select_items("g1", [1, 2]);
    let before = registry.get_selection("g1");

    registry.select_items("g1", [5, 6]);
    assert_eq!(registry.deselect_items("g1", [5, 6]), before);
}

#[test]
fn test_select_item_idempotent() {
    let registry = SelectionRegistry::<&'static str>::new();
    let once = registry.select_item("g1", "a");
    let twice = registry.select_item("g1", "a");
    assert_eq!(once, twice);
    assert!(once.same_as(&twice));
}

#[test]
fn test_group_scenario() {
    let items = vec![named("b"), named("a"), named("a")];
    let grouped = group(&items, "name", Some("name")).unwrap();

    let shape: Vec<(bool, String)> = grouped
        .iter()
        .map(|item| (item.is_header(), item.display_text(Some("name"))))
        .collect();
    assert_eq!(
        shape,
        vec![
            (true, "a".to_string()),
            (false, "a".to_string()),
            (false, "a".to_string()),
            (true, "b".to_string()),
            (false, "b".to_string()),
        ]
    );

    for pair in grouped.windows(2) {
        assert!(!(pair[0].is_header() && pair[1].is_header()));
    }
}

#[test]
fn test_filter_idempotent() {
    init_tracing();
    let items = vec![named("anna"), named("bob"), named("carla"), named("dan")];
    let state = FilteringState::new(FilteringLogic::And).with_expression(
        FilteringExpression::for_field("name", StringCondition::Contains, "A"),
    );

    let once = filter(&items, &state).unwrap();
    let twice = filter(&once, &state).unwrap();
    assert_eq!(once.len(), 3);
    assert_eq!(once, twice);
}

#[test]
fn test_sort_stable() {
    let items: Vec<Item> = [("x", 2), ("a", 1), ("b", 2), ("c", 1), ("d", 2)]
        .into_iter()
        .map(|(name, rank)| Item::Record(Record::new().with("name", name).with("rank", rank)))
        .collect();

    let sorted = sort(
        &items,
        &[SortingExpression::new("rank", SortingDirection::Asc)],
    )
    .unwrap();
    let names: Vec<String> = sorted
        .iter()
        .map(|item| item.display_text(Some("name")))
        .collect();
    assert_eq!(names, vec!["a", "c", "x", "b", "d"]);
}

#[test]
fn test_focus_scroll_scenario() {
    let registry = Arc::new(SelectionRegistry::<usize>::new());
    let mut nav = NavigationController::new(
        "list-0".to_string(),
        registry,
        UniformViewport::new(5, 20.0, 60.0),
        SelectionMode::Single,
    );
    nav.set_items((0..5).map(ListItem::new).collect());

    assert!(nav.open());
    assert!(nav.focus_index(2));
    assert_eq!(nav.viewport().scroll_top(), 0.0);

    nav.focus_next();
    nav.focus_next();
    assert_eq!(nav.focused_index(), Some(4));
    // Bottom of item 4 (100) aligned with the bottom of the viewport (60).
    assert_eq!(nav.viewport().scroll_top(), 40.0);
}

#[test]
fn test_combo_from_config() {
    init_tracing();
    let config = LatticeConfig::from_toml_str(
        r#"
        [list]
        allow_custom_values = true
        "#,
    )
    .unwrap();

    let ids = IdGenerator::new();
    let registry = Arc::new(SelectionRegistry::new());
    let mut combo = ComboBox::new(
        &ids,
        registry.clone(),
        UniformViewport::new(4, 24.0, 96.0),
        config.list,
    )
    .unwrap();
    assert_eq!(combo.id(), "combo-0");

    let data = Item::collection_from_json(
        r#"[
            {"id": 1, "name": "Oslo", "region": "North"},
            {"id": 2, "name": "Rome", "region": "South"},
            {"id": 3, "name": "Bergen", "region": "North"}
        ]"#,
    )
    .unwrap();
    combo.set_value_key(Some("id")).unwrap();
    combo.set_display_key(Some("name")).unwrap();
    combo.set_group_key(Some("region")).unwrap();
    combo.set_data(data).unwrap();
    assert_eq!(combo.filtered_items().len(), 5);

    let changes = Arc::new(AtomicUsize::new(0));
    let changes_clone = changes.clone();
    combo.navigation().selection_changed.connect(move |_| {
        changes_clone.fetch_add(1, Ordering::SeqCst);
    });

    // Headers are skipped while navigating.
    combo.open().unwrap();
    combo.handle_key(NavigationKey::ArrowDown);
    combo.handle_key(NavigationKey::Enter);
    assert_eq!(combo.selected_text(), "Oslo");

    combo.set_search_text("lisbon").unwrap();
    assert!(combo.add_custom_value().unwrap());
    assert_eq!(combo.selected_text(), "Oslo, lisbon");
    assert_eq!(changes.load(Ordering::SeqCst), 2);

    assert_eq!(registry.widget_count(), 1);
    drop(combo);
    assert_eq!(registry.widget_count(), 0);
}
