// End-to-end checks against the bundled scenario file

use customer_hierarchy::{
    normalize, render, to_svg, Category, RenderConfig, ScenarioStore, SelectionError, Session,
};
use std::path::Path;

fn bundled() -> ScenarioStore {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/scenarios.json");
    ScenarioStore::load(&path).expect("bundled scenarios load")
}

#[test]
fn test_bundled_scenarios_load() {
    let store = bundled();
    let labels: Vec<String> = store.options().into_iter().map(|o| o.label).collect();
    assert_eq!(
        labels,
        vec!["Single site customer", "Multi-country group", "Sparse record"]
    );
}

#[test]
fn test_every_bundled_scenario_renders() {
    let store = bundled();
    let config = RenderConfig::default();
    for scenario in store.iter() {
        let diagram = render(scenario, &config, 1200.0).unwrap();
        let svg = to_svg(&diagram, &diagram.initial_view, 1200.0, 800.0, &config).unwrap();
        assert!(svg.contains(&format!("<title>{}</title>", scenario.scenario_name)));
        assert_eq!(diagram.links().count(), diagram.node_count - 1);
    }
}

#[test]
fn test_group_scenario_shape() {
    let store = bundled();
    let group = store.get(1).unwrap();
    let root = normalize(&group.customer, Category::Global);

    assert_eq!(root.name, "Nordwind Group");
    let top: Vec<Category> = root.children.iter().map(|c| c.category).collect();
    assert_eq!(
        top,
        vec![Category::CountryCustomer, Category::CountryCustomer, Category::Address]
    );

    let germany = &root.children[0];
    let kinds: Vec<Category> = germany.children.iter().map(|c| c.category).collect();
    assert_eq!(kinds, vec![Category::SoldTo, Category::Pickup, Category::Contract]);
}

#[test]
fn test_sparse_scenario_falls_back() {
    let store = bundled();
    let root = normalize(&store.get(2).unwrap().customer, Category::Global);
    assert_eq!(root.name, "C-300999");
    assert_eq!(root.children[0].category, Category::SubAccount);
    assert_eq!(root.children[1].category, Category::Other);
    assert_eq!(root.children[2].name, "Nakamura");
}

#[test]
fn test_session_switch_and_stale_index() {
    let store = bundled();
    let len = store.len();
    let mut session = Session::new(store, RenderConfig::default(), 1024.0);

    session.select(1).unwrap();
    session.select(0).unwrap();
    let names = session.diagram().unwrap().node_names();
    assert!(names.contains(&"Acme Logistics"));
    assert!(!names.contains(&"Nordwind Group"));

    assert_eq!(
        session.select(len).unwrap_err(),
        SelectionError::OutOfRange { index: len, len }
    );
    assert_eq!(session.selected_index(), Some(0));
}
