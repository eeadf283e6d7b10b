//! End-to-end tests over the full pipeline: declare leaves, compile a
//! requirement term, then drive both generators from the same graph.
//!
//! Tests cover:
//! - The speeding-fine domain: equivalent term spellings, interface
//!   synthesis, and unscoped schema rendering
//! - The kitchen domain: containers, explicit plurals, cross-module
//!   imports, and value-property inlining
//! - Capability checking against synthesized interfaces
//! - Intermediate-term extraction from a product spine

use indexmap::IndexMap;

use domeq_codegen::{
    render_module, CapabilitySet, CodegenError, InterfaceSynthesizer, ProtoScalar,
};
use domeq_core::{PropertyGraph, Term};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Render every module of the graph, keyed by package name in group order.
fn render_all(graph: &PropertyGraph) -> IndexMap<String, String> {
    graph
        .modules()
        .iter()
        .map(|module| {
            let name = module.name().unwrap_or("<unscoped>").to_string();
            let text = render_module(module).expect("module should render");
            (name, text)
        })
        .collect()
}

/// The speeding-fine graph: a fine needs the speed, the driver's monthly
/// income, and the local speed limit; a speed needs distance and duration.
fn fine_graph() -> (PropertyGraph, Term) {
    let mut graph = PropertyGraph::new();
    let speed = graph.leaf("speed").unwrap();
    let distance = graph.leaf("distance").unwrap();
    let duration = graph.leaf("duration").unwrap();
    let fine = graph.leaf("fine").unwrap();
    let monthly_income = graph.leaf("monthly_income").unwrap();
    let speed_limit = graph.leaf("speed_limit").unwrap();

    let term = fine
        * (speed * (distance + duration) * Term::Terminal + monthly_income + speed_limit);
    (graph, term)
}

// ---------------------------------------------------------------------------
// Speeding-fine domain
// ---------------------------------------------------------------------------

#[test]
fn fine_domain_compiles_to_stable_interfaces_and_schema() {
    let (mut graph, term) = fine_graph();
    graph.evaluate_and_collect(&term);

    let synthesizer = InterfaceSynthesizer::new(&graph);
    let descriptors = synthesizer.synthesize_all().unwrap();
    let names: Vec<&String> = descriptors.keys().collect();
    assert_eq!(
        names,
        vec![
            "IDistance",
            "IDuration",
            "IFine",
            "IMonthlyIncome",
            "ISpeed",
            "ISpeedLimit",
        ]
    );
    assert_eq!(
        descriptors["IFine"].required_accessors(),
        vec!["monthly_income", "speed", "speed_limit"]
    );

    let rendered = render_all(&graph);
    insta::assert_snapshot!(rendered["<unscoped>"], @r#"
syntax = "proto2";
message Fine {
    required MonthlyIncome monthly_income = 1;
    required Speed speed = 2;
    required SpeedLimit speed_limit = 3;
}
message Speed {
    required Distance distance = 1;
    required Duration duration = 2;
}
"#);
}

#[test]
fn equivalent_spellings_generate_identical_text() {
    let (mut graph, factored) = fine_graph();
    let speed = Term::Leaf("Speed".to_string());
    let distance = Term::Leaf("Distance".to_string());
    let duration = Term::Leaf("Duration".to_string());
    let fine = Term::Leaf("Fine".to_string());
    let monthly_income = Term::Leaf("MonthlyIncome".to_string());
    let speed_limit = Term::Leaf("SpeedLimit".to_string());
    let distributed =
        speed.clone() * (distance + duration) + fine * (speed + monthly_income + speed_limit);
    assert!(distributed.equivalent(&factored));

    graph.evaluate_and_collect(&factored);
    let first = render_all(&graph);
    graph.evaluate_and_collect(&distributed);
    let second = render_all(&graph);
    assert_eq!(first, second);
}

#[test]
fn capability_check_reports_every_missing_accessor_at_once() {
    let (mut graph, term) = fine_graph();
    graph.evaluate_and_collect(&term);

    let synthesizer = InterfaceSynthesizer::new(&graph);
    let fine = synthesizer
        .synthesize_all()
        .unwrap()
        .remove("IFine")
        .unwrap();

    let err = fine.check(&CapabilitySet::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot instantiate 'IFine': missing accessors: monthly_income, speed, speed_limit"
    );

    let full: CapabilitySet = ["monthly_income", "speed", "speed_limit"]
        .into_iter()
        .collect();
    assert!(fine.check(&full).is_ok());

    let partial: CapabilitySet = ["speed"].into_iter().collect();
    match fine.check(&partial) {
        Err(CodegenError::MissingCapabilities { missing, .. }) => {
            assert_eq!(missing, vec!["monthly_income", "speed_limit"]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn intermediate_terms_surface_reusable_requirements() {
    let (graph, term) = fine_graph();
    let tails = graph.extract_intermediate_terms(&term);
    assert_eq!(tails.len(), 1);
    assert_eq!(
        tails[0].to_string(),
        "((((Speed * (Distance + Duration)) * O) + MonthlyIncome) + SpeedLimit)"
    );
}

// ---------------------------------------------------------------------------
// Kitchen domain
// ---------------------------------------------------------------------------

#[test]
fn kitchen_domain_renders_one_schema_per_module() {
    let mut graph = PropertyGraph::new();
    let knife = graph
        .named("knife", Some("knives"), Some("accessories"))
        .unwrap();
    let blade = graph.named("blade", None, Some("accessories")).unwrap();
    let steel = ProtoScalar::String.register(&mut graph).unwrap();
    let drawer = graph.named("drawer", None, Some("kitchen")).unwrap();
    let knives = graph
        .repeated("knife", Some("accessories"), Some("kitchen"))
        .unwrap();

    graph.evaluate_and_collect(&(drawer * knives + knife * blade.clone() + blade * steel));

    let builtins: Vec<String> = graph
        .builtin_types()
        .iter()
        .map(|d| d.class_name())
        .collect();
    assert_eq!(builtins, vec!["string"]);

    let rendered = render_all(&graph);
    assert_eq!(rendered.len(), 2);

    // Blade reduces to a string, so Knife carries it inline.
    insta::assert_snapshot!(rendered["accessories"], @r#"
syntax = "proto2";
package accessories;
message Knife {
    required string blade = 1;
}
"#);

    insta::assert_snapshot!(rendered["kitchen"], @r#"
syntax = "proto2";
package kitchen;
import accessories;
message Drawer {
    required KnifeContainer knife_container = 1;
}
message KnifeContainer {
    repeated Knife knives = 1;
}
"#);
}

#[test]
fn container_interfaces_use_the_declared_plural() {
    let mut graph = PropertyGraph::new();
    graph
        .named("knife", Some("knives"), Some("accessories"))
        .unwrap();
    let knives = graph
        .repeated("knife", Some("accessories"), Some("kitchen"))
        .unwrap();
    graph.evaluate_and_collect(&knives);

    let synthesizer = InterfaceSynthesizer::new(&graph);
    let descriptors = synthesizer.synthesize_all().unwrap();
    let container = &descriptors["IKnifeContainer"];
    assert_eq!(container.class_name(), "kitchen.KnifeContainer");
    assert_eq!(container.required_accessors(), vec!["knives"]);
}

// ---------------------------------------------------------------------------
// Snapshot stability across sessions
// ---------------------------------------------------------------------------

#[test]
fn descriptors_survive_a_serde_roundtrip() {
    let (mut graph, term) = fine_graph();
    graph.evaluate_and_collect(&term);

    let synthesizer = InterfaceSynthesizer::new(&graph);
    let descriptors = synthesizer.synthesize_all().unwrap();

    let json = serde_json::to_string(&descriptors).unwrap();
    let back: std::collections::BTreeMap<String, domeq_codegen::InterfaceDescriptor> =
        serde_json::from_str(&json).unwrap();
    assert_eq!(back, descriptors);
}
