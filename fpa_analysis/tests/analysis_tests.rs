//! End-to-end analysis properties over programmatically built models.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use fpa_analysis::{
    AnalysisMode, AnalysisModel, NullSink, PathEnd, PopulationPolicy, PropagationPath,
    SourceEndSelection,
};
use fpa_common::prelude::*;

// ─── Fixtures ───────────────────────────────────────────────────────

/// Avionics-style model:
///
/// ```text
/// top (system)
/// ├── hw (system)
/// │   ├── cpu   (processor)    o1, o2 out
/// │   └── vcpu  (virtual processor, bound to cpu)
/// ├── sw (system)
/// │   ├── nav   (process, bound to cpu)     i1, i2, i3 in
/// │   └── guest (process, bound to vcpu)
/// ├── gps (device)  fix.out
/// └── bus (bus)     access in
/// ```
struct Avionics {
    model: InstanceModel,
    top: NodeId,
    cpu: NodeId,
    vcpu: NodeId,
    nav: NodeId,
    guest: NodeId,
    gps: NodeId,
    bus: NodeId,
}

fn avionics() -> Avionics {
    let mut b = InstanceModelBuilder::new();
    let system = b.add_classifier("Sys", ComponentCategory::System);
    let cpu_c = b.add_classifier("Cpu", ComponentCategory::Processor);
    let vcpu_c = b.add_classifier("Partition", ComponentCategory::VirtualProcessor);
    let nav_c = b.add_classifier("Nav", ComponentCategory::Process);
    let guest_c = b.add_classifier("Guest", ComponentCategory::Process);
    let gps_c = b.add_classifier("Gps", ComponentCategory::Device);
    let bus_c = b.add_classifier("Bus", ComponentCategory::Bus);

    b.add_point(cpu_c, "o1", Direction::Out, None);
    b.add_point(cpu_c, "o2", Direction::Out, None);
    b.add_point(vcpu_c, "vin", Direction::In, None);
    b.add_point(vcpu_c, "vout", Direction::Out, None);
    let nav_fix = b.add_feature(nav_c, "fix");
    b.add_point(nav_c, "i1", Direction::In, Some(nav_fix));
    b.add_point(nav_c, "i2", Direction::In, None);
    b.add_point(nav_c, "i3", Direction::In, None);
    b.add_point(guest_c, "gin", Direction::In, None);
    let gps_fix = b.add_feature(gps_c, "fix");
    b.add_point(gps_c, "fix_out", Direction::Out, Some(gps_fix));
    b.add_point(bus_c, "bus_in", Direction::In, None);

    let top = b.add_root("top", system);
    let hw = b.add_child(top, "hw", system);
    let sw = b.add_child(top, "sw", system);
    let cpu = b.add_child(hw, "cpu", cpu_c);
    let vcpu = b.add_child(hw, "vcpu", vcpu_c);
    let nav = b.add_child(sw, "nav", nav_c);
    let guest = b.add_child(sw, "guest", guest_c);
    let gps = b.add_child(top, "gps", gps_c);
    let bus = b.add_child(top, "bus", bus_c);

    b.bind_processor(vcpu, cpu);
    b.bind_processor(nav, cpu);
    b.bind_processor(guest, vcpu);

    let refs = vec![ConnectionReference {
        source: b.port(gps, "fix").unwrap(),
        destination: b.port(nav, "fix").unwrap(),
    }];
    b.add_connection(top, "gps_fix", false, refs);
    b.add_connection(
        top,
        "gps_bus",
        true,
        vec![ConnectionReference {
            source: Endpoint::Component(gps),
            destination: Endpoint::Component(bus),
        }],
    );

    Avionics {
        model: b.build(),
        top,
        cpu,
        vcpu,
        nav,
        guest,
        gps,
        bus,
    }
}

fn path_key(p: &PropagationPath) -> (Option<PathEnd>, Option<PathEnd>, Option<ConnectionId>) {
    (p.source, p.destination, p.connection)
}

fn end_nodes(p: &PropagationPath) -> Option<(NodeId, NodeId)> {
    Some((p.source?.node, p.destination?.node))
}

// ─── Properties ─────────────────────────────────────────────────────

#[test]
fn one_record_per_connection_even_when_unresolved() {
    let f = avionics();
    let analysis = AnalysisModel::new(&f.model, f.top);
    for conn in f.model.connection_ids() {
        let records = analysis
            .paths()
            .iter()
            .filter(|p| p.connection == Some(conn))
            .count();
        assert_eq!(records, 1, "connection {conn}");
    }
    // gps has no access point, so gps_bus has no source end.
    let gps_bus = f.model.connection_ids().nth(1).unwrap();
    let record = analysis.path_for_connection(gps_bus).unwrap();
    assert!(record.source.is_none());
    assert!(record.destination.is_some());
}

#[test]
fn binding_cross_product_has_six_paths() {
    let f = avionics();
    let analysis = AnalysisModel::new(&f.model, f.top);
    let cpu_to_nav: Vec<_> = analysis
        .paths()
        .iter()
        .filter(|p| end_nodes(p) == Some((f.cpu, f.nav)))
        .collect();
    assert_eq!(cpu_to_nav.len(), 6);
    assert!(cpu_to_nav.iter().all(|p| p.connection.is_none()));
    assert!(cpu_to_nav.iter().all(|p| !p.bidirectional));
}

#[test]
fn virtualization_is_two_steps() {
    let f = avionics();
    let analysis = AnalysisModel::new(&f.model, f.top);
    let pairs: HashSet<_> = analysis.paths().iter().filter_map(end_nodes).collect();
    assert!(pairs.contains(&(f.cpu, f.vcpu)));
    assert!(pairs.contains(&(f.vcpu, f.guest)));
    assert!(!pairs.contains(&(f.cpu, f.guest)));
}

#[test]
fn restricted_mode_has_connection_paths_only() {
    let f = avionics();
    for policy in [PopulationPolicy::Deepest, PopulationPolicy::Shortest] {
        let analysis = AnalysisModel::with_policy(&f.model, f.top, policy);
        assert_eq!(analysis.len(), f.model.connection_count());
        assert!(analysis.paths().iter().all(|p| !p.is_synthesized()));
        assert!(!analysis.contains_node(f.cpu));
    }
}

#[test]
fn construction_is_idempotent() {
    let f = avionics();
    for mode in [
        AnalysisMode::Default,
        AnalysisMode::Restricted(PopulationPolicy::Shortest),
    ] {
        let first = AnalysisModel::with_sink(&f.model, f.top, mode, Arc::new(NullSink));
        let second = AnalysisModel::with_sink(&f.model, f.top, mode, Arc::new(NullSink));
        let a: HashSet<_> = first.paths().iter().map(path_key).collect();
        let b: HashSet<_> = second.paths().iter().map(path_key).collect();
        assert_eq!(a, b);
        assert_eq!(first.nodes(), second.nodes());
    }
}

#[test]
fn registry_holds_every_end_exactly_once() {
    let f = avionics();
    let analysis = AnalysisModel::new(&f.model, f.top);
    let nodes = analysis.nodes();
    let unique: HashSet<_> = nodes.iter().copied().collect();
    assert_eq!(unique.len(), nodes.len());
    for path in analysis.paths() {
        for end in [path.source, path.destination].into_iter().flatten() {
            assert!(analysis.contains_node(end.node));
        }
    }
    // Bound nodes participate even without resolvable connection ends.
    for node in [f.cpu, f.vcpu, f.nav, f.guest, f.gps, f.bus] {
        assert!(analysis.contains_node(node));
    }
}

#[test]
fn bidirectional_connection_is_queryable_both_ways() {
    let f = avionics();
    let analysis = AnalysisModel::with_policy(&f.model, f.top, PopulationPolicy::Deepest);
    let bus_in = f
        .model
        .incoming_points(f.model.node(f.bus).classifier)
        .next()
        .unwrap();
    // The gps side never resolved, so the bus end has nothing to reach.
    assert!(analysis.destination_ends(f.bus, bus_in).is_empty());
    assert!(analysis.source_ends(f.bus, bus_in).is_empty());
    assert_eq!(analysis.reverse_propagation_paths(f.bus, bus_in).len(), 1);
}

#[test]
fn forward_and_backward_agree_on_connection_paths() {
    let f = avionics();
    let analysis = AnalysisModel::with_policy(&f.model, f.top, PopulationPolicy::Deepest);
    let fix_out = f
        .model
        .outgoing_points(f.model.node(f.gps).classifier)
        .next()
        .unwrap();
    let reached = analysis.destination_ends(f.gps, fix_out);
    assert_eq!(reached.len(), 1);
    let nav_end = reached[0];
    assert_eq!(nav_end.node, f.nav);
    assert_eq!(
        analysis.source_ends(nav_end.node, nav_end.point),
        vec![PathEnd::new(f.gps, fix_out)]
    );
    assert_eq!(
        analysis.source_ends_with(nav_end.node, nav_end.point, SourceEndSelection::AlwaysDestination),
        vec![nav_end]
    );
}

#[test]
fn analysis_root_limits_the_scope() {
    let f = avionics();
    let hw = f.model.node_by_path("top.hw").unwrap();
    let analysis = AnalysisModel::new(&f.model, hw);
    // No connections under hw and no processes to bind.
    assert!(analysis.is_empty());
    assert!(analysis.nodes().is_empty());
}

#[test]
fn built_model_is_shared_across_threads() {
    let f = avionics();
    let analysis = AnalysisModel::new(&f.model, f.top);
    let fix_out = f
        .model
        .outgoing_points(f.model.node(f.gps).classifier)
        .next()
        .unwrap();

    thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| analysis.destination_ends(f.gps, fix_out)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().len(), 1);
        }
    });
}
