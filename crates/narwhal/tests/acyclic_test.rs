use narwhal::{EdgeLabel, GraphLabel, GraphOptions, LayoutGraph, NodeLabel, acyclic, rank};

fn cyclic_graph() -> LayoutGraph {
    let mut g = LayoutGraph::new(GraphOptions {
        multigraph: true,
        compound: true,
    });
    g.set_graph(GraphLabel::default());
    for id in ["a", "b", "c", "d"] {
        g.set_node(id, NodeLabel::default());
    }
    for (v, w) in [("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")] {
        g.set_edge(v, w, EdgeLabel::default()).unwrap();
    }
    g
}

#[test]
fn run_reverses_only_back_edges() {
    let mut g = cyclic_graph();
    acyclic::run(&mut g);

    let reversed: Vec<(String, String)> = g
        .edges()
        .filter(|(_, e)| e.reversed)
        .map(|(k, _)| (k.v.clone(), k.w.clone()))
        .collect();
    assert_eq!(reversed, vec![("a".to_string(), "c".to_string())]);
    assert_eq!(g.edge_count(), 4);
}

#[test]
fn ranks_respect_every_edge_after_breaking_cycles() {
    let mut g = cyclic_graph();
    acyclic::run(&mut g);
    rank::run(&mut g);
    for (key, e) in g.edges() {
        let rv = g.node(&key.v).unwrap().rank.unwrap();
        let rw = g.node(&key.w).unwrap().rank.unwrap();
        assert!(rw - rv >= e.minlen as i32, "{key:?}");
    }
    let min = g.nodes().filter_map(|(_, n)| n.rank).min();
    assert_eq!(min, Some(0));
}

#[test]
fn undo_restores_original_direction() {
    let mut g = cyclic_graph();
    acyclic::run(&mut g);
    acyclic::undo(&mut g);

    let mut edges: Vec<(String, String)> = g
        .edges()
        .map(|(k, _)| (k.v.clone(), k.w.clone()))
        .collect();
    edges.sort();
    let expected: Vec<(String, String)> = [("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")]
        .iter()
        .map(|(v, w)| (v.to_string(), w.to_string()))
        .collect();
    assert_eq!(edges, expected);
    assert!(g.edges().all(|(_, e)| !e.reversed));
}
