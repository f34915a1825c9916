use procpath_chain::prelude::*;
use procpath_chain::{InvalidPathReason, PATH_DELIMITER};
use proptest::prelude::*;
use std::collections::HashSet;

fn process_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "explorer.exe",
        "cmd.exe",
        "powershell.exe",
        "rundll32.exe",
        "svchost.exe",
        "winword.exe",
    ])
    .prop_map(str::to_string)
}

proptest! {
    #[test]
    fn prop_graph_bounded_by_chain(names in prop::collection::vec(process_name(), 1..30)) {
        let path = names.join(PATH_DELIMITER);
        let graph = ChainGraph::from_path(&path, &PathTokenizer::default(), SelfLoopPolicy::Allow)
            .unwrap();

        let distinct: HashSet<&String> = names.iter().collect();
        prop_assert_eq!(graph.node_count(), distinct.len());
        prop_assert!(graph.node_count() <= names.len());
        prop_assert!(graph.edge_count() <= names.len() - 1);

        // Every consecutive hop is present as an edge
        for pair in names.windows(2) {
            prop_assert!(graph.contains_edge(&pair[0], &pair[1]));
        }

        // And no edge exists that is not a consecutive hop
        let hops: HashSet<(&str, &str)> = names
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
            .collect();
        prop_assert_eq!(graph.edge_count(), hops.len());
    }

    #[test]
    fn prop_rebuilding_is_deterministic(names in prop::collection::vec(process_name(), 1..20)) {
        let path = names.join(PATH_DELIMITER);
        let tokenizer = PathTokenizer::default();
        let first = ChainGraph::from_path(&path, &tokenizer, SelfLoopPolicy::Allow).unwrap();
        let second = ChainGraph::from_path(&path, &tokenizer, SelfLoopPolicy::Allow).unwrap();

        let first_edges: Vec<_> = first.edges().collect();
        let second_edges: Vec<_> = second.edges().collect();
        prop_assert_eq!(first_edges, second_edges);

        let layout = SpringLayout::default();
        prop_assert_eq!(layout.compute(&first).unwrap(), layout.compute(&second).unwrap());
    }

    #[test]
    fn prop_tokens_round_trip_through_delimiter(names in prop::collection::vec(process_name(), 1..10)) {
        let path = names.join(PATH_DELIMITER);
        let tokenizer = PathTokenizer::default();
        let tokens = tokenizer.tokenize(&path).unwrap();
        let collected: Vec<String> = tokens.tokens().map(str::to_string).collect();
        prop_assert_eq!(collected, names);
    }
}

#[test]
fn three_hop_chain_has_expected_edges() {
    let graph =
        ChainGraph::from_path("A → B → C", &PathTokenizer::default(), SelfLoopPolicy::Allow)
            .unwrap();
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert!(graph.contains_edge("A", "B"));
    assert!(graph.contains_edge("B", "C"));
}

#[test]
fn empty_path_is_invalid() {
    let result = ChainGraph::from_path("", &PathTokenizer::default(), SelfLoopPolicy::Allow);
    assert!(matches!(
        result,
        Err(ChainError::InvalidPath {
            reason: InvalidPathReason::Empty,
            ..
        })
    ));
}

#[test]
fn single_node_renders_and_writes() {
    let graph =
        ChainGraph::from_path("lsass.exe", &PathTokenizer::default(), SelfLoopPolicy::Allow)
            .unwrap();
    let rendered = GraphRenderer::new(RenderStyle::default())
        .render(&graph)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("chain.png");
    rendered.write_png(&out).unwrap();

    let written = std::fs::read(&out).unwrap();
    pretty_assertions::assert_eq!(written.as_slice(), rendered.png_bytes());
}

#[test]
fn write_to_missing_directory_fails() {
    let graph =
        ChainGraph::from_path("A → B", &PathTokenizer::default(), SelfLoopPolicy::Allow).unwrap();
    let rendered = GraphRenderer::default().render(&graph).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let result = rendered.write_png(dir.path().join("missing").join("chain.png"));
    assert!(matches!(result, Err(ChainError::Io { .. })));
}
