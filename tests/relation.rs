mod common;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use common::{FakeClient, call_item, init_tracing};
use pinpoint_lsp::relation::{CallGraph, NodeKey, RelationRequest, find_chains};
use pinpoint_lsp::types::{Chain, ChainNode, Locate};
use pinpoint_lsp::{Capability, EngineError, Result};

/// Named nodes joined by directed edges; nodes in `broken` fail to expand.
#[derive(Default)]
struct Graph {
    edges: HashMap<&'static str, Vec<&'static str>>,
    broken: HashSet<&'static str>,
}

impl Graph {
    fn new(edges: &[(&'static str, &'static str)]) -> Self {
        let mut graph = Self::default();
        for (from, to) in edges {
            graph.edges.entry(*from).or_default().push(*to);
        }
        graph
    }
}

#[tower_lsp::async_trait]
impl CallGraph for Graph {
    type Node = &'static str;

    fn key(&self, node: &&'static str) -> NodeKey {
        NodeKey {
            file_path: PathBuf::from("graph.py"),
            line: 0,
            character: 0,
            name: node.to_string(),
        }
    }

    fn chain_node(&self, node: &&'static str) -> ChainNode {
        ChainNode {
            name: node.to_string(),
            kind: "Function".to_string(),
            file_path: PathBuf::from("graph.py"),
            detail: None,
        }
    }

    async fn successors(&self, node: &&'static str) -> Result<Vec<&'static str>> {
        if self.broken.contains(node) {
            return Err(EngineError::provider("callHierarchy/outgoingCalls", "boom"));
        }
        Ok(self.edges.get(node).cloned().unwrap_or_default())
    }
}

fn names(chain: &Chain) -> Vec<&str> {
    chain.iter().map(|node| node.name.as_str()).collect()
}

// ─── Breadth-First Search ───────────────────────────────────────────────────

#[tokio::test]
async fn test_diamond_yields_both_chains() {
    init_tracing();
    let graph = Graph::new(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
    let chains = find_chains(&graph, &"A", &"D", 5).await.unwrap();

    assert_eq!(chains.len(), 2);
    assert!(chains.iter().all(|chain| chain.len() == 3));
    let middles: HashSet<&str> = chains.iter().map(|chain| chain[1].name.as_str()).collect();
    assert_eq!(middles, HashSet::from(["B", "C"]));
}

#[tokio::test]
async fn test_cycle_terminates_with_single_chain() {
    let graph = Graph::new(&[("A", "B"), ("B", "C"), ("C", "B"), ("B", "D")]);
    let chains = find_chains(&graph, &"A", &"D", 10).await.unwrap();

    assert_eq!(chains.len(), 1);
    assert_eq!(names(&chains[0]), ["A", "B", "D"]);
}

#[tokio::test]
async fn test_depth_bound_cuts_search() {
    let graph = Graph::new(&[("A", "B"), ("B", "C")]);
    assert!(find_chains(&graph, &"A", &"C", 1).await.unwrap().is_empty());
    assert_eq!(find_chains(&graph, &"A", &"C", 2).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_source_is_target() {
    let graph = Graph::new(&[("A", "B")]);
    let chains = find_chains(&graph, &"A", &"A", 3).await.unwrap();
    assert_eq!(chains.len(), 1);
    assert_eq!(names(&chains[0]), ["A"]);
}

#[tokio::test]
async fn test_unreachable_target_is_empty() {
    let graph = Graph::new(&[("A", "B"), ("C", "D")]);
    assert!(find_chains(&graph, &"A", &"D", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_expansion_only_drops_that_branch() {
    let mut graph = Graph::new(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
    graph.broken.insert("B");
    let chains = find_chains(&graph, &"A", &"D", 5).await.unwrap();

    assert_eq!(chains.len(), 1);
    assert_eq!(names(&chains[0]), ["A", "C", "D"]);
}

#[tokio::test]
async fn test_reconverging_paths_expand_once() {
    // A reaches M through both B and C; M's downstream is expanded once.
    let graph = Graph::new(&[
        ("A", "B"),
        ("A", "C"),
        ("B", "M"),
        ("C", "M"),
        ("M", "X"),
        ("X", "T"),
    ]);
    let chains = find_chains(&graph, &"A", &"T", 10).await.unwrap();

    assert_eq!(chains.len(), 1);
    assert_eq!(names(&chains[0]), ["A", "B", "M", "X", "T"]);
}

// ─── Engine ─────────────────────────────────────────────────────────────────

const CALLS: &str = "\
def a():
    b()
def b():
    d()
def c():
    d()
def d():
    pass
";

fn call_client() -> FakeClient {
    FakeClient::new()
        .with_file("calls.py", CALLS)
        .with_call_item(call_item("a", "calls.py", 0))
        .with_call_item(call_item("b", "calls.py", 2))
        .with_call_item(call_item("c", "calls.py", 4))
        .with_call_item(call_item("d", "calls.py", 6))
        .with_call("a", "b")
        .with_call("a", "c")
        .with_call("b", "d")
        .with_call("c", "d")
}

fn request(source: &str, target: &str) -> RelationRequest {
    RelationRequest {
        source: Locate::find("calls.py", source).unwrap(),
        target: Locate::find("calls.py", target).unwrap(),
        max_depth: None,
    }
}

#[tokio::test]
async fn test_relation_through_call_hierarchy() {
    let engine = call_client().engine();
    let response = engine
        .relation(&request("def <|>a()", "def <|>d()"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(response.source.name, "a");
    assert_eq!(response.source.kind, "Function");
    assert_eq!(response.source.file_path, PathBuf::from("calls.py"));
    assert_eq!(response.target.name, "d");
    assert_eq!(response.max_depth, 10);

    let mut found: Vec<Vec<&str>> = response.chains.iter().map(names).collect();
    found.sort();
    assert_eq!(found, [["a", "b", "d"], ["a", "c", "d"]]);
}

#[tokio::test]
async fn test_relation_respects_request_depth() {
    let engine = call_client().engine();
    let mut req = request("def <|>a()", "def <|>d()");
    req.max_depth = Some(1);

    let response = engine.relation(&req).await.unwrap().unwrap();
    assert_eq!(response.max_depth, 1);
    assert!(response.chains.is_empty());
}

#[tokio::test]
async fn test_relation_unlocatable_endpoint() {
    let engine = call_client().engine();
    let response = engine
        .relation(&request("def <|>a()", "def <|>zzz()"))
        .await
        .unwrap();
    assert!(response.is_none());
}

#[tokio::test]
async fn test_relation_endpoint_without_call_item() {
    let engine = call_client().engine();
    let response = engine
        .relation(&request("def <|>a()", "pass"))
        .await
        .unwrap();
    assert!(response.is_none());
}

#[tokio::test]
async fn test_relation_requires_call_hierarchy() {
    let engine = call_client().without(Capability::CallHierarchy).engine();
    let err = engine
        .relation(&request("def <|>a()", "def <|>d()"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::UnsupportedCapability {
            capability: Capability::CallHierarchy,
            ..
        }
    ));
}
