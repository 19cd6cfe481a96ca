/// Call chains between two symbols ("how does A reach B?").
///
/// Both endpoints are resolved with the locate resolver, anchored in the
/// call hierarchy with `prepareCallHierarchy`, and connected by a bounded
/// breadth-first search over outgoing calls.
///
/// # Search
///
/// The queue holds `(node, path so far, depth)` and starts at the source.
/// On dequeue:
///   1. a node equal to the target (by [`NodeKey`]) records its path as a
///      chain and is not expanded further
///   2. a node at `max_depth` is discarded
///   3. a node already visited is discarded
///   4. otherwise the node is marked visited and one successor per
///      outgoing call is enqueued, skipping visited successors
///
/// The visited set and the depth bound guarantee termination and keep
/// every chain free of repeated nodes. Visiting is per node, not per path:
/// the first path to reach a node claims its downstream expansion. Every
/// reachable node is found, but in graphs where paths reconverge and then
/// fan out again not every distinct end-to-end chain is listed.
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::*;

use crate::capability::Capability;
use crate::error::Result;
use crate::types::{Chain, ChainNode, Locate, LocateResponse, symbol_kind_name};
use crate::{Engine, LanguageClient};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRequest {
    pub source: Locate,
    pub target: Locate,
    /// Hop limit; the engine's configured default when absent.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationResponse {
    pub source: ChainNode,
    pub target: ChainNode,
    pub max_depth: usize,
    /// Every chain found, source to target inclusive. Empty means no
    /// connection within `max_depth`.
    pub chains: Vec<Chain>,
}

/// Structural identity of a call-hierarchy node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub file_path: PathBuf,
    pub line: u32,
    pub character: u32,
    pub name: String,
}

/// A directed call graph the search can walk.
#[tower_lsp::async_trait]
pub trait CallGraph: Send + Sync {
    type Node: Clone + Send + Sync;

    fn key(&self, node: &Self::Node) -> NodeKey;

    fn chain_node(&self, node: &Self::Node) -> ChainNode;

    /// Callees of `node`, one entry per outgoing call.
    async fn successors(&self, node: &Self::Node) -> Result<Vec<Self::Node>>;
}

/// Breadth-first search for chains from `source` to `target`.
pub async fn find_chains<G: CallGraph>(
    graph: &G,
    source: &G::Node,
    target: &G::Node,
    max_depth: usize,
) -> Result<Vec<Chain>> {
    let target_key = graph.key(target);
    let mut chains = Vec::new();
    let mut visited: HashSet<NodeKey> = HashSet::new();
    let mut queue: VecDeque<(G::Node, Chain, usize)> = VecDeque::new();
    queue.push_back((source.clone(), vec![graph.chain_node(source)], 0));

    while let Some((node, path, depth)) = queue.pop_front() {
        let key = graph.key(&node);

        if key == target_key {
            tracing::debug!(hops = path.len() - 1, "found call chain");
            chains.push(path);
            continue;
        }
        if depth >= max_depth {
            continue;
        }
        if !visited.insert(key) {
            continue;
        }

        let successors = match graph.successors(&node).await {
            Ok(successors) => successors,
            Err(e) => {
                tracing::warn!(error = %e, node = %path.last().map_or("", |n| n.name.as_str()), "skipping node whose outgoing calls failed");
                continue;
            }
        };

        for next in successors {
            if visited.contains(&graph.key(&next)) {
                continue;
            }
            let mut next_path = path.clone();
            next_path.push(graph.chain_node(&next));
            queue.push_back((next, next_path, depth + 1));
        }
    }

    Ok(chains)
}

/// The call hierarchy exposed by a language client.
pub struct ClientCallGraph<'a, C> {
    client: &'a C,
}

impl<'a, C: LanguageClient> ClientCallGraph<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }
}

#[tower_lsp::async_trait]
impl<C: LanguageClient> CallGraph for ClientCallGraph<'_, C> {
    type Node = CallHierarchyItem;

    fn key(&self, item: &CallHierarchyItem) -> NodeKey {
        NodeKey {
            file_path: self.client.uri_to_path(&item.uri),
            line: item.range.start.line,
            character: item.range.start.character,
            name: item.name.clone(),
        }
    }

    fn chain_node(&self, item: &CallHierarchyItem) -> ChainNode {
        ChainNode {
            name: item.name.clone(),
            kind: symbol_kind_name(item.kind).to_string(),
            file_path: self.client.uri_to_path(&item.uri),
            detail: item.detail.clone(),
        }
    }

    async fn successors(&self, item: &CallHierarchyItem) -> Result<Vec<CallHierarchyItem>> {
        let calls = self.client.outgoing_calls(item).await?.unwrap_or_default();
        Ok(calls.into_iter().map(|call| call.to).collect())
    }
}

impl<C: LanguageClient> Engine<C> {
    /// Find call chains leading from `req.source` to `req.target`.
    ///
    /// Returns `None` when either endpoint cannot be located or has no
    /// call-hierarchy item. An empty `chains` list is a successful answer.
    pub async fn relation(&self, req: &RelationRequest) -> Result<Option<RelationResponse>> {
        self.client
            .capabilities()
            .ensure(Capability::CallHierarchy)?;

        let Some(source) = self.locate(&req.source).await? else {
            return Ok(None);
        };
        let Some(target) = self.locate(&req.target).await? else {
            return Ok(None);
        };

        let Some(source_item) = self.call_hierarchy_anchor(&source).await? else {
            return Ok(None);
        };
        let Some(target_item) = self.call_hierarchy_anchor(&target).await? else {
            return Ok(None);
        };

        let graph = ClientCallGraph::new(&self.client);
        let max_depth = req.max_depth.unwrap_or(self.config.relation_max_depth);
        let chains = find_chains(&graph, &source_item, &target_item, max_depth).await?;

        Ok(Some(RelationResponse {
            source: graph.chain_node(&source_item),
            target: graph.chain_node(&target_item),
            max_depth,
            chains,
        }))
    }

    /// The call-hierarchy item at a located position.
    ///
    /// When the server returns several (overloads, template instances)
    /// only the first is used.
    async fn call_hierarchy_anchor(
        &self,
        located: &LocateResponse,
    ) -> Result<Option<CallHierarchyItem>> {
        let items = self
            .client
            .prepare_call_hierarchy(&located.file_path, located.position)
            .await?
            .unwrap_or_default();

        if items.len() > 1 {
            tracing::debug!(
                file = %located.file_path.display(),
                candidates = items.len(),
                "several call-hierarchy items, using the first"
            );
        }
        Ok(items.into_iter().next())
    }
}
