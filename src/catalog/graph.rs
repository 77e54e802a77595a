//! Relationship graph for reachability and join path search.
//!
//! Every relationship becomes two edges: the declared (forward) direction and
//! its reverse, so a path can walk a relationship from either end. Edges are
//! inserted in catalog order (entity name, then relationship name), all
//! forward edges before any reverse edge. Neighbour iteration sorts by edge
//! index, which makes every search below deterministic.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use super::error::{CatalogError, CatalogResult};
use super::types::{Entity, RelationshipKind};

/// Direction in which a relationship is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From the relationship's `from` entity to its `to` entity.
    Forward,
    /// From the relationship's `to` entity back to its `from` entity.
    Reverse,
}

/// Edge payload.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// Name of the relationship this edge was derived from.
    pub relationship: String,
    /// Entity that declares the relationship.
    pub owner: String,
    pub direction: Direction,
    /// Cardinality as walked in `direction`.
    pub kind: RelationshipKind,
}

/// One hop of a join path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinStep {
    /// Entity already present in the query.
    pub from_entity: String,
    /// Entity this hop brings in.
    pub to_entity: String,
    pub relationship: String,
    pub owner: String,
    pub direction: Direction,
    pub kind: RelationshipKind,
}

/// A sequence of hops between two entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinPath {
    pub steps: Vec<JoinStep>,
}

impl JoinPath {
    pub fn new() -> Self {
        Self { steps: vec![] }
    }

    /// Entities along the path, start first.
    pub fn entities(&self) -> Vec<&str> {
        let mut result: Vec<&str> = Vec::new();
        for step in &self.steps {
            if result.last().copied() != Some(step.from_entity.as_str()) {
                result.push(&step.from_entity);
            }
            result.push(&step.to_entity);
        }
        result
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Parent information for path reconstruction.
struct ParentInfo {
    parent: NodeIndex,
    edge_idx: EdgeIndex,
}

/// Graph of entities connected by relationships.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    graph: DiGraph<String, EdgeData>,
    node_indices: HashMap<String, NodeIndex>,
}

impl RelationshipGraph {
    /// Build the graph from a name-ordered entity map.
    ///
    /// Fails if a relationship targets an entity that is not in the map.
    pub(crate) fn build(entities: &BTreeMap<String, Entity>) -> CatalogResult<Self> {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for name in entities.keys() {
            let idx = graph.add_node(name.clone());
            node_indices.insert(name.clone(), idx);
        }

        let mut reverse_edges = Vec::new();
        for (owner, entity) in entities {
            for relationship in entity.relationships.values() {
                let from_idx = node_indices[owner];
                let to_idx = *node_indices.get(&relationship.to_entity).ok_or_else(|| {
                    CatalogError::UnknownRelationshipTarget {
                        relationship: relationship.name.clone(),
                        target: relationship.to_entity.clone(),
                    }
                })?;

                graph.add_edge(
                    from_idx,
                    to_idx,
                    EdgeData {
                        relationship: relationship.name.clone(),
                        owner: owner.clone(),
                        direction: Direction::Forward,
                        kind: relationship.kind,
                    },
                );
                reverse_edges.push((
                    to_idx,
                    from_idx,
                    EdgeData {
                        relationship: relationship.name.clone(),
                        owner: owner.clone(),
                        direction: Direction::Reverse,
                        kind: relationship.kind.reverse(),
                    },
                ));
            }
        }

        for (from, to, data) in reverse_edges {
            graph.add_edge(from, to, data);
        }

        Ok(Self {
            graph,
            node_indices,
        })
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.node_indices.contains_key(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of declared relationships (each contributes two edges).
    pub fn relationship_count(&self) -> usize {
        self.graph.edge_count() / 2
    }

    /// Outgoing edges of `node` in insertion order.
    fn ordered_edges(&self, node: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges(node)
            .map(|edge_ref| (edge_ref.id(), edge_ref.target()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges
    }

    fn step(&self, from: NodeIndex, edge_idx: EdgeIndex, to: NodeIndex) -> JoinStep {
        let data = &self.graph[edge_idx];
        JoinStep {
            from_entity: self.graph[from].clone(),
            to_entity: self.graph[to].clone(),
            relationship: data.relationship.clone(),
            owner: data.owner.clone(),
            direction: data.direction,
            kind: data.kind,
        }
    }

    /// Single hops available from an entity: outgoing relationships first,
    /// then incoming ones walked in reverse.
    pub fn steps_from(&self, entity: &str) -> Vec<JoinStep> {
        let Some(&idx) = self.node_indices.get(entity) else {
            return Vec::new();
        };
        self.ordered_edges(idx)
            .into_iter()
            .map(|(edge_idx, target)| self.step(idx, edge_idx, target))
            .collect()
    }

    /// Find the shortest path between two entities using BFS.
    ///
    /// Ties between equally short paths go to the first edge in catalog
    /// order. Returns `None` for unknown entities or when no path exists.
    pub fn find_path(&self, from: &str, to: &str) -> Option<JoinPath> {
        let from_idx = *self.node_indices.get(from)?;
        let to_idx = *self.node_indices.get(to)?;

        if from_idx == to_idx {
            return Some(JoinPath::new());
        }

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut parents: HashMap<NodeIndex, ParentInfo> = HashMap::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();

        queue.push_back(from_idx);
        visited.insert(from_idx);

        while let Some(current) = queue.pop_front() {
            for (edge_idx, neighbor) in self.ordered_edges(current) {
                if !visited.insert(neighbor) {
                    continue;
                }

                parents.insert(
                    neighbor,
                    ParentInfo {
                        parent: current,
                        edge_idx,
                    },
                );

                if neighbor == to_idx {
                    return Some(self.reconstruct_path(from_idx, neighbor, &parents));
                }

                queue.push_back(neighbor);
            }
        }

        None
    }

    fn reconstruct_path(
        &self,
        from_idx: NodeIndex,
        to_idx: NodeIndex,
        parents: &HashMap<NodeIndex, ParentInfo>,
    ) -> JoinPath {
        let mut steps = Vec::new();
        let mut current = to_idx;

        while current != from_idx {
            let info = &parents[&current];
            steps.push(self.step(info.parent, info.edge_idx, current));
            current = info.parent;
        }

        steps.reverse();
        JoinPath { steps }
    }

    /// Check if a path exists between two entities.
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        self.find_path(from, to).is_some()
    }

    /// Every entity reachable from `from`, including itself.
    pub fn reachable_from(&self, from: &str) -> BTreeSet<String> {
        let mut reached = BTreeSet::new();
        let Some(&start) = self.node_indices.get(from) else {
            return reached;
        };

        let mut stack = vec![start];
        let mut visited = HashSet::new();
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            reached.insert(self.graph[node].clone());
            for (_, neighbor) in self.ordered_edges(node) {
                if !visited.contains(&neighbor) {
                    stack.push(neighbor);
                }
            }
        }
        reached
    }
}
