//! Afhankelijkheidsvolgorde tussen documentobjecten.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;

use super::Document;
use super::object::ObjectId;

/// Gerichte afhankelijkheid: `to` moet na `from` herberekend worden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dependency {
    pub from: ObjectId,
    pub to: ObjectId,
}

impl Dependency {
    #[must_use]
    pub const fn new(from: ObjectId, to: ObjectId) -> Self {
        Self { from, to }
    }
}

/// Resultaat van een topologische sortering.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Topology {
    pub order: Vec<ObjectId>,
    adjacency: HashMap<ObjectId, Vec<ObjectId>>,
    predecessors: HashMap<ObjectId, Vec<ObjectId>>,
}

/// Fouttype voor topologische sortering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// Het document bevat een cyclus. Bevat een pad dat de cyclus illustreert.
    Cycle { cycle: Vec<ObjectId> },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle { cycle } => {
                if cycle.is_empty() {
                    f.write_str("document bevat een cyclus")
                } else {
                    let chain = cycle
                        .iter()
                        .map(|ObjectId(id)| id.to_string())
                        .collect::<Vec<_>>()
                        .join(" -> ");
                    write!(f, "document bevat een cyclus: {chain}")
                }
            }
        }
    }
}

impl std::error::Error for TopologyError {}

impl Topology {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sorteert alle objecten van het document volgens het Kahn algoritme.
    /// Gelijke kandidaten worden in id-volgorde afgehandeld.
    pub fn sort(document: &Document) -> Result<Self, TopologyError> {
        let nodes: Vec<ObjectId> = document.object_ids().collect();
        Self::sort_edges(&nodes, &document.dependencies())
    }

    /// Kahn sortering over een expliciete lijst knopen en afhankelijkheden.
    /// Afhankelijkheden naar onbekende knopen worden genegeerd.
    pub fn sort_edges(nodes: &[ObjectId], edges: &[Dependency]) -> Result<Self, TopologyError> {
        if nodes.is_empty() {
            return Ok(Self::empty());
        }

        let mut indegree: HashMap<ObjectId, usize> = HashMap::new();
        let mut adjacency: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
        let mut predecessors: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();

        for node in nodes {
            indegree.entry(*node).or_insert(0);
            adjacency.entry(*node).or_default();
            predecessors.entry(*node).or_default();
        }

        let known: BTreeSet<Dependency> = edges
            .iter()
            .copied()
            .filter(|d| d.from != d.to)
            .filter(|d| indegree.contains_key(&d.from) && indegree.contains_key(&d.to))
            .collect();
        for dep in &known {
            adjacency.entry(dep.from).or_default().push(dep.to);
            predecessors.entry(dep.to).or_default().push(dep.from);
            *indegree.entry(dep.to).or_insert(0) += 1;
        }

        for neighbours in adjacency.values_mut() {
            neighbours.sort();
        }

        let mut ready: BTreeSet<ObjectId> = indegree
            .iter()
            .filter_map(|(node, &count)| (count == 0).then_some(*node))
            .collect();
        let mut order = Vec::with_capacity(nodes.len());

        while let Some(node) = ready.pop_first() {
            order.push(node);
            if let Some(neighbours) = adjacency.get(&node) {
                for neighbour in neighbours {
                    if let Some(count) = indegree.get_mut(neighbour) {
                        *count -= 1;
                        if *count == 0 {
                            ready.insert(*neighbour);
                        }
                    }
                }
            }
        }

        if order.len() == indegree.len() {
            return Ok(Self {
                order,
                adjacency,
                predecessors,
            });
        }

        let cycle = find_cycle(&adjacency).unwrap_or_default();
        Err(TopologyError::Cycle { cycle })
    }

    /// Directe afhankelijkheden van `node`.
    #[must_use]
    pub fn predecessors(&self, node: ObjectId) -> &[ObjectId] {
        self.predecessors
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or_else(|| &[])
    }

    /// `seeds` samen met alles wat er (transitief) van afhangt.
    #[must_use]
    pub fn downstream(&self, seeds: &BTreeSet<ObjectId>) -> BTreeSet<ObjectId> {
        let mut closure: BTreeSet<ObjectId> = BTreeSet::new();
        let mut queue: VecDeque<ObjectId> = seeds.iter().copied().collect();
        while let Some(node) = queue.pop_front() {
            if !closure.insert(node) {
                continue;
            }
            if let Some(neighbours) = self.adjacency.get(&node) {
                queue.extend(neighbours.iter().copied());
            }
        }
        closure
    }
}

fn find_cycle(adjacency: &HashMap<ObjectId, Vec<ObjectId>>) -> Option<Vec<ObjectId>> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum VisitState {
        Unvisited,
        Visiting,
        Visited,
    }

    fn dfs(
        node: ObjectId,
        adjacency: &HashMap<ObjectId, Vec<ObjectId>>,
        state: &mut HashMap<ObjectId, VisitState>,
        stack: &mut Vec<ObjectId>,
    ) -> Option<Vec<ObjectId>> {
        state.insert(node, VisitState::Visiting);
        stack.push(node);

        for neighbour in adjacency.get(&node).into_iter().flatten() {
            match state
                .get(neighbour)
                .copied()
                .unwrap_or(VisitState::Unvisited)
            {
                VisitState::Unvisited => {
                    if let Some(cycle) = dfs(*neighbour, adjacency, state, stack) {
                        return Some(cycle);
                    }
                }
                VisitState::Visiting => {
                    let position = stack.iter().position(|&n| n == *neighbour)?;
                    let mut cycle = stack[position..].to_vec();
                    cycle.push(*neighbour);
                    return Some(cycle);
                }
                VisitState::Visited => {}
            }
        }

        stack.pop();
        state.insert(node, VisitState::Visited);
        None
    }

    let mut roots: Vec<ObjectId> = adjacency.keys().copied().collect();
    roots.sort();

    let mut state: HashMap<ObjectId, VisitState> = HashMap::new();
    for node in roots {
        if state.get(&node).copied().unwrap_or(VisitState::Unvisited) == VisitState::Unvisited {
            let mut stack = Vec::new();
            if let Some(cycle) = dfs(node, adjacency, &mut state, &mut stack) {
                return Some(cycle);
            }
        }
    }

    None
}
