use crate::{path::Path, Cost, Location, StateId};

/// A stored connection from one Region to a neighboring Region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    target: Location,
    path: Path<StateId>,
}

impl Edge {
    /// Creates an Edge to `target` along the compressed `path`
    pub fn new(target: Location, path: Path<StateId>) -> Edge {
        Edge { target, path }
    }

    /// The Location of the neighboring Region
    pub fn target(&self) -> Location {
        self.target
    }

    /// The Cost of the full (uncompressed) Path
    pub fn cost(&self) -> Cost {
        self.path.cost()
    }

    /// The Subgoals between both representatives, including both
    pub fn path(&self) -> &Path<StateId> {
        &self.path
    }
}

/// The adjacency list of a single Region.
///
/// Every entry is a neighbor Location, the Cost to it and the compressed Path to it. Those
/// three always move together, so the parallel views [`neighbors`](AdjacencyRow::neighbors),
/// [`costs`](AdjacencyRow::costs) and [`paths`](AdjacencyRow::paths) always have the same
/// length. An entry can be tombstoned: it keeps its position but stores nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdjacencyRow {
    representative: StateId,
    entries: Vec<Option<Edge>>,
}

impl AdjacencyRow {
    /// Creates a Row without any neighbors
    pub fn new(representative: StateId) -> AdjacencyRow {
        AdjacencyRow {
            representative,
            entries: vec![],
        }
    }

    pub(crate) fn from_entries(representative: StateId, entries: Vec<Option<Edge>>) -> Self {
        AdjacencyRow {
            representative,
            entries,
        }
    }

    /// The representative State of the Region
    pub fn representative(&self) -> StateId {
        self.representative
    }

    /// The number of positions, including tombstones
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the Row has no positions at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of present (not tombstoned) entries
    pub fn degree(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    /// All positions in order
    pub fn entries(&self) -> &[Option<Edge>] {
        &self.entries
    }

    /// The present entries together with their position
    pub fn edges(&self) -> impl Iterator<Item = (usize, &Edge)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(k, entry)| entry.as_ref().map(|edge| (k, edge)))
    }

    /// The neighbor Location at every position
    pub fn neighbors(&self) -> impl Iterator<Item = Option<Location>> + '_ {
        self.entries.iter().map(|e| e.as_ref().map(Edge::target))
    }

    /// The Cost at every position
    pub fn costs(&self) -> impl Iterator<Item = Option<Cost>> + '_ {
        self.entries.iter().map(|e| e.as_ref().map(Edge::cost))
    }

    /// The compressed Path at every position
    pub fn paths(&self) -> impl Iterator<Item = Option<&[StateId]>> + '_ {
        self.entries
            .iter()
            .map(|e| e.as_ref().map(|edge| edge.path.as_slice()))
    }

    /// Finds the position of the entry leading to `target`, looking it up by value
    pub fn position_of(&self, target: Location) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| matches!(e, Some(edge) if edge.target == target))
    }

    /// The number of present entries leading to `target`
    pub fn count_of(&self, target: Location) -> usize {
        self.edges().filter(|(_, e)| e.target == target).count()
    }

    /// The entry leading to `target`
    pub fn edge_to(&self, target: Location) -> Option<&Edge> {
        self.position_of(target)
            .and_then(|k| self.entries[k].as_ref())
    }

    /// Adds an entry at the end
    pub fn append_edge(&mut self, edge: Edge) -> usize {
        self.entries.push(Some(edge));
        self.entries.len() - 1
    }

    /// Adds an entry in the first tombstoned position, or at the end if there is none
    pub fn push_edge(&mut self, edge: Edge) -> usize {
        match self.entries.iter().position(Option::is_none) {
            Some(k) => {
                self.entries[k] = Some(edge);
                k
            }
            None => self.append_edge(edge),
        }
    }

    /// Removes the entry leading to `target`. All later entries move one position forward.
    pub fn remove_edge(&mut self, target: Location) -> Option<Edge> {
        let k = self.position_of(target)?;
        self.entries.remove(k)
    }

    /// Tombstones the entry leading to `target`. No other entry moves.
    pub fn tombstone_edge(&mut self, target: Location) -> Option<Edge> {
        let k = self.position_of(target)?;
        self.entries[k].take()
    }

    /// Replaces the Path stored at position `k`
    pub(crate) fn replace_path(&mut self, k: usize, path: Path<StateId>) {
        if let Some(edge) = self.entries[k].as_mut() {
            edge.path = path;
        }
    }
}
