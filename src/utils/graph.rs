//! Directed graph over integer node ids.
//!
//! Edges are stored in both predecessor and successor adjacency lists so the
//! dataflow passes can walk either direction in O(1) per neighbor. Insertion
//! order is preserved; the SSA renamer relies on it for phi operand slots.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
  succ: Vec<Vec<usize>>,
  pred: Vec<Vec<usize>>,
  edge_count: usize,
}

impl Graph {
  pub fn new(node_count: usize) -> Self {
    Graph {
      succ: vec![vec![]; node_count],
      pred: vec![vec![]; node_count],
      edge_count: 0,
    }
  }

  pub fn node_count(&self) -> usize {
    self.succ.len()
  }

  pub fn edge_count(&self) -> usize {
    self.edge_count
  }

  /// Add a directed edge. Out-of-range node ids are an internal-consistency
  /// bug in the caller, so this fails fast.
  pub fn add_edge(&mut self, from: usize, to: usize) {
    let n = self.node_count();
    if from >= n || to >= n {
      panic!("graph edge {} -> {} out of range for {} nodes", from, to, n);
    }
    self.succ[from].push(to);
    self.pred[to].push(from);
    self.edge_count += 1;
  }

  pub fn succs(&self, node: usize) -> &[usize] {
    &self.succ[node]
  }

  pub fn preds(&self, node: usize) -> &[usize] {
    &self.pred[node]
  }
}
