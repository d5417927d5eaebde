//! Interference graph over live ranges, stored as a packed lower-triangular
//! bit matrix.

use crate::ir::{Function, Opcode};

/// Symmetric adjacency matrix. Only the lower triangle is stored; the
/// diagonal exists but a range never interferes with itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterferenceMatrix {
  bits: Vec<bool>,
  node_count: usize,
}

impl InterferenceMatrix {
  pub fn new(node_count: usize) -> Self {
    InterferenceMatrix {
      bits: vec![false; node_count * (node_count + 1) / 2],
      node_count,
    }
  }

  pub fn node_count(&self) -> usize {
    self.node_count
  }

  fn index(&self, a: usize, b: usize) -> usize {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    hi * (hi + 1) / 2 + lo
  }

  pub fn add_edge(&mut self, a: usize, b: usize) {
    if a == b {
      return;
    }
    let i = self.index(a, b);
    self.bits[i] = true;
  }

  pub fn interferes(&self, a: usize, b: usize) -> bool {
    a != b && self.bits[self.index(a, b)]
  }

  pub fn degree(&self, node: usize) -> usize {
    (0..self.node_count).filter(|&other| self.interferes(node, other)).count()
  }
}

/// Builds the interference graph: walk each block backward from its LiveOut
/// set; a definition interferes with everything live across it. A move's
/// destination does not interfere with the range it copies, so the two can
/// share a register and the move can later disappear.
pub fn build_interference_graph(function: &mut Function) {
  let nodes = function.live_range_count + 1;
  let mut matrix = InterferenceMatrix::new(nodes);

  for (b, block) in function.blocks.iter().enumerate() {
    let mut live = function.liveout[b].clone();

    for j in (block.start..=block.end).rev() {
      let tac = &function.ir[j];
      if let Some(dst) = tac.vreg_dest() {
        if let Some(d) = dst.live_range {
          let copied_from = match tac.opcode {
            Opcode::Move => tac.src1.and_then(|op| op.as_vreg().and_then(|v| v.live_range)),
            _ => None,
          };
          for l in live.iter() {
            if l != d && Some(l) != copied_from {
              matrix.add_edge(d, l);
            }
          }
          live.remove(d);
        }
      }
      for src in function.ir[j].vreg_sources() {
        if let Some(s) = src.live_range {
          live.insert(s);
        }
      }
    }
  }

  debug_show_edges(&matrix);
  function.interference = matrix;
}

fn debug_show_edges(matrix: &InterferenceMatrix) {
  for a in 0..matrix.node_count() {
    let neighbors: Vec<usize> = (0..a).filter(|&b| matrix.interferes(a, b)).collect();
    if !neighbors.is_empty() {
      log::debug!("lr {} interferes with {:?}", a, neighbors);
    }
  }
}
