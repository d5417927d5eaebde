//! Dominator sets, immediate dominators and dominance frontiers.
//!
//! Dominator sets use the iterative dataflow formulation (Engineering a
//! Compiler, page 503). Immediate dominators use the Cooper-Harvey-Kennedy
//! RPO intersection algorithm (page 532). Frontiers use the
//! predecessor-driven formulation over the idom tree (page 499).

use crate::ir::Function;
use crate::ir::print::{debug_show_block_sets, debug_show_idoms};
use crate::utils::{BitSet, Graph};

/// Dom(entry) = {entry}; for every other block, Dom(b) = {b} ∪ ⋂ Dom(p) over
/// predecessors p, starting from the all-blocks set and iterating to a
/// fixpoint.
pub fn compute_dominance(function: &mut Function) {
  let n = function.cfg.node_count();
  let mut dom: Vec<BitSet> = (0..n).map(|_| BitSet::full(n)).collect();
  if n == 0 {
    function.dominance = dom;
    return;
  }

  dom[0] = BitSet::new(n);
  dom[0].insert(0);

  let mut changed = true;
  while changed {
    changed = false;
    for b in 1..n {
      let mut intersection = BitSet::full(n);
      let mut got_predecessors = false;
      for &p in function.cfg.preds(b) {
        intersection.intersect_with(&dom[p]);
        got_predecessors = true;
      }
      if !got_predecessors {
        intersection = BitSet::new(n);
      }
      intersection.insert(b);

      if intersection != dom[b] {
        dom[b] = intersection;
        changed = true;
      }
    }
  }

  function.dominance = dom;
  debug_show_block_sets("dominance", &function.dominance);
}

/// Reverse postorder over the reachable blocks: the visit order plus each
/// block's position in it. Unreachable blocks get `usize::MAX`.
fn reverse_postorder(cfg: &Graph) -> (Vec<usize>, Vec<usize>) {
  let n = cfg.node_count();
  let mut rpos = vec![usize::MAX; n];
  if n == 0 {
    return (vec![], rpos);
  }

  let mut visited = vec![false; n];
  let mut postorder = Vec::with_capacity(n);
  let mut stack: Vec<(usize, usize)> = vec![(0, 0)];
  visited[0] = true;

  while let Some(frame) = stack.last_mut() {
    let (node, next_child) = *frame;
    if next_child < cfg.succs(node).len() {
      frame.1 += 1;
      let succ = cfg.succs(node)[next_child];
      if !visited[succ] {
        visited[succ] = true;
        stack.push((succ, 0));
      }
    } else {
      postorder.push(node);
      stack.pop();
    }
  }

  let order: Vec<usize> = postorder.iter().rev().copied().collect();
  for (pos, &b) in order.iter().enumerate() {
    rpos[b] = pos;
  }
  (order, rpos)
}

fn intersect(rpos: &[usize], idom: &[Option<usize>], mut f1: usize, mut f2: usize) -> usize {
  while f1 != f2 {
    while rpos[f1] > rpos[f2] {
      f1 = idom[f1].unwrap();
    }
    while rpos[f2] > rpos[f1] {
      f2 = idom[f2].unwrap();
    }
  }
  f1
}

pub fn compute_immediate_dominators(function: &mut Function) {
  let n = function.cfg.node_count();
  let mut idom: Vec<Option<usize>> = vec![None; n];
  if n == 0 {
    function.idom = idom;
    return;
  }

  let (order, rpos) = reverse_postorder(&function.cfg);

  // The entry temporarily dominates itself so intersect() terminates there.
  idom[0] = Some(0);

  let mut changed = true;
  while changed {
    changed = false;
    for &b in order.iter().skip(1) {
      let mut new_idom: Option<usize> = None;
      for &p in function.cfg.preds(b) {
        if idom[p].is_none() {
          continue;
        }
        new_idom = Some(match new_idom {
          None => p,
          Some(current) => intersect(&rpos, &idom, p, current),
        });
      }
      if idom[b] != new_idom {
        idom[b] = new_idom;
        changed = true;
      }
    }
  }

  idom[0] = None;
  function.idom = idom;
  debug_show_idoms(function);
}

/// DF(b) contains every block w such that b dominates a predecessor of w but
/// does not strictly dominate w: walk a runner from each predecessor of a
/// join block up the idom chain until it meets the join block's idom.
pub fn compute_dominance_frontiers(function: &mut Function) {
  let n = function.cfg.node_count();
  let mut df: Vec<BitSet> = (0..n).map(|_| BitSet::new(n)).collect();

  for b in 0..n {
    let preds = function.cfg.preds(b);
    if preds.len() < 2 {
      continue;
    }
    let join_idom = match function.idom[b] {
      Some(d) => d,
      None => continue,
    };

    for &p in preds {
      let mut runner = p;
      while runner != join_idom {
        df[runner].insert(b);
        match function.idom[runner] {
          Some(next) => runner = next,
          None => break,
        }
      }
    }
  }

  function.dominance_frontiers = df;
  debug_show_block_sets("dominance frontiers", &function.dominance_frontiers);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cfg::build_control_flow_graph;
  use crate::testutil::{assert_set, make_dominance_example_cfg, make_nested_branches};

  fn function_with_cfg(cfg: crate::utils::Graph) -> Function {
    let mut function = Function::new(vec![], 0);
    function.cfg = cfg;
    function
  }

  // The example on page 478 of Engineering a Compiler.
  #[test]
  fn test_dominance_nine_blocks() {
    let mut function = function_with_cfg(make_dominance_example_cfg());
    compute_dominance(&mut function);

    assert_set(&function.dominance[0], &[0]);
    assert_set(&function.dominance[1], &[0, 1]);
    assert_set(&function.dominance[2], &[0, 1, 2]);
    assert_set(&function.dominance[3], &[0, 1, 3]);
    assert_set(&function.dominance[4], &[0, 1, 3, 4]);
    assert_set(&function.dominance[5], &[0, 1, 5]);
    assert_set(&function.dominance[6], &[0, 1, 5, 6]);
    assert_set(&function.dominance[7], &[0, 1, 5, 7]);
    assert_set(&function.dominance[8], &[0, 1, 5, 8]);
  }

  #[test]
  fn test_idoms_nine_blocks() {
    let mut function = function_with_cfg(make_dominance_example_cfg());
    compute_immediate_dominators(&mut function);

    let expected = [None, Some(0), Some(1), Some(1), Some(3), Some(1), Some(5), Some(5), Some(5)];
    assert_eq!(function.idom, expected);
  }

  // The worked frontier example on page 499.
  #[test]
  fn test_dominance_frontiers_nine_blocks() {
    let mut function = function_with_cfg(make_dominance_example_cfg());
    compute_immediate_dominators(&mut function);
    compute_dominance_frontiers(&mut function);

    assert_set(&function.dominance_frontiers[0], &[]);
    assert_set(&function.dominance_frontiers[1], &[1]);
    assert_set(&function.dominance_frontiers[2], &[3]);
    assert_set(&function.dominance_frontiers[3], &[1]);
    assert_set(&function.dominance_frontiers[4], &[]);
    assert_set(&function.dominance_frontiers[5], &[3]);
    assert_set(&function.dominance_frontiers[6], &[7]);
    assert_set(&function.dominance_frontiers[7], &[3]);
    assert_set(&function.dominance_frontiers[8], &[7]);
  }

  // The example on pages 484 and 531, driven through the CFG builder.
  #[test]
  fn test_idoms_from_ir() {
    let mut function = make_nested_branches();
    build_control_flow_graph(&mut function);
    assert_eq!(function.blocks.len(), 9);
    assert_eq!(function.cfg.edge_count(), 11);

    compute_dominance(&mut function);
    compute_immediate_dominators(&mut function);

    let expected = [None, Some(0), Some(1), Some(1), Some(3), Some(1), Some(5), Some(5), Some(5)];
    assert_eq!(function.idom, expected);
  }

  #[test]
  fn test_dominance_is_idempotent() {
    let mut function = function_with_cfg(make_dominance_example_cfg());
    compute_dominance(&mut function);
    let first = function.dominance.clone();
    compute_dominance(&mut function);
    assert_eq!(function.dominance, first);
  }
}
