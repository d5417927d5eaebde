//! Live-range construction: SSA names that flow through a common phi are
//! coalesced into one live range via union-find, then the ranges get dense
//! ids and the phis dissolve into nops.

use std::collections::HashMap;

use crate::ir::{Function, Opcode, Operand, Vreg};

/// Union-find over a flat arena of SSA names, with path compression.
struct UnionFind {
  parent: Vec<usize>,
}

impl UnionFind {
  fn new(size: usize) -> Self {
    UnionFind {
      parent: (0..size).collect(),
    }
  }

  fn find(&mut self, mut x: usize) -> usize {
    while self.parent[x] != x {
      self.parent[x] = self.parent[self.parent[x]];
      x = self.parent[x];
    }
    x
  }

  fn union(&mut self, a: usize, b: usize) {
    let ra = self.find(a);
    let rb = self.find(b);
    if ra != rb {
      self.parent[rb] = ra;
    }
  }
}

/// Coalesces SSA names into live ranges and annotates every vreg operand
/// with its range id. Ids are dense, starting just past the reserved ranges.
/// Phi instructions have served their purpose and become nops, keeping
/// their label so jump targets survive.
pub fn assign_live_ranges(function: &mut Function) {
  let universe = function.vreg_count + 1;

  // One arena slot per SSA name (id, subscript).
  let mut name_counts = vec![0usize; universe];
  for tac in &function.ir {
    if let Some(d) = tac.vreg_dest() {
      if let Some(sub) = d.subscript {
        name_counts[d.id] = name_counts[d.id].max(sub + 1);
      }
    }
  }
  let mut base = vec![0usize; universe];
  let mut total = 0;
  for id in 0..universe {
    base[id] = total;
    total += name_counts[id];
  }
  let node = |v: &Vreg| -> Option<usize> { v.subscript.map(|sub| base[v.id] + sub) };

  let mut sets = UnionFind::new(total);
  for tac in &function.ir {
    if tac.opcode != Opcode::Phi {
      continue;
    }
    let dst = tac.vreg_dest().and_then(|v| node(&v));
    if let Some(d) = dst {
      for src in tac.vreg_sources() {
        // A source left unsubscripted carries no value on its path and
        // joins no range.
        if let Some(s) = node(&src) {
          sets.union(d, s);
        }
      }
    }
  }

  // Dense ids in first-appearance order, past the reserved ranges.
  let mut range_ids: HashMap<usize, usize> = HashMap::new();
  let mut next = function.reserved_live_range_count + 1;
  for n in 0..total {
    let root = sets.find(n);
    range_ids.entry(root).or_insert_with(|| {
      let id = next;
      next += 1;
      id
    });
  }

  for tac in &mut function.ir {
    for operand in [&mut tac.dst, &mut tac.src1, &mut tac.src2] {
      annotate(operand, &base, &mut sets, &range_ids);
    }
  }
  function.live_range_count = next - 1;

  for tac in &mut function.ir {
    if tac.opcode == Opcode::Phi {
      tac.opcode = Opcode::Nop;
      tac.dst = None;
      tac.src1 = None;
      tac.src2 = None;
      tac.phi_srcs.clear();
    }
  }

  log::debug!(
    "{} live ranges ({} reserved)",
    function.live_range_count,
    function.reserved_live_range_count
  );
}

fn annotate(
  operand: &mut Option<Operand>,
  base: &[usize],
  sets: &mut UnionFind,
  range_ids: &HashMap<usize, usize>,
) {
  if let Some(Operand::Vreg(v)) = operand {
    if let Some(sub) = v.subscript {
      let root = sets.find(base[v.id] + sub);
      v.live_range = Some(range_ids[&root]);
    }
  }
}
