//! Spill-cost estimation. Each def or use of a live range costs 10^depth,
//! where depth counts the enclosing START_LOOP/END_LOOP brackets.

use crate::ir::{Function, Opcode};

pub fn estimate_spill_costs(function: &mut Function) {
  let mut costs = vec![0u64; function.reg_universe()];
  let mut depth: u32 = 0;

  for tac in &function.ir {
    match tac.opcode {
      Opcode::StartLoop => {
        depth += 1;
        continue;
      }
      Opcode::EndLoop => {
        depth = depth.saturating_sub(1);
        continue;
      }
      _ => {}
    }

    let weight = 10u64.saturating_pow(depth);
    for src in tac.vreg_sources() {
      costs[src.reg_key()] = costs[src.reg_key()].saturating_add(weight);
    }
    if let Some(dst) = tac.vreg_dest() {
      costs[dst.reg_key()] = costs[dst.reg_key()].saturating_add(weight);
    }
  }

  function.spill_costs = costs;
}
