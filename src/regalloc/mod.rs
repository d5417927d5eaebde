//! Register allocation over live ranges.

pub mod allocation;
pub mod interference;
pub mod liverange;
pub mod spillcost;

pub use interference::InterferenceMatrix;

use std::collections::HashMap;

use crate::ir::{Function, Operand};

/// Renumbers virtual registers densely from 1, in first-appearance order.
/// Front ends burn through vreg ids; compacting them keeps every id-indexed
/// table small.
pub fn compress_vregs(function: &mut Function) {
  let mut renumbered: HashMap<usize, usize> = HashMap::new();
  let mut next = 1;

  for tac in &mut function.ir {
    for operand in [&mut tac.dst, &mut tac.src1, &mut tac.src2] {
      if let Some(Operand::Vreg(v)) = operand {
        let id = *renumbered.entry(v.id).or_insert_with(|| {
          let id = next;
          next += 1;
          id
        });
        v.id = id;
      }
    }
  }

  function.vreg_count = next - 1;
}
