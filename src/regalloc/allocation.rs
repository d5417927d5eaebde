//! Top-down register allocation over live ranges: constrained ranges first,
//! highest spill cost first, lowest free register wins, losers go to
//! negative stack slots.

use crate::ir::{Function, Opcode, VregLocation};
use crate::utils::BitSet;

/// Assigns every live range a physical register in `0..k` or a stack slot.
/// A range is constrained when it has at least `k` interference neighbors;
/// constrained ranges are placed before unconstrained ones, both in
/// decreasing spill-cost order with ties broken by ascending id.
pub fn allocate_registers_top_down(function: &mut Function, physical_register_count: usize) {
  let k = physical_register_count;
  function.vreg_locations = vec![None; function.reg_universe()];
  function.spilled_register_count = 0;

  for reserved in 1..=function.reserved_live_range_count {
    function.vreg_locations[reserved] = Some(VregLocation::Reg(reserved - 1));
  }

  let first = function.reserved_live_range_count + 1;
  let mut ordered: Vec<usize> = (first..=function.live_range_count).collect();
  ordered.sort_by(|&a, &b| {
    let constrained = |lr: usize| function.interference.degree(lr) >= k;
    constrained(b)
      .cmp(&constrained(a))
      .then(function.spill_costs[b].cmp(&function.spill_costs[a]))
      .then(a.cmp(&b))
  });

  for lr in ordered {
    color_live_range(function, lr, k);
  }

  log::debug!(
    "allocated {} live ranges into {} registers, {} spilled",
    function.live_range_count,
    k,
    function.spilled_register_count
  );
}

fn color_live_range(function: &mut Function, lr: usize, k: usize) {
  // Spilled neighbors constrain nobody; only register-resident neighbors
  // block a color.
  let mut taken = BitSet::new(k.max(1));
  for other in 1..=function.live_range_count {
    if !function.interference.interferes(lr, other) {
      continue;
    }
    if let Some(VregLocation::Reg(r)) = function.vreg_locations[other] {
      if r < k {
        taken.insert(r);
      }
    }
  }

  let free = (0..k).find(|&r| !taken.contains(r));
  function.vreg_locations[lr] = Some(match free {
    Some(r) => VregLocation::Reg(r),
    None => {
      function.spilled_register_count += 1;
      VregLocation::Stack(-(function.spilled_register_count as i32))
    }
  });
}

/// A move between two ranges that landed in the same register does nothing;
/// turn it into a nop. The copy-elision rule in the interference builder
/// exists to make this happen.
pub fn remove_register_self_moves(function: &mut Function) {
  let locations = function.vreg_locations.clone();
  for tac in &mut function.ir {
    if tac.opcode != Opcode::Move {
      continue;
    }
    let dst = tac.vreg_dest().and_then(|v| v.live_range);
    let src = tac.src1.and_then(|op| op.as_vreg().and_then(|v| v.live_range));
    if let (Some(d), Some(s)) = (dst, src) {
      if let (Some(VregLocation::Reg(rd)), Some(VregLocation::Reg(rs))) = (locations[d], locations[s]) {
        if rd == rs {
          tac.opcode = Opcode::Nop;
          tac.dst = None;
          tac.src1 = None;
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ir::{Function, Operand, Tac};
  use crate::regalloc::InterferenceMatrix;

  // A star: range 1 interferes with 2, 3 and 4; costs grow with the id.
  fn make_star_function() -> Function {
    let mut function = Function::default();
    function.live_range_count = 4;
    let mut m = InterferenceMatrix::new(5);
    m.add_edge(1, 2);
    m.add_edge(1, 3);
    m.add_edge(1, 4);
    function.interference = m;
    function.spill_costs = vec![0, 10, 20, 30, 40];
    function
  }

  #[test]
  fn test_star_with_one_register_spills_the_hub() {
    let mut function = make_star_function();
    allocate_registers_top_down(&mut function, 1);

    assert_eq!(function.vreg_locations[1], Some(VregLocation::Stack(-1)));
    for lr in 2..=4 {
      assert_eq!(function.vreg_locations[lr], Some(VregLocation::Reg(0)));
    }
    assert_eq!(function.spilled_register_count, 1);
  }

  #[test]
  fn test_no_registers_spills_everything_by_cost() {
    let mut function = make_star_function();
    allocate_registers_top_down(&mut function, 0);

    assert_eq!(function.vreg_locations[4], Some(VregLocation::Stack(-1)));
    assert_eq!(function.vreg_locations[3], Some(VregLocation::Stack(-2)));
    assert_eq!(function.vreg_locations[2], Some(VregLocation::Stack(-3)));
    assert_eq!(function.vreg_locations[1], Some(VregLocation::Stack(-4)));
    assert_eq!(function.spilled_register_count, 4);
  }

  #[test]
  fn test_plenty_of_registers_nobody_spills() {
    let mut function = make_star_function();
    allocate_registers_top_down(&mut function, 8);

    // Unconstrained everywhere, so cost order decides; the lowest free
    // register rule packs neighbors of 1 into register 0 or 1.
    assert_eq!(function.spilled_register_count, 0);
    for lr in 1..=4 {
      assert!(function.vreg_locations[lr].unwrap().is_reg());
    }
    let hub = *function.vreg_locations[1].unwrap().as_reg().unwrap();
    for lr in 2..=4 {
      assert_ne!(function.vreg_locations[lr], Some(VregLocation::Reg(hub)));
    }
  }

  #[test]
  fn test_reserved_ranges_are_pinned() {
    let mut function = make_star_function();
    function.reserved_live_range_count = 2;
    function.live_range_count = 4;
    allocate_registers_top_down(&mut function, 4);

    assert_eq!(function.vreg_locations[1], Some(VregLocation::Reg(0)));
    assert_eq!(function.vreg_locations[2], Some(VregLocation::Reg(1)));
    // Ranges 3 and 4 avoid registers their neighbors hold.
    assert!(function.vreg_locations[3].unwrap().is_reg());
    assert!(function.vreg_locations[4].unwrap().is_reg());
  }

  #[test]
  fn test_self_move_becomes_nop() {
    let mut function = Function::default();
    let mut mv = Tac::new(Opcode::Move, Some(Operand::vreg(2)), Some(Operand::vreg(1)), None);
    if let Some(Operand::Vreg(v)) = &mut mv.dst {
      v.live_range = Some(2);
    }
    if let Some(Operand::Vreg(v)) = &mut mv.src1 {
      v.live_range = Some(1);
    }
    function.ir = vec![mv];
    function.live_range_count = 2;
    function.vreg_locations = vec![None, Some(VregLocation::Reg(3)), Some(VregLocation::Reg(3))];

    remove_register_self_moves(&mut function);
    assert_eq!(function.ir[0].opcode, Opcode::Nop);
    assert!(function.ir[0].dst.is_none());
  }
}
