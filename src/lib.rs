//! Register allocation for three-address code.
//!
//! The pipeline takes a function's flat instruction list, discovers its
//! basic blocks and control flow, rewrites it into SSA form, coalesces SSA
//! names into live ranges, builds an interference graph, estimates spill
//! costs, and hands out physical registers top down. What comes out is the
//! same instruction list annotated with a register or stack slot for every
//! live range, ready for instruction selection.

pub mod cfg;
pub mod config;
pub mod ir;
pub mod regalloc;
pub mod ssa;
pub mod utils;

#[cfg(test)]
mod testutil;

pub use config::AllocConfig;
pub use ir::{Function, Opcode, Operand, Tac, VregLocation};

/// Runs the whole pipeline over one function.
pub fn allocate_function(function: &mut Function, config: &AllocConfig) {
  if config.enable_vreg_renumbering {
    regalloc::compress_vregs(function);
  }
  function.recount_vregs();
  function.reserved_live_range_count = config.reserved_live_range_count;

  cfg::build_control_flow_graph(function);
  ssa::convert_to_ssa(function);
  regalloc::liverange::assign_live_ranges(function);

  // Liveness again, now keyed by live range, for the interference builder.
  ssa::liveness::compute_uevar_and_varkill(function);
  ssa::liveness::compute_liveout(function);

  regalloc::interference::build_interference_graph(function);
  regalloc::spillcost::estimate_spill_costs(function);
  regalloc::allocation::allocate_registers_top_down(function, config.physical_register_count);

  if config.enable_self_move_elimination {
    regalloc::allocation::remove_register_self_moves(function);
  }

  log::debug!("allocated function:\n{}", ir::print::format_function(function));
}
