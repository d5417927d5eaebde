//! SSA construction: dominance, liveness, phi placement, renaming.

pub mod dominance;
pub mod liveness;
pub mod phi;
pub mod rename;

use crate::ir::Function;

/// Rewrites the function into SSA form. Expects the CFG to be built; leaves
/// phi instructions at join points and a subscript on every definition.
pub fn convert_to_ssa(function: &mut Function) {
  dominance::compute_dominance(function);
  dominance::compute_immediate_dominators(function);
  dominance::compute_dominance_frontiers(function);

  liveness::compute_uevar_and_varkill(function);
  liveness::compute_liveout(function);

  phi::compute_globals_and_var_blocks(function);
  phi::insert_phi_functions(function);
  rename::rename_to_ssa(function);

  log::debug!("ssa form:\n{}", crate::ir::print::format_function(function));
}
