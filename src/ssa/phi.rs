//! Phi placement: globals, per-variable assignment blocks, and iterated
//! dominance-frontier phi insertion (Engineering a Compiler, page 501).

use crate::ir::{Function, Opcode, Operand, Tac};
use crate::utils::BitSet;

/// A variable is global if some block reads it before writing it, i.e. its
/// value can flow in from another block. `var_blocks[v]` collects the blocks
/// that assign v.
pub fn compute_globals_and_var_blocks(function: &mut Function) {
  let universe = function.reg_universe();
  let n = function.blocks.len();

  let mut globals = BitSet::new(universe);
  let mut var_blocks: Vec<BitSet> = (0..universe).map(|_| BitSet::new(n)).collect();

  for (b, block) in function.blocks.iter().enumerate() {
    let mut varkill = BitSet::new(universe);

    for j in block.start..=block.end {
      let tac = &function.ir[j];
      for v in tac.vreg_sources() {
        if !varkill.contains(v.id) {
          globals.insert(v.id);
        }
      }
      if let Some(d) = tac.vreg_dest() {
        varkill.insert(d.id);
        var_blocks[d.id].insert(b);
      }
    }
  }

  function.globals = globals;
  function.var_blocks = var_blocks;
  log::debug!("globals: {}", function.globals);
}

/// For each global, walk the iterated dominance frontier of its assignment
/// blocks and mark one phi per frontier block. Idempotent: a block never
/// gets two phis for the same variable. The phi instructions themselves are
/// then materialized at every marked block's start, one source slot per CFG
/// predecessor.
pub fn insert_phi_functions(function: &mut Function) {
  let universe = function.reg_universe();
  let n = function.blocks.len();
  let mut phi_functions: Vec<BitSet> = (0..n).map(|_| BitSet::new(universe)).collect();

  for v in function.globals.iter() {
    let mut worklist = function.var_blocks[v].clone();
    while let Some(b) = worklist.first() {
      worklist.remove(b);
      for d in function.dominance_frontiers[b].iter() {
        if !phi_functions[d].contains(v) {
          phi_functions[d].insert(v);
          worklist.insert(d);
        }
      }
    }
  }

  function.phi_functions = phi_functions;
  crate::ir::print::debug_show_block_sets("phi functions", &function.phi_functions);

  materialize_phi_instructions(function);
}

fn materialize_phi_instructions(function: &mut Function) {
  let n = function.blocks.len();
  let mut inserted = vec![0usize; n];

  // Insert in reverse block order so earlier indexes stay valid, then shift
  // the block ranges in one pass.
  for b in (0..n).rev() {
    let vars: Vec<usize> = function.phi_functions[b].iter().collect();
    if vars.is_empty() {
      continue;
    }

    let start = function.blocks[b].start;
    let pred_count = function.cfg.preds(b).len();
    // The block's entry label moves onto the first phi so the block still
    // starts at its jump target.
    let label = function.ir[start].label.take();

    for (k, &v) in vars.iter().enumerate() {
      let mut tac = Tac::new(Opcode::Phi, Some(Operand::vreg(v)), None, None);
      tac.phi_srcs = vec![Operand::vreg(v); pred_count];
      if k == 0 {
        tac.label = label;
      }
      function.ir.insert(start + k, tac);
    }
    inserted[b] = vars.len();
  }

  let mut offset = 0;
  for b in 0..n {
    function.blocks[b].start += offset;
    offset += inserted[b];
    function.blocks[b].end += offset;
  }
}
