//! Block-local UEVar/VarKill sets and the LiveOut fixpoint.
//!
//! Runs twice in the pipeline: vreg-keyed before SSA construction to find
//! the globals, and live-range-keyed after live-range assignment to feed the
//! interference graph (the sets index by `Vreg::reg_key`).

use crate::ir::Function;
use crate::ir::print::debug_show_block_sets;
use crate::utils::BitSet;

/// UEVar(b): variables read before any write in b. VarKill(b): variables
/// written anywhere in b. Call arguments and phi sources count as reads.
pub fn compute_uevar_and_varkill(function: &mut Function) {
  let universe = function.reg_universe();
  let mut uevar = Vec::with_capacity(function.blocks.len());
  let mut varkill = Vec::with_capacity(function.blocks.len());

  for block in &function.blocks {
    let mut ue = BitSet::new(universe);
    let mut kill = BitSet::new(universe);

    for j in block.start..=block.end {
      let tac = &function.ir[j];
      for v in tac.vreg_sources() {
        let key = v.reg_key();
        if !kill.contains(key) {
          ue.insert(key);
        }
      }
      if let Some(d) = tac.vreg_dest() {
        kill.insert(d.reg_key());
      }
    }

    uevar.push(ue);
    varkill.push(kill);
  }

  function.uevar = uevar;
  function.varkill = varkill;
  debug_show_block_sets("uevar", &function.uevar);
  debug_show_block_sets("varkill", &function.varkill);
}

/// LiveOut(b) = ⋃ over successors s of (UEVar(s) ∪ (LiveOut(s) ∖ VarKill(s))),
/// iterated to a fixpoint. Order-independent, so a plain block-order sweep
/// repeated until quiescence is enough.
pub fn compute_liveout(function: &mut Function) {
  let universe = function.reg_universe();
  let n = function.blocks.len();
  function.liveout = (0..n).map(|_| BitSet::new(universe)).collect();

  let mut changed = true;
  while changed {
    changed = false;

    for b in 0..n {
      let mut unions = BitSet::new(universe);
      for &s in function.cfg.succs(b) {
        let mut live = function.liveout[s].clone();
        live.difference_with(&function.varkill[s]);
        live.union_with(&function.uevar[s]);
        unions.union_with(&live);
      }

      if unions != function.liveout[b] {
        function.liveout[b] = unions;
        changed = true;
      }
    }
  }

  debug_show_block_sets("liveout", &function.liveout);
}
