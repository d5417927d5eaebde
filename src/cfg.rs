//! Control-flow graph construction.
//!
//! Partitions the linear instruction list into basic blocks and connects
//! them. A block starts at the first instruction, at any jump target, and
//! immediately after a control transfer, so jumps are always block-final.

use std::collections::HashMap;

use crate::ir::{Block, Function, Label, Opcode};
use crate::utils::Graph;

pub fn build_control_flow_graph(function: &mut Function) {
  if function.ir.is_empty() {
    function.blocks = vec![];
    function.cfg = Graph::new(0);
    return;
  }

  let mut starts = vec![0];
  for (i, tac) in function.ir.iter().enumerate() {
    if i > 0 && tac.label.is_some() {
      starts.push(i);
    }
    if tac.transfers_control() && i + 1 < function.ir.len() {
      starts.push(i + 1);
    }
  }
  starts.sort_unstable();
  starts.dedup();

  let mut blocks = Vec::with_capacity(starts.len());
  for (b, &start) in starts.iter().enumerate() {
    let end = if b + 1 < starts.len() {
      starts[b + 1] - 1
    } else {
      function.ir.len() - 1
    };
    blocks.push(Block { start, end });
  }

  let mut label_blocks: HashMap<Label, usize> = HashMap::new();
  for (b, block) in blocks.iter().enumerate() {
    if let Some(label) = function.ir[block.start].label {
      label_blocks.insert(label, b);
    }
  }

  let mut cfg = Graph::new(blocks.len());
  for (b, block) in blocks.iter().enumerate() {
    let last = &function.ir[block.end];
    match last.opcode {
      Opcode::Jmp => {
        cfg.add_edge(b, target_block(&label_blocks, last.jump_target().unwrap()));
      }
      Opcode::Jz | Opcode::Jnz => {
        cfg.add_edge(b, target_block(&label_blocks, last.jump_target().unwrap()));
        if b + 1 < blocks.len() {
          cfg.add_edge(b, b + 1);
        }
      }
      Opcode::Return => {}
      _ => {
        if b + 1 < blocks.len() {
          cfg.add_edge(b, b + 1);
        }
      }
    }
  }

  function.blocks = blocks;
  function.cfg = cfg;

  crate::ir::print::debug_show_cfg(function);
}

fn target_block(label_blocks: &HashMap<Label, usize>, label: Label) -> usize {
  *label_blocks
    .get(&label)
    .unwrap_or_else(|| panic!("jump to unknown label L{}", label))
}
