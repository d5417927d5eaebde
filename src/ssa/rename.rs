//! SSA renaming: a preorder walk of the dominator tree giving every
//! definition a fresh subscript and rewriting every use to the subscript on
//! top of its variable's stack (Engineering a Compiler, page 506).

use crate::ir::{Function, Opcode, Operand};
use crate::utils::Stack;

enum Walk {
  Enter(usize),
  Leave(usize),
}

pub fn rename_to_ssa(function: &mut Function) {
  let n = function.blocks.len();
  if n == 0 {
    return;
  }
  let universe = function.vreg_count + 1;

  let mut counters = vec![0usize; universe];
  let mut stacks: Vec<Stack> = (0..universe).map(|_| Stack::new()).collect();

  // Dominator-tree children, visited in ascending block order.
  let mut children: Vec<Vec<usize>> = vec![vec![]; n];
  for b in 1..n {
    if let Some(parent) = function.idom[b] {
      children[parent].push(b);
    }
  }

  let mut frames: Vec<Vec<usize>> = vec![];
  let mut work = vec![Walk::Enter(0)];

  while let Some(step) = work.pop() {
    match step {
      Walk::Enter(b) => {
        work.push(Walk::Leave(b));
        for &child in children[b].iter().rev() {
          work.push(Walk::Enter(child));
        }

        let mut frame = vec![];
        let block = function.blocks[b];
        for j in block.start..=block.end {
          if function.ir[j].opcode != Opcode::Phi {
            rewrite_use(&mut function.ir[j].src1, &stacks);
            rewrite_use(&mut function.ir[j].src2, &stacks);
          }
          if let Some(Operand::Vreg(v)) = &mut function.ir[j].dst {
            v.subscript = Some(counters[v.id]);
            counters[v.id] += 1;
            stacks[v.id].push(v.subscript.unwrap_or(0));
            frame.push(v.id);
          }
        }

        // Fill this block's slot in each successor's phi sources. A block
        // can reach the same successor along more than one edge, so every
        // matching predecessor ordinal gets the subscript.
        let succs: Vec<usize> = function.cfg.succs(b).to_vec();
        for s in succs {
          let preds: Vec<usize> = function.cfg.preds(s).to_vec();
          let start = function.blocks[s].start;
          let end = function.blocks[s].end;
          for (ordinal, _) in preds.iter().enumerate().filter(|(_, &p)| p == b) {
            for j in start..=end {
              if function.ir[j].opcode != Opcode::Phi {
                break;
              }
              if let Operand::Vreg(v) = &mut function.ir[j].phi_srcs[ordinal] {
                // A variable can be undefined along this path; its slot then
                // keeps no subscript and is ignored downstream.
                v.subscript = stacks[v.id].top();
              }
            }
          }
        }

        frames.push(frame);
      }
      Walk::Leave(_) => {
        let frame = frames.pop().unwrap_or_default();
        for &id in frame.iter().rev() {
          stacks[id].pop();
        }
      }
    }
  }
}

fn rewrite_use(operand: &mut Option<Operand>, stacks: &[Stack]) {
  if let Some(Operand::Vreg(v)) = operand {
    match stacks[v.id].top() {
      Some(subscript) => v.subscript = Some(subscript),
      None => panic!("use of r{} before definition", v.id),
    }
  }
}
