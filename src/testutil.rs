//! Shared test fixtures: the textbook worked examples the analyses are
//! checked against, plus small builders for hand-written TAC.

use crate::ir::{Function, Label, Opcode, Operand, Tac};
use crate::utils::{BitSet, Graph};

pub fn v(id: usize) -> Operand {
  Operand::vreg(id)
}

pub fn c(value: i64) -> Operand {
  Operand::constant(value)
}

pub fn l(label: Label) -> Operand {
  Operand::label(label)
}

pub struct IrBuilder {
  ir: Vec<Tac>,
}

impl IrBuilder {
  pub fn new() -> Self {
    IrBuilder { ir: vec![] }
  }

  pub fn i(
    &mut self,
    label: Option<Label>,
    opcode: Opcode,
    dst: Option<Operand>,
    src1: Option<Operand>,
    src2: Option<Operand>,
  ) {
    let mut tac = Tac::new(opcode, dst, src1, src2);
    tac.label = label;
    self.ir.push(tac);
  }

  pub fn build(self) -> Function {
    let mut function = Function::new(self.ir, 0);
    function.recount_vregs();
    function
  }
}

pub fn assert_set(set: &BitSet, elements: &[usize]) {
  let mut expected = BitSet::new(set.capacity());
  for &e in elements {
    expected.insert(e);
  }
  assert_eq!(set, &expected, "got {} expected {}", set, expected);
}

/// The running-sum loop from page 448 of Engineering a Compiler: a back-edge
/// loop accumulating into r2 with induction variable r1.
pub fn make_running_sum() -> Function {
  let mut b = IrBuilder::new();
  b.i(None, Opcode::Nop, None, None, None);
  b.i(None, Opcode::Move, Some(v(1)), Some(c(1)), None);
  b.i(Some(1), Opcode::Jz, None, Some(v(1)), Some(l(2)));
  b.i(None, Opcode::Move, Some(v(2)), Some(c(0)), None);
  b.i(Some(2), Opcode::Add, Some(v(2)), Some(v(1)), Some(v(2)));
  b.i(None, Opcode::Add, Some(v(1)), Some(v(1)), Some(c(1)));
  b.i(None, Opcode::Jz, None, Some(v(1)), Some(l(1)));
  b.i(None, Opcode::Arg, None, Some(c(1)), Some(v(2)));
  b.build()
}

/// The nested-branch loop from page 484 of Engineering a Compiler.
/// Registers: i=1, a=2, b=3, c=4, d=5, y=6, z=7. Nine blocks, eleven edges.
pub fn make_nested_branches() -> Function {
  let mut b = IrBuilder::new();
  b.i(None, Opcode::Nop, None, None, None);
  b.i(None, Opcode::Move, Some(v(1)), Some(c(1)), None);
  b.i(Some(1), Opcode::Move, Some(v(2)), Some(c(1)), None);
  b.i(None, Opcode::Move, Some(v(4)), Some(c(1)), None);
  b.i(None, Opcode::Add, None, Some(v(2)), Some(v(4)));
  b.i(None, Opcode::Jz, None, Some(v(2)), Some(l(5)));
  b.i(None, Opcode::Move, Some(v(3)), Some(c(0)), None);
  b.i(None, Opcode::Move, Some(v(4)), Some(c(0)), None);
  b.i(None, Opcode::Move, Some(v(5)), Some(c(0)), None);
  b.i(Some(3), Opcode::Add, Some(v(6)), Some(v(2)), Some(v(3)));
  b.i(None, Opcode::Add, Some(v(7)), Some(v(4)), Some(v(5)));
  b.i(None, Opcode::Add, Some(v(1)), Some(v(1)), Some(c(1)));
  b.i(None, Opcode::Jz, None, Some(v(1)), Some(l(1)));
  b.i(None, Opcode::Return, None, None, None);
  b.i(Some(5), Opcode::Move, Some(v(2)), Some(c(0)), None);
  b.i(None, Opcode::Move, Some(v(5)), Some(c(0)), None);
  b.i(None, Opcode::Add, None, Some(v(2)), Some(v(5)));
  b.i(None, Opcode::Jz, None, Some(v(2)), Some(l(8)));
  b.i(None, Opcode::Move, Some(v(5)), Some(c(0)), None);
  b.i(Some(7), Opcode::Move, Some(v(3)), Some(c(0)), None);
  b.i(None, Opcode::Jmp, None, Some(l(3)), None);
  b.i(Some(8), Opcode::Move, Some(v(4)), Some(c(0)), None);
  b.i(None, Opcode::Jmp, None, Some(l(7)), None);
  b.build()
}

/// The classic 9-block CFG from page 478 of Engineering a Compiler, built
/// directly as a graph for the dominance tests.
pub fn make_dominance_example_cfg() -> Graph {
  let mut graph = Graph::new(9);
  graph.add_edge(0, 1);
  graph.add_edge(1, 2);
  graph.add_edge(1, 5);
  graph.add_edge(2, 3);
  graph.add_edge(5, 6);
  graph.add_edge(5, 8);
  graph.add_edge(6, 7);
  graph.add_edge(8, 7);
  graph.add_edge(7, 3);
  graph.add_edge(3, 4);
  graph.add_edge(3, 1);
  graph
}

/// A diamond with a 3-way split: v1 is assigned in three different blocks
/// that all join at L99. Used by the renaming and live-range tests.
pub fn make_three_way_join() -> Function {
  let mut b = IrBuilder::new();
  b.i(None, Opcode::Move, Some(v(1)), Some(c(1)), None);
  b.i(None, Opcode::Jz, None, Some(v(1)), Some(l(10)));
  b.i(None, Opcode::Jz, None, Some(v(1)), Some(l(20)));
  b.i(None, Opcode::Move, Some(v(1)), Some(c(2)), None);
  b.i(None, Opcode::Jmp, None, Some(l(99)), None);
  b.i(Some(10), Opcode::Move, Some(v(1)), Some(c(3)), None);
  b.i(None, Opcode::Jmp, None, Some(l(99)), None);
  b.i(Some(20), Opcode::Move, Some(v(1)), Some(c(4)), None);
  b.i(None, Opcode::Jmp, None, Some(l(99)), None);
  b.i(Some(99), Opcode::Arg, None, Some(c(0)), Some(v(1)));
  b.build()
}
