//! Three-address code and the per-function state the pipeline fills in.
//!
//! The front end hands over a `Function` holding a flat `Vec<Tac>` with raw
//! virtual-register operands and nothing else; each pipeline stage populates
//! the fields it owns, in a fixed order. The instruction selector consumes
//! the finished `Function` (instructions, `vreg_locations`, spill count).

pub mod print;

use enum_as_inner::EnumAsInner;

use crate::regalloc::InterferenceMatrix;
use crate::utils::{BitSet, Graph};

pub type Label = u32;

/// A virtual register operand. `id` is stable across SSA renaming; the SSA
/// identity is the pair `(id, subscript)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vreg {
  pub id: usize,
  /// SSA subscript, set by renaming.
  pub subscript: Option<usize>,
  /// Live range id, set by live-range assignment.
  pub live_range: Option<usize>,
}

impl Vreg {
  pub fn new(id: usize) -> Self {
    Vreg {
      id,
      subscript: None,
      live_range: None,
    }
  }

  /// The key the dataflow passes index sets by: the live range once assigned,
  /// the raw vreg id before that.
  pub fn reg_key(&self) -> usize {
    self.live_range.unwrap_or(self.id)
  }
}

/// One TAC operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumAsInner)]
pub enum Operand {
  Vreg(Vreg),
  Preg(usize),
  Const(i64),
  StrLit(usize),
  Global(usize),
  Label(Label),
  /// The CPU flags produced by a comparison.
  Flags,
}

impl Operand {
  pub fn vreg(id: usize) -> Self {
    Operand::Vreg(Vreg::new(id))
  }

  pub fn constant(value: i64) -> Self {
    Operand::Const(value)
  }

  pub fn label(label: Label) -> Self {
    Operand::Label(label)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Opcode {
  Nop,
  Move,
  Add,
  Sub,
  Mul,
  Div,
  Mod,
  Eq,
  Ne,
  Lt,
  Gt,
  Le,
  Ge,
  Band,
  Bor,
  Xor,
  Shl,
  Shr,
  Jmp,
  Jz,
  Jnz,
  Return,
  Call,
  Arg,
  StartLoop,
  EndLoop,
  Phi,
}

/// One three-address instruction. Jump targets follow the front end's
/// convention: JMP carries its target in `src1`, JZ/JNZ in `src2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tac {
  pub opcode: Opcode,
  /// Label on this instruction, if it is a jump target.
  pub label: Option<Label>,
  pub dst: Option<Operand>,
  pub src1: Option<Operand>,
  pub src2: Option<Operand>,
  /// For phi instructions: one source per CFG predecessor, in edge order.
  pub phi_srcs: Vec<Operand>,
}

impl Tac {
  pub fn new(opcode: Opcode, dst: Option<Operand>, src1: Option<Operand>, src2: Option<Operand>) -> Self {
    Tac {
      opcode,
      label: None,
      dst,
      src1,
      src2,
      phi_srcs: vec![],
    }
  }

  pub fn with_label(mut self, label: Label) -> Self {
    self.label = Some(label);
    self
  }

  /// True for instructions after which a new basic block must start.
  pub fn transfers_control(&self) -> bool {
    matches!(self.opcode, Opcode::Jmp | Opcode::Jz | Opcode::Jnz | Opcode::Return)
  }

  pub fn jump_target(&self) -> Option<Label> {
    match self.opcode {
      Opcode::Jmp => self.src1.as_ref().and_then(|op| op.as_label().copied()),
      Opcode::Jz | Opcode::Jnz => self.src2.as_ref().and_then(|op| op.as_label().copied()),
      _ => None,
    }
  }

  /// All virtual registers this instruction reads: `src1`, `src2` and, for
  /// phi instructions, every per-predecessor source.
  pub fn vreg_sources(&self) -> impl Iterator<Item = Vreg> + '_ {
    self
      .src1
      .iter()
      .chain(self.src2.iter())
      .chain(self.phi_srcs.iter())
      .filter_map(|op| op.as_vreg().copied())
  }

  pub fn vreg_dest(&self) -> Option<Vreg> {
    self.dst.as_ref().and_then(|op| op.as_vreg().copied())
  }
}

/// A maximal straight-line run of instructions, as an inclusive index range
/// into the function's instruction vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Block {
  pub start: usize,
  pub end: usize,
}

/// Where a live range ended up: a physical register, or a negative stack
/// slot. The enum makes "both at once" unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumAsInner)]
pub enum VregLocation {
  Reg(usize),
  Stack(i32),
}

/// A function being compiled. Created fresh per function, populated by the
/// pipeline stages in order, discarded once instruction selection is done.
#[derive(Debug, Clone, Default)]
pub struct Function {
  pub ir: Vec<Tac>,
  /// Highest vreg id in use.
  pub vreg_count: usize,

  // CFG builder
  pub blocks: Vec<Block>,
  pub cfg: Graph,

  // Dominance engine
  pub dominance: Vec<BitSet>,
  pub idom: Vec<Option<usize>>,
  pub dominance_frontiers: Vec<BitSet>,

  // Liveness engine
  pub uevar: Vec<BitSet>,
  pub varkill: Vec<BitSet>,
  pub liveout: Vec<BitSet>,

  // SSA builder
  pub var_blocks: Vec<BitSet>,
  pub globals: BitSet,
  pub phi_functions: Vec<BitSet>,

  // Live ranges and allocation
  pub live_range_count: usize,
  /// Live-range ids 1..=reserved are pinned to physical registers.
  pub reserved_live_range_count: usize,
  pub interference: InterferenceMatrix,
  pub spill_costs: Vec<u64>,
  pub vreg_locations: Vec<Option<VregLocation>>,
  pub spilled_register_count: usize,
}

impl Function {
  pub fn new(ir: Vec<Tac>, vreg_count: usize) -> Self {
    Function {
      ir,
      vreg_count,
      ..Function::default()
    }
  }

  /// Recompute `vreg_count` from the instructions.
  pub fn recount_vregs(&mut self) {
    let mut max = 0;
    for tac in &self.ir {
      for v in tac.vreg_sources() {
        max = max.max(v.id);
      }
      if let Some(d) = tac.vreg_dest() {
        max = max.max(d.id);
      }
    }
    self.vreg_count = max;
  }

  /// Universe size for register-keyed sets: big enough for raw vregs before
  /// live-range assignment and for live ranges after it.
  pub fn reg_universe(&self) -> usize {
    self.vreg_count.max(self.live_range_count) + 1
  }
}
