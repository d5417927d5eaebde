//! Pretty-printing for TAC and the per-function analysis results.
//!
//! Diagnostic only; nothing in the pipeline reads any of this back. The
//! `debug_show_*` helpers mirror the stage dumps the passes log at debug
//! level.

use std::fmt::{Display, Formatter, Write as _};

use crate::ir::{Function, Opcode, Operand, Tac, Vreg};

impl Display for Vreg {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.subscript {
      Some(s) => write!(f, "r{}_{}", self.id, s),
      None => write!(f, "r{}", self.id),
    }
  }
}

impl Display for Operand {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Operand::Vreg(v) => write!(f, "{}", v),
      Operand::Preg(p) => write!(f, "preg{}", p),
      Operand::Const(c) => write!(f, "{}", c),
      Operand::StrLit(i) => write!(f, "SL{}", i),
      Operand::Global(i) => write!(f, "G{}", i),
      Operand::Label(l) => write!(f, "L{}", l),
      Operand::Flags => write!(f, "flags"),
    }
  }
}

fn binop_symbol(opcode: Opcode) -> Option<&'static str> {
  match opcode {
    Opcode::Add => Some("+"),
    Opcode::Sub => Some("-"),
    Opcode::Mul => Some("*"),
    Opcode::Div => Some("/"),
    Opcode::Mod => Some("%"),
    Opcode::Eq => Some("=="),
    Opcode::Ne => Some("!="),
    Opcode::Lt => Some("<"),
    Opcode::Gt => Some(">"),
    Opcode::Le => Some("<="),
    Opcode::Ge => Some(">="),
    Opcode::Band => Some("&"),
    Opcode::Bor => Some("|"),
    Opcode::Xor => Some("^"),
    Opcode::Shl => Some("<<"),
    Opcode::Shr => Some(">>"),
    _ => None,
  }
}

impl Display for Tac {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    if let Some(symbol) = binop_symbol(self.opcode) {
      let dst = self.dst.as_ref().map(|d| d.to_string()).unwrap_or_else(|| "_".to_string());
      return write!(
        f,
        "{} = {} {} {}",
        dst,
        self.src1.as_ref().unwrap(),
        symbol,
        self.src2.as_ref().unwrap()
      );
    }

    match self.opcode {
      Opcode::Move => write!(f, "{} = {}", self.dst.as_ref().unwrap(), self.src1.as_ref().unwrap()),
      Opcode::Jmp => write!(f, "jmp {}", self.src1.as_ref().unwrap()),
      Opcode::Jz => write!(f, "jz {}, {}", self.src1.as_ref().unwrap(), self.src2.as_ref().unwrap()),
      Opcode::Jnz => write!(f, "jnz {}, {}", self.src1.as_ref().unwrap(), self.src2.as_ref().unwrap()),
      Opcode::Return => match &self.src1 {
        Some(v) => write!(f, "return {}", v),
        None => write!(f, "return"),
      },
      Opcode::Phi => {
        write!(f, "{} = phi(", self.dst.as_ref().unwrap())?;
        for (i, src) in self.phi_srcs.iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{}", src)?;
        }
        write!(f, ")")
      }
      _ => {
        // NOP, CALL, ARG, START_LOOP, END_LOOP and friends
        write!(f, "{}", self.opcode.to_string().to_lowercase())?;
        for src in self.src1.iter().chain(self.src2.iter()) {
          write!(f, " {}", src)?;
        }
        Ok(())
      }
    }
  }
}

/// Render the instruction list with block headers, labels and whatever
/// analysis annotations have been computed so far.
pub fn format_function(function: &Function) -> String {
  let mut out = String::new();

  for (b, block) in function.blocks.iter().enumerate() {
    let _ = write!(out, "block {}", b);
    if let Some(label) = function.ir[block.start].label {
      let _ = write!(out, " (L{})", label);
    }
    let _ = writeln!(out, ":");

    if b < function.dominance.len() {
      let _ = writeln!(out, "  ; dom={}", function.dominance[b]);
    }
    if b < function.liveout.len() {
      let _ = writeln!(
        out,
        "  ; uevar={} varkill={} liveout={}",
        function.uevar[b], function.varkill[b], function.liveout[b]
      );
    }

    for j in block.start..=block.end {
      let tac = &function.ir[j];
      let _ = writeln!(out, "  {:4}  {}", j, tac);
    }
  }

  if !function.vreg_locations.is_empty() {
    let _ = writeln!(out, "locations:");
    for (lr, loc) in function.vreg_locations.iter().enumerate().skip(1) {
      match loc {
        Some(crate::ir::VregLocation::Reg(p)) => {
          let _ = writeln!(out, "  lr{} -> preg{}", lr, p);
        }
        Some(crate::ir::VregLocation::Stack(slot)) => {
          let _ = writeln!(out, "  lr{} -> stack[{}]", lr, slot);
        }
        None => {}
      }
    }
  }

  out
}

pub fn debug_show_cfg(function: &Function) {
  log::debug!("blocks:");
  for (b, block) in function.blocks.iter().enumerate() {
    log::debug!("{}: {} -> {}", b, block.start, block.end);
  }
  log::debug!("edges:");
  for b in 0..function.cfg.node_count() {
    for &s in function.cfg.succs(b) {
      log::debug!("{} -> {}", b, s);
    }
  }
}

pub fn debug_show_block_sets(name: &str, sets: &[crate::utils::BitSet]) {
  log::debug!("{}:", name);
  for (b, set) in sets.iter().enumerate() {
    log::debug!("{}: {}", b, set);
  }
}

pub fn debug_show_idoms(function: &Function) {
  log::debug!("idoms:");
  for (b, idom) in function.idom.iter().enumerate() {
    match idom {
      Some(d) => log::debug!("{}: {}", b, d),
      None => log::debug!("{}: -", b),
    }
  }
}
