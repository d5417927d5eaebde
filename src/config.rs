//! Allocator configuration, loadable from a TOML file.

use anyhow::Context;
use serde::Deserialize;

/// Knobs for a register-allocation run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AllocConfig {
  /// Number of general-purpose registers available for coloring.
  pub physical_register_count: usize,
  /// Live-range ids 1..=n pinned to physical registers 0..n-1, for ranges
  /// the calling convention fixes.
  pub reserved_live_range_count: usize,
  /// Compact sparse vreg ids before building the CFG.
  pub enable_vreg_renumbering: bool,
  /// Drop moves whose source and destination share a register.
  pub enable_self_move_elimination: bool,
}

impl Default for AllocConfig {
  fn default() -> Self {
    AllocConfig {
      physical_register_count: 12,
      reserved_live_range_count: 0,
      enable_vreg_renumbering: true,
      enable_self_move_elimination: true,
    }
  }
}

impl AllocConfig {
  pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
    toml::from_str(text).context("malformed allocator config")
  }

  pub fn from_toml_file(path: &str) -> anyhow::Result<Self> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    Self::from_toml_str(&text)
  }
}
