mod graph;
pub use graph::Graph;
mod set;
pub use set::BitSet;
mod stack;
pub use stack::Stack;
