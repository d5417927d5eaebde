//! Simple integer stack, used for the per-variable subscript stacks during
//! SSA renaming.

#[derive(Clone, Debug, Default)]
pub struct Stack {
  elements: Vec<usize>,
}

impl Stack {
  pub fn new() -> Self {
    Stack { elements: vec![] }
  }

  pub fn push(&mut self, value: usize) {
    self.elements.push(value);
  }

  pub fn pop(&mut self) -> Option<usize> {
    self.elements.pop()
  }

  pub fn top(&self) -> Option<usize> {
    self.elements.last().copied()
  }

  pub fn len(&self) -> usize {
    self.elements.len()
  }

  pub fn is_empty(&self) -> bool {
    self.elements.is_empty()
  }
}
