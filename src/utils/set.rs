//! Fixed-universe bitset used for all dataflow sets.
//!
//! Block and variable counts are known once the CFG is built, so every set in
//! the pipeline is a dense characteristic vector sized once at creation.
//! Union/intersection/difference are pointwise word operations; equality is
//! element-wise.

use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitSet {
  words: Vec<u64>,
  capacity: usize,
}

impl BitSet {
  /// An empty set over the universe `0..capacity`.
  pub fn new(capacity: usize) -> Self {
    BitSet {
      words: vec![0; (capacity + 63) / 64],
      capacity,
    }
  }

  /// The set containing every element of the universe `0..capacity`.
  pub fn full(capacity: usize) -> Self {
    let mut set = Self::new(capacity);
    let nwords = set.words.len();
    for (i, word) in set.words.iter_mut().enumerate() {
      *word = u64::MAX;
      if i == nwords - 1 {
        let used = capacity - i * 64;
        if used < 64 {
          *word = (1u64 << used) - 1;
        }
      }
    }
    set
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn insert(&mut self, value: usize) {
    debug_assert!(value < self.capacity, "set element {} out of universe {}", value, self.capacity);
    self.words[value / 64] |= 1 << (value % 64);
  }

  pub fn remove(&mut self, value: usize) {
    debug_assert!(value < self.capacity);
    self.words[value / 64] &= !(1 << (value % 64));
  }

  pub fn contains(&self, value: usize) -> bool {
    if value >= self.capacity {
      return false;
    }
    self.words[value / 64] & (1 << (value % 64)) != 0
  }

  pub fn len(&self) -> usize {
    self.words.iter().map(|w| w.count_ones() as usize).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.words.iter().all(|&w| w == 0)
  }

  pub fn clear(&mut self) {
    for word in self.words.iter_mut() {
      *word = 0;
    }
  }

  /// The smallest element, if any.
  pub fn first(&self) -> Option<usize> {
    for (i, &word) in self.words.iter().enumerate() {
      if word != 0 {
        return Some(i * 64 + word.trailing_zeros() as usize);
      }
    }
    None
  }

  pub fn union_with(&mut self, other: &BitSet) {
    debug_assert_eq!(self.capacity, other.capacity);
    for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
      *w |= o;
    }
  }

  pub fn intersect_with(&mut self, other: &BitSet) {
    debug_assert_eq!(self.capacity, other.capacity);
    for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
      *w &= o;
    }
  }

  pub fn difference_with(&mut self, other: &BitSet) {
    debug_assert_eq!(self.capacity, other.capacity);
    for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
      *w &= !o;
    }
  }

  /// Iterate the elements in ascending order.
  pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
    (0..self.capacity).filter(move |&v| self.contains(v))
  }
}

impl Display for BitSet {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{{")?;
    let mut first = true;
    for v in self.iter() {
      if !first {
        write!(f, ", ")?;
      }
      write!(f, "{}", v)?;
      first = false;
    }
    write!(f, "}}")
  }
}
