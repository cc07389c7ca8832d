use std::fmt::{self, Debug, Formatter};

type BitBlock = u64;

const BLOCK_NBITS: usize = std::mem::size_of::<BitBlock>() * 8;

/// Fixed-width set of positions.
///
/// Sets are only combined with sets of the same width; two sets are equal
/// (and hash equally) exactly when they hold the same positions.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PosSet {
  slice: Box<[BitBlock]>,
}

impl PosSet {
  pub fn new(num_bits: usize) -> Self {
    let len = (num_bits + BLOCK_NBITS - 1) / BLOCK_NBITS;
    Self {
      slice: vec![0; len].into_boxed_slice(),
    }
  }

  pub fn from_bit(num_bits: usize, bit: usize) -> Self {
    let mut s = Self::new(num_bits);
    s.insert(bit);
    s
  }

  pub fn insert(&mut self, bit: usize) {
    self.slice[bit / BLOCK_NBITS] |= 1 << (bit % BLOCK_NBITS);
  }

  /// Returns whether the set has changed.
  pub fn union_with(&mut self, other: &PosSet) -> bool {
    let mut changed = false;
    for i in 0..self.slice.len() {
      let old = self.slice[i];
      self.slice[i] |= other.slice[i];
      changed |= old != self.slice[i];
    }
    changed
  }

  pub fn contains(&self, bit: usize) -> bool {
    self.slice.get(bit / BLOCK_NBITS)
      .map_or(false, |&block| block & (1 << (bit % BLOCK_NBITS)) != 0)
  }

  pub fn is_empty(&self) -> bool {
    self.slice.iter().all(|&block| block == 0)
  }

  pub fn len(&self) -> usize {
    self.slice.iter().map(|block| block.count_ones() as usize).sum()
  }

  pub fn iter(&self) -> Iter {
    Iter {
      slice: &*self.slice,
      bit: 0,
      index: 0,
    }
  }
}

pub struct Iter<'a> {
  slice: &'a [BitBlock],
  bit: usize,
  index: usize,
}

impl<'a> Iterator for Iter<'a> {
  type Item = usize;

  fn next(&mut self) -> Option<usize> {
    while self.index < self.slice.len() {
      if self.bit < BLOCK_NBITS {
        let bit = (self.slice[self.index] & !((1 << self.bit) - 1))
          .trailing_zeros() as usize;
        if bit < BLOCK_NBITS {
          self.bit = bit + 1;
          return Some(self.index * BLOCK_NBITS + bit);
        }
      }

      self.index += 1;
      self.bit = 0;
    }
    None
  }
}

impl<'a> IntoIterator for &'a PosSet {
  type Item = usize;
  type IntoIter = Iter<'a>;

  fn into_iter(self) -> Iter<'a> {
    self.iter()
  }
}

impl Debug for PosSet {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.debug_set().entries(self.iter()).finish()
  }
}
