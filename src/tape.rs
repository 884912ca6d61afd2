//! Sparse memory tape.

use std::collections::BTreeMap;

/// A sparse byte tape with a pointer that never goes below address 0.
///
/// Only visited addresses are stored. Address 0 exists from construction and
/// every address the pointer lands on is materialised with value 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: BTreeMap<i64, u8>,
    pointer: i64,
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

impl Tape {
    pub fn new() -> Self {
        Self {
            cells: BTreeMap::from([(0, 0)]),
            pointer: 0,
        }
    }

    /// Value of the cell under the pointer.
    pub fn read(&self) -> u8 {
        self.cells.get(&self.pointer).copied().unwrap_or(0)
    }

    /// Overwrite the cell under the pointer.
    pub fn write(&mut self, value: u8) {
        self.cells.insert(self.pointer, value);
    }

    /// Move one cell left, clamped at address 0.
    pub fn move_left(&mut self) {
        self.pointer = (self.pointer - 1).max(0);
        self.visit();
    }

    pub fn move_right(&mut self) {
        self.pointer += 1;
        self.visit();
    }

    pub fn pointer(&self) -> i64 {
        self.pointer
    }

    /// Value stored at `address`, or `None` if the pointer never went there.
    pub fn get(&self, address: i64) -> Option<u8> {
        self.cells.get(&address).copied()
    }

    /// Visited cells in ascending address order.
    pub fn cells(&self) -> impl Iterator<Item = (i64, u8)> + '_ {
        self.cells.iter().map(|(&addr, &value)| (addr, value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn visit(&mut self) {
        self.cells.entry(self.pointer).or_insert(0);
    }
}
