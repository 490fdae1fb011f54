//! A sparse, two-way unbounded tape.
//!
//! Only non-blank cells are stored. Writing the blank symbol removes the cell, which
//! keeps the representation canonical and snapshots small.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::MAX_WINDOW_REACH;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tape {
    cells: BTreeMap<i64, char>,
}

/// A contiguous window of the tape, produced for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TapeSegment {
    /// Every position in `min_position..=max_position` with its symbol.
    pub cells: BTreeMap<i64, char>,
    pub head_position: i64,
    pub min_position: i64,
    pub max_position: i64,
}

impl Tape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tape holding `input` at positions `0, 1, 2, ...`.
    pub fn from_input(input: &str, blank: char) -> Self {
        let mut tape = Self::new();
        for (pos, symbol) in (0i64..).zip(input.chars()) {
            tape.write(pos, symbol, blank);
        }
        tape
    }

    /// Returns the symbol at `pos`, or `blank` if the cell is unset.
    pub fn read(&self, pos: i64, blank: char) -> char {
        self.cells.get(&pos).copied().unwrap_or(blank)
    }

    /// Writes `symbol` at `pos`. Writing `blank` clears the cell.
    pub fn write(&mut self, pos: i64, symbol: char, blank: char) {
        if symbol == blank {
            self.cells.remove(&pos);
        } else {
            self.cells.insert(pos, symbol);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of non-blank cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns the lowest and highest occupied positions.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        let min = self.cells.keys().next()?;
        let max = self.cells.keys().next_back()?;
        Some((*min, *max))
    }

    /// Iterates the occupied cells in position order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, char)> + '_ {
        self.cells.iter().map(|(pos, symbol)| (*pos, *symbol))
    }

    /// Drops any stored cell that holds `blank`.
    ///
    /// A tape captured under one blank symbol may be restored into a machine using
    /// another one.
    pub fn canonicalize(&mut self, blank: char) {
        self.cells.retain(|_, symbol| *symbol != blank);
    }

    /// Renders the occupied span of the tape, blanks included. An all-blank tape renders
    /// as the empty string.
    pub fn contents(&self, blank: char) -> String {
        match self.bounds() {
            Some((min, max)) => (min..=max).map(|pos| self.read(pos, blank)).collect(),
            None => String::new(),
        }
    }

    /// Returns the window from `min(occupied, head) - padding` to
    /// `max(occupied, head) + padding`, filling unset cells with `blank`.
    ///
    /// The window never reaches more than [`MAX_WINDOW_REACH`] cells past the head on
    /// either side.
    pub fn segment(&self, head: i64, padding: usize, blank: char) -> TapeSegment {
        let padding = i64::try_from(padding).unwrap_or(i64::MAX);
        let (min, max) = match self.bounds() {
            Some((min, max)) => (min.min(head), max.max(head)),
            None => (head, head),
        };
        let min_position = min
            .saturating_sub(padding)
            .max(head.saturating_sub(MAX_WINDOW_REACH));
        let max_position = max
            .saturating_add(padding)
            .min(head.saturating_add(MAX_WINDOW_REACH));

        TapeSegment {
            cells: (min_position..=max_position)
                .map(|pos| (pos, self.read(pos, blank)))
                .collect(),
            head_position: head,
            min_position,
            max_position,
        }
    }
}
