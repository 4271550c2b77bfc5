//! Dihedral symmetry reduction for square-board placements.
//!
//! A placement is a sequence of `n` column indices, one per row. The eight
//! symmetries of the square act on each `(row, col)` queen; the canonical key
//! of a placement is the lexicographically smallest serialization across the
//! eight images.

use std::collections::BTreeSet;

/// The eight symmetries of the square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symmetry {
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
    FlipHorizontal,
    FlipAntiDiagonal,
    FlipVertical,
    Transpose,
}

impl Symmetry {
    pub const ALL: [Self; 8] = [
        Self::Identity,
        Self::Rotate90,
        Self::Rotate180,
        Self::Rotate270,
        Self::FlipHorizontal,
        Self::FlipAntiDiagonal,
        Self::FlipVertical,
        Self::Transpose,
    ];

    /// Image of `(row, col)` on an `n x n` board. Requires `row, col < n`.
    #[must_use]
    pub const fn apply(self, row: usize, col: usize, n: usize) -> (usize, usize) {
        let last = n - 1;
        match self {
            Self::Identity => (row, col),
            Self::Rotate90 => (col, last - row),
            Self::Rotate180 => (last - row, last - col),
            Self::Rotate270 => (last - col, row),
            Self::FlipHorizontal => (row, last - col),
            Self::FlipAntiDiagonal => (last - col, last - row),
            Self::FlipVertical => (last - row, col),
            Self::Transpose => (col, row),
        }
    }

    /// Transformed placement, or `None` if `cols` is not a permutation of
    /// `0..n` (only permutations map to placements again).
    #[must_use]
    pub fn transform(self, cols: &[i64], n: usize) -> Option<Vec<i64>> {
        if !is_permutation(cols, n) {
            return None;
        }
        let mut image = vec![0_i64; n];
        for (row, &col) in cols.iter().enumerate() {
            let (r, c) = self.apply(row, usize::try_from(col).ok()?, n);
            image[r] = i64::try_from(c).ok()?;
        }
        Some(image)
    }
}

fn is_permutation(cols: &[i64], n: usize) -> bool {
    if cols.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &col in cols {
        match usize::try_from(col) {
            Ok(c) if c < n && !seen[c] => seen[c] = true,
            _ => return false,
        }
    }
    true
}

fn serialize(cols: &[i64]) -> String {
    cols.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Canonical key of a placement under the dihedral group.
///
/// Keys compare as strings. A sequence that is not a permutation of `0..n`
/// has no well-defined images and keys as its own serialization.
#[must_use]
pub fn canonical_key(cols: &[i64], n: usize) -> String {
    Symmetry::ALL
        .iter()
        .filter_map(|s| s.transform(cols, n))
        .map(|image| serialize(&image))
        .min()
        .unwrap_or_else(|| serialize(cols))
}

/// Keep the first placement of each symmetry class, in encounter order.
#[must_use]
pub fn dedupe(solutions: &[Vec<i64>], n: usize) -> Vec<Vec<i64>> {
    let mut seen = BTreeSet::new();
    solutions
        .iter()
        .filter(|cols| seen.insert(canonical_key(cols, n)))
        .cloned()
        .collect()
}
