use std::borrow::Cow;
use std::ops::Range;

use crate::element::Element;

/// The nonzero entries of one sparse column, ordered by strictly increasing
/// row index.
///
/// Stored matrices hand out borrowed slices; lazily computed matrices build
/// the column on demand and hand out owned data.
#[derive(Debug, Clone)]
pub struct SparseColumn<'a, T: Element> {
    indices: Cow<'a, [usize]>,
    values: Cow<'a, [T]>,
}

impl<'a, T: Element> SparseColumn<'a, T> {
    /// Column view over borrowed index and value slices of equal length.
    pub fn borrowed(indices: &'a [usize], values: &'a [T]) -> Self {
        debug_assert_eq!(indices.len(), values.len());
        SparseColumn {
            indices: Cow::Borrowed(indices),
            values: Cow::Borrowed(values),
        }
    }

    /// Column owning its entries.
    pub fn owned(indices: Vec<usize>, values: Vec<T>) -> Self {
        debug_assert_eq!(indices.len(), values.len());
        SparseColumn {
            indices: Cow::Owned(indices),
            values: Cow::Owned(values),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Position of the first entry with index >= `row`.
    #[inline]
    pub fn lower_bound(&self, row: usize) -> usize {
        self.indices.partition_point(|&k| k < row)
    }

    /// Position of the first entry with index > `row`.
    #[inline]
    pub fn upper_bound(&self, row: usize) -> usize {
        self.indices.partition_point(|&k| k <= row)
    }

    /// Value stored at `row`, or zero.
    pub fn get(&self, row: usize) -> T {
        match self.indices.binary_search(&row) {
            Ok(pos) => self.values[pos],
            Err(_) => T::zero(),
        }
    }

    /// `(index, value)` pairs at positions `range`.
    pub fn entries(&self, range: Range<usize>) -> impl Iterator<Item = (usize, T)> + '_ {
        self.indices[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// All `(index, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.entries(0..self.len())
    }

    /// Returns true if the indices are strictly increasing.
    pub fn is_sorted_strict(&self) -> bool {
        self.indices.windows(2).all(|w| w[0] < w[1])
    }
}
