//! Every ordering of a small set, without materializing it.
//!
//! [`Permutations`] stands for all `k!` orderings of `k` distinct items.
//! Orderings are addressed by their rank in lexicographic order of item
//! positions, converted in O(k) through the factorial number system.
//! There is no iterator: a caller that really needs every
//! ordering has to generate them from [`Permutations::items`] itself.
//!
//! ```
//! use hidden_letters::decisions::Permutations;
//!
//! let orders = Permutations::new(vec!['a', 'b', 'c']).unwrap();
//! assert_eq!(orders.count(), 6);
//! assert_eq!(orders.element_at(0), Some(vec!['a', 'b', 'c']));
//! assert_eq!(orders.element_at(5), Some(vec!['c', 'b', 'a']));
//! assert_eq!(orders.index_of(&['b', 'a', 'c']).unwrap(), 2);
//! ```

use thiserror::Error;

/// Largest item count whose `k!` fits in a `usize`.
pub const MAX_ITEMS: usize = if usize::BITS >= 64 { 20 } else { 12 };

/// Failure building or querying a [`Permutations`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PermutationError {
    #[error("permutation items must be distinct (item {index} repeats an earlier one)")]
    Duplicate { index: usize },

    #[error("{count} items have too many orderings (at most {max} supported)", max = MAX_ITEMS)]
    TooMany { count: usize },

    #[error("not an ordering of the items")]
    NotAPermutation,
}

/// All orderings of a set of distinct items.
#[derive(Clone, Debug)]
pub struct Permutations<T> {
    items: Vec<T>,
}

impl<T: PartialEq + Clone> Permutations<T> {
    /// Create the orderings of `items`, which must be distinct.
    pub fn new(items: Vec<T>) -> Result<Self, PermutationError> {
        if items.len() > MAX_ITEMS {
            return Err(PermutationError::TooMany { count: items.len() });
        }
        for (index, item) in items.iter().enumerate() {
            if items[..index].contains(item) {
                return Err(PermutationError::Duplicate { index });
            }
        }
        Ok(Self { items })
    }

    /// The underlying items, in their original order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of orderings (`k!`).
    #[must_use]
    pub fn count(&self) -> usize {
        factorial(self.items.len())
    }

    /// Is `order` an ordering of exactly these items?
    #[must_use]
    pub fn contains(&self, order: &[T]) -> bool {
        order.len() == self.items.len() && self.items.iter().all(|item| order.contains(item))
    }

    /// Rank of an ordering: its Lehmer code read as a factorial-base number.
    pub fn index_of(&self, order: &[T]) -> Result<usize, PermutationError> {
        let k = self.items.len();
        if order.len() != k {
            return Err(PermutationError::NotAPermutation);
        }
        // Bit i is set once items[i] has been placed.
        let mut placed: u32 = 0;
        let mut index = 0;
        for (position, item) in order.iter().enumerate() {
            let original = self
                .items
                .iter()
                .position(|candidate| candidate == item)
                .ok_or(PermutationError::NotAPermutation)?;
            let bit = 1u32 << original;
            if placed & bit != 0 {
                return Err(PermutationError::NotAPermutation);
            }
            let smaller_left = (!placed & (bit - 1)).count_ones() as usize;
            placed |= bit;
            index = index * (k - position) + smaller_left;
        }
        Ok(index)
    }

    /// Ordering at a rank.
    #[must_use]
    pub fn element_at(&self, index: usize) -> Option<Vec<T>> {
        if index >= self.count() {
            return None;
        }
        let mut available = self.items.clone();
        let mut remainder = index;
        let mut order = Vec::with_capacity(available.len());
        while !available.is_empty() {
            let block = factorial(available.len() - 1);
            order.push(available.remove(remainder / block));
            remainder %= block;
        }
        Some(order)
    }
}

/// Equal when they order the same set of items.
impl<T: PartialEq + Clone> PartialEq for Permutations<T> {
    fn eq(&self, other: &Self) -> bool {
        self.contains(&other.items)
    }
}

fn factorial(n: usize) -> usize {
    (2..=n).product()
}
