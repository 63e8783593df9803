//! Node subsets as bitmasks, plus the lazy enumerators used by every search
//! in the engine (mechanisms, purviews and bipartitions).
//!
//! Enumeration order is fixed: subsets are produced by size, then
//! lexicographically over member order. Searches only replace their
//! incumbent on a strict improvement, so this order decides ties.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{PhiError, Result};

/// Set of node indices packed into a `u32`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct NodeSet(u32);

impl NodeSet {
    /// Largest node index a set can hold, plus one.
    pub const CAPACITY: usize = 32;

    pub const fn empty() -> Self {
        Self(0)
    }

    /// All nodes `0..n`.
    pub fn full(n: usize) -> Self {
        debug_assert!(n <= Self::CAPACITY);
        if n >= Self::CAPACITY {
            Self(u32::MAX)
        } else {
            Self((1u32 << n) - 1)
        }
    }

    pub fn singleton(node: usize) -> Self {
        debug_assert!(node < Self::CAPACITY);
        Self(1u32 << node)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build a set from node indices, rejecting indices beyond [`Self::CAPACITY`].
    pub fn from_nodes(nodes: &[usize]) -> Result<Self> {
        nodes.iter().try_fold(Self::empty(), |acc, &node| {
            if node >= Self::CAPACITY {
                Err(PhiError::config(format!(
                    "node index {node} exceeds the {} node limit",
                    Self::CAPACITY
                )))
            } else {
                Ok(acc.union(Self::singleton(node)))
            }
        })
    }

    pub fn contains(self, node: usize) -> bool {
        node < Self::CAPACITY && self.0 & (1u32 << node) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn is_subset(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Lowest member, if any.
    pub fn first(self) -> Option<usize> {
        (!self.is_empty()).then(|| self.0.trailing_zeros() as usize)
    }

    /// Members in ascending order.
    pub fn iter(self) -> NodeIter {
        NodeIter(self.0)
    }

    pub fn to_vec(self) -> Vec<usize> {
        self.iter().collect()
    }

    /// Place bit `k` of `index` onto the `k`-th member of this set.
    ///
    /// This is how a compact purview/sub-network index is written into the
    /// full little-endian state index.
    pub fn scatter(self, index: usize) -> u32 {
        self.iter()
            .enumerate()
            .filter(|(k, _)| (index >> k) & 1 == 1)
            .fold(0u32, |acc, (_, node)| acc | (1u32 << node))
    }

    /// Inverse of [`Self::scatter`]: read the members' bits of `mask` into a
    /// compact index.
    pub fn gather(self, mask: u32) -> usize {
        self.iter()
            .enumerate()
            .filter(|(_, node)| mask & (1u32 << node) != 0)
            .fold(0usize, |acc, (k, _)| acc | (1usize << k))
    }

    /// Lazily enumerate subsets with at least `min_size` members.
    pub fn subsets(self, min_size: usize) -> Subsets {
        Subsets::new(self, min_size, self.len())
    }

    /// Every bipartition of this set, both orderings of each split.
    pub fn bipartitions(self) -> Bipartitions {
        Bipartitions::new(self, false)
    }
}

impl TryFrom<Vec<usize>> for NodeSet {
    type Error = PhiError;

    fn try_from(value: Vec<usize>) -> Result<Self> {
        Self::from_nodes(&value)
    }
}

impl From<NodeSet> for Vec<usize> {
    fn from(value: NodeSet) -> Self {
        value.to_vec()
    }
}

impl FromIterator<usize> for NodeSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |acc, node| acc.union(Self::singleton(node)))
    }
}

impl fmt::Display for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|n| n.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}

/// Ascending member iterator.
#[derive(Debug, Clone)]
pub struct NodeIter(u32);

impl Iterator for NodeIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let node = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for NodeIter {}

/// Combinations of a set's members, by size then lexicographically.
#[derive(Debug, Clone)]
pub struct Subsets {
    members: Vec<usize>,
    size: usize,
    max_size: usize,
    positions: Vec<usize>,
    started: bool,
    done: bool,
}

impl Subsets {
    fn new(set: NodeSet, min_size: usize, max_size: usize) -> Self {
        let members = set.to_vec();
        let max_size = max_size.min(members.len());
        Self {
            done: min_size > max_size,
            positions: (0..min_size).collect(),
            size: min_size,
            max_size,
            members,
            started: false,
        }
    }

    fn current(&self) -> NodeSet {
        self.positions
            .iter()
            .map(|&pos| self.members[pos])
            .collect()
    }

    fn advance(&mut self) -> bool {
        let n = self.members.len();
        let r = self.size;
        if let Some(i) = (0..r).rev().find(|&i| self.positions[i] != i + n - r) {
            self.positions[i] += 1;
            for j in i + 1..r {
                self.positions[j] = self.positions[j - 1] + 1;
            }
            return true;
        }
        if self.size >= self.max_size {
            return false;
        }
        self.size += 1;
        self.positions = (0..self.size).collect();
        true
    }
}

impl Iterator for Subsets {
    type Item = NodeSet;

    fn next(&mut self) -> Option<NodeSet> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.current());
        }
        if self.advance() {
            Some(self.current())
        } else {
            self.done = true;
            None
        }
    }
}

/// Split of a node set into two complementary parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bipartition {
    part1: NodeSet,
    part2: NodeSet,
}

impl Bipartition {
    pub fn new(part1: NodeSet, part2: NodeSet) -> Self {
        Self { part1, part2 }
    }

    pub fn part1(&self) -> NodeSet {
        self.part1
    }

    pub fn part2(&self) -> NodeSet {
        self.part2
    }

    pub fn parts(&self) -> [NodeSet; 2] {
        [self.part1, self.part2]
    }

    /// Nodes covered by both parts together.
    pub fn nodes(&self) -> NodeSet {
        self.part1.union(self.part2)
    }

    pub fn swapped(&self) -> Self {
        Self::new(self.part2, self.part1)
    }

    /// A partition with an empty side does not cut anything.
    pub fn is_trivial(&self) -> bool {
        self.part1.is_empty() || self.part2.is_empty()
    }
}

impl fmt::Display for Bipartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.part1, self.part2)
    }
}

/// Lazy bipartition enumerator.
///
/// The ordered mode yields `(A, B)` and `(B, A)` for every split. The
/// unordered mode keeps only splits whose first part holds the lowest node.
#[derive(Debug, Clone)]
pub struct Bipartitions {
    universe: NodeSet,
    lowest: Option<usize>,
    firsts: Subsets,
    unordered: bool,
}

impl Bipartitions {
    pub fn new(universe: NodeSet, unordered: bool) -> Self {
        let max = universe.len().saturating_sub(1);
        Self {
            universe,
            lowest: universe.first(),
            firsts: Subsets::new(universe, 1, max),
            unordered,
        }
    }
}

impl Iterator for Bipartitions {
    type Item = Bipartition;

    fn next(&mut self) -> Option<Bipartition> {
        loop {
            let part1 = self.firsts.next()?;
            if self.unordered && !self.lowest.map_or(false, |low| part1.contains(low)) {
                continue;
            }
            return Some(Bipartition::new(part1, self.universe.difference(part1)));
        }
    }
}
