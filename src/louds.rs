//! LOUDS ("level-order unary degree sequence") encoding of a rooted ordinal
//! binary tree: two bits per node (does a left child exist, does a right
//! child exist), laid out in BFS order, indexed by a [`Poppy`] for constant
//! time navigation.

use std::collections::VecDeque;

use crate::bit_array::{BitArray, RawBitVec};
use crate::poppy::Poppy;

#[cfg_attr(feature = "savefile", derive(savefile_derive::Savefile))]
#[derive(Debug, Clone)]
pub struct LoudsBinaryTree {
    num_nodes: usize,
    bits: Poppy,
}

impl LoudsBinaryTree {
    /// Builds the encoding by BFS traversal starting at `root`, discovering
    /// children through `left_child`/`right_child`. Node ids in the returned
    /// tree are dense BFS indices, unrelated to whatever identifiers `A`
    /// uses.
    pub fn from_tree<A: Clone>(
        root: A,
        left_child: impl FnMut(&A) -> Option<A>,
        right_child: impl FnMut(&A) -> Option<A>,
    ) -> Self {
        Self::from_tree_with_order(root, left_child, right_child).0
    }

    /// Same as [`from_tree`](Self::from_tree), but also returns the BFS
    /// order the external ids were visited in: `order[dense_id]` is the
    /// external id assigned that dense id. Used by
    /// [`Permutation`](crate::permutation::Permutation) to attach
    /// per-node metadata (Huffman merge-bitmap offsets, leaf run starts)
    /// to the dense LOUDS ids it ends up with.
    pub fn from_tree_with_order<A: Clone>(
        root: A,
        mut left_child: impl FnMut(&A) -> Option<A>,
        mut right_child: impl FnMut(&A) -> Option<A>,
    ) -> (Self, Vec<A>) {
        let mut queue = VecDeque::new();
        queue.push_back(root);

        let mut bits = RawBitVec::new();
        let mut order = Vec::new();

        while let Some(node) = queue.pop_front() {
            order.push(node.clone());
            for child in [left_child(&node), right_child(&node)] {
                match child {
                    Some(child) => {
                        bits.push(true);
                        queue.push_back(child);
                    }
                    None => bits.push(false),
                }
            }
        }
        let num_nodes = order.len();
        bits.pad_to_64_bits();

        log::debug!("louds tree: encoded {num_nodes} nodes in {} bits", bits.len());

        (
            Self {
                num_nodes,
                bits: Poppy::new(bits),
            },
            order,
        )
    }

    pub fn len(&self) -> usize {
        self.num_nodes
    }

    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    pub fn root(&self) -> usize {
        0
    }

    pub fn left_child(&self, i: usize) -> Option<usize> {
        self.bits.at(2 * i).ok().filter(|&b| b)?;
        self.bits.rank(2 * i).ok()
    }

    pub fn right_child(&self, i: usize) -> Option<usize> {
        self.bits.at(2 * i + 1).ok().filter(|&b| b)?;
        self.bits.rank(2 * i + 1).ok()
    }

    pub fn parent(&self, i: usize) -> Option<usize> {
        if i == 0 {
            return None;
        }
        self.bits.select(i - 1).map(|pos| pos / 2)
    }

    pub fn is_leaf(&self, i: usize) -> bool {
        !self.bits.at(2 * i).unwrap_or(false) && !self.bits.at(2 * i + 1).unwrap_or(false)
    }
}
