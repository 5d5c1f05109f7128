//! Huffman tree construction.
//!
//! The tree lives in an arena. Leaves are pushed first, in the order the frequency model
//! hands them out (sentinel, then bytes ascending), and every merge appends a new node.
//! Arena indices therefore double as insertion sequence numbers, and the min-heap is keyed
//! on `(weight, index)` so that equal weights always come out in the same order.
//!
//! Only leaf depths survive the tree. They become the code lengths that the canonical
//! assigner turns into codes.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::trace;

use super::symbol::{Sym, MAX_CODE_LEN};
use crate::error::{HuffError, Result};
use crate::tools::freq_count::Frequencies;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeData {
    /// Arena indices of the left and right child.
    Kids(usize, usize),
    Leaf(Sym),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Node {
    pub weight: u64,
    pub node_data: NodeData,
}

impl Node {
    pub fn new(weight: u64, node_data: NodeData) -> Node {
        Node { weight, node_data }
    }
}

/// A complete Huffman tree. The root is always the last node in the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn root(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Depth of every leaf, walking left before right. A lone leaf gets length 1 so the
    /// sentinel of an empty input still has a code.
    pub fn code_lengths(&self) -> Result<Vec<(Sym, u8)>> {
        let mut leaves = Vec::with_capacity(self.nodes.len() / 2 + 1);
        self.return_leaves(self.root(), 0, &mut leaves);
        leaves
            .into_iter()
            .map(|(sym, depth)| {
                let len = depth.max(1);
                if len > MAX_CODE_LEN as usize {
                    return Err(HuffError::CodeTooLong { len });
                }
                Ok((sym, len as u8))
            })
            .collect()
    }

    /// Recursively walk the tree and push each leaf with its distance from the root.
    fn return_leaves(&self, idx: usize, depth: usize, leaves: &mut Vec<(Sym, usize)>) {
        match self.nodes[idx].node_data {
            NodeData::Kids(left, right) => {
                self.return_leaves(left, depth + 1, leaves);
                self.return_leaves(right, depth + 1, leaves);
            }
            NodeData::Leaf(sym) => leaves.push((sym, depth)),
        }
    }
}

/// Build the Huffman tree for a frequency model. The model always holds the sentinel, so
/// there is at least one leaf.
pub fn build_tree(freqs: &Frequencies) -> Tree {
    let mut nodes: Vec<Node> = freqs
        .iter()
        .map(|(sym, f)| Node::new(f, NodeData::Leaf(sym)))
        .collect();

    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| Reverse((n.weight, i)))
        .collect();

    // Pull off the two lightest nodes and hang them under a new one until one is left.
    while let (Some(Reverse((lw, left))), Some(Reverse((rw, right)))) = (heap.pop(), heap.pop())
    {
        let idx = nodes.len();
        nodes.push(Node::new(lw + rw, NodeData::Kids(left, right)));
        heap.push(Reverse((lw + rw, idx)));
        trace!("merged {} ({}) + {} ({}) -> {}", left, lw, right, rw, idx);
    }

    Tree { nodes }
}
