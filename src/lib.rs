//! Maximum substring score over a byte string: the largest value of
//! `|w| * occ(w)` across all non-empty substrings `w`, computed by building
//! Ukkonen's online suffix tree of the input plus a terminator and scoring
//! its branching nodes.

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate smallvec;

pub mod alphabet;
mod error;

pub use error::{Result, ScoreError};

use alphabet::Alphabet;
use bit_vec::BitVec;
use smallvec::SmallVec;
use std::cell::Cell;

/// Longest input the open-edge encoding supports.
pub const MAX_TEXT_LEN: usize = 1_000_000;

/// Sentinel `end` for edges that grow with the current phase.
const OPEN_END: usize = usize::MAX;

type NodeId = usize;

const ROOT: NodeId = 0;

/// One symbol of the extended text: a code unit of the input, or the
/// terminator appended after the last input symbol. The terminator compares
/// distinct from every input symbol.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum Symbol {
    Terminal,
    Regular(u8),
}

#[derive(Copy, Clone)]
struct Text<'a> {
    data: &'a [u8],
}

impl<'a> Text<'a> {
    fn new(data: &'a [u8]) -> Text<'a> {
        Text { data }
    }

    fn raw_len(&self) -> usize {
        self.data.len()
    }

    /// Length including the terminator.
    fn len(&self) -> usize {
        self.data.len() + 1
    }

    fn at(&self, index: usize) -> Symbol {
        if index == self.data.len() {
            Symbol::Terminal
        } else {
            Symbol::Regular(self.data[index])
        }
    }

    fn substring(&self, start: usize, end: usize) -> String {
        let regular_end = end.min(self.data.len());
        let mut label =
            String::from_utf8_lossy(&self.data[start.min(regular_end)..regular_end]).into_owned();
        if end > self.data.len() {
            label.push('$');
        }
        label
    }
}

/// A labelled arc to a child node. The label is the interval
/// `[start, end)` over the extended text; `end == OPEN_END` marks a leaf
/// edge whose label grows implicitly as construction advances.
#[derive(Debug, Copy, Clone)]
struct Edge {
    start: usize,
    end: usize,
    target: NodeId,
}

impl Edge {
    fn new(start: usize, end: usize, target: NodeId) -> Edge {
        debug_assert!(end == OPEN_END || start < end, "empty edge label");
        Edge { start, end, target }
    }

    fn open(start: usize, target: NodeId) -> Edge {
        Edge { start, end: OPEN_END, target }
    }

    fn resolved_end(&self, position: usize) -> usize {
        if self.end == OPEN_END {
            position + 1
        } else {
            self.end
        }
    }

    fn len(&self, position: usize) -> usize {
        self.resolved_end(position) - self.start
    }
}

/// Outgoing edges of a node, keyed by the first symbol of the edge label:
/// one slot per alphabet rank plus one for the terminator.
struct ChildMap {
    terminal: Option<Edge>,
    regular: SmallVec<[Option<Edge>; 4]>,
}

impl ChildMap {
    fn new(alphabet_size: usize) -> ChildMap {
        ChildMap {
            terminal: None,
            regular: smallvec![None; alphabet_size],
        }
    }

    fn slot(&mut self, alphabet: &Alphabet, symbol: Symbol) -> &mut Option<Edge> {
        match symbol {
            Symbol::Terminal => &mut self.terminal,
            Symbol::Regular(byte) => {
                &mut self.regular[alphabet.rank_of_symbol(byte) as usize]
            }
        }
    }

    fn get(&self, alphabet: &Alphabet, symbol: Symbol) -> Option<Edge> {
        match symbol {
            Symbol::Terminal => self.terminal,
            Symbol::Regular(byte) => self.regular[alphabet.rank_of_symbol(byte) as usize],
        }
    }

    fn iter<'s>(&'s self) -> Box<dyn Iterator<Item = Edge> + 's> {
        let terminal = self.terminal.iter().cloned();
        let regular = self.regular.iter().filter_map(|&edge| edge);
        Box::new(terminal.chain(regular))
    }

    fn len(&self) -> usize {
        self.terminal.iter().count()
            + self.regular.iter().filter(|edge| edge.is_some()).count()
    }
}

struct RootNode {
    children: ChildMap,
}

struct InternalNode {
    depth: usize,
    children: ChildMap,
    suffix_link: Option<NodeId>,
    leaf_count: Cell<Option<usize>>,
}

enum Node {
    Root(RootNode),
    Internal(InternalNode),
    Leaf,
}

impl Node {
    fn new_root(alphabet_size: usize) -> Node {
        Node::Root(RootNode { children: ChildMap::new(alphabet_size) })
    }

    fn new_internal(alphabet_size: usize, depth: usize) -> Node {
        Node::Internal(InternalNode {
            depth,
            children: ChildMap::new(alphabet_size),
            suffix_link: None,
            leaf_count: Cell::new(None),
        })
    }

    fn children(&self) -> Option<&ChildMap> {
        match *self {
            Node::Root(RootNode { ref children, .. })
            | Node::Internal(InternalNode { ref children, .. }) => Some(children),
            Node::Leaf => None,
        }
    }

    fn children_mut(&mut self) -> Option<&mut ChildMap> {
        match *self {
            Node::Root(RootNode { ref mut children, .. })
            | Node::Internal(InternalNode { ref mut children, .. }) => Some(children),
            Node::Leaf => None,
        }
    }

    /// String-depth: number of symbols on the path from the root. A leaf's
    /// depth is implicit in its open edge and never queried.
    fn depth(&self) -> usize {
        match *self {
            Node::Root(_) => 0,
            Node::Internal(InternalNode { depth, .. }) => depth,
            Node::Leaf => panic!("leaf string-depth is implicit"),
        }
    }
}

pub struct SuffixTree<'a> {
    alphabet: Alphabet,
    text: Text<'a>,
    nodes: Vec<Node>,
}

impl<'a> SuffixTree<'a> {
    fn new(data: &'a [u8], alphabet: Alphabet) -> SuffixTree<'a> {
        let alphabet_size = alphabet.size();

        SuffixTree {
            alphabet,
            text: Text::new(data),
            nodes: vec![Node::new_root(alphabet_size)],
        }
    }

    /// Builds the complete suffix tree of `data` plus the terminator.
    ///
    /// With `alphabet = None` the alphabet is derived from the input; a
    /// supplied alphabet must cover every input byte.
    ///
    /// # Examples
    /// ```
    /// use substring_score::SuffixTree;
    ///
    /// let tree = SuffixTree::from_text(b"banana", None).unwrap();
    /// assert_eq!(tree.node_count(), 11);
    /// ```
    pub fn from_text(data: &'a [u8], alphabet: Option<Alphabet>) -> Result<SuffixTree<'a>> {
        let mut builder = SuffixTreeBuilder::new(data, alphabet)?;
        for index in 0..=data.len() {
            let symbol = builder.symbol_at(index);
            builder.insert_symbol(symbol);
        }
        Ok(builder.build())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The largest `|w| * occ(w)` over all non-empty substrings `w`, never
    /// less than the input length (the whole string occurs once).
    pub fn max_score(&self) -> u64 {
        let mut best = self.text.raw_len() as u64;
        for node in &self.nodes {
            if let Node::Internal(ref internal) = *node {
                if internal.children.len() < 2 {
                    continue;
                }
                let count = internal
                    .leaf_count
                    .get()
                    .expect("leaf counts are cached when the tree is built");
                best = best.max(internal.depth as u64 * count as u64);
            }
        }
        best
    }

    pub fn pretty_print(&self) -> String {
        fn render(tree: &SuffixTree, node: NodeId, text: String) -> Vec<String> {
            let children = match tree.nodes[node].children() {
                Some(children) => children,
                None => return vec![text],
            };

            let mut edges: Vec<Edge> = children.iter().collect();
            edges.sort_by_key(|edge| edge.target);

            if edges.is_empty() {
                return vec![text];
            }

            let indent = " ".repeat(text.chars().count());

            let mut lines = Vec::new();
            for (i, edge) in edges.iter().enumerate() {
                let label = tree
                    .text
                    .substring(edge.start, edge.resolved_end(tree.text.raw_len()));

                for (j, line) in render(tree, edge.target, label).into_iter().enumerate() {
                    let line = match (i, j) {
                        (0, 0)                         => format!("{}┳{}", text, line),
                        (_, 0) if i < edges.len() - 1  => format!("{}┣{}", indent, line),
                        (_, _) if i < edges.len() - 1  => format!("{}┃{}", indent, line),
                        (_, 0)                         => format!("{}┗{}", indent, line),
                        (_, _)                         => format!("{} {}", indent, line),
                    };

                    lines.push(line);
                }
            }

            lines
        }

        render(self, ROOT, String::new()).join("\n")
    }

    /// Post-order pass caching `leaf_count` on every internal node. The tree
    /// can be as deep as the input is long, so the traversal keeps its own
    /// stack.
    fn cache_leaf_counts(&self) {
        let mut expanded = BitVec::from_elem(self.nodes.len(), false);
        let mut stack: Vec<NodeId> = vec![ROOT];

        while let Some(&node_id) = stack.last() {
            let children = match self.nodes[node_id].children() {
                Some(children) => children,
                None => {
                    stack.pop();
                    continue;
                }
            };

            if !expanded[node_id] {
                expanded.set(node_id, true);
                for edge in children.iter() {
                    stack.push(edge.target);
                }
            } else {
                stack.pop();
                let total: usize = children
                    .iter()
                    .map(|edge| self.leaf_count(edge.target))
                    .sum();
                if let Node::Internal(ref internal) = self.nodes[node_id] {
                    internal.leaf_count.set(Some(total));
                }
            }
        }
    }

    fn leaf_count(&self, node_id: NodeId) -> usize {
        match self.nodes[node_id] {
            Node::Leaf => 1,
            Node::Internal(ref internal) => internal
                .leaf_count
                .get()
                .expect("leaf counts are cached bottom-up"),
            Node::Root(ref root) => root
                .children
                .iter()
                .map(|edge| self.leaf_count(edge.target))
                .sum(),
        }
    }

    fn add_node(&mut self, node: Node) -> NodeId {
        let node_id = self.nodes.len();
        self.nodes.push(node);

        node_id
    }

    fn add_child(&mut self, parent: NodeId, symbol: Symbol, edge: Edge) {
        let children = self.nodes[parent]
            .children_mut()
            .expect("a leaf cannot take children");
        let slot = children.slot(&self.alphabet, symbol);
        assert!(slot.is_none(), "child key already present");
        *slot = Some(edge);
    }

    fn replace_child(&mut self, parent: NodeId, symbol: Symbol, edge: Edge) {
        let children = self.nodes[parent]
            .children_mut()
            .expect("a leaf cannot take children");
        let slot = children.slot(&self.alphabet, symbol);
        assert!(slot.is_some(), "replacing a child that is not there");
        *slot = Some(edge);
    }

    fn get_child(&self, parent: NodeId, symbol: Symbol) -> Option<Edge> {
        self.nodes[parent]
            .children()
            .and_then(|children| children.get(&self.alphabet, symbol))
    }

    fn internal_node_mut(&mut self, node_id: NodeId) -> Option<&mut InternalNode> {
        if let Node::Internal(ref mut node) = self.nodes[node_id] {
            Some(node)
        } else {
            None
        }
    }
}

/// Online Ukkonen construction. Feed the extended text one symbol at a time
/// with [`insert_symbol`](SuffixTreeBuilder::insert_symbol), terminator
/// last, then call [`build`](SuffixTreeBuilder::build).
pub struct SuffixTreeBuilder<'a> {
    tree: SuffixTree<'a>,

    active_node: NodeId,
    active_edge: Option<(Symbol, usize)>,

    position: usize,
    remainder: usize,

    last_created_internal: Option<NodeId>,
}

impl<'a> SuffixTreeBuilder<'a> {
    pub fn new(data: &'a [u8], alphabet: Option<Alphabet>) -> Result<SuffixTreeBuilder<'a>> {
        if data.len() > MAX_TEXT_LEN {
            return Err(ScoreError::InputTooLong { len: data.len(), max: MAX_TEXT_LEN });
        }

        let alphabet = match alphabet {
            Some(alphabet) => {
                for &byte in data {
                    if !alphabet.contains(byte) {
                        return Err(ScoreError::UnknownSymbol { symbol: byte });
                    }
                }
                alphabet
            }
            None => Alphabet::from_text(data),
        };

        Ok(SuffixTreeBuilder {
            tree: SuffixTree::new(data, alphabet),
            active_node: ROOT,
            active_edge: None,
            position: 0,
            remainder: 0,
            last_created_internal: None,
        })
    }

    /// The symbol at `index` of the extended text: the input byte, or the
    /// terminator at `index == data.len()`.
    pub fn symbol_at(&self, index: usize) -> Symbol {
        self.tree.text.at(index)
    }

    /// Runs one phase: extends the tree with the symbol at the current
    /// position. `c` must be the symbol [`symbol_at`](Self::symbol_at)
    /// returns for that position.
    pub fn insert_symbol(&mut self, c: Symbol) {
        debug_assert!(self.position < self.tree.text.len(), "text already consumed");
        debug_assert_eq!(c, self.tree.text.at(self.position));

        self.remainder += 1;
        self.last_created_internal = None;

        for _ in 0..self.remainder {
            if self.insert_suffix(c) {
                self.remainder -= 1;
                self.advance_active_point();
            } else {
                // Rule 3: the symbol is already on the tree. Record the step
                // and stop; the outstanding suffixes carry over.
                self.active_edge = match self.active_edge {
                    Some((symbol, length)) => Some((symbol, length + 1)),
                    None => Some((c, 1)),
                };
                self.normalize_active_point();
                break;
            }
        }

        self.position += 1;
    }

    pub fn build(self) -> SuffixTree<'a> {
        self.tree.cache_leaf_counts();
        self.tree
    }

    /// Inserts the next outstanding suffix at the active point. Returns
    /// false when the suffix is already present (Rule 3).
    fn insert_suffix(&mut self, c: Symbol) -> bool {
        match self.active_edge {
            Some((symbol, length)) => self.split_active_edge(c, symbol, length),
            None => self.insert_leaf(c),
        }
    }

    fn insert_leaf(&mut self, c: Symbol) -> bool {
        if self.tree.get_child(self.active_node, c).is_some() {
            return false;
        }

        let leaf = self.tree.add_node(Node::Leaf);
        self.tree.add_child(self.active_node, c, Edge::open(self.position, leaf));

        let link_target = self.active_node;
        self.link_pending_internal(link_target);

        true
    }

    fn split_active_edge(&mut self, c: Symbol, edge_symbol: Symbol, length: usize) -> bool {
        let edge = self
            .tree
            .get_child(self.active_node, edge_symbol)
            .expect("active point refers to a missing edge");
        let split_pos = edge.start + length;

        if self.tree.text.at(split_pos) == c {
            return false;
        }

        let depth = self.tree.nodes[self.active_node].depth() + length;
        let alphabet_size = self.tree.alphabet.size();
        let split_node = self.tree.add_node(Node::new_internal(alphabet_size, depth));

        let leaf = self.tree.add_node(Node::Leaf);
        self.tree.add_child(split_node, c, Edge::open(self.position, leaf));

        let continuation = self.tree.text.at(split_pos);
        self.tree
            .add_child(split_node, continuation, Edge::new(split_pos, edge.end, edge.target));

        self.tree.replace_child(
            self.active_node,
            edge_symbol,
            Edge::new(edge.start, split_pos, split_node),
        );

        self.link_pending_internal(split_node);
        self.last_created_internal = Some(split_node);

        true
    }

    /// Moves the active point to the next outstanding suffix after an
    /// insertion; `remainder` has already been decremented.
    fn advance_active_point(&mut self) {
        if self.active_node == ROOT {
            if let Some((_, length)) = self.active_edge {
                self.active_edge = Some((
                    self.tree.text.at(self.position + 1 - self.remainder),
                    length - 1,
                ));
            }
        } else {
            match self.tree.nodes[self.active_node] {
                Node::Internal(InternalNode { suffix_link: Some(link), .. }) => {
                    self.active_node = link;
                }
                _ => {
                    // The node's link is not threaded yet; re-derive the
                    // point from the next outstanding suffix.
                    self.active_node = ROOT;
                    self.active_edge = if self.remainder > 1 {
                        Some((
                            self.tree.text.at(self.position + 1 - self.remainder),
                            self.remainder - 1,
                        ))
                    } else {
                        None
                    };
                }
            }
        }

        self.normalize_active_point();
    }

    /// Walks the active point down while its length covers the referenced
    /// edge. Each step consumes a positive edge length, so this terminates.
    fn normalize_active_point(&mut self) {
        loop {
            match self.active_edge {
                None => break,
                Some((_, 0)) => {
                    self.active_edge = None;
                    break;
                }
                Some((symbol, length)) => {
                    let edge = self
                        .tree
                        .get_child(self.active_node, symbol)
                        .expect("active point refers to a missing edge");
                    let edge_len = edge.len(self.position);
                    if length < edge_len {
                        break;
                    }

                    self.active_node = edge.target;
                    if length == edge_len {
                        self.active_edge = None;
                        break;
                    }

                    let continuation = self.position - length + edge_len;
                    self.active_edge =
                        Some((self.tree.text.at(continuation), length - edge_len));
                }
            }
        }
    }

    fn link_pending_internal(&mut self, link_to: NodeId) {
        if let Some(node) = self.last_created_internal {
            self.tree
                .internal_node_mut(node)
                .expect("suffix links live on internal nodes")
                .suffix_link = Some(link_to);
        }

        self.last_created_internal = None;
    }
}

/// The maximum of `|w| * occ(w)` over all non-empty substrings `w` of
/// `data`, along with the number of nodes the suffix tree allocated.
///
/// Empty input yields `(0, 1)`: the root alone.
///
/// # Examples
/// ```
/// use substring_score::max_substring_score;
///
/// let (score, nodes) = max_substring_score(b"ababab").unwrap();
/// assert_eq!(score, 8);
/// assert_eq!(nodes, 12);
/// ```
pub fn max_substring_score(data: &[u8]) -> Result<(u64, u64)> {
    if data.is_empty() {
        return Ok((0, 1));
    }

    let tree = SuffixTree::from_text(data, None)?;
    Ok((tree.max_score(), tree.node_count() as u64))
}
