/// Rooted binary cluster tree produced by UPGMA
///
/// Nodes own their children exclusively; the tree is assembled bottom-up one
/// merge at a time and never modified afterwards.
use crate::fraction::Fraction;
use arbor_core::{ArborError, ArborResult};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClusterNode {
    Leaf {
        name: String,
    },
    Internal {
        name: String,
        /// Half the distance at which the two children were merged
        height: Fraction,
        /// Number of leaves below this node
        size: u64,
        left: Box<ClusterNode>,
        right: Box<ClusterNode>,
    },
}

/// A parent-to-child branch and its length (height difference)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub parent: String,
    pub child: String,
    pub length: Fraction,
}

impl ClusterNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        ClusterNode::Leaf { name: name.into() }
    }

    pub fn internal(
        name: impl Into<String>,
        height: Fraction,
        left: ClusterNode,
        right: ClusterNode,
    ) -> Self {
        ClusterNode::Internal {
            name: name.into(),
            height,
            size: left.size() + right.size(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ClusterNode::Leaf { name } | ClusterNode::Internal { name, .. } => name,
        }
    }

    /// Leaves sit at height 0
    pub fn height(&self) -> Fraction {
        match self {
            ClusterNode::Leaf { .. } => Fraction::ZERO,
            ClusterNode::Internal { height, .. } => *height,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            ClusterNode::Leaf { .. } => 1,
            ClusterNode::Internal { size, .. } => *size,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, ClusterNode::Leaf { .. })
    }

    pub fn children(&self) -> Option<(&ClusterNode, &ClusterNode)> {
        match self {
            ClusterNode::Leaf { .. } => None,
            ClusterNode::Internal { left, right, .. } => Some((&**left, &**right)),
        }
    }

    /// Leaf names in left-to-right order
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self.children() {
            None => out.push(self.name()),
            Some((left, right)) => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self.children() {
            None => 1,
            Some((left, right)) => left.leaf_count() + right.leaf_count(),
        }
    }

    pub fn internal_count(&self) -> usize {
        match self.children() {
            None => 0,
            Some((left, right)) => 1 + left.internal_count() + right.internal_count(),
        }
    }

    /// Find a node by name anywhere in this subtree
    pub fn find(&self, name: &str) -> Option<&ClusterNode> {
        if self.name() == name {
            return Some(self);
        }
        let (left, right) = self.children()?;
        left.find(name).or_else(|| right.find(name))
    }

    /// True if no node sits below either of its children
    pub fn is_monotone(&self) -> bool {
        match self.children() {
            None => true,
            Some((left, right)) => {
                self.height() >= left.height()
                    && self.height() >= right.height()
                    && left.is_monotone()
                    && right.is_monotone()
            }
        }
    }

    /// All branches in pre-order, each with its exact length
    pub fn edges(&self) -> ArborResult<Vec<Edge>> {
        let mut edges = Vec::new();
        self.collect_edges(&mut edges)?;
        Ok(edges)
    }

    fn collect_edges(&self, out: &mut Vec<Edge>) -> ArborResult<()> {
        if let Some((left, right)) = self.children() {
            for child in [left, right] {
                let length = self.height().checked_sub(child.height()).ok_or_else(|| {
                    ArborError::ArithmeticOverflow(format!(
                        "branch length from {} to {}",
                        self.name(),
                        child.name()
                    ))
                })?;
                out.push(Edge {
                    parent: self.name().to_string(),
                    child: child.name().to_string(),
                    length,
                });
                child.collect_edges(out)?;
            }
        }
        Ok(())
    }

    /// Newick rendering with branch lengths; internal nodes are unnamed.
    pub fn to_newick(&self) -> String {
        let mut out = String::new();
        self.write_newick(&mut out);
        out.push(';');
        out
    }

    fn write_newick(&self, out: &mut String) {
        match self.children() {
            None => out.push_str(&newick_label(self.name())),
            Some((left, right)) => {
                out.push('(');
                for (i, child) in [left, right].into_iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    child.write_newick(out);
                    let _ = write!(out, ":{}", branch_length(self.height(), child.height()));
                }
                out.push(')');
            }
        }
    }
}

fn branch_length(parent: Fraction, child: Fraction) -> String {
    match parent.checked_sub(child) {
        Some(length) if length.is_integer() => length.to_string(),
        Some(length) => length.to_f64().to_string(),
        None => (parent.to_f64() - child.to_f64()).to_string(),
    }
}

fn newick_label(name: &str) -> String {
    const RESERVED: &[char] = &['(', ')', '[', ']', '\'', ':', ';', ',', ' ', '\t'];
    if name.contains(RESERVED) {
        format!("'{}'", name.replace('\'', "''"))
    } else {
        name.to_string()
    }
}
