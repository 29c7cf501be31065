//! Tree structure for hierarchical document indexing.
//!
//! Flat, level-tagged sections are nested into a tree of [`TreeNode`]s.
//! Each node exclusively owns its children; there are no back references.
//! Field declaration order on [`TreeNode`] is the order fields appear in
//! emitted JSON.

use crate::markdown::FlatSection;
use serde::{Deserialize, Serialize};

/// A node in the document tree structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Section title.
    pub title: String,

    /// Zero-padded sequential identifier ("0000", "0001", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,

    /// Summary of a leaf node's text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Summary of an internal node's own text, excluding its children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_summary: Option<String>,

    /// Text owned by this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// 1-indexed line where the section starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,

    /// Reserved; Markdown sections leave this unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_index: Option<usize>,

    /// Child nodes (subsections).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a new tree node.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the owned text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the starting line.
    pub fn with_start_index(mut self, line: usize) -> Self {
        self.start_index = Some(line);
        self
    }

    /// Add a child node.
    pub fn add_child(&mut self, child: TreeNode) {
        self.nodes.push(child);
    }

    /// Check if this node has children.
    pub fn has_children(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Recursively count all nodes in this subtree (including self).
    pub fn node_count(&self) -> usize {
        1 + self.nodes.iter().map(|n| n.node_count()).sum::<usize>()
    }

    /// Find all leaf nodes (nodes without children).
    pub fn leaves(&self) -> Vec<&TreeNode> {
        if self.nodes.is_empty() {
            vec![self]
        } else {
            self.nodes.iter().flat_map(|n| n.leaves()).collect()
        }
    }

    /// Find a node by title (case-insensitive).
    pub fn find_by_title(&self, title: &str) -> Option<&TreeNode> {
        if self.title.to_lowercase() == title.to_lowercase() {
            return Some(self);
        }
        self.nodes.iter().find_map(|child| child.find_by_title(title))
    }

    /// Find a node by its identifier.
    pub fn find_by_id(&self, node_id: &str) -> Option<&TreeNode> {
        if self.node_id.as_deref() == Some(node_id) {
            return Some(self);
        }
        self.nodes.iter().find_map(|child| child.find_by_id(node_id))
    }

    /// Format the tree as a string for display.
    pub fn format_tree(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        let id_str = self
            .node_id
            .as_ref()
            .map(|s| format!("[{}] ", s))
            .unwrap_or_default();
        let line_str = self
            .start_index
            .map(|l| format!(" (line {})", l))
            .unwrap_or_default();

        let mut result = format!("{}{}{}{}\n", prefix, id_str, self.title, line_str);

        for child in &self.nodes {
            result.push_str(&child.format_tree(indent + 1));
        }

        result
    }
}

/// The result of converting one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTree {
    /// Document name.
    #[serde(rename = "doc_name")]
    pub name: String,

    /// Optional one-sentence document description.
    #[serde(
        rename = "doc_description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,

    /// Root-level nodes.
    #[serde(rename = "structure")]
    pub nodes: Vec<TreeNode>,
}

impl DocumentTree {
    /// Create a new document tree.
    pub fn new(name: impl Into<String>, nodes: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            description: None,
            nodes,
        }
    }

    /// Get total node count.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(|n| n.node_count()).sum()
    }

    /// Get maximum depth of the tree.
    pub fn max_depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            1 + node.nodes.iter().map(depth).max().unwrap_or(0)
        }

        self.nodes.iter().map(depth).max().unwrap_or(0)
    }

    /// All leaves, left to right.
    pub fn leaves(&self) -> Vec<&TreeNode> {
        self.nodes.iter().flat_map(|n| n.leaves()).collect()
    }

    /// Find a node by title.
    pub fn find_by_title(&self, title: &str) -> Option<&TreeNode> {
        self.nodes.iter().find_map(|n| n.find_by_title(title))
    }

    /// Find a node by identifier.
    pub fn find_by_id(&self, node_id: &str) -> Option<&TreeNode> {
        self.nodes.iter().find_map(|n| n.find_by_id(node_id))
    }

    /// Format the entire tree for display.
    pub fn format(&self) -> String {
        let mut result = format!(
            "Document: {} ({} sections, depth {})\n",
            self.name,
            self.node_count(),
            self.max_depth()
        );
        if let Some(desc) = &self.description {
            result.push_str(desc);
            result.push('\n');
        }
        result.push_str(&"─".repeat(50));
        result.push('\n');

        for node in &self.nodes {
            result.push_str(&node.format_tree(0));
        }

        result
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Nest flat sections by heading level.
///
/// A section becomes a child of the nearest preceding open section with a
/// strictly lower level, or a root when there is none. Skipped levels do not
/// produce intermediate nodes.
pub fn build_tree(sections: Vec<FlatSection>) -> Vec<TreeNode> {
    let mut roots = Vec::new();
    let mut stack: Vec<(TreeNode, usize)> = Vec::new();

    for section in sections {
        while stack.last().is_some_and(|(_, level)| *level >= section.level) {
            close_top(&mut stack, &mut roots);
        }

        let node = TreeNode::new(section.title)
            .with_text(section.text)
            .with_start_index(section.line_num);
        stack.push((node, section.level));
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }

    roots
}

/// Pop the top of the stack and attach it to its parent, or to the roots.
fn close_top(stack: &mut Vec<(TreeNode, usize)>, roots: &mut Vec<TreeNode>) {
    if let Some((node, _)) = stack.pop() {
        match stack.last_mut() {
            Some((parent, _)) => parent.add_child(node),
            None => roots.push(node),
        }
    }
}

/// Assign zero-padded identifiers in pre-order, starting at "0000".
pub fn assign_node_ids(nodes: &mut [TreeNode]) {
    fn walk(nodes: &mut [TreeNode], next: &mut usize) {
        for node in nodes {
            node.node_id = Some(format!("{:04}", *next));
            *next += 1;
            walk(&mut node.nodes, next);
        }
    }

    let mut next = 0;
    walk(nodes, &mut next);
}

/// Flatten the tree in pre-order.
pub fn preorder(nodes: &[TreeNode]) -> Vec<&TreeNode> {
    fn walk<'a>(nodes: &'a [TreeNode], out: &mut Vec<&'a TreeNode>) {
        for node in nodes {
            out.push(node);
            walk(&node.nodes, out);
        }
    }

    let mut out = Vec::new();
    walk(nodes, &mut out);
    out
}

/// Visit every node mutably in pre-order.
pub fn for_each_preorder_mut(nodes: &mut [TreeNode], f: &mut impl FnMut(&mut TreeNode)) {
    for node in nodes {
        f(node);
        for_each_preorder_mut(&mut node.nodes, f);
    }
}

/// Drop the owned text from every node.
pub fn strip_text(nodes: &mut [TreeNode]) {
    for_each_preorder_mut(nodes, &mut |node: &mut TreeNode| node.text = None);
}

/// The subset of a node used to describe the whole document.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptionNode {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<DescriptionNode>,
}

/// Project nodes onto title, identifier, summaries and children.
pub fn description_projection(nodes: &[TreeNode]) -> Vec<DescriptionNode> {
    nodes
        .iter()
        .map(|node| DescriptionNode {
            title: node.title.clone(),
            node_id: node.node_id.clone(),
            summary: node.summary.clone(),
            prefix_summary: node.prefix_summary.clone(),
            nodes: description_projection(&node.nodes),
        })
        .collect()
}
