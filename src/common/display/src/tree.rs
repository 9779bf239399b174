//! Tree display utilities for query plans.

use std::fmt;

/// A node that can be rendered by [`DisplayTree`].
pub trait TreeNode {
    /// One-line label of this node, e.g. `Project[a := a]`.
    fn label(&self) -> String;

    /// Child nodes, in display order.
    fn children(&self) -> Vec<&dyn TreeNode>;

    /// Additional details shown after the label.
    fn details(&self) -> Option<String> {
        None
    }
}

/// Renders a [`TreeNode`] hierarchy with box-drawing connectors.
pub struct DisplayTree<'a> {
    root: &'a dyn TreeNode,
}

impl<'a> DisplayTree<'a> {
    /// Create a new display tree.
    pub fn new(root: &'a dyn TreeNode) -> Self {
        Self { root }
    }

    fn write_label(f: &mut fmt::Formatter<'_>, node: &dyn TreeNode) -> fmt::Result {
        write!(f, "{}", node.label())?;
        if let Some(details) = node.details() {
            write!(f, " ({details})")?;
        }
        writeln!(f)
    }

    fn fmt_node(
        f: &mut fmt::Formatter<'_>,
        node: &dyn TreeNode,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let connector = if is_last { "└─ " } else { "├─ " };
        write!(f, "{prefix}{connector}")?;
        Self::write_label(f, node)?;

        let children = node.children();
        let child_prefix = format!("{prefix}{}", if is_last { "   " } else { "│  " });

        for (i, child) in children.iter().enumerate() {
            Self::fmt_node(f, *child, &child_prefix, i == children.len() - 1)?;
        }

        Ok(())
    }
}

impl fmt::Display for DisplayTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::write_label(f, self.root)?;

        let children = self.root.children();
        for (i, child) in children.iter().enumerate() {
            Self::fmt_node(f, *child, "", i == children.len() - 1)?;
        }

        Ok(())
    }
}
