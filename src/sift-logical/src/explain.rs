//! Tree-formatted plan explanation.

use common_display::{DisplayTree, TreeNode, truncate_string};

use crate::ops::PlanNode;

const MAX_PREDICATE_WIDTH: usize = 60;

fn symbol_list<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl TreeNode for PlanNode {
    fn label(&self) -> String {
        match self {
            Self::Values(node) => format!("Values[{}]", symbol_list(&node.output_symbols)),
            Self::TableScan(node) => {
                let columns: Vec<_> = node
                    .columns
                    .iter()
                    .map(|(symbol, column)| format!("{symbol} := {column}"))
                    .collect();
                format!("TableScan[{}: {}]", node.table, columns.join(", "))
            }
            Self::Project(node) => format!("Project[{}]", node.assignments),
            Self::Filter(node) => format!(
                "Filter[{}]",
                truncate_string(&node.predicate.to_string(), MAX_PREDICATE_WIDTH)
            ),
            Self::Limit(node) => format!("Limit[{}]", node.count),
            Self::Apply(node) => {
                let mut parts = vec![format!("correlation=[{}]", symbol_list(&node.correlation))];
                parts.extend(
                    node.assignments
                        .iter()
                        .map(|(symbol, expression)| format!("{symbol} := {expression}")),
                );
                format!("Apply[{}]", parts.join(", "))
            }
            Self::Join(node) => {
                let mut parts = vec![node.kind.to_string()];
                parts.extend(node.criteria.iter().map(ToString::to_string));
                if let Some(filter) = &node.filter {
                    parts.push(truncate_string(&filter.to_string(), MAX_PREDICATE_WIDTH));
                }
                format!("Join[{}]", parts.join(", "))
            }
        }
    }

    fn children(&self) -> Vec<&dyn TreeNode> {
        PlanNode::children(self)
            .into_iter()
            .map(|child| child as &dyn TreeNode)
            .collect()
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::Values(node) if !node.rows.is_empty() => {
                Some(format!("{} rows", node.row_count()))
            }
            Self::Join(node) => Some(format!("outputs: {}", symbol_list(&node.output_symbols()))),
            _ => None,
        }
    }
}

impl PlanNode {
    /// Render this subtree as an indented tree.
    pub fn explain(&self) -> String {
        DisplayTree::new(self).to_string()
    }
}
