//! Plan node model: the closed set of relational operators.

mod apply;
mod filter;
mod join;
mod limit;
mod project;
mod table_scan;
mod values;

pub use apply::{ApplyNode, Quantifier, SetExpression};
pub use filter::FilterNode;
pub use join::{EquiJoinClause, JoinKind, JoinNode};
pub use limit::LimitNode;
pub use project::ProjectNode;
pub use table_scan::TableScanNode;
pub use values::ValuesNode;

use common_error::{SiftError, SiftResult, ensure};
use serde::{Deserialize, Serialize};
use sift_core::{Symbol, SymbolSet};

/// The kind of a plan node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// [`ValuesNode`]
    Values,
    /// [`TableScanNode`]
    TableScan,
    /// [`ProjectNode`]
    Project,
    /// [`FilterNode`]
    Filter,
    /// [`LimitNode`]
    Limit,
    /// [`ApplyNode`]
    Apply,
    /// [`JoinNode`]
    Join,
}

impl NodeKind {
    /// Get the name of this node kind.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Values => "Values",
            Self::TableScan => "TableScan",
            Self::Project => "Project",
            Self::Filter => "Filter",
            Self::Limit => "Limit",
            Self::Apply => "Apply",
            Self::Join => "Join",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A relational operator in a logical plan.
///
/// Children are owned exclusively by their parent, so any subtree can be
/// replaced wholesale. Rewrites never mutate a node in place; they build a
/// new node and leave the original untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanNode {
    /// Literal rows.
    Values(ValuesNode),
    /// Connector-provided leaf.
    TableScan(TableScanNode),
    /// Column selection and computation.
    Project(ProjectNode),
    /// Row filtering.
    Filter(FilterNode),
    /// Row count limit.
    Limit(LimitNode),
    /// Correlated subquery.
    Apply(ApplyNode),
    /// Join of two relations.
    Join(JoinNode),
}

impl PlanNode {
    /// The kind of this node.
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Values(_) => NodeKind::Values,
            Self::TableScan(_) => NodeKind::TableScan,
            Self::Project(_) => NodeKind::Project,
            Self::Filter(_) => NodeKind::Filter,
            Self::Limit(_) => NodeKind::Limit,
            Self::Apply(_) => NodeKind::Apply,
            Self::Join(_) => NodeKind::Join,
        }
    }

    /// The ordered schema this node produces.
    pub fn output_symbols(&self) -> Vec<Symbol> {
        match self {
            Self::Values(node) => node.output_symbols.clone(),
            Self::TableScan(node) => node.output_symbols(),
            Self::Project(node) => node.assignments.outputs(),
            Self::Filter(node) => node.source.output_symbols(),
            Self::Limit(node) => node.source.output_symbols(),
            Self::Apply(node) => node.output_symbols(),
            Self::Join(node) => node.output_symbols(),
        }
    }

    /// Child nodes in positional order (Apply: input, subquery; Join: left, right).
    pub fn children(&self) -> Vec<&PlanNode> {
        match self {
            Self::Values(_) | Self::TableScan(_) => vec![],
            Self::Project(node) => vec![node.source.as_ref()],
            Self::Filter(node) => vec![node.source.as_ref()],
            Self::Limit(node) => vec![node.source.as_ref()],
            Self::Apply(node) => vec![node.input.as_ref(), node.subquery.as_ref()],
            Self::Join(node) => vec![node.left.as_ref(), node.right.as_ref()],
        }
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        match self {
            Self::Values(_) | Self::TableScan(_) => 0,
            Self::Project(_) | Self::Filter(_) | Self::Limit(_) => 1,
            Self::Apply(_) | Self::Join(_) => 2,
        }
    }

    /// Rebuild this node around new children, keeping the payload.
    pub fn with_children(self, children: Vec<PlanNode>) -> SiftResult<PlanNode> {
        ensure!(
            children.len() == self.child_count(),
            InternalError: "{} expects {} children, got {}",
            self.kind(),
            self.child_count(),
            children.len()
        );

        let mut children = children.into_iter();
        let mut next = || {
            children
                .next()
                .map(Box::new)
                .ok_or_else(|| SiftError::internal("missing child"))
        };

        Ok(match self {
            Self::Values(_) | Self::TableScan(_) => self,
            Self::Project(node) => Self::Project(ProjectNode {
                source: next()?,
                ..node
            }),
            Self::Filter(node) => Self::Filter(FilterNode {
                source: next()?,
                ..node
            }),
            Self::Limit(node) => Self::Limit(LimitNode {
                source: next()?,
                ..node
            }),
            Self::Apply(node) => {
                let input = next()?;
                let subquery = next()?;
                Self::Apply(ApplyNode {
                    input,
                    subquery,
                    ..node
                })
            }
            Self::Join(node) => {
                let left = next()?;
                let right = next()?;
                Self::Join(JoinNode {
                    left,
                    right,
                    ..node
                })
            }
        })
    }

    /// Split this node into its payload shell and its children.
    ///
    /// The shell keeps placeholder children; [`PlanNode::with_children`] puts
    /// the real ones back.
    pub fn take_children(self) -> (PlanNode, Vec<PlanNode>) {
        let placeholder = || Box::new(PlanNode::Values(ValuesNode::empty(Vec::new())));
        match self {
            Self::Values(_) | Self::TableScan(_) => (self, vec![]),
            Self::Project(node) => (
                Self::Project(ProjectNode {
                    source: placeholder(),
                    assignments: node.assignments,
                }),
                vec![*node.source],
            ),
            Self::Filter(node) => (
                Self::Filter(FilterNode {
                    source: placeholder(),
                    predicate: node.predicate,
                }),
                vec![*node.source],
            ),
            Self::Limit(node) => (
                Self::Limit(LimitNode {
                    source: placeholder(),
                    count: node.count,
                }),
                vec![*node.source],
            ),
            Self::Apply(node) => (
                Self::Apply(ApplyNode {
                    input: placeholder(),
                    subquery: placeholder(),
                    correlation: node.correlation,
                    assignments: node.assignments,
                }),
                vec![*node.input, *node.subquery],
            ),
            Self::Join(node) => (
                Self::Join(JoinNode {
                    kind: node.kind,
                    left: placeholder(),
                    right: placeholder(),
                    criteria: node.criteria,
                    filter: node.filter,
                    left_output_symbols: node.left_output_symbols,
                    right_output_symbols: node.right_output_symbols,
                }),
                vec![*node.left, *node.right],
            ),
        }
    }

    /// Symbols read by this node's own payload (not by its children).
    pub fn referenced_symbols(&self) -> SymbolSet {
        match self {
            Self::Values(node) => node.referenced_symbols(),
            Self::TableScan(_) | Self::Limit(_) => SymbolSet::new(),
            Self::Project(node) => node.assignments.referenced_symbols(),
            Self::Filter(node) => node.predicate.symbols(),
            Self::Apply(node) => {
                let mut referenced = node.assignment_symbols();
                referenced.extend(node.correlation.iter().cloned());
                referenced
            }
            Self::Join(node) => node.condition_symbols(),
        }
    }

    /// The symbols this node needs from child `index`, given that its own
    /// consumer needs `required` from it.
    ///
    /// The result is always a subset of the child's outputs. Demand is derived
    /// from the node as it currently is, so narrowing a child to this set never
    /// breaks the node.
    pub fn required_child_symbols(&self, index: usize, required: &SymbolSet) -> SymbolSet {
        let Some(child) = self.children().get(index).copied() else {
            return SymbolSet::new();
        };
        let child_outputs: SymbolSet = child.output_symbols().into_iter().collect();

        let mut demand: SymbolSet = match self {
            Self::Values(_) | Self::TableScan(_) => SymbolSet::new(),
            Self::Project(node) => node.assignments.referenced_symbols(),
            Self::Filter(node) => {
                let mut demand = required.clone();
                node.predicate.collect_symbols(&mut demand);
                demand
            }
            Self::Limit(_) => required.clone(),
            Self::Apply(node) => {
                let mut demand = node.assignment_symbols();
                if index == 0 {
                    demand.extend(required.iter().cloned());
                    demand.extend(node.correlation.iter().cloned());
                }
                demand
            }
            Self::Join(node) => {
                let mut demand = node.condition_symbols();
                let exposed = if index == 0 {
                    &node.left_output_symbols
                } else {
                    &node.right_output_symbols
                };
                demand.extend(exposed.iter().cloned());
                demand
            }
        };

        demand.retain(|symbol| child_outputs.contains(symbol));
        demand
    }

    /// Symbols referenced in this subtree but not produced inside it.
    ///
    /// For a correlated subquery these are the outer symbols it reads.
    pub fn free_symbols(&self) -> SymbolSet {
        let mut produced = SymbolSet::new();
        let mut free = SymbolSet::new();
        for child in self.children() {
            produced.extend(child.output_symbols());
            free.extend(child.free_symbols());
        }

        if let Self::Apply(node) = self {
            // The subquery's correlated references are bound by this node.
            let subquery_free = node.subquery.free_symbols();
            free = node.input.free_symbols();
            free.extend(
                subquery_free
                    .into_iter()
                    .filter(|symbol| !node.correlation.contains(symbol)),
            );
        }

        free.extend(
            self.referenced_symbols()
                .into_iter()
                .filter(|symbol| !produced.contains(symbol)),
        );
        free
    }

    /// Number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    /// Check if this subtree contains a node satisfying `predicate`.
    pub fn contains<F>(&self, predicate: &F) -> bool
    where
        F: Fn(&PlanNode) -> bool,
    {
        predicate(self) || self.children().iter().any(|child| child.contains(predicate))
    }
}
