//! Structural patterns over plan nodes.
//!
//! A [`Pattern`] describes the shape of a plan fragment: a node kind, extra
//! predicates on the node, and patterns for some of its children. Matching is
//! pure: it never allocates symbols and never mutates the plan. Sub-patterns
//! can be named with [`Pattern::capture_as`] so a rule can pick the matched
//! nodes out of the returned [`Captures`].

use std::collections::BTreeMap;
use std::sync::Arc;

use sift_logical::{NodeKind, PlanNode};

/// A named predicate on a single plan node.
pub type NodePredicate = Arc<dyn Fn(&PlanNode) -> bool + Send + Sync>;

/// Pattern over plan nodes.
#[derive(Clone)]
pub enum Pattern {
    /// Matches any node.
    Any,
    /// Matches a node of the given kind (any kind when `None`) satisfying every
    /// predicate, whose children match the given child patterns.
    Node {
        /// Required node kind.
        kind: Option<NodeKind>,
        /// Labelled predicates, all of which must hold.
        predicates: Vec<(String, NodePredicate)>,
        /// Patterns for children by position.
        children: Vec<(usize, Pattern)>,
    },
    /// Matches like `pattern` and records the matched node under `name`.
    Capture {
        /// Capture name.
        name: &'static str,
        /// Inner pattern.
        pattern: Box<Pattern>,
    },
}

impl Pattern {
    /// Pattern matching any node.
    pub const fn any() -> Self {
        Self::Any
    }

    /// Pattern matching nodes of one kind.
    pub fn typed(kind: NodeKind) -> Self {
        Self::Node {
            kind: Some(kind),
            predicates: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a predicate the matched node must satisfy.
    #[must_use]
    pub fn matching<F>(self, label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&PlanNode) -> bool + Send + Sync + 'static,
    {
        self.push_predicate(label.into(), Arc::new(predicate))
    }

    fn push_predicate(self, label: String, predicate: NodePredicate) -> Self {
        match self {
            Self::Any => Self::Node {
                kind: None,
                predicates: vec![(label, predicate)],
                children: Vec::new(),
            },
            Self::Node {
                kind,
                mut predicates,
                children,
            } => {
                predicates.push((label, predicate));
                Self::Node {
                    kind,
                    predicates,
                    children,
                }
            }
            // Predicates apply to the captured node itself.
            Self::Capture { name, pattern } => Self::Capture {
                name,
                pattern: Box::new(pattern.push_predicate(label, predicate)),
            },
        }
    }

    /// Require child `index` to match `pattern`.
    #[must_use]
    pub fn with_child(self, index: usize, pattern: Pattern) -> Self {
        match self {
            Self::Any => Self::Node {
                kind: None,
                predicates: Vec::new(),
                children: vec![(index, pattern)],
            },
            Self::Node {
                kind,
                predicates,
                mut children,
            } => {
                children.push((index, pattern));
                Self::Node {
                    kind,
                    predicates,
                    children,
                }
            }
            Self::Capture { name, pattern: inner } => Self::Capture {
                name,
                pattern: Box::new(inner.with_child(index, pattern)),
            },
        }
    }

    /// Record the node matched by this pattern under `name`.
    #[must_use]
    pub fn capture_as(self, name: &'static str) -> Self {
        Self::Capture {
            name,
            pattern: Box::new(self),
        }
    }

    /// The node kind this pattern requires at its root, if any.
    pub fn root_kind(&self) -> Option<NodeKind> {
        match self {
            Self::Any => None,
            Self::Node { kind, .. } => *kind,
            Self::Capture { pattern, .. } => pattern.root_kind(),
        }
    }

    /// Match `node` against this pattern.
    ///
    /// Returns the captured nodes on success.
    pub fn matches<'a>(&self, node: &'a PlanNode) -> Option<Captures<'a>> {
        let mut captures = Captures::default();
        self.match_into(node, &mut captures).then_some(captures)
    }

    fn match_into<'a>(&self, node: &'a PlanNode, captures: &mut Captures<'a>) -> bool {
        match self {
            Self::Any => true,
            Self::Node {
                kind,
                predicates,
                children,
            } => {
                if kind.is_some_and(|kind| kind != node.kind()) {
                    return false;
                }
                if !predicates.iter().all(|(_, predicate)| predicate(node)) {
                    return false;
                }
                let node_children = node.children();
                children.iter().all(|(index, pattern)| {
                    node_children
                        .get(*index)
                        .copied()
                        .is_some_and(|child| pattern.match_into(child, captures))
                })
            }
            Self::Capture { name, pattern } => {
                if !pattern.match_into(node, captures) {
                    return false;
                }
                captures.nodes.insert(*name, node);
                true
            }
        }
    }
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Node {
                kind,
                predicates,
                children,
            } => {
                match kind {
                    Some(kind) => write!(f, "{kind}")?,
                    None => write!(f, "node")?,
                }
                for (label, _) in predicates {
                    write!(f, ".matching({label})")?;
                }
                for (index, child) in children {
                    write!(f, ".with_child({index}, {child:?})")?;
                }
                Ok(())
            }
            Self::Capture { name, pattern } => write!(f, "{pattern:?}.capture_as({name})"),
        }
    }
}

/// Nodes recorded by named sub-patterns during a successful match.
#[derive(Debug, Default)]
pub struct Captures<'a> {
    nodes: BTreeMap<&'static str, &'a PlanNode>,
}

impl<'a> Captures<'a> {
    /// The node captured under `name`.
    pub fn get(&self, name: &str) -> Option<&'a PlanNode> {
        self.nodes.get(name).copied()
    }

    /// Number of captured nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
