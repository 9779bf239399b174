//! Name-based plan matching for rule and optimizer tests.
//!
//! Expected plans are written with symbol names rather than symbols, so a
//! test does not need access to the symbol table the plan was built with.
//! Every matcher compiles to a production [`Pattern`].

use common_display::indent;
use sift_core::Symbol;
use sift_logical::{JoinKind, NodeKind, PlanNode};

use crate::pattern::Pattern;

fn names(symbols: &[Symbol]) -> Vec<String> {
    symbols.iter().map(|symbol| symbol.name().to_string()).collect()
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

/// Expected scalar expression, compared by its rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionMatcher(String);

/// Expected Apply set expression, compared by its rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetExpressionMatcher(String);

/// Expected expression, e.g. `expression("a")` or `expression("(b + 1)")`.
pub fn expression(text: &str) -> ExpressionMatcher {
    ExpressionMatcher(text.to_string())
}

/// Expected set expression, e.g. `set_expression("a IN s1")` or `set_expression("EXISTS")`.
pub fn set_expression(text: &str) -> SetExpressionMatcher {
    SetExpressionMatcher(text.to_string())
}

/// An expected plan shape.
#[derive(Debug, Clone)]
pub struct PlanMatchPattern {
    pattern: Pattern,
    description: String,
}

impl PlanMatchPattern {
    fn new(pattern: Pattern, head: String, children: &[&PlanMatchPattern]) -> Self {
        let mut description = head;
        for child in children {
            description.push('\n');
            description.push_str(&indent(&child.description, "    "));
        }
        Self {
            pattern,
            description,
        }
    }

    /// Additionally require the node to produce exactly these symbols, in order.
    #[must_use]
    pub fn with_outputs(self, outputs: &[&str]) -> Self {
        let expected = owned(outputs);
        let description = format!("{} outputs={expected:?}", self.description);
        let pattern = self.pattern.matching(description.clone(), move |node| {
            names(&node.output_symbols()) == expected
        });
        Self {
            pattern,
            description,
        }
    }

    /// Check whether `node` has the expected shape.
    pub fn matches(&self, node: &PlanNode) -> bool {
        self.pattern.matches(node).is_some()
    }

    /// The underlying structural pattern.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}

impl std::fmt::Display for PlanMatchPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// Any node, with any children.
pub fn any() -> PlanMatchPattern {
    PlanMatchPattern::new(Pattern::any(), "any".to_string(), &[])
}

/// A node matching `pattern` anywhere in the subtree, including its root.
pub fn any_tree(pattern: PlanMatchPattern) -> PlanMatchPattern {
    let inner = pattern.pattern.clone();
    PlanMatchPattern::new(
        Pattern::any().matching("any_tree", move |node| {
            node.contains(&|candidate: &PlanNode| inner.matches(candidate).is_some())
        }),
        "any_tree".to_string(),
        &[&pattern],
    )
}

/// A Values node with exactly these columns, in order.
pub fn values(outputs: &[&str]) -> PlanMatchPattern {
    let expected = owned(outputs);
    let head = format!("values({})", expected.join(", "));
    PlanMatchPattern::new(
        Pattern::typed(NodeKind::Values).matching(head.clone(), move |node| {
            names(&node.output_symbols()) == expected
        }),
        head,
        &[],
    )
}

/// A TableScan of `table` with exactly these columns, in order.
pub fn table_scan(table: &str, outputs: &[&str]) -> PlanMatchPattern {
    let expected_table = table.to_string();
    let expected = owned(outputs);
    let head = format!("table_scan({table}: {})", expected.join(", "));
    PlanMatchPattern::new(
        Pattern::typed(NodeKind::TableScan).matching(head.clone(), move |node| {
            matches!(node, PlanNode::TableScan(scan) if scan.table == expected_table)
                && names(&node.output_symbols()) == expected
        }),
        head,
        &[],
    )
}

/// A Project with exactly these assignments, in order.
pub fn project(
    assignments: &[(&str, ExpressionMatcher)],
    source: PlanMatchPattern,
) -> PlanMatchPattern {
    let expected: Vec<(String, String)> = assignments
        .iter()
        .map(|(name, expr)| ((*name).to_string(), expr.0.clone()))
        .collect();
    let rendered: Vec<_> = expected
        .iter()
        .map(|(name, expr)| format!("{name} := {expr}"))
        .collect();
    let head = format!("project({})", rendered.join(", "));

    let pattern = Pattern::typed(NodeKind::Project)
        .matching(head.clone(), move |node| {
            let PlanNode::Project(project) = node else {
                return false;
            };
            let actual: Vec<(String, String)> = project
                .assignments
                .iter()
                .map(|(symbol, expr)| (symbol.name().to_string(), expr.to_string()))
                .collect();
            actual == expected
        })
        .with_child(0, source.pattern.clone());
    PlanMatchPattern::new(pattern, head, &[&source])
}

/// A Filter with the given predicate text.
pub fn filter(predicate: &str, source: PlanMatchPattern) -> PlanMatchPattern {
    let expected = predicate.to_string();
    let head = format!("filter({predicate})");
    let pattern = Pattern::typed(NodeKind::Filter)
        .matching(head.clone(), move |node| {
            matches!(node, PlanNode::Filter(filter) if filter.predicate.to_string() == expected)
        })
        .with_child(0, source.pattern.clone());
    PlanMatchPattern::new(pattern, head, &[&source])
}

/// A Limit of `count` rows.
pub fn limit(count: u64, source: PlanMatchPattern) -> PlanMatchPattern {
    let head = format!("limit({count})");
    let pattern = Pattern::typed(NodeKind::Limit)
        .matching(head.clone(), move |node| {
            matches!(node, PlanNode::Limit(limit) if limit.count == count)
        })
        .with_child(0, source.pattern.clone());
    PlanMatchPattern::new(pattern, head, &[&source])
}

/// An Apply with exactly this correlation and these assignments, in order.
pub fn apply(
    correlation: &[&str],
    assignments: &[(&str, SetExpressionMatcher)],
    input: PlanMatchPattern,
    subquery: PlanMatchPattern,
) -> PlanMatchPattern {
    let expected_correlation = owned(correlation);
    let expected: Vec<(String, String)> = assignments
        .iter()
        .map(|(name, expr)| ((*name).to_string(), expr.0.clone()))
        .collect();
    let rendered: Vec<_> = expected
        .iter()
        .map(|(name, expr)| format!("{name} := {expr}"))
        .collect();
    let head = format!(
        "apply(correlation=[{}], {})",
        expected_correlation.join(", "),
        rendered.join(", ")
    );

    let pattern = Pattern::typed(NodeKind::Apply)
        .matching(head.clone(), move |node| {
            let PlanNode::Apply(apply) = node else {
                return false;
            };
            let actual: Vec<(String, String)> = apply
                .assignments
                .iter()
                .map(|(symbol, expr)| (symbol.name().to_string(), expr.to_string()))
                .collect();
            names(&apply.correlation) == expected_correlation && actual == expected
        })
        .with_child(0, input.pattern.clone())
        .with_child(1, subquery.pattern.clone());
    PlanMatchPattern::new(pattern, head, &[&input, &subquery])
}

/// A Join of the given kind with exactly these equality criteria, in order.
pub fn join(
    kind: JoinKind,
    criteria: &[(&str, &str)],
    left: PlanMatchPattern,
    right: PlanMatchPattern,
) -> PlanMatchPattern {
    let expected: Vec<String> = criteria
        .iter()
        .map(|(left, right)| format!("{left} = {right}"))
        .collect();
    let head = format!("join({kind}, {})", expected.join(", "));

    let pattern = Pattern::typed(NodeKind::Join)
        .matching(head.clone(), move |node| {
            let PlanNode::Join(join) = node else {
                return false;
            };
            let actual: Vec<String> = join.criteria.iter().map(ToString::to_string).collect();
            join.kind == kind && actual == expected
        })
        .with_child(0, left.pattern.clone())
        .with_child(1, right.pattern.clone());
    PlanMatchPattern::new(pattern, head, &[&left, &right])
}

#[cfg(test)]
mod tests {
    use sift_logical::expr::{lit, sym};
    use sift_logical::{PlanBuilder, SetExpression};

    use super::*;

    #[test]
    fn test_match_apply_tree() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let s1 = p.symbol("s1");
        let s2 = p.symbol("s2");
        let r = p.symbol("r");
        let plan = p.apply(
            vec![(r, SetExpression::in_(&a, &s1))],
            vec![],
            p.values(&[&a]),
            p.identity_project(&[&s1], p.values(&[&s1, &s2])),
        );

        let expected = apply(
            &[],
            &[("r", set_expression("a IN s1"))],
            values(&["a"]),
            project(&[("s1", expression("s1"))], values(&["s1", "s2"])),
        );
        assert!(expected.matches(&plan));

        let wrong_subquery = apply(
            &[],
            &[("r", set_expression("a IN s1"))],
            values(&["a"]),
            values(&["s1", "s2"]),
        );
        assert!(!wrong_subquery.matches(&plan));

        assert!(any_tree(values(&["s1", "s2"])).matches(&plan));
        assert!(!any_tree(values(&["s2"])).matches(&plan));
        assert!(any().with_outputs(&["a", "r"]).matches(&plan));
    }

    #[test]
    fn test_match_filter_limit_scan() {
        let mut p = PlanBuilder::new();
        let a = p.symbol("a");
        let plan = p.limit(
            5,
            p.filter(sym(&a).gt(lit(1i64)), p.table_scan("t", &[&a])),
        );

        assert!(limit(5, filter("(a > 1)", table_scan("t", &["a"]))).matches(&plan));
        assert!(!limit(6, any()).matches(&plan));
        assert!(!limit(5, filter("(a > 1)", table_scan("u", &["a"]))).matches(&plan));
    }

    #[test]
    fn test_description() {
        let expected = project(&[("a", expression("a"))], values(&["a", "b"]));
        assert_eq!(expected.to_string(), "project(a := a)\n    values(a, b)");
    }
}
