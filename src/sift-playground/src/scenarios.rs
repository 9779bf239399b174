//! Built-in plans for playground runs.
//!
//! The Apply scenarios cover the subquery pruning cases: one subquery column
//! read, every column read, and none read. The rest show pruning through
//! correlation, joins and filters.

use sift_core::SymbolAllocator;
use sift_logical::expr::{lit, sym};
use sift_logical::{EquiJoinClause, JoinKind, LogicalPlan, PlanBuilder, PlanNode, SetExpression};

/// A named plan that can be built on demand.
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    /// Name used on the command line.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    build: fn(&mut PlanBuilder) -> PlanNode,
}

impl Scenario {
    /// Build the plan with a fresh symbol table.
    pub fn build(&self) -> (LogicalPlan, SymbolAllocator) {
        let mut builder = PlanBuilder::new();
        let root = (self.build)(&mut builder);
        builder.build(root)
    }
}

/// Every built-in scenario.
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "single-reference",
        description: "Apply reads one of two subquery columns",
        build: single_reference,
    },
    Scenario {
        name: "all-referenced",
        description: "Apply reads every subquery column; nothing to prune",
        build: all_referenced,
    },
    Scenario {
        name: "no-reference",
        description: "Apply reads no subquery column; the subquery keeps only its rows",
        build: no_reference,
    },
    Scenario {
        name: "correlated",
        description: "Correlated subquery under a projection of the Apply result",
        build: correlated,
    },
    Scenario {
        name: "join",
        description: "Projection over an inner join of two table scans",
        build: join,
    },
    Scenario {
        name: "filter",
        description: "Projection over a limited, filtered table scan",
        build: filter,
    },
];

/// Look up a scenario by name.
pub fn find_scenario(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|scenario| scenario.name == name)
}

fn single_reference(p: &mut PlanBuilder) -> PlanNode {
    let a = p.symbol("a");
    let s1 = p.symbol("s1");
    let s2 = p.symbol("s2");
    let in_result = p.symbol("in_result");
    p.apply(
        vec![(in_result, SetExpression::in_(&a, &s1))],
        vec![],
        p.values(&[&a]),
        p.values(&[&s1, &s2]),
    )
}

fn all_referenced(p: &mut PlanBuilder) -> PlanNode {
    let a = p.symbol("a");
    let s1 = p.symbol("s1");
    let s2 = p.symbol("s2");
    let in_s1 = p.symbol("in_s1");
    let in_s2 = p.symbol("in_s2");
    p.apply(
        vec![
            (in_s1, SetExpression::in_(&a, &s1)),
            (in_s2, SetExpression::in_(&a, &s2)),
        ],
        vec![],
        p.values(&[&a]),
        p.values(&[&s1, &s2]),
    )
}

fn no_reference(p: &mut PlanBuilder) -> PlanNode {
    let a = p.symbol("a");
    let s = p.symbol("s");
    let in_result = p.symbol("in_result");
    p.apply(
        vec![(in_result, SetExpression::in_(&a, &a))],
        vec![],
        p.values(&[&a]),
        p.values_with_rows(&[&s], vec![vec![lit(1i64)], vec![lit(2i64)]]),
    )
}

fn correlated(p: &mut PlanBuilder) -> PlanNode {
    let a = p.symbol("a");
    let b = p.symbol("b");
    let s1 = p.symbol("s1");
    let s2 = p.symbol("s2");
    let in_result = p.symbol("in_result");
    let apply = p.apply(
        vec![(in_result.clone(), SetExpression::in_(&a, &s1))],
        vec![a.clone(), b.clone()],
        p.values(&[&a, &b]),
        p.filter(sym(&s1).eq(sym(&a)), p.table_scan("orders", &[&s1, &s2])),
    );
    p.identity_project(&[&in_result], apply)
}

fn join(p: &mut PlanBuilder) -> PlanNode {
    let customer_id = p.symbol("customer_id");
    let name = p.symbol("name");
    let order_customer = p.symbol("order_customer");
    let total = p.symbol("total");
    let joined = p.join(
        JoinKind::Inner,
        p.table_scan("customers", &[&customer_id, &name]),
        p.table_scan("orders", &[&order_customer, &total]),
        vec![EquiJoinClause::new(&customer_id, &order_customer)],
        None,
    );
    p.identity_project(&[&name, &total], joined)
}

fn filter(p: &mut PlanBuilder) -> PlanNode {
    let id = p.symbol("id");
    let age = p.symbol("age");
    let city = p.symbol("city");
    p.identity_project(
        &[&id],
        p.limit(
            10,
            p.filter(
                sym(&age).gt(lit(30i64)),
                p.table_scan("people", &[&id, &age, &city]),
            ),
        ),
    )
}

#[cfg(test)]
mod tests {
    use sift_logical::validation::ensure_valid;

    use super::*;

    #[test]
    fn test_scenarios_are_valid() {
        for scenario in SCENARIOS {
            let (plan, symbols) = scenario.build();
            assert!(
                ensure_valid(&plan, Some(&symbols)).is_ok(),
                "scenario {} builds an invalid plan",
                scenario.name
            );
        }
    }

    #[test]
    fn test_find_scenario() {
        assert_eq!(find_scenario("join").map(|s| s.name), Some("join"));
        assert!(find_scenario("unknown").is_none());
    }
}
