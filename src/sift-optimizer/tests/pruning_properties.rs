//! Property tests: pruning over randomly layered plans.

use proptest::prelude::*;
use sift_core::{Symbol, SymbolAllocator, SymbolSet};
use sift_logical::expr::{lit, sym};
use sift_logical::validation::ensure_valid;
use sift_logical::{Assignments, LogicalPlan, PlanBuilder, PlanNode, SetExpression};
use sift_optimizer::optimize;

#[ctor::ctor]
fn init() {
    let _ = env_logger::try_init();
}

/// One operator stacked on top of the plan built so far.
#[derive(Debug, Clone)]
enum Layer {
    /// Filter on the n-th current column.
    Filter(usize),
    Limit(u64),
    /// Keep the columns whose bit is set; bit 7 adds a computed column.
    Project(u8),
    /// Apply over a fresh Values subquery of `width` columns.
    Apply {
        width: usize,
        references: Vec<usize>,
        correlated: bool,
    },
}

fn layer() -> impl Strategy<Value = Layer> {
    prop_oneof![
        any::<usize>().prop_map(Layer::Filter),
        (1u64..100).prop_map(Layer::Limit),
        any::<u8>().prop_map(Layer::Project),
        (
            1usize..4,
            proptest::collection::vec(any::<usize>(), 0..4),
            any::<bool>()
        )
            .prop_map(|(width, references, correlated)| Layer::Apply {
                width,
                references,
                correlated,
            }),
    ]
}

/// Allocates uniquely named symbols while building.
struct Generator {
    builder: PlanBuilder,
    next: usize,
}

impl Generator {
    fn fresh(&mut self) -> Symbol {
        let symbol = self.builder.symbol(&format!("c{}", self.next));
        self.next += 1;
        symbol
    }

    fn values(&mut self, width: usize) -> PlanNode {
        let columns: Vec<Symbol> = (0..width).map(|_| self.fresh()).collect();
        let row = (0..width).map(|i| lit(i as i64)).collect();
        let refs: Vec<&Symbol> = columns.iter().collect();
        self.builder.values_with_rows(&refs, vec![row])
    }

    fn stack(&mut self, node: PlanNode, layer: &Layer) -> PlanNode {
        let outputs = node.output_symbols();
        match layer {
            Layer::Filter(column) => {
                if outputs.is_empty() {
                    return node;
                }
                let column = &outputs[column % outputs.len()];
                self.builder.filter(sym(column).gt(lit(0i64)), node)
            }
            Layer::Limit(count) => self.builder.limit(*count, node),
            Layer::Project(mask) => {
                let mask = *mask;
                let kept: Vec<&Symbol> = outputs
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| (mask >> (i % 7)) & 1 == 1)
                    .map(|(_, symbol)| symbol)
                    .collect();
                let mut assignments = Assignments::identity(kept);
                if mask & 0x80 != 0 && !outputs.is_empty() {
                    let computed = self.fresh();
                    assignments = assignments
                        .with(computed, sym(&outputs[0]).add(lit(1i64)))
                        .unwrap();
                }
                self.builder.project(assignments, node)
            }
            Layer::Apply {
                width,
                references,
                correlated,
            } => {
                let mut subquery = self.values(*width);
                let subquery_outputs = subquery.output_symbols();

                let mut correlation = Vec::new();
                if *correlated && !outputs.is_empty() {
                    subquery = self
                        .builder
                        .filter(sym(&subquery_outputs[0]).eq(sym(&outputs[0])), subquery);
                    correlation.push(outputs[0].clone());
                }

                let assignments = references
                    .iter()
                    .map(|reference| {
                        let output = self.fresh();
                        let expression = if outputs.is_empty() {
                            SetExpression::Exists
                        } else {
                            let value = &outputs[reference % outputs.len()];
                            // One extra slot compares the input against itself
                            match subquery_outputs.get(reference % (width + 1)) {
                                Some(column) => SetExpression::in_(value, column),
                                None => SetExpression::in_(value, value),
                            }
                        };
                        (output, expression)
                    })
                    .collect();
                self.builder.apply(assignments, correlation, node, subquery)
            }
        }
    }
}

fn build(width: usize, layers: &[Layer]) -> (LogicalPlan, SymbolAllocator) {
    let mut generator = Generator {
        builder: PlanBuilder::new(),
        next: 0,
    };
    let mut node = generator.values(width);
    for layer in layers {
        node = generator.stack(node, layer);
    }
    generator.builder.build(node)
}

fn values_width(node: &PlanNode) -> usize {
    let own = match node {
        PlanNode::Values(values) => values.output_symbols.len(),
        _ => 0,
    };
    own + node.children().into_iter().map(values_width).sum::<usize>()
}

fn unpruned_apply(node: &PlanNode) -> bool {
    let PlanNode::Apply(apply) = node else {
        return false;
    };
    let outputs: SymbolSet = apply.subquery.output_symbols().into_iter().collect();
    outputs != apply.referenced_subquery_symbols()
}

fn plans() -> impl Strategy<Value = (usize, Vec<Layer>)> {
    (1usize..5, proptest::collection::vec(layer(), 0..6))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn optimized_plan_keeps_root_outputs((width, layers) in plans()) {
        let (plan, mut symbols) = build(width, &layers);
        let expected = plan.output_symbols();

        let result = optimize(plan, &mut symbols).unwrap();
        prop_assert_eq!(result.plan.output_symbols(), expected);
        prop_assert!(ensure_valid(&result.plan, Some(&symbols)).is_ok(), "{}", result.plan.explain());
    }

    #[test]
    fn optimizing_twice_changes_nothing((width, layers) in plans()) {
        let (plan, mut symbols) = build(width, &layers);

        let first = optimize(plan, &mut symbols).unwrap();
        let second = optimize(first.plan.clone(), &mut symbols).unwrap();
        prop_assert_eq!(second.rules_applied, 0);
        prop_assert_eq!(second.plan, first.plan);
    }

    #[test]
    fn apply_subqueries_produce_exactly_what_assignments_read((width, layers) in plans()) {
        let (plan, mut symbols) = build(width, &layers);

        let result = optimize(plan, &mut symbols).unwrap();
        prop_assert!(!result.plan.contains_node(unpruned_apply), "{}", result.plan.explain());
    }

    #[test]
    fn pruning_never_widens_values((width, layers) in plans()) {
        let (plan, mut symbols) = build(width, &layers);
        let before = values_width(plan.root());

        let result = optimize(plan, &mut symbols).unwrap();
        prop_assert!(values_width(result.plan.root()) <= before);
    }
}
