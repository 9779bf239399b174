//! Scalar expression tree.

use serde::{Deserialize, Serialize};
use sift_core::{DataType, Symbol, SymbolSet, Value};

use super::BinaryOp;

/// A scalar expression over symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Reference to a symbol in scope.
    Symbol(Symbol),
    /// Literal value.
    Literal(Value),
    /// Binary operation.
    Binary {
        /// Left operand.
        left: Box<Expr>,
        /// Binary operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Logical negation.
    Not(Box<Expr>),
    /// Null check.
    IsNull(Box<Expr>),
    /// Opaque function call; treated as deterministic.
    Call {
        /// Function name.
        name: String,
        /// Arguments.
        args: Vec<Expr>,
    },
}

/// Create a symbol reference expression.
pub fn sym(symbol: &Symbol) -> Expr {
    Expr::Symbol(symbol.clone())
}

/// Create a literal expression.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

impl Expr {
    /// Create a binary expression.
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a function call expression.
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Call {
            name: name.into(),
            args,
        }
    }

    /// Equality comparison.
    #[must_use]
    pub fn eq(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Eq, other)
    }

    /// Greater than comparison.
    #[must_use]
    pub fn gt(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Gt, other)
    }

    /// Less than comparison.
    #[must_use]
    pub fn lt(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Lt, other)
    }

    /// Logical AND.
    #[must_use]
    pub fn and(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::And, other)
    }

    /// Logical OR.
    #[must_use]
    pub fn or(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Or, other)
    }

    /// Addition.
    #[must_use]
    pub fn add(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Add, other)
    }

    /// Logical NOT.
    #[must_use]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Is null check.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::IsNull(Box::new(self))
    }

    /// The symbol this expression is a bare reference to, if any.
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// All symbols referenced by this expression.
    pub fn symbols(&self) -> SymbolSet {
        let mut symbols = SymbolSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    /// Add every symbol referenced by this expression to `out`.
    pub fn collect_symbols(&self, out: &mut SymbolSet) {
        match self {
            Self::Symbol(symbol) => {
                out.insert(symbol.clone());
            }
            Self::Literal(_) => {}
            Self::Binary { left, right, .. } => {
                left.collect_symbols(out);
                right.collect_symbols(out);
            }
            Self::Not(expr) | Self::IsNull(expr) => expr.collect_symbols(out),
            Self::Call { args, .. } => {
                for arg in args {
                    arg.collect_symbols(out);
                }
            }
        }
    }

    /// Infer the result type, or `None` when operand types do not fit the operator.
    ///
    /// Function calls are opaque and report `Null` (unknown).
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Symbol(symbol) => Some(symbol.data_type().clone()),
            Self::Literal(value) => Some(value.data_type()),
            Self::Binary { left, op, right } => {
                op.result_type(&left.data_type()?, &right.data_type()?)
            }
            Self::Not(expr) => match expr.data_type()? {
                DataType::Bool | DataType::Null => Some(DataType::Bool),
                _ => None,
            },
            Self::IsNull(expr) => expr.data_type().map(|_| DataType::Bool),
            Self::Call { .. } => Some(DataType::Null),
        }
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Symbol(symbol) => write!(f, "{symbol}"),
            Self::Literal(value) => write!(f, "{value}"),
            Self::Binary { left, op, right } => write!(f, "({left} {op} {right})"),
            Self::Not(expr) => write!(f, "NOT {expr}"),
            Self::IsNull(expr) => write!(f, "{expr} IS NULL"),
            Self::Call { name, args } => {
                let args: Vec<_> = args.iter().map(ToString::to_string).collect();
                write!(f, "{}({})", name, args.join(", "))
            }
        }
    }
}
