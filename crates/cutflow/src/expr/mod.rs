//! The cut expression language: a whitelisted grammar of arithmetic,
//! comparisons, element-wise logical combinators and four math functions,
//! compiled to an AST at construction and evaluated column-at-a-time.

mod eval;
mod parser;
mod token;

pub use eval::{evaluate_numeric, evaluate_predicate};
pub use parser::{ArithOp, CmpOp, Expr, Func, Kind, parse, parse_numeric, parse_predicate};
