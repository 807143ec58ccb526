//! Recursive-descent parser for the cut expression language.
//!
//! The grammar is a small whitelist: arithmetic, comparisons (with chaining,
//! so `a < x < b` means `(a < x) & (x < b)`), element-wise logical
//! combinators and four math functions. Comparisons bind tighter than `&`
//! and `|`, so `0 < cs1 & cs1 < 200` parses the way it reads; this is the
//! opposite of Python's operator table and removes the need for defensive
//! parentheses in cut definitions.
//!
//! Expressions are typed at parse time: column references and arithmetic
//! are numeric, comparisons produce booleans, and `& | ~` only accept
//! booleans. A malformed or ill-typed expression fails at construction,
//! before any dataset is touched.

use std::collections::BTreeSet;

use crate::error::{CutflowError, Result};

use super::token::{Token, tokenize};

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Whitelisted math functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sqrt,
    Exp,
    Log,
    Abs,
}

impl Func {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Func::Sqrt),
            "exp" => Some(Func::Exp),
            "log" => Some(Func::Log),
            "abs" => Some(Func::Abs),
            _ => None,
        }
    }
}

/// A parsed, type-checked expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Column(String),
    Param(String),
    Neg(Box<Expr>),
    Arith {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Compare {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Call {
        func: Func,
        arg: Box<Expr>,
    },
}

/// The static type of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Numeric,
    Boolean,
}

impl Expr {
    /// The type of this expression. Well-typedness is enforced at parse
    /// time, so this never fails.
    pub fn kind(&self) -> Kind {
        match self {
            Expr::Number(_) | Expr::Column(_) | Expr::Param(_) => Kind::Numeric,
            Expr::Neg(_) | Expr::Arith { .. } | Expr::Call { .. } => Kind::Numeric,
            Expr::Compare { .. } | Expr::Not(_) | Expr::And(..) | Expr::Or(..) => Kind::Boolean,
        }
    }

    /// Collect every column name the expression references.
    pub fn columns(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.walk(&mut |e| {
            if let Expr::Column(name) = e {
                out.insert(name.clone());
            }
        });
        out
    }

    /// Collect every `@` parameter symbol the expression references.
    pub fn params(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.walk(&mut |e| {
            if let Expr::Param(name) = e {
                out.insert(name.clone());
            }
        });
        out
    }

    fn walk(&self, visit: &mut impl FnMut(&Expr)) {
        visit(self);
        match self {
            Expr::Number(_) | Expr::Column(_) | Expr::Param(_) => {}
            Expr::Neg(e) | Expr::Not(e) | Expr::Call { arg: e, .. } => e.walk(visit),
            Expr::Arith { left, right, .. } | Expr::Compare { left, right, .. } => {
                left.walk(visit);
                right.walk(visit);
            }
            Expr::And(l, r) | Expr::Or(l, r) => {
                l.walk(visit);
                r.walk(visit);
            }
        }
    }
}

/// Parse an expression of either kind.
pub fn parse(source: &str) -> Result<Expr> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
    };
    let expr = parser.or_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(parser.invalid("trailing tokens after expression"));
    }
    Ok(expr)
}

/// Parse an expression that must be boolean, e.g. a cut predicate.
pub fn parse_predicate(source: &str) -> Result<Expr> {
    let expr = parse(source)?;
    if expr.kind() != Kind::Boolean {
        return Err(CutflowError::InvalidExpression {
            expression: source.to_string(),
            message: "expression is numeric; a cut predicate must be boolean".to_string(),
        });
    }
    Ok(expr)
}

/// Parse an expression that must be numeric, e.g. a derived column recipe.
pub fn parse_numeric(source: &str) -> Result<Expr> {
    let expr = parse(source)?;
    if expr.kind() != Kind::Numeric {
        return Err(CutflowError::InvalidExpression {
            expression: source.to_string(),
            message: "expression is boolean; a derived column must be numeric".to_string(),
        });
    }
    Ok(expr)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn invalid(&self, message: impl Into<String>) -> CutflowError {
        CutflowError::InvalidExpression {
            expression: self.source.to_string(),
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<()> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.invalid(format!("expected {what}")))
        }
    }

    fn require_boolean(&self, expr: &Expr, op: &str) -> Result<()> {
        if expr.kind() != Kind::Boolean {
            return Err(self.invalid(format!("'{op}' requires boolean operands")));
        }
        Ok(())
    }

    fn require_numeric(&self, expr: &Expr, op: &str) -> Result<()> {
        if expr.kind() != Kind::Numeric {
            return Err(self.invalid(format!("'{op}' requires numeric operands")));
        }
        Ok(())
    }

    fn or_expr(&mut self) -> Result<Expr> {
        let mut left = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.and_expr()?;
            self.require_boolean(&left, "|")?;
            self.require_boolean(&right, "|")?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut left = self.not_expr()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.not_expr()?;
            self.require_boolean(&left, "&")?;
            self.require_boolean(&right, "&")?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            let inner = self.not_expr()?;
            self.require_boolean(&inner, "~")?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison()
    }

    /// Comparisons chain: `a < x < b` is the conjunction of the pairwise
    /// comparisons, with the shared operand duplicated. Duplication is
    /// harmless since evaluation is pure.
    fn comparison(&mut self) -> Result<Expr> {
        let first = self.additive()?;
        let Some(op) = self.peek_cmp_op() else {
            return Ok(first);
        };
        self.require_numeric(&first, cmp_symbol(op))?;

        let mut terms = vec![first];
        let mut ops = Vec::new();
        while let Some(op) = self.peek_cmp_op() {
            self.pos += 1;
            let term = self.additive()?;
            self.require_numeric(&term, cmp_symbol(op))?;
            ops.push(op);
            terms.push(term);
        }

        let mut result = Expr::Compare {
            op: ops[0],
            left: Box::new(terms[0].clone()),
            right: Box::new(terms[1].clone()),
        };
        for (idx, op) in ops.iter().enumerate().skip(1) {
            let pair = Expr::Compare {
                op: *op,
                left: Box::new(terms[idx].clone()),
                right: Box::new(terms[idx + 1].clone()),
            };
            result = Expr::And(Box::new(result), Box::new(pair));
        }
        Ok(result)
    }

    fn peek_cmp_op(&self) -> Option<CmpOp> {
        match self.peek() {
            Some(Token::Lt) => Some(CmpOp::Lt),
            Some(Token::Le) => Some(CmpOp::Le),
            Some(Token::Gt) => Some(CmpOp::Gt),
            Some(Token::Ge) => Some(CmpOp::Ge),
            Some(Token::EqEq) => Some(CmpOp::Eq),
            Some(Token::Ne) => Some(CmpOp::Ne),
            _ => None,
        }
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithOp::Add,
                Some(Token::Minus) => ArithOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.multiplicative()?;
            self.require_numeric(&left, arith_symbol(op))?;
            self.require_numeric(&right, arith_symbol(op))?;
            left = Expr::Arith {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => ArithOp::Mul,
                Some(Token::Slash) => ArithOp::Div,
                _ => break,
            };
            self.pos += 1;
            let right = self.unary()?;
            self.require_numeric(&left, arith_symbol(op))?;
            self.require_numeric(&right, arith_symbol(op))?;
            left = Expr::Arith {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.peek() == Some(&Token::Minus) {
            self.pos += 1;
            let inner = self.unary()?;
            self.require_numeric(&inner, "-")?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.power()
    }

    /// `**` is right-associative and binds tighter than unary minus on its
    /// left: `-x**2` is `-(x**2)`, `x**-2` is allowed.
    fn power(&mut self) -> Result<Expr> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::Power) {
            self.pos += 1;
            let exponent = self.unary()?;
            self.require_numeric(&base, "**")?;
            self.require_numeric(&exponent, "**")?;
            return Ok(Expr::Arith {
                op: ArithOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Param(name)) => Ok(Expr::Param(name)),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    let Some(func) = Func::from_name(&name) else {
                        return Err(self.invalid(format!("unknown function '{name}'")));
                    };
                    self.pos += 1;
                    let arg = self.or_expr()?;
                    self.require_numeric(&arg, &name)?;
                    self.expect(Token::RParen, "')' after function argument")?;
                    return Ok(Expr::Call {
                        func,
                        arg: Box::new(arg),
                    });
                }
                Ok(Expr::Column(name))
            }
            Some(Token::LParen) => {
                let inner = self.or_expr()?;
                self.expect(Token::RParen, "closing ')'")?;
                Ok(inner)
            }
            _ => Err(self.invalid("expected a value")),
        }
    }
}

fn cmp_symbol(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Lt => "<",
        CmpOp::Le => "<=",
        CmpOp::Gt => ">",
        CmpOp::Ge => ">=",
        CmpOp::Eq => "==",
        CmpOp::Ne => "!=",
    }
}

fn arith_symbol(op: ArithOp) -> &'static str {
    match op {
        ArithOp::Add => "+",
        ArithOp::Sub => "-",
        ArithOp::Mul => "*",
        ArithOp::Div => "/",
        ArithOp::Pow => "**",
    }
}
