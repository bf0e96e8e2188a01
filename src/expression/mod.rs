//! Numeric value expressions used by `values`/`from`/`to`/`by` and `formula` attributes.

mod ast;
pub mod error;
mod eval;
mod lexer;
mod parser;

pub use error::ExprError;
pub use eval::ExprEnv;

/// A parsed expression, evaluated against an [`ExprEnv`].
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    ast: ast::Expr,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        Ok(Self {
            source: source.to_owned(),
            ast: parser::parse_expr(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn eval(&self, env: &ExprEnv) -> Result<f64, ExprError> {
        eval::eval(&self.ast, env)
    }
}

/// Parse and evaluate in one step.
pub fn evaluate(source: &str, env: &ExprEnv) -> Result<f64, ExprError> {
    Expression::parse(source)?.eval(env)
}

#[cfg(test)]
#[path = "../../tests/unit/expression/eval.rs"]
mod tests;
