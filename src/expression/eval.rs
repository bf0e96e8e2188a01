use crate::expression::ast::{BinaryOp, Expr, Func, UnaryOp, Var};
use crate::expression::error::ExprError;

/// Values the free variables of an expression resolve to.
///
/// `x`/`y` are the element's bounding-box centre and `width`/`height` its size, all divided by
/// the slide size. `param` is the `$` of a formula.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExprEnv {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub param: Option<f64>,
}

impl ExprEnv {
    pub fn with_param(mut self, value: f64) -> Self {
        self.param = Some(value);
        self
    }
}

fn truthy(v: f64) -> bool {
    v != 0.0 && !v.is_nan()
}

fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

pub(crate) fn eval(expr: &Expr, env: &ExprEnv) -> Result<f64, ExprError> {
    Ok(match expr {
        Expr::Num(v) => *v,
        Expr::Var(var) => match var {
            Var::X => env.x,
            Var::Y => env.y,
            Var::Width => env.width,
            Var::Height => env.height,
        },
        Expr::Param => env
            .param
            .ok_or_else(|| ExprError::new(0, "'$' used outside of a formula"))?,
        Expr::Unary { op, expr } => {
            let v = eval(expr, env)?;
            match op {
                UnaryOp::Neg => -v,
                UnaryOp::Not => flag(!truthy(v)),
            }
        }
        Expr::Binary { op, left, right } => {
            let l = eval(left, env)?;
            match op {
                BinaryOp::And => {
                    return Ok(flag(truthy(l) && truthy(eval(right, env)?)));
                }
                BinaryOp::Or => {
                    return Ok(flag(truthy(l) || truthy(eval(right, env)?)));
                }
                _ => {}
            }
            let r = eval(right, env)?;
            match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
                BinaryOp::Mod => l % r,
                BinaryOp::Eq => flag(l == r),
                BinaryOp::Ne => flag(l != r),
                BinaryOp::Lt => flag(l < r),
                BinaryOp::Le => flag(l <= r),
                BinaryOp::Gt => flag(l > r),
                BinaryOp::Ge => flag(l >= r),
                BinaryOp::And | BinaryOp::Or => unreachable!("short-circuited above"),
            }
        }
        Expr::Ternary {
            cond,
            then,
            otherwise,
        } => {
            if truthy(eval(cond, env)?) {
                eval(then, env)?
            } else {
                eval(otherwise, env)?
            }
        }
        Expr::Call { func, args } => {
            let values = args
                .iter()
                .map(|a| eval(a, env))
                .collect::<Result<Vec<_>, _>>()?;
            let a = values.first().copied().unwrap_or(f64::NAN);
            match func {
                Func::Abs => a.abs(),
                Func::Sqrt => a.sqrt(),
                Func::Asin => a.asin(),
                Func::Acos => a.acos(),
                Func::Atan => a.atan(),
                Func::Sin => a.sin(),
                Func::Cos => a.cos(),
                Func::Tan => a.tan(),
                Func::Exp => a.exp(),
                Func::Log => a.ln(),
                Func::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
                Func::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            }
        }
    })
}
