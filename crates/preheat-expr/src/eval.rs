use preheat_core::errors::{ErrorInfo, ModelError};

use crate::ast::{BinaryOp, Expr};

/// Numeric values bound to the placeholders of an expression.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bindings<'a> {
    /// Field values, `fields[0]` binds `f1`.
    pub fields: &'a [f64],
    /// Coefficient values, `coefficients[0]` binds `C1`.
    pub coefficients: &'a [f64],
    /// Bare coefficient values, `bare[0]` binds `D1`.
    pub bare: &'a [f64],
}

fn lookup(values: &[f64], index: usize, prefix: &str) -> Result<f64, ModelError> {
    index
        .checked_sub(1)
        .and_then(|slot| values.get(slot))
        .copied()
        .ok_or_else(|| {
            ModelError::InvalidExpression(
                ErrorInfo::new("expr_unbound", "placeholder has no bound value")
                    .with_context("placeholder", format!("{prefix}{index}"))
                    .with_context("bound", values.len().to_string()),
            )
        })
}

impl Expr {
    /// Evaluates the expression against the given bindings.
    pub fn eval(&self, bindings: &Bindings<'_>) -> Result<f64, ModelError> {
        Ok(match self {
            Expr::Field { index } => lookup(bindings.fields, *index, "f")?,
            Expr::Coeff { index } => lookup(bindings.coefficients, *index, "C")?,
            Expr::Bare { index } => lookup(bindings.bare, *index, "D")?,
            Expr::Literal { value } => *value,
            Expr::Neg { operand } => -operand.eval(bindings)?,
            Expr::Binary { op, lhs, rhs } => {
                let lhs = lhs.eval(bindings)?;
                let rhs = rhs.eval(bindings)?;
                match op {
                    BinaryOp::Add => lhs + rhs,
                    BinaryOp::Sub => lhs - rhs,
                    BinaryOp::Mul => lhs * rhs,
                    BinaryOp::Div => lhs / rhs,
                }
            }
            Expr::Pow { base, exponent } => {
                let base = base.eval(bindings)?;
                let exponent = exponent.eval(bindings)?;
                if exponent.fract() == 0.0 && exponent.abs() <= f64::from(i32::MAX) {
                    base.powi(exponent as i32)
                } else {
                    base.powf(exponent)
                }
            }
            Expr::Call { function, argument } => function.apply(argument.eval(bindings)?),
        })
    }
}
