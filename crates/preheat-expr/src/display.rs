use std::fmt::{self, Display};

use crate::ast::Expr;

fn write_literal(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        write!(f, "{value}")
    } else {
        write!(f, "{value:?}")
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

/// Renders the canonical textual form. Parsing the output of a parsed tree
/// yields the same tree.
impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Field { index } => write!(f, "f{index}"),
            Expr::Coeff { index } => write!(f, "C{index}"),
            Expr::Bare { index } => write!(f, "D{index}"),
            Expr::Literal { value } => write_literal(f, *value),
            Expr::Neg { operand } => {
                write!(f, "-")?;
                write_operand(f, operand, operand.precedence() < 3)
            }
            Expr::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                write_operand(f, lhs, lhs.precedence() < prec)?;
                write!(f, "{}", op.symbol())?;
                write_operand(f, rhs, rhs.precedence() <= prec)
            }
            Expr::Pow { base, exponent } => {
                write_operand(f, base, base.precedence() <= 4)?;
                write!(f, "**")?;
                write_operand(f, exponent, exponent.precedence() < 4)
            }
            Expr::Call { function, argument } => write!(f, "{}({argument})", function.name()),
        }
    }
}
