use std::collections::BTreeSet;

use preheat_core::errors::{ErrorInfo, ModelError};
use serde::{Deserialize, Serialize};

use crate::ast::Expr;

/// Distinct placeholders referenced by one or more expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholders {
    /// Referenced field indices (`f<i>`).
    pub fields: BTreeSet<usize>,
    /// Referenced coefficient slots (`C<i>`).
    pub coefficients: BTreeSet<usize>,
    /// Referenced bare coefficient slots (`D<i>`).
    pub bare: BTreeSet<usize>,
}

impl Placeholders {
    /// Collects the placeholders of a single expression.
    pub fn collect(expr: &Expr) -> Self {
        let mut placeholders = Self::default();
        placeholders.add(expr);
        placeholders
    }

    /// Collects the union of placeholders across several expressions.
    pub fn collect_all<'a, I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = &'a Expr>,
    {
        let mut placeholders = Self::default();
        for expr in exprs {
            placeholders.add(expr);
        }
        placeholders
    }

    fn add(&mut self, expr: &Expr) {
        expr.visit(&mut |node| match node {
            Expr::Field { index } => {
                self.fields.insert(*index);
            }
            Expr::Coeff { index } => {
                self.coefficients.insert(*index);
            }
            Expr::Bare { index } => {
                self.bare.insert(*index);
            }
            _ => {}
        });
    }

    /// Ensures the `C` slots are exactly `C1..C{available}`.
    pub fn check_coefficient_arity(&self, available: usize) -> Result<(), ModelError> {
        check_slots(
            &self.coefficients,
            available,
            "C",
            "coefficient_arity",
            "potential.coefficients",
        )
    }

    /// Ensures the `D` slots are exactly `D1..D{available}`.
    pub fn check_bare_arity(&self, available: usize) -> Result<(), ModelError> {
        check_slots(
            &self.bare,
            available,
            "D",
            "bare_coefficient_arity",
            "potential.bare_coefficients",
        )
    }

    /// Ensures every referenced field exists in a set of `field_count` fields.
    pub fn check_field_arity(&self, field_count: usize) -> Result<(), ModelError> {
        match self.fields.iter().next_back() {
            Some(&max) if max > field_count => Err(ModelError::InconsistentFieldArity(
                ErrorInfo::new("field_placeholder", "expression references a missing field")
                    .with_context("placeholder", format!("f{max}"))
                    .with_context("field_count", field_count.to_string()),
            )),
            _ => Ok(()),
        }
    }
}

fn check_slots(
    used: &BTreeSet<usize>,
    available: usize,
    prefix: &str,
    code: &str,
    field: &str,
) -> Result<(), ModelError> {
    let contiguous = used.iter().next_back().map_or(true, |&max| max == used.len());
    if used.len() == available && contiguous {
        return Ok(());
    }
    let referenced = used
        .iter()
        .map(|index| format!("{prefix}{index}"))
        .collect::<Vec<_>>()
        .join(",");
    let missing = (1..=available.max(used.len()))
        .filter(|index| !used.contains(index))
        .map(|index| format!("{prefix}{index}"))
        .collect::<Vec<_>>()
        .join(",");
    Err(ModelError::CoefficientArityMismatch(
        ErrorInfo::new(
            code,
            format!(
                "{} distinct {prefix} placeholders referenced but {available} values supplied",
                used.len()
            ),
        )
        .with_context("field", field)
        .with_context("referenced", referenced)
        .with_context("missing", missing)
        .with_context("supplied", available.to_string())
        .with_hint(format!("{prefix} slots bind positionally and must run {prefix}1..{prefix}n")),
    ))
}
