use serde::{Deserialize, Serialize};

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
}

impl BinaryOp {
    /// Returns the operator symbol used in the textual form.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    pub(crate) fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }
}

/// Elementary functions allowed inside potential terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Function {
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
    /// Tangent.
    Tan,
    /// Natural exponential.
    Exp,
    /// Natural logarithm.
    Log,
    /// Square root.
    Sqrt,
    /// Hyperbolic sine.
    Sinh,
    /// Hyperbolic cosine.
    Cosh,
    /// Hyperbolic tangent.
    Tanh,
    /// Absolute value.
    Abs,
}

impl Function {
    const ALL: [Function; 10] = [
        Function::Sin,
        Function::Cos,
        Function::Tan,
        Function::Exp,
        Function::Log,
        Function::Sqrt,
        Function::Sinh,
        Function::Cosh,
        Function::Tanh,
        Function::Abs,
    ];

    /// Returns the name used in the textual form.
    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Exp => "exp",
            Function::Log => "log",
            Function::Sqrt => "sqrt",
            Function::Sinh => "sinh",
            Function::Cosh => "cosh",
            Function::Tanh => "tanh",
            Function::Abs => "abs",
        }
    }

    /// Looks up a function by its textual name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|func| func.name() == name)
    }

    /// Applies the function to a value.
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Tan => x.tan(),
            Function::Exp => x.exp(),
            Function::Log => x.ln(),
            Function::Sqrt => x.sqrt(),
            Function::Sinh => x.sinh(),
            Function::Cosh => x.cosh(),
            Function::Tanh => x.tanh(),
            Function::Abs => x.abs(),
        }
    }
}

/// Tagged expression tree for one potential term.
///
/// Placeholder indices are 1-based as written: `f2` is `Field { index: 2 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Expr {
    /// Field value placeholder `f<i>`.
    Field {
        /// 1-based field index.
        index: usize,
    },
    /// Scaled coefficient slot `C<i>`.
    Coeff {
        /// 1-based coefficient index.
        index: usize,
    },
    /// Bare coefficient slot `D<i>`.
    Bare {
        /// 1-based bare coefficient index.
        index: usize,
    },
    /// Numeric literal.
    Literal {
        /// Literal value.
        value: f64,
    },
    /// Unary negation.
    Neg {
        /// Negated operand.
        operand: Box<Expr>,
    },
    /// Binary arithmetic.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Exponentiation `base**exponent`.
    Pow {
        /// Base.
        base: Box<Expr>,
        /// Exponent.
        exponent: Box<Expr>,
    },
    /// Elementary function application.
    Call {
        /// Applied function.
        function: Function,
        /// Function argument.
        argument: Box<Expr>,
    },
}

impl Expr {
    /// Field placeholder `f<index>`.
    pub fn field(index: usize) -> Self {
        Expr::Field { index }
    }

    /// Coefficient placeholder `C<index>`.
    pub fn coeff(index: usize) -> Self {
        Expr::Coeff { index }
    }

    /// Bare coefficient placeholder `D<index>`.
    pub fn bare(index: usize) -> Self {
        Expr::Bare { index }
    }

    /// Numeric literal.
    pub fn literal(value: f64) -> Self {
        Expr::Literal { value }
    }

    /// Negation of `operand`.
    pub fn neg(operand: Expr) -> Self {
        Expr::Neg {
            operand: Box::new(operand),
        }
    }

    /// Binary operation `lhs op rhs`.
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Product `lhs * rhs`.
    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Mul, lhs, rhs)
    }

    /// Power `base ** exponent`.
    pub fn pow(base: Expr, exponent: Expr) -> Self {
        Expr::Pow {
            base: Box::new(base),
            exponent: Box::new(exponent),
        }
    }

    /// Function application.
    pub fn call(function: Function, argument: Expr) -> Self {
        Expr::Call {
            function,
            argument: Box::new(argument),
        }
    }

    /// Visits this node and all descendants in pre-order.
    pub fn visit<F: FnMut(&Expr)>(&self, f: &mut F) {
        f(self);
        match self {
            Expr::Field { .. } | Expr::Coeff { .. } | Expr::Bare { .. } | Expr::Literal { .. } => {}
            Expr::Neg { operand } => operand.visit(f),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.visit(f);
                rhs.visit(f);
            }
            Expr::Pow { base, exponent } => {
                base.visit(f);
                exponent.visit(f);
            }
            Expr::Call { argument, .. } => argument.visit(f),
        }
    }

    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Neg { .. } => 3,
            Expr::Pow { .. } => 4,
            Expr::Literal { value } if value.is_sign_negative() => 3,
            _ => 5,
        }
    }
}
