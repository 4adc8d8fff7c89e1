//! Builtin operator alphabet for float scalars.
//!
//! Each `safe_*` operator returns NaN outside its real domain instead of
//! panicking, so a search loop can feed arbitrary candidate expressions
//! through the evaluator and let the completeness flag reject the bad ones.

use super::{BinaryOp, UnaryOp};
use num_traits::Float;

pub(crate) mod op_names {
    pub const ADD: &str = "+";
    pub const SUB: &str = "-";
    pub const MUL: &str = "*";
    pub const DIV: &str = "/";
    pub const POW: &str = "^";
    pub const SAFE_POW: &str = "safe_pow";

    pub const NEG: &str = "neg";
    pub const ABS: &str = "abs";
    pub const SIN: &str = "sin";
    pub const COS: &str = "cos";
    pub const TAN: &str = "tan";
    pub const EXP: &str = "exp";
    pub const TANH: &str = "tanh";
    pub const SQUARE: &str = "square";
    pub const CUBE: &str = "cube";
    pub const SAFE_LOG: &str = "safe_log";
    pub const SAFE_LOG2: &str = "safe_log2";
    pub const SAFE_LOG10: &str = "safe_log10";
    pub const SAFE_LOG1P: &str = "safe_log1p";
    pub const SAFE_SQRT: &str = "safe_sqrt";
    pub const SAFE_ACOSH: &str = "safe_acosh";
}

pub fn add<T: Float>() -> BinaryOp<T> {
    BinaryOp::new(op_names::ADD, |a, b| a + b)
}

pub fn sub<T: Float>() -> BinaryOp<T> {
    BinaryOp::new(op_names::SUB, |a, b| a - b)
}

pub fn mul<T: Float>() -> BinaryOp<T> {
    BinaryOp::new(op_names::MUL, |a, b| a * b)
}

pub fn div<T: Float>() -> BinaryOp<T> {
    BinaryOp::new(op_names::DIV, |a, b| a / b)
}

pub fn pow<T: Float>() -> BinaryOp<T> {
    BinaryOp::new(op_names::POW, |a, b| a.powf(b))
}

/// Exponentiation that stays inside the reals: `powf` already yields NaN for
/// a negative base with a fractional exponent; a zero base with a negative
/// exponent is mapped from infinity to NaN as well.
pub fn safe_pow<T: Float>() -> BinaryOp<T> {
    BinaryOp::new(op_names::SAFE_POW, |a, b| {
        if a == T::zero() && b < T::zero() {
            T::nan()
        } else {
            a.powf(b)
        }
    })
}

pub fn neg<T: Float>() -> UnaryOp<T> {
    UnaryOp::new(op_names::NEG, |x| -x)
}

pub fn abs<T: Float>() -> UnaryOp<T> {
    UnaryOp::new(op_names::ABS, |x| x.abs())
}

pub fn sin<T: Float>() -> UnaryOp<T> {
    UnaryOp::new(op_names::SIN, |x| x.sin())
}

pub fn cos<T: Float>() -> UnaryOp<T> {
    UnaryOp::new(op_names::COS, |x| x.cos())
}

pub fn tan<T: Float>() -> UnaryOp<T> {
    UnaryOp::new(op_names::TAN, |x| x.tan())
}

pub fn exp<T: Float>() -> UnaryOp<T> {
    UnaryOp::new(op_names::EXP, |x| x.exp())
}

pub fn tanh<T: Float>() -> UnaryOp<T> {
    UnaryOp::new(op_names::TANH, |x| x.tanh())
}

pub fn square<T: Float>() -> UnaryOp<T> {
    UnaryOp::new(op_names::SQUARE, |x| x * x)
}

pub fn cube<T: Float>() -> UnaryOp<T> {
    UnaryOp::new(op_names::CUBE, |x| x * x * x)
}

pub fn safe_log<T: Float>() -> UnaryOp<T> {
    UnaryOp::new(op_names::SAFE_LOG, |x| {
        if x > T::zero() { x.ln() } else { T::nan() }
    })
}

pub fn safe_log2<T: Float>() -> UnaryOp<T> {
    UnaryOp::new(op_names::SAFE_LOG2, |x| {
        if x > T::zero() { x.log2() } else { T::nan() }
    })
}

pub fn safe_log10<T: Float>() -> UnaryOp<T> {
    UnaryOp::new(op_names::SAFE_LOG10, |x| {
        if x > T::zero() { x.log10() } else { T::nan() }
    })
}

pub fn safe_log1p<T: Float>() -> UnaryOp<T> {
    UnaryOp::new(op_names::SAFE_LOG1P, |x| {
        if x > -T::one() { x.ln_1p() } else { T::nan() }
    })
}

pub fn safe_sqrt<T: Float>() -> UnaryOp<T> {
    UnaryOp::new(op_names::SAFE_SQRT, |x| {
        if x >= T::zero() { x.sqrt() } else { T::nan() }
    })
}

pub fn safe_acosh<T: Float>() -> UnaryOp<T> {
    UnaryOp::new(op_names::SAFE_ACOSH, |x| {
        if x >= T::one() { x.acosh() } else { T::nan() }
    })
}

/// The full builtin binary alphabet, in registration order.
pub fn binary_ops<T: Float>() -> Vec<BinaryOp<T>> {
    vec![add(), sub(), mul(), div(), pow(), safe_pow()]
}

/// The full builtin unary alphabet, in registration order.
pub fn unary_ops<T: Float>() -> Vec<UnaryOp<T>> {
    vec![
        neg(),
        abs(),
        sin(),
        cos(),
        tan(),
        exp(),
        tanh(),
        square(),
        cube(),
        safe_log(),
        safe_log2(),
        safe_log10(),
        safe_log1p(),
        safe_sqrt(),
        safe_acosh(),
    ]
}
