use super::{BinaryOp, UnaryOp};
use std::fmt::Debug;

/// The closed operator alphabet a tree is evaluated against.
///
/// An [OperatorSet] holds two ordered sequences of operators, one per arity.
/// Trees reference operators by 1-based index into the matching sequence;
/// the set itself is never carried by the tree, so the same tree may be
/// evaluated against any set whose indices it stays within. The set is
/// immutable once constructed and freely shareable across threads.
///
/// # Example
/// ```
/// use dynexpr::{OperatorSet, ops::math};
///
/// let ops = OperatorSet::new(
///     vec![math::cos()],
///     vec![math::add(), math::sub(), math::mul()],
/// );
///
/// assert_eq!(ops.unary(1).name(), "cos");
/// assert_eq!(ops.binary(3).apply(2.0_f64, 4.0), 8.0);
/// ```
pub struct OperatorSet<T> {
    unary: Vec<UnaryOp<T>>,
    binary: Vec<BinaryOp<T>>,
    differentiable: bool,
}

impl<T> OperatorSet<T> {
    pub fn new(unary: Vec<UnaryOp<T>>, binary: Vec<BinaryOp<T>>) -> Self {
        OperatorSet {
            unary,
            binary,
            differentiable: false,
        }
    }

    /// Record that derivative kernels are co-registered for this alphabet.
    ///
    /// The flag is carried for external derivative collaborators; the
    /// evaluators in this crate do not consult it.
    pub fn with_derivatives(mut self) -> Self {
        self.differentiable = true;
        self
    }

    pub fn differentiable(&self) -> bool {
        self.differentiable
    }

    /// Look up a unary operator by its 1-based index.
    ///
    /// Panics on an index outside the registered range; an index that does
    /// not resolve against the set used for evaluation is a caller bug.
    #[inline]
    pub fn unary(&self, op: usize) -> &UnaryOp<T> {
        assert!(op >= 1, "operator indices are 1-based");
        &self.unary[op - 1]
    }

    /// Look up a binary operator by its 1-based index.
    #[inline]
    pub fn binary(&self, op: usize) -> &BinaryOp<T> {
        assert!(op >= 1, "operator indices are 1-based");
        &self.binary[op - 1]
    }

    #[inline]
    pub fn get_unary(&self, op: usize) -> Option<&UnaryOp<T>> {
        op.checked_sub(1).and_then(|i| self.unary.get(i))
    }

    #[inline]
    pub fn get_binary(&self, op: usize) -> Option<&BinaryOp<T>> {
        op.checked_sub(1).and_then(|i| self.binary.get(i))
    }

    pub fn unary_len(&self) -> usize {
        self.unary.len()
    }

    pub fn binary_len(&self) -> usize {
        self.binary.len()
    }
}

impl<T> Clone for OperatorSet<T> {
    fn clone(&self) -> Self {
        OperatorSet {
            unary: self.unary.clone(),
            binary: self.binary.clone(),
            differentiable: self.differentiable,
        }
    }
}

impl<T> Debug for OperatorSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OperatorSet {{ unary: {:?}, binary: {:?} }}",
            self.unary.iter().map(|op| op.name()).collect::<Vec<_>>(),
            self.binary.iter().map(|op| op.name()).collect::<Vec<_>>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::math;

    #[test]
    fn test_lookup_is_one_based() {
        let ops = OperatorSet::new(
            vec![math::cos::<f64>(), math::sin()],
            vec![math::add(), math::mul()],
        );

        assert_eq!(ops.unary(1).name(), "cos");
        assert_eq!(ops.unary(2).name(), "sin");
        assert_eq!(ops.binary(2).name(), "*");
        assert_eq!(ops.unary_len(), 2);
        assert_eq!(ops.binary_len(), 2);
    }

    #[test]
    fn test_checked_lookup() {
        let ops = OperatorSet::new(vec![math::cos::<f32>()], vec![math::add()]);

        assert!(ops.get_unary(1).is_some());
        assert!(ops.get_unary(0).is_none());
        assert!(ops.get_unary(2).is_none());
        assert!(ops.get_binary(2).is_none());
    }

    #[test]
    #[should_panic]
    fn test_lookup_out_of_range_panics() {
        let ops = OperatorSet::<f32>::new(vec![], vec![math::add()]);
        ops.binary(2);
    }

    #[test]
    fn test_derivative_flag_is_preserved() {
        let ops = OperatorSet::<f64>::new(vec![], vec![math::add()]);
        assert!(!ops.differentiable());

        let ops = ops.with_derivatives();
        assert!(ops.differentiable());
        assert!(ops.clone().differentiable());
    }

    #[test]
    fn test_same_body_in_both_lists() {
        // The same callable may be registered at both arities; the entries
        // are distinct as far as trees are concerned.
        let ops = OperatorSet::new(
            vec![UnaryOp::new("first", |x: f32| x)],
            vec![BinaryOp::new("first", |a: f32, _| a)],
        );

        assert_eq!(ops.unary(1).name(), ops.binary(1).name());
        assert_eq!(ops.unary(1).apply(3.0), 3.0);
        assert_eq!(ops.binary(1).apply(3.0, 9.0), 3.0);
    }
}
