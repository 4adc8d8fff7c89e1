//! Batched evaluation for float scalars.
//!
//! Evaluation is a post-order recursion, specialized three ways to keep the
//! per-sample cost close to a hand-written kernel:
//!
//! - a subtree with no variable leaf is folded to one scalar and broadcast;
//! - the recursion dispatches on the tree's shape near its root, fusing the
//!   common small patterns (unary-of-unary, unary-of-binary, binary over
//!   leaves, binary with one leaf side) into single loops that read leaf
//!   constants and feature rows directly instead of materializing them;
//! - non-finite intermediates never branch out of a loop: the offending
//!   element is replaced with `+Inf` and a single scan of the finished
//!   output decides the completeness flag. Fused kernels that pre-read a
//!   leaf constant bail out before the loop instead.
//!
//! Every fused path computes exactly what the plain recursion would; the
//! specialization is observable only through speed.

use super::Dataset;
use crate::ops::{OperatorSet, UnaryOp};
use crate::tree::Node;
use num_traits::Float;

/// Evaluate `tree` over every sample column of `data`.
///
/// Returns the length-`n` output vector and the completeness flag. A
/// `false` flag means some intermediate or output value was NaN or
/// infinite; the output contents are then not to be relied upon.
///
/// # Example
/// ```
/// use dynexpr::{Dataset, Node, OperatorSet, eval_tree, ops::math};
///
/// let ops = OperatorSet::new(vec![math::cos()], vec![math::sub()]);
/// let tree = Node::unary(1, Node::binary(1, Node::variable(1), Node::constant(3.2_f64)));
/// let data = Dataset::from_rows(vec![vec![3.2, 0.0]]).unwrap();
///
/// let (values, complete) = eval_tree(&tree, &data, &ops);
/// assert!(complete);
/// assert_eq!(values[0], 1.0);
/// ```
pub fn eval_tree<T: Float>(
    tree: &Node<T>,
    data: &Dataset<T>,
    ops: &OperatorSet<T>,
) -> (Vec<T>, bool) {
    let n = data.n_samples();

    if !tree.has_variables() {
        let (value, ok) = eval_constant(tree, ops);
        if !ok {
            return incomplete(n);
        }
        return (vec![value; n], true);
    }

    let (out, ok) = eval_at(tree, data, ops);
    if !ok {
        return (out, false);
    }

    let complete = out.iter().all(|value| value.is_finite());
    (out, complete)
}

/// Fold a variable-free subtree to a single scalar.
///
/// Any non-finite intermediate stops the recursion with a `false` flag; a
/// variable leaf (a caller error for this path) does the same.
pub fn eval_constant<T: Float>(tree: &Node<T>, ops: &OperatorSet<T>) -> (T, bool) {
    match tree {
        Node::Constant(value) => (*value, value.is_finite()),
        Node::Variable(_) => (T::nan(), false),
        Node::Unary { op, child } => {
            let (inner, ok) = eval_constant(child, ops);
            if !ok {
                return (inner, false);
            }
            let value = ops.unary(*op as usize).apply(inner);
            (value, value.is_finite())
        }
        Node::Binary { op, left, right } => {
            let (a, ok) = eval_constant(left, ops);
            if !ok {
                return (a, false);
            }
            let (b, ok) = eval_constant(right, ops);
            if !ok {
                return (b, false);
            }
            let value = ops.binary(*op as usize).apply(a, b);
            (value, value.is_finite())
        }
    }
}

fn incomplete<T: Float>(n: usize) -> (Vec<T>, bool) {
    (vec![T::nan(); n], false)
}

#[inline]
fn finite_or_inf<T: Float>(value: T) -> T {
    if value.is_finite() { value } else { T::infinity() }
}

fn eval_at<T: Float>(node: &Node<T>, data: &Dataset<T>, ops: &OperatorSet<T>) -> (Vec<T>, bool) {
    match node {
        Node::Constant(value) => (vec![*value; data.n_samples()], true),
        Node::Variable(feature) => (data.feature(*feature as usize).to_vec(), true),
        Node::Unary { op, child } => eval_unary(*op, child, data, ops),
        Node::Binary { op, left, right } => eval_binary(*op, left, right, data, ops),
    }
}

fn eval_unary<T: Float>(
    op: u16,
    child: &Node<T>,
    data: &Dataset<T>,
    ops: &OperatorSet<T>,
) -> (Vec<T>, bool) {
    let n = data.n_samples();
    let outer = ops.unary(op as usize);

    match child {
        // g(f(c)) and g(f(x_k)): fuse through the inner unary
        Node::Unary {
            op: inner_op,
            child: grand,
        } => {
            let inner = ops.unary(*inner_op as usize);
            match grand.as_ref() {
                Node::Constant(c) => {
                    if !c.is_finite() {
                        return incomplete(n);
                    }
                    let value = outer.apply(inner.apply(*c));
                    if !value.is_finite() {
                        return incomplete(n);
                    }
                    (vec![value; n], true)
                }
                Node::Variable(feature) => {
                    let row = data.feature(*feature as usize);
                    let out = row
                        .iter()
                        .map(|&x| finite_or_inf(outer.apply(inner.apply(x))))
                        .collect();
                    (out, true)
                }
                _ => apply_unary_over(outer, child, data, ops),
            }
        }
        // g(h(a, b)) with leaf grandchildren: fuse through the inner binary
        Node::Binary {
            op: inner_op,
            left,
            right,
        } => {
            let inner = ops.binary(*inner_op as usize);
            match (left.as_ref(), right.as_ref()) {
                (Node::Constant(a), Node::Constant(b)) => {
                    if !a.is_finite() || !b.is_finite() {
                        return incomplete(n);
                    }
                    let value = outer.apply(inner.apply(*a, *b));
                    if !value.is_finite() {
                        return incomplete(n);
                    }
                    (vec![value; n], true)
                }
                (Node::Constant(a), Node::Variable(fb)) => {
                    if !a.is_finite() {
                        return incomplete(n);
                    }
                    let row = data.feature(*fb as usize);
                    let out = row
                        .iter()
                        .map(|&b| finite_or_inf(outer.apply(inner.apply(*a, b))))
                        .collect();
                    (out, true)
                }
                (Node::Variable(fa), Node::Constant(b)) => {
                    if !b.is_finite() {
                        return incomplete(n);
                    }
                    let row = data.feature(*fa as usize);
                    let out = row
                        .iter()
                        .map(|&a| finite_or_inf(outer.apply(inner.apply(a, *b))))
                        .collect();
                    (out, true)
                }
                (Node::Variable(fa), Node::Variable(fb)) => {
                    let left_row = data.feature(*fa as usize);
                    let right_row = data.feature(*fb as usize);
                    let out = left_row
                        .iter()
                        .zip(right_row)
                        .map(|(&a, &b)| finite_or_inf(outer.apply(inner.apply(a, b))))
                        .collect();
                    (out, true)
                }
                _ => apply_unary_over(outer, child, data, ops),
            }
        }
        _ => apply_unary_over(outer, child, data, ops),
    }
}

/// The unspecialized degree-1 path: evaluate the child into a buffer, then
/// apply the operator in place.
fn apply_unary_over<T: Float>(
    outer: &UnaryOp<T>,
    child: &Node<T>,
    data: &Dataset<T>,
    ops: &OperatorSet<T>,
) -> (Vec<T>, bool) {
    let (mut buf, ok) = eval_at(child, data, ops);
    if !ok {
        return (buf, false);
    }

    for value in buf.iter_mut() {
        *value = finite_or_inf(outer.apply(*value));
    }

    (buf, true)
}

fn eval_binary<T: Float>(
    op: u16,
    left: &Node<T>,
    right: &Node<T>,
    data: &Dataset<T>,
    ops: &OperatorSet<T>,
) -> (Vec<T>, bool) {
    let n = data.n_samples();
    let f = ops.binary(op as usize);

    match (left, right) {
        (Node::Constant(a), Node::Constant(b)) => {
            if !a.is_finite() || !b.is_finite() {
                return incomplete(n);
            }
            let value = f.apply(*a, *b);
            if !value.is_finite() {
                return incomplete(n);
            }
            (vec![value; n], true)
        }
        (Node::Constant(a), Node::Variable(fb)) => {
            if !a.is_finite() {
                return incomplete(n);
            }
            let row = data.feature(*fb as usize);
            let out = row.iter().map(|&b| finite_or_inf(f.apply(*a, b))).collect();
            (out, true)
        }
        (Node::Variable(fa), Node::Constant(b)) => {
            if !b.is_finite() {
                return incomplete(n);
            }
            let row = data.feature(*fa as usize);
            let out = row.iter().map(|&a| finite_or_inf(f.apply(a, *b))).collect();
            (out, true)
        }
        (Node::Variable(fa), Node::Variable(fb)) => {
            let left_row = data.feature(*fa as usize);
            let right_row = data.feature(*fb as usize);
            let out = left_row
                .iter()
                .zip(right_row)
                .map(|(&a, &b)| finite_or_inf(f.apply(a, b)))
                .collect();
            (out, true)
        }
        // one computed side: reuse its buffer, read the leaf directly
        (Node::Constant(a), computed) => {
            if !a.is_finite() {
                return incomplete(n);
            }
            let (mut buf, ok) = eval_at(computed, data, ops);
            if !ok {
                return (buf, false);
            }
            for value in buf.iter_mut() {
                *value = finite_or_inf(f.apply(*a, *value));
            }
            (buf, true)
        }
        (Node::Variable(fa), computed) => {
            let (mut buf, ok) = eval_at(computed, data, ops);
            if !ok {
                return (buf, false);
            }
            let row = data.feature(*fa as usize);
            for (value, &a) in buf.iter_mut().zip(row) {
                *value = finite_or_inf(f.apply(a, *value));
            }
            (buf, true)
        }
        (computed, Node::Constant(b)) => {
            if !b.is_finite() {
                return incomplete(n);
            }
            let (mut buf, ok) = eval_at(computed, data, ops);
            if !ok {
                return (buf, false);
            }
            for value in buf.iter_mut() {
                *value = finite_or_inf(f.apply(*value, *b));
            }
            (buf, true)
        }
        (computed, Node::Variable(fb)) => {
            let (mut buf, ok) = eval_at(computed, data, ops);
            if !ok {
                return (buf, false);
            }
            let row = data.feature(*fb as usize);
            for (value, &b) in buf.iter_mut().zip(row) {
                *value = finite_or_inf(f.apply(*value, b));
            }
            (buf, true)
        }
        (l, r) => {
            let (mut left_buf, ok) = eval_at(l, data, ops);
            if !ok {
                return (left_buf, false);
            }
            let (right_buf, ok) = eval_at(r, data, ops);
            if !ok {
                return (right_buf, false);
            }
            for (value, &b) in left_buf.iter_mut().zip(&right_buf) {
                *value = finite_or_inf(f.apply(*value, b));
            }
            (left_buf, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::math;

    fn arithmetic() -> OperatorSet<f64> {
        OperatorSet::new(
            vec![math::cos(), math::safe_log(), math::square()],
            vec![math::add(), math::sub(), math::mul(), math::div()],
        )
    }

    fn data() -> Dataset<f64> {
        Dataset::from_rows(vec![vec![1.0, 2.0, 0.5], vec![0.0, 1.0, 4.0]]).unwrap()
    }

    #[test]
    fn test_constant_tree_broadcasts() {
        let ops = arithmetic();
        let data = Dataset::from_rows(vec![vec![0.0; 5]]).unwrap();

        // 3.0 + 4.0, no variables anywhere
        let tree = Node::binary(1, Node::constant(3.0), Node::constant(4.0));
        let (values, complete) = eval_tree(&tree, &data, &ops);

        assert!(complete);
        assert_eq!(values, vec![7.0; 5]);
    }

    #[test]
    fn test_constant_tree_with_bad_intermediate() {
        let ops = arithmetic();
        let data = Dataset::from_rows(vec![vec![0.0; 3]]).unwrap();

        // log(-1) inside a constant subtree
        let tree = Node::binary(
            1,
            Node::unary(2, Node::constant(-1.0)),
            Node::constant(4.0),
        );
        let (values, complete) = eval_tree(&tree, &data, &ops);

        assert!(!complete);
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_division_by_zero_is_incomplete() {
        let ops = arithmetic();
        let data = Dataset::from_rows(vec![vec![1.0, 2.0]]).unwrap();

        // 1.0 / (x1 - x1)
        let tree = Node::binary(
            4,
            Node::constant(1.0),
            Node::binary(2, Node::variable(1), Node::variable(1)),
        );
        let (values, complete) = eval_tree(&tree, &data, &ops);

        assert!(!complete);
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_leaf_materialization() {
        let ops = arithmetic();

        let (values, complete) = eval_tree(&Node::variable(2), &data(), &ops);
        assert!(complete);
        assert_eq!(values, vec![0.0, 1.0, 4.0]);
    }

    #[test]
    fn test_fused_binary_over_leaves() {
        let ops = arithmetic();
        let data = data();

        let var_var = Node::binary(3, Node::variable(1), Node::variable(2));
        assert_eq!(eval_tree(&var_var, &data, &ops).0, vec![0.0, 2.0, 2.0]);

        let const_var = Node::binary(1, Node::constant(10.0), Node::variable(2));
        assert_eq!(eval_tree(&const_var, &data, &ops).0, vec![10.0, 11.0, 14.0]);

        let var_const = Node::binary(2, Node::variable(1), Node::constant(1.0));
        assert_eq!(eval_tree(&var_const, &data, &ops).0, vec![0.0, 1.0, -0.5]);
    }

    #[test]
    fn test_fused_unary_of_unary() {
        let ops = arithmetic();
        let data = data();

        // square(cos(x2))
        let tree = Node::unary(3, Node::unary(1, Node::variable(2)));
        let (values, complete) = eval_tree(&tree, &data, &ops);

        assert!(complete);
        for (value, x) in values.iter().zip(data.feature(2)) {
            assert!((value - x.cos().powi(2)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fused_unary_of_binary() {
        let ops = arithmetic();
        let data = data();

        // cos(x2 - 3.2)
        let tree = Node::unary(
            1,
            Node::binary(2, Node::variable(2), Node::constant(3.2)),
        );
        let (values, complete) = eval_tree(&tree, &data, &ops);

        assert!(complete);
        for (value, x) in values.iter().zip(data.feature(2)) {
            assert!((value - (x - 3.2).cos()).abs() < 1e-12);
        }

        // cos(x1 * x2)
        let tree = Node::unary(1, Node::binary(3, Node::variable(1), Node::variable(2)));
        let (values, complete) = eval_tree(&tree, &data, &ops);

        assert!(complete);
        for ((value, a), b) in values.iter().zip(data.feature(1)).zip(data.feature(2)) {
            assert!((value - (a * b).cos()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_one_sided_fusion_with_computed_branch() {
        let ops = arithmetic();
        let data = data();

        // x1 + square(x2): right side recurses, left reads the feature row
        let tree = Node::binary(
            1,
            Node::variable(1),
            Node::unary(3, Node::variable(2)),
        );
        let (values, complete) = eval_tree(&tree, &data, &ops);

        assert!(complete);
        for ((value, a), b) in values.iter().zip(data.feature(1)).zip(data.feature(2)) {
            assert!((value - (a + b * b)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_general_two_buffer_combine() {
        let ops = arithmetic();
        let data = data();

        // (x1 + 1) * (x2 + 2): neither side is a leaf
        let tree = Node::binary(
            3,
            Node::binary(1, Node::variable(1), Node::constant(1.0)),
            Node::binary(1, Node::variable(2), Node::constant(2.0)),
        );
        let (values, complete) = eval_tree(&tree, &data, &ops);

        assert!(complete);
        for ((value, a), b) in values.iter().zip(data.feature(1)).zip(data.feature(2)) {
            assert!((value - (a + 1.0) * (b + 2.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_nan_constant_leaf_fails_fast() {
        let ops = arithmetic();
        let data = data();

        // f64::NAN + x1: the fused kernel pre-reads the constant
        let tree = Node::binary(1, Node::constant(f64::NAN), Node::variable(1));
        let (values, complete) = eval_tree(&tree, &data, &ops);

        assert!(!complete);
        assert_eq!(values.len(), data.n_samples());
    }

    #[test]
    fn test_partial_nonfinite_marks_incomplete() {
        let ops = arithmetic();
        let data = Dataset::from_rows(vec![vec![-1.0, 1.0]]).unwrap();

        // log(x1): NaN in the first lane only
        let tree = Node::unary(2, Node::variable(1));
        let (values, complete) = eval_tree(&tree, &data, &ops);

        assert!(!complete);
        assert_eq!(values[1], 0.0);
    }

    #[test]
    fn test_eval_constant_folds_scalars() {
        let ops = arithmetic();

        let tree = Node::binary(
            3,
            Node::constant(2.0),
            Node::binary(1, Node::constant(1.0), Node::constant(3.0)),
        );
        assert_eq!(eval_constant(&tree, &ops), (8.0, true));

        let (_, ok) = eval_constant(&Node::unary(2, Node::constant(-1.0)), &ops);
        assert!(!ok);
    }
}
