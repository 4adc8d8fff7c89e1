use crate::error::{ExprError, ExprResult};
use crate::ops::OperatorSet;
use crate::tree::{Node, render};
use std::fmt::Display;

/// Evaluate a tree over arbitrary element types: strings, vectors, domain
/// objects - anything `Clone`.
///
/// `inputs` holds one value per feature. There is no finiteness tracking
/// and no structural specialization here; the value of this path is that it
/// places no numeric bounds on `T`. An operator or feature index that does
/// not resolve is the dispatch-failure case: with `throw_errors` it is
/// surfaced as an error naming the rendered tree, otherwise it is swallowed
/// and the call returns `Ok(None)`.
///
/// # Example
/// ```
/// use dynexpr::{Node, OperatorSet, UnaryOp, eval_tree_generic};
///
/// let ops = OperatorSet::new(
///     vec![UnaryOp::new("shout", |s: String| s.to_uppercase())],
///     vec![],
/// );
/// let tree = Node::unary(1, Node::variable(1));
///
/// let result = eval_tree_generic(&tree, &["hello".to_string()], &ops, true).unwrap();
/// assert_eq!(result, Some("HELLO".to_string()));
/// ```
pub fn eval_tree_generic<T: Clone + Display>(
    tree: &Node<T>,
    inputs: &[T],
    ops: &OperatorSet<T>,
    throw_errors: bool,
) -> ExprResult<Option<T>> {
    match eval_any(tree, inputs, ops, tree) {
        Ok(value) => Ok(Some(value)),
        Err(err) if throw_errors => Err(err),
        Err(err) => {
            tracing::debug!(error = %err, "generic evaluation failed");
            Ok(None)
        }
    }
}

fn eval_any<T: Clone + Display>(
    node: &Node<T>,
    inputs: &[T],
    ops: &OperatorSet<T>,
    root: &Node<T>,
) -> ExprResult<T> {
    match node {
        Node::Constant(value) => Ok(value.clone()),
        Node::Variable(feature) => (*feature as usize)
            .checked_sub(1)
            .and_then(|index| inputs.get(index))
            .cloned()
            .ok_or_else(|| ExprError::FeatureOutOfRange {
                feature: *feature,
                len: inputs.len(),
                tree: render(root, ops, None),
            }),
        Node::Unary { op, child } => {
            let inner = eval_any(child, inputs, ops, root)?;
            let operator =
                ops.get_unary(*op as usize)
                    .ok_or_else(|| ExprError::UnknownUnary {
                        op: *op,
                        len: ops.unary_len(),
                        tree: render(root, ops, None),
                    })?;
            Ok(operator.apply(inner))
        }
        Node::Binary { op, left, right } => {
            let a = eval_any(left, inputs, ops, root)?;
            let b = eval_any(right, inputs, ops, root)?;
            let operator =
                ops.get_binary(*op as usize)
                    .ok_or_else(|| ExprError::UnknownBinary {
                        op: *op,
                        len: ops.binary_len(),
                        tree: render(root, ops, None),
                    })?;
            Ok(operator.apply(a, b))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{BinaryOp, UnaryOp};

    fn string_ops() -> OperatorSet<String> {
        OperatorSet::new(
            vec![UnaryOp::new("greet", |s: String| format!("Hello {}", s))],
            vec![BinaryOp::new("concat", |a: String, b: String| {
                format!("{}{}", a, b)
            })],
        )
    }

    #[test]
    fn test_string_concatenation() {
        let ops = string_ops();
        let inputs = vec!["Hello".to_string(), "Me?".to_string()];

        // x1 ++ " World!"
        let tree = Node::binary(
            1,
            Node::variable(1),
            Node::constant(" World!".to_string()),
        );

        let result = eval_tree_generic(&tree, &inputs, &ops, true).unwrap();
        assert_eq!(result, Some("Hello World!".to_string()));
    }

    #[test]
    fn test_unary_over_second_feature() {
        let ops = string_ops();
        let inputs = vec!["Hello".to_string(), "Me?".to_string()];

        let tree = Node::unary(1, Node::variable(2));
        let result = eval_tree_generic(&tree, &inputs, &ops, true).unwrap();

        assert_eq!(result, Some("Hello Me?".to_string()));
    }

    #[test]
    fn test_unknown_operator_surfaces_with_rendered_tree() {
        let ops = string_ops();
        let inputs = vec!["a".to_string()];

        let tree = Node::binary(9, Node::variable(1), Node::variable(1));
        let err = eval_tree_generic(&tree, &inputs, &ops, true).unwrap_err();

        let ExprError::UnknownBinary { op, len, tree } = err else {
            panic!("expected an unknown-binary error");
        };
        assert_eq!(op, 9);
        assert_eq!(len, 1);
        assert_eq!(tree, "op9(x1, x1)");
    }

    #[test]
    fn test_failures_are_swallowed_without_throw() {
        let ops = string_ops();
        let inputs = vec!["a".to_string()];

        let unknown_op = Node::binary(9, Node::variable(1), Node::variable(1));
        assert_eq!(
            eval_tree_generic(&unknown_op, &inputs, &ops, false),
            Ok(None)
        );

        let missing_feature = Node::<String>::unary(1, Node::variable(4));
        assert_eq!(
            eval_tree_generic(&missing_feature, &inputs, &ops, false),
            Ok(None)
        );
    }

    #[test]
    fn test_numeric_trees_work_generically() {
        let ops = OperatorSet::new(
            vec![],
            vec![BinaryOp::new("+", |a: f64, b: f64| a + b)],
        );

        let tree = Node::binary(1, Node::variable(1), Node::constant(2.5));
        let result = eval_tree_generic(&tree, &[1.5], &ops, true).unwrap();

        assert_eq!(result, Some(4.0));
    }
}
