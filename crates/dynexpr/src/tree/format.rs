use super::Node;
use crate::ops::OperatorSet;
use crate::ops::math::op_names;
use std::fmt::Display;

/// Render a tree against the operator set it is meant to be evaluated with.
///
/// The arithmetic names `+ - * / ^` render infix and parenthesized; every
/// other operator renders prefix as `name(args)`. Variables render as `xK`,
/// or through `var_names` (indexed by feature) when supplied. The `safe_*`
/// builtins render under their mathematical names.
///
/// # Example
/// ```
/// use dynexpr::{Node, OperatorSet, ops::math, render};
///
/// let ops = OperatorSet::<f64>::new(vec![], vec![math::mul()]);
/// let tree = Node::binary(1, Node::variable(1), Node::variable(2));
///
/// assert_eq!(render(&tree, &ops, None), "(x1 * x2)");
/// assert_eq!(render(&tree, &ops, Some(&["a", "b"])), "(a * b)");
/// ```
pub fn render<T: Display>(
    tree: &Node<T>,
    ops: &OperatorSet<T>,
    var_names: Option<&[&str]>,
) -> String {
    let mut out = String::new();
    render_node(tree, ops, var_names, &mut out);
    out
}

impl<T: Display> Node<T> {
    /// See [render].
    pub fn render(&self, ops: &OperatorSet<T>, var_names: Option<&[&str]>) -> String {
        render(self, ops, var_names)
    }
}

fn render_node<T: Display>(
    node: &Node<T>,
    ops: &OperatorSet<T>,
    var_names: Option<&[&str]>,
    out: &mut String,
) {
    match node {
        Node::Constant(value) => out.push_str(&value.to_string()),
        Node::Variable(feature) => match var_names
            .zip((*feature as usize).checked_sub(1))
            .and_then(|(names, index)| names.get(index))
        {
            Some(name) => out.push_str(name),
            None => out.push_str(&format!("x{}", feature)),
        },
        Node::Unary { op, child } => {
            out.push_str(&unary_name(ops, *op));
            out.push('(');
            render_node(child, ops, var_names, out);
            out.push(')');
        }
        Node::Binary { op, left, right } => {
            let name = binary_name(ops, *op);
            if is_infix(&name) {
                out.push('(');
                render_node(left, ops, var_names, out);
                out.push(' ');
                out.push_str(&name);
                out.push(' ');
                render_node(right, ops, var_names, out);
                out.push(')');
            } else {
                out.push_str(&name);
                out.push('(');
                render_node(left, ops, var_names, out);
                out.push_str(", ");
                render_node(right, ops, var_names, out);
                out.push(')');
            }
        }
    }
}

fn unary_name<T>(ops: &OperatorSet<T>, op: u16) -> String {
    match ops.get_unary(op as usize) {
        Some(operator) => display_name(operator.name()).to_string(),
        None => format!("op{}", op),
    }
}

fn binary_name<T>(ops: &OperatorSet<T>, op: u16) -> String {
    match ops.get_binary(op as usize) {
        Some(operator) => display_name(operator.name()).to_string(),
        None => format!("op{}", op),
    }
}

/// The rendering rewrite table for the safe builtins.
fn display_name(name: &str) -> &str {
    match name {
        op_names::SAFE_LOG => "log",
        op_names::SAFE_LOG2 => "log2",
        op_names::SAFE_LOG10 => "log10",
        op_names::SAFE_LOG1P => "log1p",
        op_names::SAFE_ACOSH => "acosh",
        op_names::SAFE_SQRT => "sqrt",
        op_names::SAFE_POW => op_names::POW,
        other => other,
    }
}

fn is_infix(name: &str) -> bool {
    matches!(name, "+" | "-" | "*" | "/" | "^")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::math;

    fn arithmetic() -> OperatorSet<f32> {
        OperatorSet::new(
            vec![math::cos(), math::safe_log(), math::safe_sqrt()],
            vec![math::add(), math::sub(), math::mul(), math::safe_pow()],
        )
    }

    #[test]
    fn test_default_and_named_variables() {
        let ops = arithmetic();
        let tree = Node::binary(3, Node::variable(1), Node::variable(2));

        assert_eq!(render(&tree, &ops, None), "(x1 * x2)");
        assert_eq!(render(&tree, &ops, Some(&["a", "b"])), "(a * b)");
    }

    #[test]
    fn test_infix_nests_with_parentheses() {
        let ops = arithmetic();
        let tree = Node::binary(
            3,
            Node::variable(1),
            Node::unary(1, Node::binary(2, Node::variable(2), Node::constant(3.2))),
        );

        assert_eq!(render(&tree, &ops, None), "(x1 * cos((x2 - 3.2)))");
    }

    #[test]
    fn test_safe_names_are_rewritten() {
        let ops = arithmetic();

        let log = Node::unary(2, Node::variable(1));
        assert_eq!(render(&log, &ops, None), "log(x1)");

        let sqrt = Node::unary(3, Node::variable(1));
        assert_eq!(render(&sqrt, &ops, None), "sqrt(x1)");

        let pow = Node::binary(4, Node::variable(1), Node::constant(2.0));
        assert_eq!(render(&pow, &ops, None), "(x1 ^ 2)");
    }

    #[test]
    fn test_non_arithmetic_binary_renders_prefix() {
        let ops = OperatorSet::new(vec![], vec![crate::ops::BinaryOp::new("max", f32::max)]);
        let tree = Node::binary(1, Node::variable(1), Node::constant(0.5));

        assert_eq!(render(&tree, &ops, None), "max(x1, 0.5)");
    }

    #[test]
    fn test_unknown_operator_renders_placeholder() {
        let ops = OperatorSet::<f32>::new(vec![], vec![]);
        let tree = Node::unary(7, Node::variable(1));

        assert_eq!(render(&tree, &ops, None), "op7(x1)");
    }

    #[test]
    fn test_short_name_table_falls_back() {
        let ops = arithmetic();
        let tree = Node::binary(1, Node::variable(1), Node::variable(3));

        assert_eq!(render(&tree, &ops, Some(&["a"])), "(a + x3)");
    }
}
