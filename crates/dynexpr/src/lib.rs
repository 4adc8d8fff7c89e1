//! Dynamic symbolic expression trees with fast batched evaluation.
//!
//! A [Node] is a runtime-mutable expression tree over a closed, user-chosen
//! alphabet of operators (an [OperatorSet]). Trees reference operators and
//! input features by index, so millions of candidate expressions can be
//! built, mutated and evaluated against a [Dataset] without touching the
//! type system - the shape of the search space lives entirely in values.
//!
//! # Example
//! ```
//! use dynexpr::{Dataset, Node, OperatorSet, eval_tree, ops::math};
//!
//! // the operator alphabet: unary [cos], binary [+, -, *]
//! let ops = OperatorSet::new(
//!     vec![math::cos()],
//!     vec![math::add(), math::sub(), math::mul()],
//! );
//!
//! // x1 * cos(x2 - 3.2)
//! let tree = Node::binary(
//!     3,
//!     Node::variable(1),
//!     Node::unary(1, Node::binary(2, Node::variable(2), Node::constant(3.2_f64))),
//! );
//!
//! let data = Dataset::from_rows(vec![
//!     vec![1.0, 2.0, 0.5], // x1
//!     vec![0.0, 3.2, 6.4], // x2
//! ]).unwrap();
//!
//! let (values, complete) = eval_tree(&tree, &data, &ops);
//! assert!(complete);
//! assert_eq!(values.len(), 3);
//! assert_eq!(values[1], 2.0); // cos(0) == 1
//! ```

pub mod error;
pub mod eval;
pub mod ops;
pub mod tree;

pub use error::{ExprError, ExprResult};
pub use eval::{Dataset, eval_constant, eval_tree, eval_tree_generic};
pub use ops::{BinaryOp, OperatorSet, UnaryOp};
pub use tree::{Node, PreOrder, ScalarHash, render};
