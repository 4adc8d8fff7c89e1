use crate::error::{ExprError, ExprResult};
use hashbrown::HashMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;

/// A node in a dynamic expression tree.
///
/// [Node] is the tagged variant at the heart of the crate: the enum
/// discriminant is the node's degree (0 for leaves, 1 for unary
/// application, 2 for binary application), so an ill-formed node - a leaf
/// carrying both a constant and a feature, an application without its
/// children - is unrepresentable. Operator and feature indices are 1-based
/// and resolve against whatever [OperatorSet](crate::OperatorSet) and input
/// the caller evaluates with; the tree carries neither.
///
/// Children sit behind [Arc], so a subtree can be shared between parents as
/// a read-only optimization (clone the `Arc`), while [Node::get_mut] and
/// [Node::set] mutate through copy-on-write. [Clone] is the cheap shallow
/// copy that shares all children with the source; [Node::deep_copy] and
/// [Node::deep_copy_shared] produce fresh trees.
///
/// # Example
/// ```
/// use dynexpr::Node;
///
/// // x1 * (x2 - 3.2), with `-` at binary index 2 and `*` at 3
/// let tree = Node::binary(
///     3,
///     Node::variable(1),
///     Node::binary(2, Node::variable(2), Node::constant(3.2_f32)),
/// );
///
/// assert_eq!(tree.degree(), 2);
/// assert_eq!(tree.size(), 5);
/// ```
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Node<T> {
    Constant(T),
    Variable(u16),
    Unary { op: u16, child: Arc<Node<T>> },
    Binary {
        op: u16,
        left: Arc<Node<T>>,
        right: Arc<Node<T>>,
    },
}

impl<T> Node<T> {
    /// A degree-0 constant leaf.
    pub fn constant(value: T) -> Self {
        Node::Constant(value)
    }

    /// A degree-0 variable leaf referencing the 1-based `feature` row of
    /// the input. Panics on 0.
    pub fn variable(feature: u16) -> Self {
        assert!(feature >= 1, "feature indices are 1-based");
        Node::Variable(feature)
    }

    /// A degree-1 application of the unary operator at 1-based index `op`.
    pub fn unary(op: u16, child: impl Into<Arc<Node<T>>>) -> Self {
        assert!(op >= 1, "operator indices are 1-based");
        Node::Unary {
            op,
            child: child.into(),
        }
    }

    /// A degree-2 application of the binary operator at 1-based index `op`.
    pub fn binary(
        op: u16,
        left: impl Into<Arc<Node<T>>>,
        right: impl Into<Arc<Node<T>>>,
    ) -> Self {
        assert!(op >= 1, "operator indices are 1-based");
        Node::Binary {
            op,
            left: left.into(),
            right: right.into(),
        }
    }

    /// Parse a variable leaf from its default rendering, `xK`.
    ///
    /// # Example
    /// ```
    /// use dynexpr::Node;
    ///
    /// let var = Node::<f64>::parse_variable("x3").unwrap();
    /// assert_eq!(var, Node::variable(3));
    /// assert!(Node::<f64>::parse_variable("y3").is_err());
    /// ```
    pub fn parse_variable(name: &str) -> ExprResult<Self> {
        let feature = name
            .strip_prefix('x')
            .and_then(|digits| digits.parse::<u16>().ok())
            .filter(|feature| *feature >= 1)
            .ok_or_else(|| ExprError::MalformedVariable(name.to_string()))?;

        Ok(Node::Variable(feature))
    }

    /// A variable leaf whose feature index is 1 + the position of `name`
    /// in `names`. The name must match exactly one entry.
    pub fn named_variable(name: &str, names: &[&str]) -> ExprResult<Self> {
        let mut found = names
            .iter()
            .enumerate()
            .filter(|(_, candidate)| **candidate == name);

        match (found.next(), found.next()) {
            (Some((index, _)), None) => Ok(Node::Variable((index + 1) as u16)),
            (Some(_), Some(_)) => Err(ExprError::AmbiguousVariable(name.to_string())),
            (None, _) => Err(ExprError::UnknownVariable(name.to_string())),
        }
    }

    /// The node's arity tag: 0 for leaves, 1 for unary, 2 for binary.
    pub fn degree(&self) -> usize {
        match self {
            Node::Constant(_) | Node::Variable(_) => 0,
            Node::Unary { .. } => 1,
            Node::Binary { .. } => 2,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.degree() == 0
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Node::Constant(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Node::Variable(_))
    }

    /// The constant payload, for constant leaves.
    pub fn value(&self) -> Option<&T> {
        match self {
            Node::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// The 1-based feature index, for variable leaves.
    pub fn feature(&self) -> Option<u16> {
        match self {
            Node::Variable(feature) => Some(*feature),
            _ => None,
        }
    }

    /// The 1-based operator index, for applications.
    pub fn op(&self) -> Option<u16> {
        match self {
            Node::Unary { op, .. } | Node::Binary { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// Deep conversion of every constant leaf through `f`; variables and
    /// operator indices are preserved. Shared subtrees in the source are
    /// duplicated in the result.
    pub fn convert_with<U, F: FnMut(&T) -> U>(&self, mut f: F) -> Node<U> {
        self.convert_inner(&mut f)
    }

    /// Like [Node::convert_with], but shared subtrees in the source are
    /// converted once and stay shared in the result. Trees with cycles are
    /// not supported.
    pub fn convert_with_shared<U, F: FnMut(&T) -> U>(&self, mut f: F) -> Node<U> {
        let mut seen = HashMap::new();
        self.convert_shared_inner(&mut f, &mut seen)
    }

    /// Deep conversion of the element type through [From].
    pub fn convert<U: From<T>>(&self) -> Node<U>
    where
        T: Clone,
    {
        self.convert_with(|value| U::from(value.clone()))
    }

    /// Sharing-preserving deep conversion of the element type.
    pub fn convert_shared<U: From<T>>(&self) -> Node<U>
    where
        T: Clone,
    {
        self.convert_with_shared(|value| U::from(value.clone()))
    }

    fn convert_inner<U, F: FnMut(&T) -> U>(&self, f: &mut F) -> Node<U> {
        match self {
            Node::Constant(value) => Node::Constant(f(value)),
            Node::Variable(feature) => Node::Variable(*feature),
            Node::Unary { op, child } => Node::Unary {
                op: *op,
                child: Arc::new(child.convert_inner(f)),
            },
            Node::Binary { op, left, right } => Node::Binary {
                op: *op,
                left: Arc::new(left.convert_inner(f)),
                right: Arc::new(right.convert_inner(f)),
            },
        }
    }

    fn convert_shared_inner<U, F: FnMut(&T) -> U>(
        &self,
        f: &mut F,
        seen: &mut HashMap<*const Node<T>, Arc<Node<U>>>,
    ) -> Node<U> {
        match self {
            Node::Constant(value) => Node::Constant(f(value)),
            Node::Variable(feature) => Node::Variable(*feature),
            Node::Unary { op, child } => Node::Unary {
                op: *op,
                child: Self::shared_image(child, f, seen),
            },
            Node::Binary { op, left, right } => Node::Binary {
                op: *op,
                left: Self::shared_image(left, f, seen),
                right: Self::shared_image(right, f, seen),
            },
        }
    }

    fn shared_image<U, F: FnMut(&T) -> U>(
        child: &Arc<Node<T>>,
        f: &mut F,
        seen: &mut HashMap<*const Node<T>, Arc<Node<U>>>,
    ) -> Arc<Node<U>> {
        let identity = Arc::as_ptr(child);
        if let Some(image) = seen.get(&identity) {
            return Arc::clone(image);
        }

        let image = Arc::new(child.convert_shared_inner(f, seen));
        seen.insert(identity, Arc::clone(&image));
        image
    }
}

impl<T: Clone> Node<T> {
    /// A structurally fresh copy; shared subtrees in the source are
    /// duplicated.
    pub fn deep_copy(&self) -> Self {
        self.convert_with(|value| value.clone())
    }

    /// A structurally fresh copy that reproduces the source's DAG sharing.
    pub fn deep_copy_shared(&self) -> Self {
        self.convert_with_shared(|value| value.clone())
    }

    /// Overwrite this node with `source`'s content. The reassignment is
    /// shallow: afterwards the node has `source`'s degree and shares
    /// `source`'s children.
    pub fn set(&mut self, source: &Self) {
        *self = source.clone();
    }
}

/// Shallow copy: leaf payloads are cloned, children are shared with the
/// source. Use [Node::deep_copy] for a structurally fresh tree.
impl<T: Clone> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Node::Constant(value) => Node::Constant(value.clone()),
            Node::Variable(feature) => Node::Variable(*feature),
            Node::Unary { op, child } => Node::Unary {
                op: *op,
                child: Arc::clone(child),
            },
            Node::Binary { op, left, right } => Node::Binary {
                op: *op,
                left: Arc::clone(left),
                right: Arc::clone(right),
            },
        }
    }
}

/// Hashing for scalar payloads.
///
/// Floats hash by bit pattern (with both zeros normalized to `+0.0` so that
/// equal nodes hash equally); everything else delegates to [Hash].
pub trait ScalarHash {
    fn hash_scalar<H: Hasher>(&self, state: &mut H);
}

impl ScalarHash for f32 {
    fn hash_scalar<H: Hasher>(&self, state: &mut H) {
        let normalized = if *self == 0.0 { 0.0_f32 } else { *self };
        state.write_u32(normalized.to_bits());
    }
}

impl ScalarHash for f64 {
    fn hash_scalar<H: Hasher>(&self, state: &mut H) {
        let normalized = if *self == 0.0 { 0.0_f64 } else { *self };
        state.write_u64(normalized.to_bits());
    }
}

macro_rules! impl_scalar_hash {
    ($($t:ty),+) => {
        $(
            impl ScalarHash for $t {
                fn hash_scalar<H: Hasher>(&self, state: &mut H) {
                    self.hash(state);
                }
            }
        )+
    };
}

impl_scalar_hash!(
    u8,
    u16,
    u32,
    u64,
    u128,
    i8,
    i16,
    i32,
    i64,
    i128,
    usize,
    isize,
    bool,
    char,
    String,
    &str
);

impl<S: ScalarHash> ScalarHash for Vec<S> {
    fn hash_scalar<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for item in self {
            item.hash_scalar(state);
        }
    }
}

/// Structural hash: the discriminant keeps a constant leaf of value 3 and a
/// variable leaf of feature 3 from colliding, and equal trees hash equally.
impl<T: ScalarHash> Hash for Node<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Node::Constant(value) => {
                0_u8.hash(state);
                value.hash_scalar(state);
            }
            Node::Variable(feature) => {
                1_u8.hash(state);
                feature.hash(state);
            }
            Node::Unary { op, child } => {
                2_u8.hash(state);
                op.hash(state);
                child.hash(state);
            }
            Node::Binary { op, left, right } => {
                3_u8.hash(state);
                op.hash(state);
                left.hash(state);
                right.hash(state);
            }
        }
    }
}

impl<T: ScalarHash> Node<T> {
    /// The structural hash as a `u64`, stable within a process.
    pub fn structural_hash(&self) -> u64 {
        foldhash::fast::FixedState::default().hash_one(self)
    }
}
