use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A named unary operator over the scalar type `T`.
///
/// Operators are plain values: a `&'static str` name plus a bare function
/// pointer. Keeping the callable a `fn` rather than a boxed closure is what
/// lets the evaluator dispatch with a single indirect call per node, with no
/// vtable or allocation behind it.
pub struct UnaryOp<T> {
    name: &'static str,
    op: fn(T) -> T,
}

/// A named binary operator over the scalar type `T`.
pub struct BinaryOp<T> {
    name: &'static str,
    op: fn(T, T) -> T,
}

impl<T> UnaryOp<T> {
    pub fn new(name: &'static str, op: fn(T) -> T) -> Self {
        UnaryOp { name, op }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn apply(&self, x: T) -> T {
        (self.op)(x)
    }
}

impl<T> BinaryOp<T> {
    pub fn new(name: &'static str, op: fn(T, T) -> T) -> Self {
        BinaryOp { name, op }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn apply(&self, left: T, right: T) -> T {
        (self.op)(left, right)
    }
}

impl<T> Clone for UnaryOp<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for UnaryOp<T> {}

impl<T> Clone for BinaryOp<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BinaryOp<T> {}

impl<T> PartialEq for UnaryOp<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for UnaryOp<T> {}

impl<T> PartialEq for BinaryOp<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for BinaryOp<T> {}

impl<T> Hash for UnaryOp<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<T> Hash for BinaryOp<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<T> Display for UnaryOp<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl<T> Display for BinaryOp<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl<T> Debug for UnaryOp<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unary: {}", self.name)
    }
}

impl<T> Debug for BinaryOp<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Binary: {}", self.name)
    }
}
