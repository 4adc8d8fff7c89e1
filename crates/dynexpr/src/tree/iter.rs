use super::Node;
use std::sync::Arc;

/// Borrowing pre-order iterator over a tree: parent before children, left
/// before right. This is the canonical visit order for every positional
/// operation in the crate.
pub struct PreOrder<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iterator for PreOrder<'a, T> {
    type Item = &'a Node<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;

        match node {
            Node::Unary { child, .. } => self.stack.push(child),
            Node::Binary { left, right, .. } => {
                self.stack.push(right);
                self.stack.push(left);
            }
            _ => {}
        }

        Some(node)
    }
}

impl<T> Node<T> {
    pub fn iter_pre_order(&self) -> PreOrder<'_, T> {
        PreOrder { stack: vec![self] }
    }

    /// Number of nodes in the subtree rooted here.
    #[inline]
    pub fn size(&self) -> usize {
        match self {
            Node::Unary { child, .. } => 1 + child.size(),
            Node::Binary { left, right, .. } => 1 + left.size() + right.size(),
            _ => 1,
        }
    }

    /// Length of the longest root-to-leaf path, in edges.
    #[inline]
    pub fn height(&self) -> usize {
        match self {
            Node::Unary { child, .. } => 1 + child.height(),
            Node::Binary { left, right, .. } => 1 + left.height().max(right.height()),
            _ => 0,
        }
    }

    /// True if any leaf of the subtree is a variable. Subtrees without
    /// variables fold to a single scalar during evaluation.
    pub fn has_variables(&self) -> bool {
        self.iter_pre_order().any(Node::is_variable)
    }

    /// The node at pre-order position `index` (0-based).
    pub fn get(&self, index: usize) -> Option<&Node<T>> {
        self.iter_pre_order().nth(index)
    }

    /// Tree-shaped fold: `f` maps each node on the way down, `combine`
    /// merges a node's mapped value with its children's results (0, 1 or 2
    /// of them) on the way back up. Leaves return `f(leaf)` directly.
    ///
    /// # Example
    /// ```
    /// use dynexpr::Node;
    ///
    /// let tree = Node::binary(1, Node::variable(1), Node::constant(2.0_f64));
    /// let count = tree.fold(|_| 1_usize, |node, children| {
    ///     node + children.iter().sum::<usize>()
    /// });
    /// assert_eq!(count, tree.size());
    /// ```
    pub fn fold<R, F, C>(&self, mut f: F, mut combine: C) -> R
    where
        F: FnMut(&Node<T>) -> R,
        C: FnMut(R, &[R]) -> R,
    {
        self.fold_inner(&mut f, &mut combine)
    }

    fn fold_inner<R, F, C>(&self, f: &mut F, combine: &mut C) -> R
    where
        F: FnMut(&Node<T>) -> R,
        C: FnMut(R, &[R]) -> R,
    {
        match self {
            Node::Unary { child, .. } => {
                let mapped = f(self);
                let inner = child.fold_inner(f, combine);
                combine(mapped, std::slice::from_ref(&inner))
            }
            Node::Binary { left, right, .. } => {
                let mapped = f(self);
                let results = [left.fold_inner(f, combine), right.fold_inner(f, combine)];
                combine(mapped, &results)
            }
            leaf => f(leaf),
        }
    }
}

impl<T: Clone> Node<T> {
    /// Mutable access to the node at pre-order position `index` (0-based).
    ///
    /// Shared subtrees along the path are unshared copy-on-write, so the
    /// returned reference never aliases another parent's child.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Node<T>> {
        let mut cursor = 0;
        Self::get_mut_pre_order(self, index, &mut cursor)
    }

    fn get_mut_pre_order<'a>(
        node: &'a mut Node<T>,
        target: usize,
        cursor: &mut usize,
    ) -> Option<&'a mut Node<T>> {
        if *cursor == target {
            return Some(node);
        }

        *cursor += 1;
        match node {
            Node::Unary { child, .. } => {
                Self::get_mut_pre_order(Arc::make_mut(child), target, cursor)
            }
            Node::Binary { left, right, .. } => {
                if let Some(found) = Self::get_mut_pre_order(Arc::make_mut(left), target, cursor) {
                    return Some(found);
                }
                Self::get_mut_pre_order(Arc::make_mut(right), target, cursor)
            }
            _ => None,
        }
    }
}
