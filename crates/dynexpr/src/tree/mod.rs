mod format;
mod iter;
mod node;

pub use format::render;
pub use iter::PreOrder;
pub use node::{Node, ScalarHash};
