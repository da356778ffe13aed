mod cache;
mod coordinate;
mod model;
mod node;
mod sync;

pub use coordinate::Coordinate;
pub use model::{TagTreeModel, PAGE_WINDOW};
pub use node::{DisplayAttrs, TextColor, TextEmphasis, TreeNode, UNTAGGED_LABEL};
pub use sync::TreeEdit;
