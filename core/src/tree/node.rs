use crate::models::{Page, Tag};

/// Label shown for the synthetic untagged bucket
pub const UNTAGGED_LABEL: &str = "untagged";

/// A resolved tree row. The two tag-like variants only exist at depth 1;
/// pages appear below them and carry their own sub-hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    /// Synthetic bucket for pages carrying no tags
    Untagged,
    Tag(Tag),
    Page(Page),
}

impl TreeNode {
    pub fn as_page(&self) -> Option<&Page> {
        match self {
            TreeNode::Page(page) => Some(page),
            _ => None,
        }
    }

    pub fn is_tag_like(&self) -> bool {
        matches!(self, TreeNode::Untagged | TreeNode::Tag(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEmphasis {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColor {
    Normal,
    Muted,
}

/// Presentation data for a row, independent of any widget toolkit
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayAttrs {
    pub label: String,
    /// Stable identity for selection handling: tag name or full page path
    pub key: String,
    pub is_empty_marker: bool,
    pub emphasis: TextEmphasis,
    pub color: TextColor,
}
