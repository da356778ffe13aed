use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Colon-separated hierarchical page name, e.g. "projects:alpha:notes".
///
/// The empty path is the root namespace. The root is never a visible row;
/// it only acts as the parent of top-level pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PagePath(String);

impl PagePath {
    /// Create a path from a user-supplied name, dropping empty segments
    pub fn new(name: &str) -> Self {
        let parts: Vec<&str> = name
            .split(':')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        PagePath(parts.join(":"))
    }

    /// The root namespace
    pub fn root() -> Self {
        PagePath(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments from the top of the namespace down
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.0.split(':').filter(|p| !p.is_empty())
    }

    /// The last path segment, used as the display name
    pub fn basename(&self) -> &str {
        self.0.rsplit(':').next().unwrap_or("")
    }

    /// The parent namespace, or None for the root itself
    pub fn parent(&self) -> Option<PagePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind(':') {
            Some(i) => Some(PagePath(self.0[..i].to_string())),
            None => Some(PagePath::root()),
        }
    }

    /// A direct child of this path
    pub fn child(&self, basename: &str) -> PagePath {
        if self.is_root() {
            PagePath(basename.to_string())
        } else {
            PagePath(format!("{}:{}", self.0, basename))
        }
    }

    /// This path and all its ancestors, from self up to but excluding the root
    pub fn self_and_parents(&self) -> Vec<PagePath> {
        let mut out = Vec::new();
        let mut current = Some(self.clone());
        while let Some(path) = current {
            if path.is_root() {
                break;
            }
            current = path.parent();
            out.push(path);
        }
        out
    }
}

impl fmt::Display for PagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A page row from the index.
///
/// `has_data` is false for rows coming from listings that skip the
/// child-count join; `Index::lookup_data` fills in `has_children`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub id: i64,
    pub path: PagePath,
    pub has_children: bool,
    pub has_data: bool,
    pub created_at: DateTime<Utc>,
}

impl Page {
    pub fn basename(&self) -> &str {
        self.path.basename()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_normalization() {
        assert_eq!(PagePath::new("projects:alpha").as_str(), "projects:alpha");
        assert_eq!(PagePath::new(" projects : alpha ").as_str(), "projects:alpha");
        assert_eq!(PagePath::new(":projects::alpha:").as_str(), "projects:alpha");
        assert!(PagePath::new("").is_root());
        assert!(PagePath::new(" : ").is_root());
    }

    #[test]
    fn test_basename_and_parent() {
        let path = PagePath::new("projects:alpha:notes");
        assert_eq!(path.basename(), "notes");
        assert_eq!(path.parent(), Some(PagePath::new("projects:alpha")));

        let top = PagePath::new("projects");
        assert_eq!(top.basename(), "projects");
        assert_eq!(top.parent(), Some(PagePath::root()));
        assert_eq!(PagePath::root().parent(), None);
    }

    #[test]
    fn test_child() {
        assert_eq!(
            PagePath::root().child("projects"),
            PagePath::new("projects")
        );
        assert_eq!(
            PagePath::new("projects").child("alpha"),
            PagePath::new("projects:alpha")
        );
    }

    #[test]
    fn test_self_and_parents() {
        let path = PagePath::new("a:b:c");
        let walk = path.self_and_parents();
        assert_eq!(
            walk,
            vec![PagePath::new("a:b:c"), PagePath::new("a:b"), PagePath::new("a")]
        );
        assert!(PagePath::root().self_and_parents().is_empty());
    }
}
