use std::fmt;

/// Position of a row in the projected tree: child offsets from the root.
///
/// The empty coordinate is the (invisible) root. At depth 1, offset 0 is the
/// untagged bucket and offset i > 0 is tag i-1 in the index's canonical tag
/// order. Deeper offsets address pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate(Vec<usize>);

impl Coordinate {
    pub fn root() -> Self {
        Coordinate(Vec::new())
    }

    pub fn new(offsets: Vec<usize>) -> Self {
        Coordinate(offsets)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn offsets(&self) -> &[usize] {
        &self.0
    }

    /// The offset within the parent, None for the root
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn parent(&self) -> Option<Coordinate> {
        if self.is_root() {
            return None;
        }
        Some(Coordinate(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn child(&self, offset: usize) -> Coordinate {
        let mut offsets = self.0.clone();
        offsets.push(offset);
        Coordinate(offsets)
    }

    /// The first `depth` offsets of this coordinate
    pub fn prefix(&self, depth: usize) -> Coordinate {
        Coordinate(self.0[..depth.min(self.0.len())].to_vec())
    }

    /// This coordinate extended with the given trailing offsets
    pub fn join(&self, tail: &[usize]) -> Coordinate {
        let mut offsets = self.0.clone();
        offsets.extend_from_slice(tail);
        Coordinate(offsets)
    }
}

impl From<Vec<usize>> for Coordinate {
    fn from(offsets: Vec<usize>) -> Self {
        Coordinate(offsets)
    }
}

impl From<&[usize]> for Coordinate {
    fn from(offsets: &[usize]) -> Self {
        Coordinate(offsets.to_vec())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, offset) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", offset)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_and_child() {
        let root = Coordinate::root();
        assert!(root.is_root());
        assert_eq!(root.parent(), None);

        let c = root.child(2).child(4);
        assert_eq!(c.offsets(), &[2, 4]);
        assert_eq!(c.depth(), 2);
        assert_eq!(c.last(), Some(4));
        assert_eq!(c.parent(), Some(Coordinate::new(vec![2])));
    }

    #[test]
    fn test_prefix_and_join() {
        let c = Coordinate::new(vec![1, 0, 3]);
        assert_eq!(c.prefix(0), Coordinate::root());
        assert_eq!(c.prefix(2), Coordinate::new(vec![1, 0]));
        assert_eq!(c.prefix(9), c);
        assert_eq!(
            Coordinate::new(vec![1, 0]).join(&[3, 5]),
            Coordinate::new(vec![1, 0, 3, 5])
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Coordinate::new(vec![1, 0]).to_string(), "(1, 0)");
        assert_eq!(Coordinate::root().to_string(), "()");
    }
}
