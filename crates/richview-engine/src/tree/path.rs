use std::fmt;

/// Root-relative address of a node: one sibling index per tree depth.
///
/// Paths order lexicographically over their indices. They describe the tree
/// as it was when they were computed and must not be kept across renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Vec<usize>);

impl Path {
    /// The empty path, addressing the document root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of the `index`-th child of this node.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(index);
        Self(indices)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    /// Sibling index at the deepest level.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// True when `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl FromIterator<usize> for Path {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_and_parent() {
        let path = Path::from(vec![2, 0]);
        let child = path.child(5);

        assert_eq!(child.indices(), &[2, 0, 5]);
        assert_eq!(child.parent(), Some(path));
        assert_eq!(child.last(), Some(5));
        assert_eq!(Path::root().parent(), None);
        assert_eq!(Path::root().last(), None);
    }

    #[test]
    fn test_lexicographic_order() {
        let a = Path::from(vec![0, 3]);
        let b = Path::from(vec![1]);
        let c = Path::from(vec![1, 0]);

        assert!(a < b);
        assert!(b < c);
        assert!(Path::root() < a);
    }

    #[test]
    fn test_is_ancestor_of() {
        let parent = Path::from(vec![1]);
        assert!(parent.is_ancestor_of(&Path::from(vec![1, 4])));
        assert!(Path::root().is_ancestor_of(&parent));
        assert!(!parent.is_ancestor_of(&parent));
        assert!(!parent.is_ancestor_of(&Path::from(vec![2, 0])));
    }

    #[test]
    fn test_display() {
        assert_eq!(Path::from(vec![3, 1, 4]).to_string(), "[3, 1, 4]");
        assert_eq!(Path::root().to_string(), "[]");
    }
}
