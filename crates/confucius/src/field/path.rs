//! Dotted / bracketed field paths such as `spec.containers[0].image`.

use std::fmt;

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Name(String),
    Index(usize),
}

/// Path of a field from the root record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The empty path of the root record.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// A new path extended by a named segment.
    pub fn child(&self, name: &str) -> Self {
        let mut path = self.clone();
        path.push(PathSegment::Name(name.to_string()));
        path
    }

    /// A new path extended by a sequence index.
    pub fn index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.push(PathSegment::Index(index));
        path
    }

    pub(crate) fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub(crate) fn pop(&mut self) {
        self.segments.pop();
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Name(name) if i == 0 => f.write_str(name)?,
                PathSegment::Name(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_names_and_indices() {
        let path = FieldPath::root()
            .child("spec")
            .child("containers")
            .index(0)
            .child("image");
        assert_eq!(path.to_string(), "spec.containers[0].image");
    }

    #[test]
    fn test_display_nested_indices() {
        let path = FieldPath::root().child("grid").index(1).index(2);
        assert_eq!(path.to_string(), "grid[1][2]");
    }

    #[test]
    fn test_root_is_empty() {
        assert!(FieldPath::root().is_root());
        assert_eq!(FieldPath::root().to_string(), "");
    }

    #[test]
    fn test_push_and_pop() {
        let mut path = FieldPath::root().child("a");
        path.push(PathSegment::Index(3));
        assert_eq!(path.to_string(), "a[3]");
        path.pop();
        assert_eq!(path.to_string(), "a");
    }
}
