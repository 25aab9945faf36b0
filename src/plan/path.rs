use std::fmt;

use crate::{naming::ConventionPair, record::PATH_SEPARATOR};

/// Location of a destination member, as member names from the root type down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<&'static str>,
}

impl FieldPath {
    /// The path of the root type itself.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, name: &'static str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name);
        Self { segments }
    }

    pub fn segments(&self) -> &[&'static str] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The record field name for this path: every segment rewritten by `naming`, joined with
    /// the path separator.
    pub fn resolve(&self, naming: &ConventionPair) -> String {
        let mut resolved = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                resolved.push(PATH_SEPARATOR);
            }
            resolved.push_str(&naming.transform_segment(segment));
        }
        resolved
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "<root>");
        }
        write!(f, "{}", self.resolve(&ConventionPair::default()))
    }
}
