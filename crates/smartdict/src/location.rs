//! Trail of resolved steps, used to report where a lookup stopped.
//!
//! A `Location` is built while walking a document: every step that resolves
//! successfully pushes the concrete segment it landed on. Selector steps push
//! the index of the element they matched, so errors always point at real data.

use std::fmt;

/// A single resolved segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Seg {
    /// Object key access: `{"key": value}`
    Key(String),
    /// Array index access: `[index]`
    Index(usize),
}

impl Seg {
    /// Create a key segment.
    #[inline]
    pub fn key(k: impl Into<String>) -> Self {
        Seg::Key(k.into())
    }

    /// Create an index segment.
    #[inline]
    pub fn index(i: usize) -> Self {
        Seg::Index(i)
    }
}

impl fmt::Display for Seg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seg::Key(k) => write!(f, ".{}", k),
            Seg::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// The steps resolved so far, rendered as `$.tables[0].name`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Location(Vec<Seg>);

impl Location {
    /// The document root.
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn push(&mut self, seg: Seg) {
        self.0.push(seg);
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for seg in &self.0 {
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl FromIterator<Seg> for Location {
    fn from_iter<I: IntoIterator<Item = Seg>>(iter: I) -> Self {
        Location(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_display() {
        assert_eq!(Location::root().to_string(), "$");
    }

    #[test]
    fn test_mixed_display() {
        let mut loc = Location::root();
        loc.push(Seg::key("tables"));
        loc.push(Seg::index(0));
        loc.push(Seg::key("name"));
        assert_eq!(loc.to_string(), "$.tables[0].name");
    }

    #[test]
    fn test_collect_from_segments() {
        let loc: Location = vec![Seg::key("a"), Seg::index(2)].into_iter().collect();
        assert_eq!(loc.to_string(), "$.a[2]");
    }
}
