//! Key paths locating a value inside nested records and sequences.
//!
//! A [`KeyPath`] is attached to every [`SchemaError`](crate::SchemaError) so a
//! failure deep inside a nested model or array can be reported as
//! `author.email` or `contributors[2].name`.

use std::fmt::{self, Display};

/// One step of a [`KeyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A record key (e.g. `name`).
    Key(String),
    /// A sequence index (e.g. `[3]`).
    Index(usize),
}

/// A path to a value in a nested record.
///
/// Paths are persistent: every `push_*` returns a new path and leaves the
/// receiver untouched, so a parent path can be shared between siblings.
///
/// # Example
///
/// ```rust
/// use edictor::KeyPath;
///
/// let path = KeyPath::root()
///     .push_key("contributors")
///     .push_index(0)
///     .push_key("email");
///
/// assert_eq!(path.to_string(), "contributors[0].email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    /// The empty path, pointing at the validated value itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// A path made of a single record key.
    pub fn key(name: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Key(name.into())],
        }
    }

    /// A path made of a single sequence index.
    pub fn index(idx: usize) -> Self {
        Self {
            segments: vec![Segment::Index(idx)],
        }
    }

    /// Returns a new path with a key appended.
    pub fn push_key(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(name.into()));
        Self { segments }
    }

    /// Returns a new path with an index appended.
    pub fn push_index(&self, idx: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(idx));
        Self { segments }
    }

    /// Returns `prefix` followed by the segments of `self`.
    ///
    /// Used to re-root errors reported by a nested model or array under the
    /// key or index that holds it.
    pub fn under(&self, prefix: &KeyPath) -> Self {
        let mut segments = Vec::with_capacity(prefix.len() + self.len());
        segments.extend(prefix.segments.iter().cloned());
        segments.extend(self.segments.iter().cloned());
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// The first segment, i.e. the top-level key or index the path starts at.
    pub fn head(&self) -> Option<&Segment> {
        self.segments.first()
    }
}

impl Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                Segment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}
