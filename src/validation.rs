//! Depth tracking for nested validation.
//!
//! Models may reference themselves (a `Node` whose `children` are
//! `array_of(Node)`), and an `initial` value can make such a schema recurse
//! without consuming any input. [`ValidationContext`] is threaded through every
//! nested model construction and nested array so that recursion stops with a
//! `max_depth_exceeded` error instead of exhausting the stack.

use crate::error::{SchemaError, SchemaErrors};
use crate::path::KeyPath;

/// Default nesting limit for model-in-model and array-in-array validation.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Carries the current nesting depth through a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    depth: usize,
    max_depth: usize,
}

impl ValidationContext {
    pub fn new(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    /// Returns a context one nesting level deeper, or the error to report
    /// when the limit is already reached.
    pub fn descend(&self) -> Result<Self, SchemaErrors> {
        if self.depth >= self.max_depth {
            return Err(SchemaErrors::single(
                SchemaError::new(
                    KeyPath::root(),
                    format!("maximum nesting depth {} exceeded", self.max_depth),
                )
                .with_code("max_depth_exceeded"),
            ));
        }
        Ok(Self {
            depth: self.depth + 1,
            max_depth: self.max_depth,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}
