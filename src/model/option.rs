use crate::validation::DEFAULT_MAX_DEPTH;

/// Options of a model class or a single model operation.
///
/// Unset options inherit from the class the operation runs on, which inherits
/// from its parent class.
///
/// ```rust
/// use edictor::ModelOption;
///
/// let option = ModelOption::new().with_max_depth(8);
/// assert!(option.is_strict());
/// assert!(!option.merge(&ModelOption::permissive()).is_strict());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelOption {
    strict: Option<bool>,
    max_depth: Option<usize>,
}

impl ModelOption {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown keys are kept instead of rejected.
    pub fn permissive() -> Self {
        Self::new().with_strict(false)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Limits how deeply nested models and arrays are validated.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Defaults to `true`.
    pub fn is_strict(&self) -> bool {
        self.strict.unwrap_or(true)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)
    }

    /// Returns `self` with every option set in `over` replaced.
    pub fn merge(&self, over: &ModelOption) -> ModelOption {
        ModelOption {
            strict: over.strict.or(self.strict),
            max_depth: over.max_depth.or(self.max_depth),
        }
    }
}
