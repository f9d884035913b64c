/// Bounds on definition size that keep every evaluation short
///
/// Together these cap the work a single evaluation can do: at most
/// `max_steps` steps, each parsing and walking one expression of at most
/// `max_expression_length` characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Maximum number of entries in `steps`
    pub max_steps: usize,

    /// Maximum length of a `calc` expression, in characters
    pub max_expression_length: usize,

    /// Maximum nesting depth of a parsed expression
    /// Real usage: ~5 levels, Limit: 100
    pub max_expression_depth: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_steps: 200,
            max_expression_length: 500,
            max_expression_depth: 100,
        }
    }
}

impl ResourceLimits {
    /// Create a new ResourceLimits with default values
    pub fn new() -> Self {
        Self::default()
    }
}
