/*!
 Limits applied while decoding untrusted data.
*/

/// Default maximum container nesting depth, small enough to decode on a thread with a 2 MiB stack
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Decoder configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum nesting depth of containers; the root object is at depth 0
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    /// Create a configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum container nesting depth
    ///
    /// Every level of nesting uses stack space, so deeper limits need a thread with a larger stack.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
