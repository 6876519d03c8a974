//! Decomposition configuration.

/// Configuration for successive augmentation.
///
/// # Examples
///
/// ```
/// use u_floorplan::decompose::DecomposeConfig;
///
/// let config = DecomposeConfig::default().with_chunk_size(8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecomposeConfig {
    /// Maximum number of modules per chunk.
    pub chunk_size: usize,

    /// Instances with fewer modules are rejected.
    pub min_modules: usize,

    /// Whether to solve chunks in parallel using rayon.
    ///
    /// Only takes effect when the `parallel` feature is enabled.
    pub parallel: bool,
}

impl Default for DecomposeConfig {
    fn default() -> Self {
        Self {
            chunk_size: 10,
            min_modules: 10,
            parallel: false,
        }
    }
}

impl DecomposeConfig {
    pub fn with_chunk_size(mut self, k: usize) -> Self {
        self.chunk_size = k;
        self
    }

    pub fn with_min_modules(mut self, n: usize) -> Self {
        self.min_modules = n;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be at least 1".into());
        }
        Ok(())
    }
}
