use log::debug;

use crate::error::{ProductError, Result};

/// Default row count above which a product may be assigned in parallel.
pub const DEFAULT_SMP_THRESHOLD: usize = 3025;

/// Environment variable enabling or disabling the loop-unrolled kernels.
pub const ENV_OPTIMIZED_KERNELS: &str = "SPX_OPTIMIZED_KERNELS";

/// Environment variable overriding the parallel assignment threshold.
pub const ENV_SMP_THRESHOLD: &str = "SPX_SMP_THRESHOLD";

/// Tuning knobs for evaluating a dense x sparse product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductConfig {
    /// Allow the loop-unrolled kernels when they are legal.
    pub use_optimized_kernels: bool,
    /// A product is eligible for parallel assignment only if it has more
    /// rows than this.
    pub smp_threshold: usize,
}

impl Default for ProductConfig {
    fn default() -> Self {
        ProductConfig {
            use_optimized_kernels: true,
            smp_threshold: DEFAULT_SMP_THRESHOLD,
        }
    }
}

impl ProductConfig {
    /// Read the configuration from the process environment.
    ///
    /// Reads the following keys:
    /// - `SPX_OPTIMIZED_KERNELS` -> use_optimized_kernels (`1/0/true/false/on/off`)
    /// - `SPX_SMP_THRESHOLD` -> smp_threshold (unsigned integer)
    ///
    /// Unset keys keep their defaults.
    pub fn from_env() -> Result<ProductConfig> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<ProductConfig> {
        let mut config = ProductConfig::default();

        if let Some(raw) = lookup(ENV_OPTIMIZED_KERNELS) {
            config.use_optimized_kernels = parse_flag(ENV_OPTIMIZED_KERNELS, &raw)?;
            debug!(
                "{} overrides use_optimized_kernels = {}",
                ENV_OPTIMIZED_KERNELS, config.use_optimized_kernels
            );
        }

        if let Some(raw) = lookup(ENV_SMP_THRESHOLD) {
            config.smp_threshold = raw.trim().parse().map_err(|e| ProductError::Config {
                key: ENV_SMP_THRESHOLD.to_string(),
                value: raw.clone(),
                reason: format!("{}", e),
            })?;
            debug!(
                "{} overrides smp_threshold = {}",
                ENV_SMP_THRESHOLD, config.smp_threshold
            );
        }

        Ok(config)
    }

    pub fn with_optimized_kernels(mut self, enabled: bool) -> Self {
        self.use_optimized_kernels = enabled;
        self
    }

    pub fn with_smp_threshold(mut self, threshold: usize) -> Self {
        self.smp_threshold = threshold;
        self
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(ProductError::Config {
            key: key.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean flag".to_string(),
        }),
    }
}
