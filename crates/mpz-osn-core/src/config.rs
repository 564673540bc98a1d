use derive_builder::Builder;
use mpz_common::cpu::default_parallelism;

const DEFAULT_FORK_THRESHOLD: usize = 256;

/// Random OSN configuration.
#[derive(Debug, Clone, Builder)]
pub struct ROSNConfig {
    /// Maximum number of threads used to build or apply the network.
    ///
    /// A value of `1` runs the network sequentially.
    #[builder(default = "default_parallelism()")]
    max_parallelism: usize,
    /// Minimum number of wires of a sub-network for it to be considered for
    /// parallel execution.
    #[builder(default = "DEFAULT_FORK_THRESHOLD")]
    fork_threshold: usize,
}

impl Default for ROSNConfig {
    fn default() -> Self {
        Self {
            max_parallelism: default_parallelism(),
            fork_threshold: DEFAULT_FORK_THRESHOLD,
        }
    }
}

impl ROSNConfig {
    /// Creates a new builder for ROSNConfig.
    pub fn builder() -> ROSNConfigBuilder {
        ROSNConfigBuilder::default()
    }

    /// Returns the maximum number of threads.
    pub fn max_parallelism(&self) -> usize {
        self.max_parallelism
    }

    /// Returns the minimum sub-network size considered for parallel execution.
    pub fn fork_threshold(&self) -> usize {
        self.fork_threshold
    }
}
