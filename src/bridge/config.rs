//! Bridge configuration.

/// When an idle source subscription is released.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReleasePolicy {
    /// Release on the next scheduler tick, unless the store is subscribed
    /// again first.
    #[default]
    Deferred,
    /// Release as soon as the last store subscriber leaves.
    Immediate,
}

/// Configuration for [`observable_to_store_with`](super::observable_to_store_with).
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// When to release the source subscription.
    /// Default: `Deferred`
    pub release: ReleasePolicy,

    /// Clear both stores once the source subscription is released.
    /// Default: true
    pub reset_on_release: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            release: ReleasePolicy::Deferred,
            reset_on_release: true,
        }
    }
}

impl BridgeConfig {
    /// Release synchronously, without a scheduler tick.
    pub fn immediate() -> Self {
        Self {
            release: ReleasePolicy::Immediate,
            ..Default::default()
        }
    }
}
