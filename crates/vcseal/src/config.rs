//! Configuration for the inscription workflow.
//!
//! Built once at startup by the caller and passed down explicitly; nothing
//! in the library reads process environment.

use vcseal_core::DEFAULT_MAX_VC_SIZE;

/// Default amount committed to fund the reveal, in satoshis.
pub const DEFAULT_COMMIT_AMOUNT_SATS: u64 = 10_000;

/// Settings for the inscription workflow.
#[derive(Debug, Clone)]
pub struct InscriberConfig {
    /// Amount the commit transaction locks at the commit address, in sats.
    pub commit_amount_sats: u64,
    /// Limit on the canonical credential size, in bytes.
    pub max_vc_size: usize,
}

impl Default for InscriberConfig {
    fn default() -> Self {
        Self {
            commit_amount_sats: DEFAULT_COMMIT_AMOUNT_SATS,
            max_vc_size: DEFAULT_MAX_VC_SIZE,
        }
    }
}
