//! Deterministic random seeds derived from a params file and string keys.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Contents of the params file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Random number generation settings
    pub random: RandomParams,
}

/// Random number generation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomParams {
    /// Base seed every derived seed starts from
    pub seed: u64,
}

impl Params {
    /// Load params from `path`; a missing file yields seed 0 with a warning.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("params file {} not found, using seed 0", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|error| {
            Error::Config(format!("Failed to read params {}: {error}", path.display()))
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Seed for the operation named by `keys`.
    pub fn derive(&self, keys: &[&str]) -> u64 {
        derive_seed(self.random.seed, keys)
    }
}

/// Mix a base seed with string keys into a new 64-bit seed.
///
/// The derivation is a SHA-256 over the little-endian base seed followed by each key and a
/// zero separator, so it is stable across platforms and releases.
pub fn derive_seed(base: u64, keys: &[&str]) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    for key in keys {
        hasher.update(key.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let seed = u64::from_le_bytes(head);
    debug!("derived seed {seed} from base {base} and keys {keys:?}");
    seed
}
