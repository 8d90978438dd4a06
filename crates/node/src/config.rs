//! Node configuration.

use liveness_escrow::GameLimits;
use serde::{Deserialize, Serialize};

/// Default domain tag mixed into every game id.
pub const DEFAULT_DOMAIN: &str = "liveness-escrow";

/// Configuration for an [`EscrowNode`](crate::EscrowNode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Admission limits applied to every new game.
    pub limits: GameLimits,

    /// Domain tag for game id derivation.
    ///
    /// Nodes with different domains never produce colliding game ids for the
    /// same challenger and nonce.
    pub domain: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            limits: GameLimits::default(),
            domain: DEFAULT_DOMAIN.to_string(),
        }
    }
}

impl NodeConfig {
    /// Set the admission limits.
    pub fn with_limits(mut self, limits: GameLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the domain tag.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }
}
