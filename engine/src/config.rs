//! Engine Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{Context, Result};
use std::env;

use crate::reconcile::GrantPolicy;

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the REST API (e.g., `https://bi.example.com/Library`)
    pub store_url: String,

    /// Session token sent as `X-MSTR-AuthToken`
    pub auth_token: String,

    /// Project used when a request names none (optional)
    pub default_project_id: Option<String>,

    /// Transport timeout for a single store request in seconds (default: 30)
    pub request_timeout_secs: u64,

    /// Report a failed grant step as an error instead of recording it (default: false)
    pub strict_grants: bool,
}

impl EngineConfig {
    /// Load `.env` (if present) and then read the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            store_url: env::var("ACL_STORE_URL").context("ACL_STORE_URL must be set")?,
            auth_token: env::var("ACL_STORE_TOKEN").context("ACL_STORE_TOKEN must be set")?,
            default_project_id: env::var("ACL_STORE_PROJECT_ID")
                .ok()
                .filter(|v| !v.is_empty()),
            request_timeout_secs: env::var("ACL_STORE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            strict_grants: env::var("ACL_STRICT_GRANTS")
                .ok()
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    /// How reconcilers treat a failed grant step.
    #[must_use]
    pub const fn grant_policy(&self) -> GrantPolicy {
        if self.strict_grants {
            GrantPolicy::Propagate
        } else {
            GrantPolicy::Suppress
        }
    }

    /// Create a default configuration for testing.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            store_url: "http://localhost:8080/Library".into(),
            auth_token: "test-token".into(),
            default_project_id: None,
            request_timeout_secs: 5,
            strict_grants: false,
        }
    }
}
