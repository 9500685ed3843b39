//! Emulator configuration.

use std::env;

/// Emulator configuration.
#[derive(Debug, Clone)]
pub struct DynamockConfig {
    /// Region used when building table ARNs.
    pub default_region: String,
    /// Tables created at startup, each with hash key `id` (S) and 5/5
    /// provisioned throughput.
    pub seed_tables: Vec<String>,
}

impl DynamockConfig {
    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            default_region: env::var("DEFAULT_REGION").unwrap_or_else(|_| "us-east-1".to_owned()),
            seed_tables: env::var("DYNAMOCK_SEED_TABLES")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
        }
    }
}

impl Default for DynamockConfig {
    fn default() -> Self {
        Self {
            default_region: "us-east-1".to_owned(),
            seed_tables: Vec::new(),
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
