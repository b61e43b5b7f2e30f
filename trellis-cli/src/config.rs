//! CLI configuration

/// Runtime configuration resolved from flags and environment
pub struct Config {
    pub server_url: String,
}
