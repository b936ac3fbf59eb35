//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger gateway configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Ledger gateway configuration.
///
/// Anchoring is advisory: a misconfigured or unreachable gateway never
/// blocks debt or payment writes.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Soroban RPC endpoint.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Deployed debt-registry contract id.
    #[serde(default)]
    pub contract_id: String,
    /// Network passphrase the contract lives on.
    #[serde(default = "default_network_passphrase")]
    pub network_passphrase: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            contract_id: String::new(),
            network_passphrase: default_network_passphrase(),
        }
    }
}

fn default_rpc_url() -> String {
    "https://soroban-testnet.stellar.org:443".to_string()
}

fn default_network_passphrase() -> String {
    "Test SDF Network ; September 2015".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FIADO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
