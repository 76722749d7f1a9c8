//! Host configuration loaded from environment variables.

use serde::Deserialize;

/// Host configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Module Location ===
    /// Path to the module root directory (contains module.toml).
    #[serde(default = "default_module_root")]
    pub module_root: String,

    // === Host Capabilities ===
    /// Modules the host itself provides, satisfying manifest dependencies.
    #[serde(default = "default_host_modules")]
    pub host_modules: Vec<String>,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_module_root() -> String {
    "magento_cegid_dashboard".to_string()
}

fn default_host_modules() -> Vec<String> {
    vec!["base".to_string(), "web".to_string()]
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.module_root.trim().is_empty() {
            return Err("MODULE_ROOT must not be empty".to_string());
        }

        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        if self.host_modules.is_empty() {
            return Err("HOST_MODULES must list at least one module".to_string());
        }

        if self.host_modules.iter().any(|m| m.trim().is_empty()) {
            return Err("HOST_MODULES entries must not be empty".to_string());
        }

        Ok(())
    }
}
