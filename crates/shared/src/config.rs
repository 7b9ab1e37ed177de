//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Snapshot storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Booking and reminder rules.
    #[serde(default)]
    pub rental: RentalConfig,
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

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Snapshot storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the vehicle, rental and ticket snapshots.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

/// Booking and reminder rules.
#[derive(Debug, Clone, Deserialize)]
pub struct RentalConfig {
    /// Turnaround days kept free on both sides of another renter's booking.
    #[serde(default = "default_buffer_days")]
    pub buffer_days: u32,
    /// Minimum severity (1-5) at which an unresolved issue grounds a vehicle.
    #[serde(default = "default_critical_severity")]
    pub critical_severity: u8,
    /// Severity recorded for damage reported at return time.
    #[serde(default = "default_damage_severity")]
    pub default_damage_severity: u8,
    /// Days before the end date at which a due-soon reminder fires.
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: u32,
    /// Interval between reminder sweeps.
    #[serde(default = "default_reminder_interval")]
    pub reminder_interval_secs: u64,
}

impl Default for RentalConfig {
    fn default() -> Self {
        Self {
            buffer_days: default_buffer_days(),
            critical_severity: default_critical_severity(),
            default_damage_severity: default_damage_severity(),
            due_soon_days: default_due_soon_days(),
            reminder_interval_secs: default_reminder_interval(),
        }
    }
}

fn default_buffer_days() -> u32 {
    2
}

fn default_critical_severity() -> u8 {
    4
}

fn default_damage_severity() -> u8 {
    3
}

fn default_due_soon_days() -> u32 {
    1
}

fn default_reminder_interval() -> u64 {
    3600 // 1 hour
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
            .add_source(config::Environment::with_prefix("FLEETRENT").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
