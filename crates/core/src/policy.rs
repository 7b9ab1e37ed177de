//! Tunable booking rules.

use fleetrent_shared::RentalConfig;

/// Rules the catalog applies when booking, returning and reminding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentalPolicy {
    /// Days kept free on both sides of an existing booking.
    pub buffer_days: u32,
    /// Unresolved issues at or above this severity ground the vehicle.
    pub critical_severity: u8,
    /// Severity recorded for damage reported at return.
    pub default_damage_severity: u8,
    /// Window (in days before the end date) for due-soon reminders.
    pub due_soon_days: u32,
}

impl Default for RentalPolicy {
    fn default() -> Self {
        Self {
            buffer_days: 2,
            critical_severity: 4,
            default_damage_severity: 3,
            due_soon_days: 1,
        }
    }
}

impl From<&RentalConfig> for RentalPolicy {
    fn from(config: &RentalConfig) -> Self {
        Self {
            buffer_days: config.buffer_days,
            critical_severity: config.critical_severity,
            default_damage_severity: config.default_damage_severity,
            due_soon_days: config.due_soon_days,
        }
    }
}
