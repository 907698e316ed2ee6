use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for the message bus and for logging.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bus: BusSettings,
    pub logging: LoggingSettings,
}

/// Configuration settings for the message bus.
///
/// `default_queue_length` is the capacity given to subscribers created
/// without an explicit one. `0` means unbounded.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BusSettings {
    pub default_queue_length: usize,
}

/// Configuration settings for logging.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub bus: Option<PartialBusSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBusSettings {
    pub default_queue_length: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            default_queue_length: 16,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Provides default values for `Settings`.
impl Default for Settings {
    fn default() -> Self {
        Self {
            bus: BusSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl PartialSettings {
    /// Fills every missing value from `Settings::default()`.
    pub fn merge_with_defaults(self) -> Settings {
        let default = Settings::default();

        Settings {
            bus: BusSettings {
                default_queue_length: self
                    .bus
                    .as_ref()
                    .and_then(|b| b.default_queue_length)
                    .unwrap_or(default.bus.default_queue_length),
            },
            logging: LoggingSettings {
                level: self
                    .logging
                    .and_then(|l| l.level)
                    .unwrap_or(default.logging.level),
            },
        }
    }
}
