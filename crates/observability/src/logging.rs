//! Logging-Setup fuer Anwendungen, die den Geheimpost-Kern einbetten
//!
//! Umgebungsvariablen ueberschreiben die Konfiguration:
//! - `GP_LOG_LEVEL`: Level oder komplette Filter-Direktive
//!   (z.B. `geheimpost_crypto=trace`)
//! - `GP_LOG_FORMAT`: `text` oder `json`
//!
//! Ohne Direktive loggen nur die Geheimpost-Crates auf dem gewaehlten
//! Level, alle anderen Crates ab `warn`.

use tracing_subscriber::{fmt, EnvFilter};

const ENV_LEVEL: &str = "GP_LOG_LEVEL";
const ENV_FORMAT: &str = "GP_LOG_FORMAT";

const GUELTIGE_LEVEL: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Ausgabeformat der Log-Zeilen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parsen(format: &str) -> Option<Self> {
        match format {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Filter-Direktive fuer ein einfaches Level
pub fn filter_direktive(level: &str) -> String {
    format!("warn,geheimpost_crypto={level},geheimpost_observability={level}")
}

/// Installiert den globalen Subscriber.
///
/// Gibt `false` zurueck, wenn bereits ein Subscriber aktiv war; der
/// bestehende bleibt dann unveraendert.
pub fn logging_initialisieren(level: &str, format: &str) -> bool {
    let filter = match std::env::var(ENV_LEVEL) {
        Ok(direktive) => EnvFilter::try_new(&direktive),
        Err(_) if log_level_gueltig(level) => EnvFilter::try_new(filter_direktive(level)),
        Err(_) => EnvFilter::try_new(level),
    }
    .unwrap_or_else(|_| EnvFilter::new(filter_direktive("info")));

    let format = std::env::var(ENV_FORMAT)
        .ok()
        .and_then(|f| LogFormat::parsen(&f))
        .or_else(|| LogFormat::parsen(format))
        .unwrap_or(LogFormat::Text);

    let ergebnis = match format {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .try_init(),
        LogFormat::Text => fmt().with_env_filter(filter).with_target(true).try_init(),
    };

    match ergebnis {
        Ok(()) => {
            tracing::debug!(?format, "Logging initialisiert");
            true
        }
        Err(_) => false,
    }
}

/// Log-Level aus der Umgebung, Fallback "info"
pub fn log_level_aus_env() -> String {
    std::env::var(ENV_LEVEL).unwrap_or_else(|_| "info".to_string())
}

/// Log-Format aus der Umgebung, Fallback "text"
pub fn log_format_aus_env() -> String {
    std::env::var(ENV_FORMAT).unwrap_or_else(|_| "text".to_string())
}

pub fn log_level_gueltig(level: &str) -> bool {
    GUELTIGE_LEVEL.contains(&level)
}

pub fn log_format_gueltig(format: &str) -> bool {
    LogFormat::parsen(format).is_some()
}
