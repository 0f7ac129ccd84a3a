//! # geheimpost-observability
//!
//! Structured Logging fuer Geheimpost-Anwendungen:
//! - Text- oder JSON-Ausgabe via tracing-subscriber
//! - Level/Format per Konfiguration oder Umgebungsvariable
//!
//! Der Krypto-Kern selbst loggt nur Metadaten (Laengen, Gruppen-IDs,
//! Epochen), niemals Schluesselmaterial oder Klartext.

pub mod logging;

pub use logging::{
    filter_direktive, log_format_aus_env, log_format_gueltig, log_level_aus_env,
    log_level_gueltig, logging_initialisieren, LogFormat,
};
