//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! Server settings are loaded from environment variables at startup. The `.env`
//! file is used for local development. Partner catalogs are declared in a TOML
//! file so a new partner can be onboarded without a code change.

use crate::adapters::partner::PartnerConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{warn, Level};

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
    #[error("Invalid partner configuration in {0}: {1}")]
    Partners(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: Level,
    /// Label of the institution that owns the internal catalog.
    pub home_institution: String,
    pub partners_path: PathBuf,
    /// Default per-request timeout for partner catalogs.
    pub partner_timeout: Duration,
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", 5u32)?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Catalog Settings ---
        let home_institution = std::env::var("HOME_INSTITUTION")
            .unwrap_or_else(|_| "Biblioteca Universidad Gustambo".to_string());

        let partners_path = std::env::var("PARTNERS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./partners.toml"));

        let partner_timeout = Duration::from_millis(parse_var("PARTNER_TIMEOUT_MS", 5000u64)?);

        let cors_allowed_origin = std::env::var("CORS_ALLOWED_ORIGIN")
            .ok()
            .filter(|origin| !origin.trim().is_empty());

        Ok(Self {
            bind_address,
            database_url,
            db_max_connections,
            log_level,
            home_institution,
            partners_path,
            partner_timeout,
            cors_allowed_origin,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

//=========================================================================================
// Partner Catalog File
//=========================================================================================

#[derive(Debug, Deserialize)]
struct PartnersFile {
    #[serde(default, rename = "partner")]
    partners: Vec<PartnerConfig>,
}

/// Parses the `[[partner]]` tables of a partners file.
pub fn parse_partners(source: &str, origin: &str) -> Result<Vec<PartnerConfig>, ConfigError> {
    let file: PartnersFile = toml::from_str(source)
        .map_err(|e| ConfigError::Partners(origin.to_string(), e.to_string()))?;

    let mut seen = std::collections::HashSet::new();
    for partner in &file.partners {
        if partner.key.trim().is_empty() || partner.label.trim().is_empty() {
            return Err(ConfigError::Partners(
                origin.to_string(),
                "every partner needs a key and a label".to_string(),
            ));
        }
        if !seen.insert(partner.key.to_lowercase()) {
            return Err(ConfigError::Partners(
                origin.to_string(),
                format!("duplicate partner key '{}'", partner.key),
            ));
        }
    }
    Ok(file.partners)
}

/// Loads partner definitions from `path`. A missing file means no partners.
pub fn load_partners(path: &Path) -> Result<Vec<PartnerConfig>, ConfigError> {
    let origin = path.display().to_string();
    match std::fs::read_to_string(path) {
        Ok(source) => parse_partners(&source, &origin),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Partners file {} not found; searching the internal catalog only", origin);
            Ok(Vec::new())
        }
        Err(e) => Err(ConfigError::Partners(origin, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [[partner]]
        key = "unam"
        label = "Universidad Nacional Autónoma de México"
        aliases = ["UNAM"]
        search_url = "http://unam.example/api/libros"
        search_param = "busqueda"
        item_url = "http://unam.example/api/libros"
        fallback_author = "UNAM"

        [partner.fields]
        id = ["id", "uuid"]
        title = ["titulo", "title"]
        cover_image = ["portadaBase64", "portadaUrl", "imageUrl"]

        [[partner]]
        key = "oxford"
        label = "Oxford University"
        search_url = "http://oxford.example/libro/getAllLibro"
        timeout_ms = 2500
    "#;

    #[test]
    fn parses_partner_tables_in_order() {
        let partners = parse_partners(SAMPLE, "sample").unwrap();

        assert_eq!(partners.len(), 2);
        assert_eq!(partners[0].key, "unam");
        assert_eq!(partners[0].search_param, "busqueda");
        assert_eq!(partners[0].fields.cover_image[0], "portadaBase64");
        assert_eq!(partners[1].key, "oxford");
        assert_eq!(partners[1].search_param, "q");
        assert_eq!(partners[1].timeout_ms, Some(2500));
        assert!(partners[1].item_url.is_none());
    }

    #[test]
    fn rejects_duplicate_keys() {
        let doubled = format!("{SAMPLE}\n[[partner]]\nkey = \"UNAM\"\nlabel = \"x\"\nsearch_url = \"http://x\"\n");
        assert!(matches!(parse_partners(&doubled, "sample"), Err(ConfigError::Partners(_, _))));
    }

    #[test]
    fn missing_file_means_no_partners() {
        let partners = load_partners(Path::new("/definitely/not/here/partners.toml")).unwrap();
        assert!(partners.is_empty());
    }

    #[test]
    fn shipped_partners_file_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../partners.toml");
        let partners = load_partners(&path).unwrap();
        let keys: Vec<_> = partners.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["utl", "unam", "oxford"]);
    }
}
