// ============================================================================
// Configuration
// ============================================================================
// Paramètres de l'application, lus dans cet ordre :
// 1. valeurs par défaut
// 2. fichier TOML ($DEMANDES_CONFIG ou ~/.config/demandes/config.toml)
// 3. variables d'environnement DEMANDES_*
//
// CONCEPTS RUST :
// 1. #[serde(default)] : tout champ absent du fichier garde sa valeur par défaut
// 2. Option + ? : un fichier absent n'est pas une erreur
// ============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::listing::DEFAULT_PAGE_SIZE;
use crate::models::DemandeKind;

/// Nom de l'application (dossiers de config et de logs)
pub const APP_NAME: &str = "demandes";

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL de base de l'API du back-office
    pub api_base_url: String,

    /// Ressource REST des échanges
    pub echange_resource: String,

    /// Ressource REST des levées de fonds
    pub leveefond_resource: String,

    /// Nombre de demandes par page
    pub page_size: usize,

    /// Timeout des requêtes HTTP, en secondes
    pub request_timeout_secs: u64,

    /// Mode hors-ligne : backend en mémoire avec des demandes de démonstration
    pub offline: bool,

    /// Dossier des fichiers de logs
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            echange_resource: DemandeKind::Echange.default_resource().to_string(),
            leveefond_resource: DemandeKind::LeveeFond.default_resource().to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: 10,
            offline: false,
            log_dir: PathBuf::from("./logs"),
        }
    }
}

impl Config {
    /// Charge la configuration complète (fichier puis environnement)
    pub fn load() -> Result<Self> {
        let path = std::env::var_os("DEMANDES_CONFIG")
            .map(PathBuf::from)
            .or_else(default_config_path);

        let config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Lit un fichier TOML
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Reading configuration file");
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Impossible de lire {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Configuration invalide dans {}", path.display()))
    }

    /// Parse une configuration TOML
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Échec du parsing TOML")?;
        Ok(config.normalized())
    }

    /// Applique les variables d'environnement
    ///
    /// `lookup` est injecté pour pouvoir tester sans toucher à l'environnement
    /// du processus. Une valeur illisible est ignorée.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("DEMANDES_API_URL") {
            self.api_base_url = url;
        }
        if let Some(size) = lookup("DEMANDES_PAGE_SIZE").and_then(|v| v.parse().ok()) {
            self.page_size = size;
        }
        if let Some(offline) = lookup("DEMANDES_OFFLINE").and_then(|v| parse_flag(&v)) {
            self.offline = offline;
        }
        if let Some(dir) = lookup("DEMANDES_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        self.normalized()
    }

    /// Ressource REST d'un type de demande
    pub fn resource(&self, kind: DemandeKind) -> &str {
        match kind {
            DemandeKind::Echange => &self.echange_resource,
            DemandeKind::LeveeFond => &self.leveefond_resource,
        }
    }

    fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self
    }
}

/// ~/.config/demandes/config.toml (selon l'OS)
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.resource(DemandeKind::Echange), "echanges");
        assert_eq!(config.resource(DemandeKind::LeveeFond), "leveefonds");
        assert!(!config.offline);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            api_base_url = "https://backoffice.example.com/api/"
            leveefond_resource = "leveefond"
            page_size = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "https://backoffice.example.com/api");
        assert_eq!(config.resource(DemandeKind::LeveeFond), "leveefond");
        assert_eq!(config.resource(DemandeKind::Echange), "echanges");
        // Une taille nulle est ramenée à 1
        assert_eq!(config.page_size, 1);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml("page_size = \"cinq\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DEMANDES_API_URL", "http://10.0.0.2:9000"),
            ("DEMANDES_PAGE_SIZE", "10"),
            ("DEMANDES_OFFLINE", "yes"),
        ]
        .into_iter()
        .collect();

        let config = Config::default()
            .with_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "http://10.0.0.2:9000");
        assert_eq!(config.page_size, 10);
        assert!(config.offline);
    }

    #[test]
    fn test_unreadable_env_values_are_ignored() {
        let config = Config::default().with_env_overrides(|key| match key {
            "DEMANDES_PAGE_SIZE" => Some("beaucoup".to_string()),
            "DEMANDES_OFFLINE" => Some("peut-être".to_string()),
            _ => None,
        });

        assert_eq!(config.page_size, 5);
        assert!(!config.offline);
    }
}
