// ============================================================================
// API Client : back-office HTTP
// ============================================================================
// Implémente DemandeService au-dessus de l'API REST du back-office
//
//   GET  {base}/{ressource}                 → liste complète
//   PUT  {base}/{ressource}/{id}/status     {"state": "valider"}
//   PUT  {base}/{ressource}/{id}/livrer     {"livrer": true}
//
// CONCEPTS RUST :
// 1. async/await : appels réseau non-bloquants
// 2. Result + Context (anyhow) : erreurs avec message lisible
// 3. Serde : désérialisation JSON directe vers Demande
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, error, info, instrument};

use crate::api::DemandeService;
use crate::config::Config;
use crate::models::{Demande, DemandeKind, DemandeState};

/// Client HTTP pour une collection de demandes
pub struct HttpDemandeService {
    /// Client reqwest (pool de connexions réutilisé)
    client: Client,

    /// URL de la collection, ex: "http://localhost:8080/api/echanges"
    collection_url: String,
}

impl HttpDemandeService {
    /// Crée le client pour un type de demande
    pub fn new(config: &Config, kind: DemandeKind) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("demandes/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            client,
            collection_url: build_collection_url(&config.api_base_url, config.resource(kind)),
        })
    }

    /// URL de la collection
    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    /// PUT d'un champ sur une demande
    async fn put(&self, id: i64, action: &str, body: serde_json::Value) -> Result<Demande> {
        let url = format!("{}/{}/{}", self.collection_url, id, action);
        debug!(url = %url, body = %body, "Sending update request");

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Échec de la requête HTTP vers {}", url))?;

        parse_json(response, &url).await
    }
}

#[async_trait]
impl DemandeService for HttpDemandeService {
    #[instrument(skip(self), fields(url = %self.collection_url))]
    async fn get_all(&self) -> Result<Vec<Demande>> {
        debug!("Fetching all demandes");
        let response = self
            .client
            .get(&self.collection_url)
            .send()
            .await
            .with_context(|| format!("Échec de la requête HTTP vers {}", self.collection_url))?;

        let demandes: Vec<Demande> = parse_json(response, &self.collection_url).await?;
        info!(count = demandes.len(), "Fetched demandes");
        Ok(demandes)
    }

    #[instrument(skip(self), fields(url = %self.collection_url))]
    async fn update_status(&self, id: i64, status: DemandeState) -> Result<Demande> {
        self.put(id, "status", json!({ "state": status })).await
    }

    #[instrument(skip(self), fields(url = %self.collection_url))]
    async fn update_deliverable(&self, id: i64, deliverable: bool) -> Result<Demande> {
        self.put(id, "livrer", json!({ "livrer": deliverable })).await
    }
}

/// Construit l'URL d'une collection sans double "/"
fn build_collection_url(base: &str, resource: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        resource.trim_matches('/')
    )
}

/// Vérifie le statut HTTP puis désérialise le corps JSON
async fn parse_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T> {
    let status = response.status();
    debug!(status = %status, "Received HTTP response");

    // Vérifie que la réponse est un succès HTTP (200-299)
    if !status.is_success() {
        error!(status = %status, url = %url, "Backend returned error status");
        anyhow::bail!("Le back-office a retourné une erreur : HTTP {} ({})", status, url);
    }

    response
        .json::<T>()
        .await
        .with_context(|| format!("Échec du parsing JSON de la réponse de {}", url))
}

// ============================================================================
// Tests unitaires
// ============================================================================
