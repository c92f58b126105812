// ============================================================================
// Dispatcher d'actions
// ============================================================================
// Envoie une mutation (état / livrer) au backend puis fusionne la réponse
// dans la vue locale.
//
// Règles :
// - la valeur renvoyée par le serveur fait foi (pas la valeur demandée)
// - en cas d'erreur, rien n'est modifié localement
// - pas de mise à jour optimiste, pas de retry, pas de dédoublonnage
//
// CONCEPT RUST : Arc<dyn Trait>
// - Le même service est partagé entre l'UI et le worker thread
// - dyn DemandeService : le client HTTP ou le backend en mémoire
// ============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::DemandeService;
use crate::listing::{ListView, Mutation};
use crate::models::{Demande, DemandeState};

/// Dispatcher lié à un backend
#[derive(Clone)]
pub struct ActionDispatcher {
    service: Arc<dyn DemandeService>,
}

impl ActionDispatcher {
    /// Crée un dispatcher pour un backend
    pub fn new(service: Arc<dyn DemandeService>) -> Self {
        Self { service }
    }

    /// Charge toute la collection
    pub async fn fetch(&self) -> Result<Vec<Demande>> {
        self.service
            .get_all()
            .await
            .context("Échec du chargement des demandes")
    }

    /// Envoie une mutation, retourne la demande renvoyée par le serveur
    pub async fn send(&self, id: i64, mutation: Mutation) -> Result<Demande> {
        let result = match mutation {
            Mutation::Status(status) => self.service.update_status(id, status).await,
            Mutation::Deliverable(flag) => self.service.update_deliverable(id, flag).await,
        };

        match &result {
            Ok(echo) => info!(id, ?mutation, echoed_state = %echo.state, "Mutation accepted"),
            Err(e) => warn!(id, ?mutation, error = %e, "Mutation failed, local state left unchanged"),
        }

        result.with_context(|| format!("Échec de la mise à jour de la demande {}", id))
    }

    /// Change l'état d'une demande et fusionne la réponse dans `view`
    ///
    /// Retourne true si une demande locale a été mise à jour.
    pub async fn set_status(&self, view: &mut ListView, id: i64, status: DemandeState) -> Result<bool> {
        let mutation = Mutation::Status(status);
        let echo = self.send(id, mutation).await?;
        Ok(view.merge_echo(id, mutation, &echo))
    }

    /// Change l'indicateur "livrer" et fusionne la réponse dans `view`
    pub async fn set_deliverable(&self, view: &mut ListView, id: i64, deliverable: bool) -> Result<bool> {
        let mutation = Mutation::Deliverable(deliverable);
        let echo = self.send(id, mutation).await?;
        Ok(view.merge_echo(id, mutation, &echo))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
