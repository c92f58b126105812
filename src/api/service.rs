// ============================================================================
// Trait : DemandeService
// ============================================================================
// Contrat du backend distant pour une collection de demandes
//
// CONCEPTS RUST :
// 1. Trait = interface : le client HTTP et le backend en mémoire
//    l'implémentent tous les deux
// 2. #[async_trait] : méthodes async dans un trait utilisable via Arc<dyn ...>
// 3. Send + Sync : le service est partagé avec le worker thread
// ============================================================================

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Demande, DemandeState};

/// Backend d'une collection de demandes
#[async_trait]
pub trait DemandeService: Send + Sync {
    /// Récupère toute la collection
    async fn get_all(&self) -> Result<Vec<Demande>>;

    /// Change l'état d'une demande, retourne la demande renvoyée par le serveur
    async fn update_status(&self, id: i64, status: DemandeState) -> Result<Demande>;

    /// Change l'indicateur "livrer", retourne la demande renvoyée par le serveur
    async fn update_deliverable(&self, id: i64, deliverable: bool) -> Result<Demande>;
}
