// ============================================================================
// Backend en mémoire
// ============================================================================
// Implémente DemandeService sans réseau :
// - mode hors-ligne de l'application (config `offline = true`)
// - tests du dispatcher et de l'intégration
//
// CONCEPTS RUST :
// 1. Mutex<Vec<T>> : état partagé modifiable derrière &self
// 2. AtomicBool : interrupteur de panne sans verrou
// ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use tracing::debug;

use crate::api::DemandeService;
use crate::models::{Demande, DemandeKind, DemandeState};

/// Backend en mémoire
#[derive(Debug, Default)]
pub struct MemoryDemandeService {
    demandes: Mutex<Vec<Demande>>,
    failing: AtomicBool,
}

impl MemoryDemandeService {
    /// Crée un backend contenant `demandes`
    pub fn new(demandes: Vec<Demande>) -> Self {
        Self {
            demandes: Mutex::new(demandes),
            failing: AtomicBool::new(false),
        }
    }

    /// Jeu de démonstration pour le mode hors-ligne
    ///
    /// 23 demandes réparties sur les trois états, quelques-unes sans client
    /// ou sans responsable.
    pub fn demo(kind: DemandeKind) -> Self {
        let prefix = match kind {
            DemandeKind::Echange => "ECH",
            DemandeKind::LeveeFond => "LVF",
        };
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).single().unwrap_or_default();

        let demandes = (1..=23)
            .map(|i: i64| {
                let state = match i % 4 {
                    0 => DemandeState::Validated,
                    3 => DemandeState::Cancelled,
                    _ => DemandeState::Pending,
                };
                let mut demande = Demande::new(i, state)
                    .with_created_at(start + Duration::hours(i * 20));
                if i % 7 != 0 {
                    demande = demande.with_client(format!("CL{:03}", (i * 37) % 100));
                }
                if i % 5 != 0 {
                    demande = demande.with_responsible(format!("R{}", i % 3 + 1));
                }
                demande.deliverable = state == DemandeState::Validated && i % 8 == 0;
                demande
                    .extra
                    .insert("reference".to_string(), format!("{}-{:04}", prefix, i).into());
                demande
            })
            .collect();

        Self::new(demandes)
    }

    /// Simule une panne : toutes les requêtes échouent
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Copie de l'état côté "serveur"
    pub fn snapshot(&self) -> Vec<Demande> {
        self.lock().map(|d| d.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Demande>>> {
        self.demandes
            .lock()
            .map_err(|_| anyhow!("Backend en mémoire inutilisable (mutex empoisonné)"))
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("Backend en mémoire indisponible");
        }
        Ok(())
    }

    /// Applique une modification et renvoie la demande mise à jour
    fn update(&self, id: i64, apply: impl FnOnce(&mut Demande)) -> Result<Demande> {
        self.check_available()?;
        let mut demandes = self.lock()?;
        let demande = demandes
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| anyhow!("Demande {} introuvable", id))?;
        apply(demande);
        Ok(demande.clone())
    }
}

#[async_trait]
impl DemandeService for MemoryDemandeService {
    async fn get_all(&self) -> Result<Vec<Demande>> {
        self.check_available()?;
        let demandes = self.lock()?.clone();
        debug!(count = demandes.len(), "Serving demandes from memory");
        Ok(demandes)
    }

    async fn update_status(&self, id: i64, status: DemandeState) -> Result<Demande> {
        self.update(id, |d| d.state = status)
    }

    async fn update_deliverable(&self, id: i64, deliverable: bool) -> Result<Demande> {
        self.update(id, |d| d.deliverable = deliverable)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
