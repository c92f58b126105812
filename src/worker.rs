// ============================================================================
// Background Worker
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des AppCommand au worker thread
// - Le worker exécute les appels au backend (async, dans son runtime tokio)
// - Les AppResult reviennent par un second channel, lus avec try_recv
//
// Les commandes sont traitées une par une, dans l'ordre d'arrivée.
// Pas d'annulation ni de dédoublonnage : deux validations rapides de la même
// demande partent toutes les deux.
// ============================================================================

use std::collections::HashMap;
use std::sync::mpsc;
use std::thread::JoinHandle;

use tracing::{error, info};

use crate::api::ActionDispatcher;
use crate::listing::Mutation;
use crate::models::{Demande, DemandeKind};

/// Commandes envoyées au worker thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// (Re)charger toute la collection d'un type de demande
    Fetch { kind: DemandeKind },

    /// Envoyer une mutation pour une demande
    Mutate {
        kind: DemandeKind,
        id: i64,
        mutation: Mutation,
    },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
pub enum AppResult {
    /// Collection chargée
    Loaded {
        kind: DemandeKind,
        demandes: Vec<Demande>,
    },

    /// Échec du chargement
    LoadError { kind: DemandeKind, error: String },

    /// Mutation acceptée, `echo` est la demande renvoyée par le serveur
    Mutated {
        kind: DemandeKind,
        id: i64,
        mutation: Mutation,
        echo: Demande,
    },

    /// Échec de la mutation
    MutationError {
        kind: DemandeKind,
        id: i64,
        error: String,
    },
}

/// Exécute une commande et construit le résultat correspondant
pub async fn execute(dispatcher: &ActionDispatcher, command: AppCommand) -> AppResult {
    match command {
        AppCommand::Fetch { kind } => match dispatcher.fetch().await {
            Ok(demandes) => {
                info!(kind = kind.label(), count = demandes.len(), "Demandes loaded");
                AppResult::Loaded { kind, demandes }
            }
            Err(e) => {
                error!(kind = kind.label(), error = ?e, "Failed to load demandes");
                AppResult::LoadError {
                    kind,
                    error: format!("{:#}", e),
                }
            }
        },
        AppCommand::Mutate { kind, id, mutation } => match dispatcher.send(id, mutation).await {
            Ok(echo) => AppResult::Mutated {
                kind,
                id,
                mutation,
                echo,
            },
            Err(e) => {
                error!(kind = kind.label(), id, error = ?e, "Failed to update demande");
                AppResult::MutationError {
                    kind,
                    id,
                    error: format!("{:#}", e),
                }
            }
        },
    }
}

/// Lance le worker thread
///
/// CONCEPT RUST : Thread + async runtime
/// - std::thread::spawn() : crée un thread OS
/// - tokio::runtime::Runtime : runtime async propre à ce thread
/// - La boucle s'arrête quand le Sender des commandes est fermé
pub fn spawn_background_worker(
    dispatchers: HashMap<DemandeKind, ActionDispatcher>,
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to create tokio runtime, worker not started");
                return;
            }
        };

        // Boucle de traitement des commandes
        // - recv() bloque le worker (pas l'UI)
        // - Err : channel fermé, on quitte
        while let Ok(command) = command_rx.recv() {
            info!(?command, "Worker received command");

            let kind = match &command {
                AppCommand::Fetch { kind } | AppCommand::Mutate { kind, .. } => *kind,
            };
            let Some(dispatcher) = dispatchers.get(&kind) else {
                error!(kind = kind.label(), "No backend configured for this kind");
                continue;
            };

            let result = runtime.block_on(execute(dispatcher, command));
            if result_tx.send(result).is_err() {
                // L'UI est partie
                break;
            }
        }

        info!("Worker thread exiting (channel closed)");
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryDemandeService;
    use crate::models::DemandeState;
    use std::sync::Arc;
    use std::time::Duration;

    fn dispatcher(service: Arc<MemoryDemandeService>) -> ActionDispatcher {
        ActionDispatcher::new(service)
    }

    #[tokio::test]
    async fn test_execute_fetch_and_mutate() {
        let service = Arc::new(MemoryDemandeService::new(vec![Demande::new(
            3,
            DemandeState::Pending,
        )]));
        let dispatcher = dispatcher(service);

        let loaded = execute(&dispatcher, AppCommand::Fetch { kind: DemandeKind::Echange }).await;
        assert!(matches!(loaded, AppResult::Loaded { ref demandes, .. } if demandes.len() == 1));

        let mutated = execute(
            &dispatcher,
            AppCommand::Mutate {
                kind: DemandeKind::Echange,
                id: 3,
                mutation: Mutation::Status(DemandeState::Validated),
            },
        )
        .await;
        match mutated {
            AppResult::Mutated { id, echo, .. } => {
                assert_eq!(id, 3);
                assert_eq!(echo.state, DemandeState::Validated);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_reports_errors() {
        let service = Arc::new(MemoryDemandeService::default());
        service.set_failing(true);
        let dispatcher = dispatcher(service);

        let result = execute(&dispatcher, AppCommand::Fetch { kind: DemandeKind::LeveeFond }).await;
        match result {
            AppResult::LoadError { kind, error } => {
                assert_eq!(kind, DemandeKind::LeveeFond);
                assert!(error.contains("indisponible"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_worker_thread_round_trip() {
        let service = Arc::new(MemoryDemandeService::demo(DemandeKind::Echange));
        let dispatchers: HashMap<_, _> = [(DemandeKind::Echange, dispatcher(service))]
            .into_iter()
            .collect();
        let (command_tx, command_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();

        let handle = spawn_background_worker(dispatchers, command_rx, result_tx);
        command_tx
            .send(AppCommand::Fetch { kind: DemandeKind::Echange })
            .unwrap();

        let result = result_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(result, AppResult::Loaded { kind: DemandeKind::Echange, .. }));

        // Fermer le channel arrête le worker
        drop(command_tx);
        handle.join().unwrap();
    }
}
