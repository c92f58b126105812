// ============================================================================
// Module : api
// ============================================================================
// Accès au backend du back-office : contrat, client HTTP, backend en mémoire
// et dispatcher des actions (valider / annuler / livrer)
// ============================================================================

pub mod dispatcher; // Envoi des mutations + fusion de la réponse
pub mod http;       // Client HTTP (reqwest)
pub mod memory;     // Backend en mémoire (hors-ligne, tests)
pub mod service;    // Trait DemandeService

// Re-exports des types principaux
pub use dispatcher::ActionDispatcher;
pub use http::HttpDemandeService;
pub use memory::MemoryDemandeService;
pub use service::DemandeService;
