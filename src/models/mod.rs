// ============================================================================
// Module : models
// ============================================================================
// Structures de données du back-office : demandes, états, types de demande
// ============================================================================

pub mod demande; // Une demande (échange ou levée de fonds)
pub mod kind;    // Type de demande (onglet)
pub mod state;   // État d'une demande + mapping ByState

// Re-exports pour simplifier les imports
// On peut faire : use demandes::models::Demande;
pub use demande::{Client, Demande, Responsible};
pub use kind::DemandeKind;
pub use state::{ByState, DemandeState};
