// ============================================================================
// Demandes - Library
// ============================================================================
// Expose les modules publics pour le binaire TUI et les tests
// ============================================================================

pub mod api;     // Backend : trait, client HTTP, mémoire, dispatcher
pub mod app;     // État de l'application
pub mod config;  // Configuration (TOML + environnement)
pub mod listing; // Pipeline filtre → tri → pagination
pub mod models;  // Structures de données
pub mod ui;      // Interface utilisateur
pub mod worker;  // Worker thread des appels au backend
