// ============================================================================
// Module : listing
// ============================================================================
// Pipeline de mise en forme des demandes chargées en mémoire :
// filtre → tri → pagination, réuni dans le composant ListView
// ============================================================================

pub mod filter;     // Classifieur (filtres code / date + répartition par état)
pub mod pagination; // Paginateur
pub mod sort;       // Trieur
pub mod view;       // Composant ListView

// Re-exports
pub use filter::{classify, Filters};
pub use pagination::{Pagination, DEFAULT_PAGE_SIZE};
pub use sort::{SortDirection, SortField};
pub use view::{ListView, Mutation, StateList};
