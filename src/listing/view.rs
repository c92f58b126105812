// ============================================================================
// Structure : ListView
// ============================================================================
// Composant réutilisable : une collection de demandes chargée en mémoire,
// ses filtres, et pour chaque état un sous-ensemble trié et paginé.
//
// Pipeline :
//   load → classify → paginate
//   filtre modifié   → classify → paginate (les trois états)
//   tri              → sort → paginate (un seul état)
//   changement page  → paginate (un seul état)
//
// CONCEPTS RUST :
// 1. Encapsulation : le Vec principal n'est modifiable que via les méthodes
// 2. ByState<T> : un sous-ensemble par état, sans triple if/else
// 3. Emprunts disjoints : on lit `demandes` pendant qu'on trie `subsets`
// ============================================================================

use std::collections::HashMap;

use tracing::debug;

use crate::listing::filter::{classify, Filters};
use crate::listing::pagination::Pagination;
use crate::listing::sort::{sort_indices, SortDirection, SortField};
use crate::models::{ByState, Demande, DemandeState};

/// Mutation demandée au backend pour une demande
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Nouvel état (valider / annuler)
    Status(DemandeState),

    /// Nouvel indicateur "livrer"
    Deliverable(bool),
}

/// Sous-ensemble d'un état : indices filtrés + pagination
#[derive(Debug, Clone)]
pub struct StateList {
    /// Positions dans ListView::demandes, dans l'ordre d'affichage
    indices: Vec<usize>,

    /// Pagination de ce sous-ensemble
    pagination: Pagination,
}

impl StateList {
    fn new(page_size: usize) -> Self {
        Self {
            indices: Vec::new(),
            pagination: Pagination::new(page_size),
        }
    }

    /// Nombre de demandes dans le sous-ensemble
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Sous-ensemble vide ?
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn repaginate(&mut self) {
        self.pagination.update(self.indices.len());
    }
}

/// Vue liste d'une collection de demandes
#[derive(Debug, Clone)]
pub struct ListView {
    /// Collection complète, telle que chargée
    demandes: Vec<Demande>,

    /// Filtres courants (communs aux trois états)
    filters: Filters,

    /// Un sous-ensemble par état
    subsets: ByState<StateList>,

    /// Sens de tri par colonne, partagé par les trois états
    sort_directions: HashMap<SortField, SortDirection>,

    /// Demande affichée dans la vue détail (par identifiant)
    selected: Option<i64>,
}

impl ListView {
    /// Crée une vue vide
    pub fn new(page_size: usize) -> Self {
        Self {
            demandes: Vec::new(),
            filters: Filters::default(),
            subsets: ByState::from_fn(|_| StateList::new(page_size)),
            sort_directions: HashMap::new(),
            selected: None,
        }
    }

    // ========================================================================
    // Chargement
    // ========================================================================

    /// Remplace la collection (chargement initial ou rechargement)
    pub fn load(&mut self, demandes: Vec<Demande>) {
        debug!(count = demandes.len(), "Loading demandes into list view");
        self.demandes = demandes;

        // La demande sélectionnée a pu disparaître
        if let Some(id) = self.selected {
            if self.find(id).is_none() {
                self.selected = None;
            }
        }

        self.apply_filters();
    }

    /// Toutes les demandes chargées
    pub fn demandes(&self) -> &[Demande] {
        &self.demandes
    }

    /// Cherche une demande par identifiant
    pub fn find(&self, id: i64) -> Option<&Demande> {
        self.demandes.iter().find(|d| d.id == id)
    }

    // ========================================================================
    // Classification et filtres
    // ========================================================================

    /// Filtres courants
    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Change le filtre code et reclasse
    pub fn set_code_filter(&mut self, code: impl Into<String>) {
        self.filters.code = code.into();
        self.apply_filters();
    }

    /// Change le filtre date et reclasse
    pub fn set_date_filter(&mut self, date: impl Into<String>) {
        self.filters.date = date.into();
        self.apply_filters();
    }

    /// Efface les deux filtres
    pub fn clear_filters(&mut self) {
        self.filters = Filters::default();
        self.apply_filters();
    }

    /// Reclasse toute la collection puis repagine les trois états
    ///
    /// Les sous-ensembles repartent de l'ordre de chargement.
    pub fn apply_filters(&mut self) {
        let classified = classify(&self.demandes, &self.filters);

        for (state, indices) in classified.iter() {
            let subset = &mut self.subsets[state];
            subset.indices = indices.clone();
            subset.repaginate();
        }

        debug!(
            pending = self.subsets[DemandeState::Pending].len(),
            validated = self.subsets[DemandeState::Validated].len(),
            cancelled = self.subsets[DemandeState::Cancelled].len(),
            "Classified demandes"
        );
    }

    /// Sous-ensemble d'un état
    pub fn subset(&self, state: DemandeState) -> &StateList {
        &self.subsets[state]
    }

    /// Demandes filtrées d'un état, dans l'ordre d'affichage
    pub fn filtered(&self, state: DemandeState) -> Vec<&Demande> {
        self.subsets[state]
            .indices
            .iter()
            .map(|&i| &self.demandes[i])
            .collect()
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    /// Demandes de la page courante d'un état
    pub fn paginated(&self, state: DemandeState) -> Vec<&Demande> {
        let subset = &self.subsets[state];
        subset
            .pagination
            .page_of(&subset.indices)
            .iter()
            .map(|&i| &self.demandes[i])
            .collect()
    }

    /// Page courante d'un état
    pub fn current_page(&self, state: DemandeState) -> usize {
        self.subsets[state].pagination.current_page()
    }

    /// Numéros de pages d'un état
    pub fn pages(&self, state: DemandeState) -> Vec<usize> {
        self.subsets[state].pagination.pages().collect()
    }

    /// Change la page d'un état (bornée)
    pub fn change_page(&mut self, state: DemandeState, page: usize) {
        self.subsets[state].pagination.go_to(page);
    }

    /// Page suivante d'un état
    pub fn next_page(&mut self, state: DemandeState) {
        self.subsets[state].pagination.next();
    }

    /// Page précédente d'un état
    pub fn previous_page(&mut self, state: DemandeState) {
        self.subsets[state].pagination.previous();
    }

    // ========================================================================
    // Tri
    // ========================================================================

    /// Sens de tri courant d'une colonne
    pub fn sort_direction(&self, field: SortField) -> SortDirection {
        self.sort_directions.get(&field).copied().unwrap_or_default()
    }

    /// Inverse le sens de la colonne puis trie le sous-ensemble de l'état
    ///
    /// Le sens part de Asc : le premier appel trie donc en Desc.
    pub fn toggle_sort(&mut self, state: DemandeState, field: SortField) {
        let direction = self.sort_direction(field).toggled();
        self.sort_directions.insert(field, direction);
        self.sort(state, field, direction);
    }

    /// Trie le sous-ensemble d'un état puis le repagine (lui seul)
    pub fn sort(&mut self, state: DemandeState, field: SortField, direction: SortDirection) {
        let subset = &mut self.subsets[state];
        sort_indices(&self.demandes, &mut subset.indices, field, direction);
        subset.repaginate();
        debug!(state = %state, field = field.label(), ?direction, "Sorted subset");
    }

    // ========================================================================
    // Vue détail
    // ========================================================================

    /// Ouvre la vue détail sur une demande
    pub fn show_details(&mut self, id: i64) {
        if self.find(id).is_some() {
            self.selected = Some(id);
        }
    }

    /// Ferme la vue détail
    pub fn hide_details(&mut self) {
        self.selected = None;
    }

    /// Demande affichée dans la vue détail
    pub fn selected(&self) -> Option<&Demande> {
        self.selected.and_then(|id| self.find(id))
    }

    // ========================================================================
    // Retour du backend après une action
    // ========================================================================

    /// Fusionne la réponse du backend après une mutation
    ///
    /// Seul le champ muté est recopié, avec la valeur renvoyée par le serveur
    /// (pas celle demandée localement). Reclasse ensuite la collection.
    /// Retourne false si aucune demande locale n'a cet identifiant.
    pub fn merge_echo(&mut self, id: i64, mutation: Mutation, echo: &Demande) -> bool {
        let Some(local) = self.demandes.iter_mut().find(|d| d.id == id) else {
            debug!(id, "No local demande matches server echo");
            return false;
        };

        match mutation {
            Mutation::Status(_) => local.state = echo.state,
            Mutation::Deliverable(_) => local.deliverable = echo.deliverable,
        }

        self.apply_filters();
        true
    }
}

impl Default for ListView {
    fn default() -> Self {
        Self::new(crate::listing::pagination::DEFAULT_PAGE_SIZE)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn two_records() -> Vec<Demande> {
        vec![
            Demande::new(1, DemandeState::Pending)
                .with_client("C1")
                .with_created_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            Demande::new(2, DemandeState::Validated)
                .with_client("C2")
                .with_created_at(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()),
        ]
    }

    fn pending(count: i64) -> Vec<Demande> {
        (0..count)
            .map(|i| Demande::new(i, DemandeState::Pending).with_client(format!("C{:02}", i)))
            .collect()
    }

    #[test]
    fn test_load_classifies() {
        let mut view = ListView::default();
        view.load(two_records());

        assert_eq!(view.filtered(DemandeState::Pending).len(), 1);
        assert_eq!(view.filtered(DemandeState::Validated).len(), 1);
        assert_eq!(view.filtered(DemandeState::Cancelled).len(), 0);
        assert!(view.pages(DemandeState::Cancelled).is_empty());
    }

    #[test]
    fn test_code_filter_empties_pending() {
        let mut view = ListView::default();
        view.load(two_records());
        view.set_code_filter("C2");

        assert!(view.filtered(DemandeState::Pending).is_empty());
        assert_eq!(view.filtered(DemandeState::Validated)[0].id, 2);

        view.clear_filters();
        assert_eq!(view.filtered(DemandeState::Pending).len(), 1);
    }

    #[test]
    fn test_pagination_of_twelve() {
        let mut view = ListView::default();
        view.load(pending(12));

        assert_eq!(view.pages(DemandeState::Pending), vec![1, 2, 3]);
        view.change_page(DemandeState::Pending, 3);
        let ids: Vec<i64> = view.paginated(DemandeState::Pending).iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![10, 11]);

        view.change_page(DemandeState::Pending, 7);
        assert_eq!(view.current_page(DemandeState::Pending), 3);
    }

    #[test]
    fn test_filter_change_keeps_page_within_bounds() {
        let mut view = ListView::default();
        view.load(pending(12));
        view.change_page(DemandeState::Pending, 3);

        view.set_code_filter("C0");
        // C00..C09 : 10 demandes, 2 pages
        assert_eq!(view.current_page(DemandeState::Pending), 2);
        assert_eq!(view.paginated(DemandeState::Pending).len(), 5);
    }

    #[test]
    fn test_toggle_sort_starts_descending() {
        let mut view = ListView::default();
        view.load(pending(3));

        view.toggle_sort(DemandeState::Pending, SortField::Code);
        assert_eq!(view.sort_direction(SortField::Code), SortDirection::Desc);
        let ids: Vec<i64> = view.filtered(DemandeState::Pending).iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![2, 1, 0]);

        view.toggle_sort(DemandeState::Pending, SortField::Code);
        let ids: Vec<i64> = view.filtered(DemandeState::Pending).iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        // L'autre colonne garde son propre sens
        assert_eq!(view.sort_direction(SortField::Date), SortDirection::Asc);
    }

    #[test]
    fn test_sort_only_touches_one_state() {
        let mut demandes = pending(3);
        demandes.push(Demande::new(10, DemandeState::Cancelled).with_client("A"));
        demandes.push(Demande::new(11, DemandeState::Cancelled).with_client("B"));
        let mut view = ListView::default();
        view.load(demandes);

        view.toggle_sort(DemandeState::Pending, SortField::Code);
        let cancelled: Vec<i64> = view.filtered(DemandeState::Cancelled).iter().map(|d| d.id).collect();
        assert_eq!(cancelled, vec![10, 11]);
    }

    #[test]
    fn test_merge_status_echo_moves_record() {
        let mut records = two_records();
        records.push(Demande::new(5, DemandeState::Pending).with_client("C5"));
        let mut view = ListView::default();
        view.load(records);
        assert_eq!(view.filtered(DemandeState::Pending).len(), 2);

        let echo = Demande::new(5, DemandeState::Cancelled);
        assert!(view.merge_echo(5, Mutation::Status(DemandeState::Cancelled), &echo));

        assert_eq!(view.filtered(DemandeState::Pending).len(), 1);
        let cancelled = view.filtered(DemandeState::Cancelled);
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].id, 5);
        // Le reste de la demande locale est conservé
        assert_eq!(cancelled[0].client_code(), Some("C5"));
    }

    #[test]
    fn test_merge_trusts_server_value() {
        let mut view = ListView::default();
        view.load(two_records());

        // Demandé : annuler ; le serveur répond : valider
        let echo = Demande::new(1, DemandeState::Validated);
        view.merge_echo(1, Mutation::Status(DemandeState::Cancelled), &echo);

        assert_eq!(view.find(1).map(|d| d.state), Some(DemandeState::Validated));
    }

    #[test]
    fn test_merge_deliverable_only_touches_flag() {
        let mut view = ListView::default();
        view.load(two_records());

        let mut echo = Demande::new(1, DemandeState::Cancelled);
        echo.deliverable = true;
        view.merge_echo(1, Mutation::Deliverable(true), &echo);

        let local = view.find(1).unwrap();
        assert!(local.deliverable);
        assert_eq!(local.state, DemandeState::Pending);
    }

    #[test]
    fn test_merge_unknown_id_is_noop() {
        let mut view = ListView::default();
        view.load(two_records());

        let echo = Demande::new(99, DemandeState::Cancelled);
        assert!(!view.merge_echo(99, Mutation::Status(DemandeState::Cancelled), &echo));
        assert!(view.filtered(DemandeState::Cancelled).is_empty());
    }

    #[test]
    fn test_details_selection() {
        let mut view = ListView::default();
        view.load(two_records());

        view.show_details(2);
        assert_eq!(view.selected().map(|d| d.id), Some(2));

        view.show_details(42);
        assert_eq!(view.selected().map(|d| d.id), Some(2));

        view.hide_details();
        assert!(view.selected().is_none());

        // Un rechargement sans la demande ferme la vue détail
        view.show_details(2);
        view.load(Vec::new());
        assert!(view.selected().is_none());
    }
}
