// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Une ListView par type de demande, l'UI ne fait que lire
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Les appels réseau ne partent jamais d'ici : App retourne des AppCommand
//   que l'event loop transmet au worker
// ============================================================================

use tracing::{debug, info, warn};

use crate::listing::{ListView, Mutation, SortField};
use crate::models::{Demande, DemandeKind, DemandeState};
use crate::worker::{AppCommand, AppResult};

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Un seul écran actif à la fois
// - Le compilateur force à gérer tous les cas (exhaustivité)
// ============================================================================

/// Champ de filtre en cours de saisie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    /// Filtre sur le code client / responsable
    Code,

    /// Filtre sur le jour de création (YYYY-MM-DD)
    Date,
}

impl FilterField {
    /// Prompt affiché pendant la saisie
    pub fn prompt(&self) -> &'static str {
        match self {
            FilterField::Code => "Code client / responsable : ",
            FilterField::Date => "Date (AAAA-MM-JJ) : ",
        }
    }
}

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : les trois tableaux du type de demande actif
    List,

    /// Vue détail de la demande sélectionnée (popup)
    Details,

    /// Saisie d'un filtre, appliqué à chaque touche
    /// - `previous` : valeur restaurée si ESC
    Filter {
        field: FilterField,
        previous: String,
    },
}

/// Message affiché dans la barre de statut
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Une vue par type de demande (indexée par DemandeKind::index)
    views: [ListView; 2],

    /// Onglet actif
    pub active_kind: DemandeKind,

    /// Tableau (état) qui a le focus
    pub focused_state: DemandeState,

    /// Ligne sélectionnée dans la page courante du tableau focus
    pub selected_row: usize,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Buffer de saisie du filtre
    pub input_buffer: String,

    /// Two-step quit : première pression de 'q' → confirmation
    pub confirm_quit: bool,

    /// Two-step cancel : identifiant de la demande dont l'annulation
    /// attend une seconde pression de 'x'
    pub confirm_cancel: Option<i64>,

    /// Nombre de requêtes en cours côté worker
    pub pending_requests: usize,

    /// Dernier message pour l'utilisateur
    pub status: Option<StatusMessage>,
}

impl App {
    /// Crée une application avec des vues vides
    pub fn new(page_size: usize) -> Self {
        Self {
            running: true,
            views: [ListView::new(page_size), ListView::new(page_size)],
            active_kind: DemandeKind::Echange,
            focused_state: DemandeState::Pending,
            selected_row: 0,
            current_screen: Screen::List,
            input_buffer: String::new(),
            confirm_quit: false,
            confirm_cancel: None,
            pending_requests: 0,
            status: None,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Accès aux vues
    // ========================================================================

    /// Vue d'un type de demande
    pub fn view(&self, kind: DemandeKind) -> &ListView {
        &self.views[kind.index()]
    }

    /// Vue mutable d'un type de demande
    pub fn view_mut(&mut self, kind: DemandeKind) -> &mut ListView {
        &mut self.views[kind.index()]
    }

    /// Vue de l'onglet actif
    pub fn active_view(&self) -> &ListView {
        self.view(self.active_kind)
    }

    fn active_view_mut(&mut self) -> &mut ListView {
        self.view_mut(self.active_kind)
    }

    /// Demandes de la page courante du tableau focus
    pub fn focused_page(&self) -> Vec<&Demande> {
        self.active_view().paginated(self.focused_state)
    }

    /// Demande sous le curseur
    pub fn selected_demande(&self) -> Option<&Demande> {
        self.focused_page().get(self.selected_row).copied()
    }

    /// Demande visée par les actions : celle du popup s'il est ouvert,
    /// sinon celle sous le curseur
    pub fn action_target(&self) -> Option<&Demande> {
        if self.is_on_details() {
            self.active_view().selected()
        } else {
            self.selected_demande()
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Ligne précédente
    pub fn navigate_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    /// Ligne suivante (bornée à la page courante)
    pub fn navigate_down(&mut self) {
        let max_row = self.focused_page().len().saturating_sub(1);
        self.selected_row = (self.selected_row + 1).min(max_row);
    }

    /// Focus sur le tableau suivant
    pub fn focus_next_state(&mut self) {
        self.focus_state(self.focused_state.next());
    }

    /// Focus sur le tableau précédent
    pub fn focus_previous_state(&mut self) {
        self.focus_state(self.focused_state.previous());
    }

    /// Focus sur un tableau précis
    pub fn focus_state(&mut self, state: DemandeState) {
        self.focused_state = state;
        self.selected_row = 0;
    }

    /// Onglet suivant
    pub fn switch_kind(&mut self) {
        self.active_kind = self.active_kind.next();
        self.selected_row = 0;
        self.confirm_cancel = None;
    }

    /// Page suivante du tableau focus
    pub fn next_page(&mut self) {
        let state = self.focused_state;
        self.active_view_mut().next_page(state);
        self.selected_row = 0;
    }

    /// Page précédente du tableau focus
    pub fn previous_page(&mut self) {
        let state = self.focused_state;
        self.active_view_mut().previous_page(state);
        self.selected_row = 0;
    }

    /// Garde le curseur dans la page après un reclassement
    fn clamp_selection(&mut self) {
        let len = self.focused_page().len();
        self.selected_row = self.selected_row.min(len.saturating_sub(1));
    }

    // ========================================================================
    // Tri
    // ========================================================================

    /// Inverse le tri d'une colonne sur le tableau focus
    pub fn toggle_sort(&mut self, field: SortField) {
        let state = self.focused_state;
        self.active_view_mut().toggle_sort(state, field);
        let direction = self.active_view().sort_direction(field);
        debug!(field = field.label(), ?direction, state = %state, "User sorted table");
    }

    // ========================================================================
    // Saisie des filtres
    // ========================================================================
    // CONCEPT : Modal input (Vim-like)
    // - Chaque touche met à jour le filtre (filtrage "live")
    // - Enter garde la valeur, ESC restaure la précédente
    // ========================================================================

    /// Entre en saisie d'un filtre, pré-rempli avec sa valeur courante
    pub fn start_filter_input(&mut self, field: FilterField) {
        let filters = self.active_view().filters();
        let previous = match field {
            FilterField::Code => filters.code.clone(),
            FilterField::Date => filters.date.clone(),
        };
        self.input_buffer = previous.clone();
        self.current_screen = Screen::Filter { field, previous };
    }

    /// Champ en cours de saisie
    pub fn filter_input_field(&self) -> Option<FilterField> {
        match &self.current_screen {
            Screen::Filter { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// Vérifie si on est en saisie
    pub fn is_in_input_mode(&self) -> bool {
        matches!(self.current_screen, Screen::Filter { .. })
    }

    /// Ajoute un caractère au filtre
    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
        self.apply_input();
    }

    /// Supprime le dernier caractère du filtre
    pub fn backspace(&mut self) {
        self.input_buffer.pop();
        self.apply_input();
    }

    /// Valide la saisie
    pub fn submit_input(&mut self) {
        self.apply_input();
        self.current_screen = Screen::List;
        self.input_buffer.clear();
    }

    /// Annule la saisie et restaure le filtre précédent
    pub fn cancel_input(&mut self) {
        if let Screen::Filter { previous, .. } = &self.current_screen {
            self.input_buffer = previous.clone();
            self.apply_input();
        }
        self.current_screen = Screen::List;
        self.input_buffer.clear();
    }

    /// Efface les filtres de l'onglet actif
    pub fn clear_filters(&mut self) {
        self.active_view_mut().clear_filters();
        self.clamp_selection();
    }

    fn apply_input(&mut self) {
        let Some(field) = self.filter_input_field() else {
            return;
        };
        let value = self.input_buffer.clone();
        let view = self.active_view_mut();
        match field {
            FilterField::Code => view.set_code_filter(value),
            FilterField::Date => view.set_date_filter(value),
        }
        self.clamp_selection();
    }

    // ========================================================================
    // Vue détail
    // ========================================================================

    /// Ouvre la vue détail sur la demande sélectionnée
    pub fn show_details(&mut self) {
        if let Some(id) = self.selected_demande().map(|d| d.id) {
            self.active_view_mut().show_details(id);
            self.current_screen = Screen::Details;
        }
    }

    /// Ferme la vue détail
    pub fn hide_details(&mut self) {
        self.active_view_mut().hide_details();
        self.current_screen = Screen::List;
    }

    /// Vérifie si la vue détail est ouverte
    pub fn is_on_details(&self) -> bool {
        self.current_screen == Screen::Details
    }

    // ========================================================================
    // Actions (retournent la commande à envoyer au worker)
    // ========================================================================

    /// Valide la demande sélectionnée
    pub fn validate_selected(&mut self) -> Option<AppCommand> {
        self.status_action(DemandeState::Validated)
    }

    /// Annulation en deux temps de la demande sélectionnée
    ///
    /// Première pression : demande confirmation ; seconde pression sur la
    /// même demande : retourne la commande.
    pub fn cancel_selected(&mut self) -> Option<AppCommand> {
        let (id, current) = self.action_target().map(|d| (d.id, d.state))?;

        if self.confirm_cancel == Some(id) {
            self.confirm_cancel = None;
            self.status_action(DemandeState::Cancelled)
        } else if current.is_actionable() {
            self.confirm_cancel = Some(id);
            None
        } else {
            self.set_status("Seules les demandes en cours peuvent être annulées", true);
            None
        }
    }

    /// Annule la confirmation d'annulation
    pub fn reset_cancel_confirmation(&mut self) {
        self.confirm_cancel = None;
    }

    /// Inverse l'indicateur "livrer" de la demande sélectionnée
    pub fn toggle_deliverable_selected(&mut self) -> Option<AppCommand> {
        let demande = self.action_target()?;
        let command = AppCommand::Mutate {
            kind: self.active_kind,
            id: demande.id,
            mutation: Mutation::Deliverable(!demande.deliverable),
        };
        self.pending_requests += 1;
        Some(command)
    }

    /// Recharge l'onglet actif
    pub fn reload(&mut self) -> AppCommand {
        self.pending_requests += 1;
        AppCommand::Fetch {
            kind: self.active_kind,
        }
    }

    /// Commandes du chargement initial (un fetch par type)
    pub fn initial_commands(&mut self) -> Vec<AppCommand> {
        DemandeKind::ALL
            .into_iter()
            .map(|kind| {
                self.pending_requests += 1;
                AppCommand::Fetch { kind }
            })
            .collect()
    }

    fn status_action(&mut self, status: DemandeState) -> Option<AppCommand> {
        let (id, current) = self.action_target().map(|d| (d.id, d.state))?;

        // en cours → valider | annuler, rien d'autre
        if !current.is_actionable() {
            self.set_status("Seules les demandes en cours peuvent être traitées", true);
            return None;
        }

        let command = AppCommand::Mutate {
            kind: self.active_kind,
            id,
            mutation: Mutation::Status(status),
        };
        info!(id, status = %status, "User requested status change");
        self.pending_requests += 1;
        Some(command)
    }

    // ========================================================================
    // Résultats du worker
    // ========================================================================

    /// Intègre un résultat du worker
    pub fn apply_result(&mut self, result: AppResult) {
        self.pending_requests = self.pending_requests.saturating_sub(1);

        match result {
            AppResult::Loaded { kind, demandes } => {
                let count = demandes.len();
                self.view_mut(kind).load(demandes);
                self.set_status(format!("{} : {} demandes chargées", kind.label(), count), false);
            }
            AppResult::LoadError { kind, error } => {
                // La collection reste telle quelle (vide au premier chargement)
                self.set_status(format!("{} : chargement impossible ({})", kind.label(), error), true);
            }
            AppResult::Mutated {
                kind,
                id,
                mutation,
                echo,
            } => {
                if self.view_mut(kind).merge_echo(id, mutation, &echo) {
                    let text = match mutation {
                        Mutation::Status(_) => format!("Demande {} : {}", id, echo.state),
                        Mutation::Deliverable(_) => format!(
                            "Demande {} : livrer = {}",
                            id,
                            if echo.deliverable { "oui" } else { "non" }
                        ),
                    };
                    self.set_status(text, false);
                } else {
                    warn!(id, "Server echo for unknown local demande");
                }
            }
            AppResult::MutationError { kind, id, error } => {
                self.set_status(
                    format!("{} : demande {} non modifiée ({})", kind.label(), id, error),
                    true,
                );
            }
        }

        // Une demande a pu changer de tableau, ou la vue détail se fermer
        self.clamp_selection();
        if self.is_on_details() && self.active_view().selected().is_none() {
            self.current_screen = Screen::List;
        }
    }

    /// Vérifie si des requêtes sont en cours
    pub fn is_loading(&self) -> bool {
        self.pending_requests > 0
    }

    // ========================================================================
    // Confirmation de quit / statut
    // ========================================================================

    /// Demande la confirmation de quitter
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    /// Remplace le message de statut
    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error,
        });
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(crate::listing::DEFAULT_PAGE_SIZE)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_app() -> App {
        let mut app = App::default();
        let demandes = vec![
            Demande::new(1, DemandeState::Pending).with_client("C1"),
            Demande::new(2, DemandeState::Pending).with_client("C2"),
            Demande::new(3, DemandeState::Validated).with_client("C3"),
        ];
        app.apply_result(AppResult::Loaded {
            kind: DemandeKind::Echange,
            demandes,
        });
        app
    }

    #[test]
    fn test_app_creation() {
        let app = App::default();
        assert!(app.is_running());
        assert_eq!(app.active_kind, DemandeKind::Echange);
        assert!(app.selected_demande().is_none());
    }

    #[test]
    fn test_actions_target_the_record_shown_in_details() {
        let mut app = loaded_app();
        app.show_details();
        // Le curseur bouge sous le popup, l'action vise toujours la demande affichée
        app.selected_row = 1;

        assert_eq!(app.action_target().map(|d| d.id), Some(1));
        let command = app.validate_selected();
        assert_eq!(
            command,
            Some(AppCommand::Mutate {
                kind: DemandeKind::Echange,
                id: 1,
                mutation: Mutation::Status(DemandeState::Validated),
            })
        );

        app.hide_details();
        assert_eq!(app.action_target().map(|d| d.id), Some(2));
    }

    #[test]
    fn test_navigation_is_bounded_by_page() {
        let mut app = loaded_app();

        app.navigate_down();
        app.navigate_down();
        assert_eq!(app.selected_row, 1);
        assert_eq!(app.selected_demande().map(|d| d.id), Some(2));

        app.navigate_up();
        app.navigate_up();
        assert_eq!(app.selected_row, 0);
    }

    #[test]
    fn test_focus_and_tab_switch() {
        let mut app = loaded_app();
        app.focus_next_state();
        assert_eq!(app.focused_state, DemandeState::Validated);
        assert_eq!(app.selected_demande().map(|d| d.id), Some(3));

        app.switch_kind();
        assert_eq!(app.active_kind, DemandeKind::LeveeFond);
        assert!(app.selected_demande().is_none());
    }

    #[test]
    fn test_live_filter_and_escape_restores() {
        let mut app = loaded_app();

        app.start_filter_input(FilterField::Code);
        app.append_char('C');
        app.append_char('2');
        assert_eq!(app.focused_page().len(), 1);

        app.cancel_input();
        assert_eq!(app.current_screen, Screen::List);
        assert_eq!(app.focused_page().len(), 2);
        assert!(app.active_view().filters().code.is_empty());
    }

    #[test]
    fn test_submit_keeps_filter() {
        let mut app = loaded_app();
        app.navigate_down();

        app.start_filter_input(FilterField::Code);
        app.append_char('1');
        app.submit_input();

        assert_eq!(app.active_view().filters().code, "1");
        assert_eq!(app.selected_row, 0);
        assert_eq!(app.selected_demande().map(|d| d.id), Some(1));
    }

    #[test]
    fn test_validate_builds_command() {
        let mut app = loaded_app();
        let command = app.validate_selected();

        assert_eq!(
            command,
            Some(AppCommand::Mutate {
                kind: DemandeKind::Echange,
                id: 1,
                mutation: Mutation::Status(DemandeState::Validated),
            })
        );
        assert!(app.is_loading());
    }

    #[test]
    fn test_validated_demande_cannot_be_processed_again() {
        let mut app = loaded_app();
        app.focus_state(DemandeState::Validated);

        assert!(app.validate_selected().is_none());
        assert!(app.cancel_selected().is_none());
        assert!(app.status.as_ref().is_some_and(|s| s.is_error));
    }

    #[test]
    fn test_cancel_needs_two_presses() {
        let mut app = loaded_app();

        assert!(app.cancel_selected().is_none());
        assert_eq!(app.confirm_cancel, Some(1));

        let command = app.cancel_selected();
        assert_eq!(
            command,
            Some(AppCommand::Mutate {
                kind: DemandeKind::Echange,
                id: 1,
                mutation: Mutation::Status(DemandeState::Cancelled),
            })
        );
        assert!(app.confirm_cancel.is_none());
    }

    #[test]
    fn test_mutation_result_moves_row() {
        let mut app = loaded_app();
        app.navigate_down();
        app.pending_requests = 1;

        app.apply_result(AppResult::Mutated {
            kind: DemandeKind::Echange,
            id: 2,
            mutation: Mutation::Status(DemandeState::Cancelled),
            echo: Demande::new(2, DemandeState::Cancelled),
        });

        assert_eq!(app.focused_page().len(), 1);
        // Le curseur reste dans la page
        assert_eq!(app.selected_row, 0);
        assert_eq!(app.view(DemandeKind::Echange).filtered(DemandeState::Cancelled)[0].id, 2);
        assert!(!app.is_loading());
    }

    #[test]
    fn test_mutation_error_keeps_state() {
        let mut app = loaded_app();
        app.apply_result(AppResult::MutationError {
            kind: DemandeKind::Echange,
            id: 1,
            error: "HTTP 500".to_string(),
        });

        assert_eq!(app.focused_page().len(), 2);
        assert!(app.status.as_ref().is_some_and(|s| s.is_error && s.text.contains("HTTP 500")));
    }

    #[test]
    fn test_details_close_when_demande_disappears() {
        let mut app = loaded_app();
        app.show_details();
        assert!(app.is_on_details());

        app.apply_result(AppResult::Loaded {
            kind: DemandeKind::Echange,
            demandes: Vec::new(),
        });
        assert!(!app.is_on_details());
    }

    #[test]
    fn test_initial_commands() {
        let mut app = App::default();
        let commands = app.initial_commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(app.pending_requests, 2);
    }
}
