// ============================================================================
// Gestion des événements
// ============================================================================
// Lit les événements clavier et les traduit en actions de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : KeyCode → Action
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::listing::SortField;
use crate::models::DemandeState;

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (lecture des résultats du worker, rafraîchissement)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire avec un tick de 250ms
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release : on garde Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Enum Action : ce que l'utilisateur demande, indépendamment de la touche
// ============================================================================

/// Actions de la vue liste
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Up,
    Down,
    NextState,
    PreviousState,
    FocusState(DemandeState),
    NextPage,
    PreviousPage,
    SwitchKind,
    FilterCode,
    FilterDate,
    ClearFilters,
    Sort(SortField),
    Details,
    Close,
    Validate,
    Cancel,
    ToggleDeliverable,
    Reload,
}

/// Traduit une touche de la vue liste / détail en action
///
/// CONCEPT RUST : Multiple patterns avec |
/// - KeyCode::Up | KeyCode::Char('k') : flèches ou touches Vim
pub fn list_action(key: &KeyEvent) -> Option<Action> {
    // Ctrl+C quitte toujours
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Right => Action::NextState,
        KeyCode::Left => Action::PreviousState,
        KeyCode::Char('1') => Action::FocusState(DemandeState::Pending),
        KeyCode::Char('2') => Action::FocusState(DemandeState::Validated),
        KeyCode::Char('3') => Action::FocusState(DemandeState::Cancelled),
        KeyCode::Char('n') | KeyCode::PageDown => Action::NextPage,
        KeyCode::Char('p') | KeyCode::PageUp => Action::PreviousPage,
        KeyCode::Tab => Action::SwitchKind,
        KeyCode::Char('/') => Action::FilterCode,
        KeyCode::Char('t') => Action::FilterDate,
        KeyCode::Char('e') => Action::ClearFilters,
        KeyCode::Char('c') => Action::Sort(SortField::Code),
        KeyCode::Char('o') => Action::Sort(SortField::Date),
        KeyCode::Enter => Action::Details,
        KeyCode::Esc | KeyCode::Char(' ') => Action::Close,
        KeyCode::Char('v') => Action::Validate,
        KeyCode::Char('x') => Action::Cancel,
        KeyCode::Char('l') => Action::ToggleDeliverable,
        KeyCode::Char('r') => Action::Reload,
        _ => return None,
    };

    Some(action)
}

// ============================================================================
// Saisie de filtre
// ============================================================================

/// Touches reconnues pendant la saisie d'un filtre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    Char(char),
    Backspace,
    Submit,
    Cancel,
}

/// Traduit une touche en saisie de filtre
///
/// Seuls les caractères qui peuvent apparaître dans un code ou une date
/// sont acceptés.
pub fn input_key(key: &KeyEvent) -> Option<InputKey> {
    match key.code {
        KeyCode::Enter => Some(InputKey::Submit),
        KeyCode::Esc => Some(InputKey::Cancel),
        KeyCode::Backspace => Some(InputKey::Backspace),
        KeyCode::Char(c) if is_filter_char(c) => Some(InputKey::Char(c)),
        _ => None,
    }
}

fn is_filter_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.' | '/')
}

// ============================================================================
// Tests
// ============================================================================
