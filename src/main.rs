// ============================================================================
// Demandes - Back-office TUI
// ============================================================================
// Listes des échanges et des levées de fonds : filtres, tri, pagination,
// validation / annulation et indicateur "livrer".
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Worker thread : appels réseau hors de l'UI, résultats par channel
// 4. Restauration du terminal même en cas d'erreur
// ============================================================================

use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc, Mutex};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use demandes::api::{ActionDispatcher, DemandeService, HttpDemandeService, MemoryDemandeService};
use demandes::app::{App, FilterField};
use demandes::config::Config;
use demandes::models::DemandeKind;
use demandes::ui::events::{input_key, list_action, Action, Event, EventHandler, InputKey};
use demandes::ui::render;
use demandes::worker::{spawn_background_worker, AppCommand, AppResult};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f ./logs/demandes.log.*
///
/// # Contrôler le niveau de log
/// RUST_LOG=demandes=trace cargo run
/// ```
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(&config.log_dir)
        .context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "demandes.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour demandes, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "demandes=debug,info".into()),
        )
        .init();

    info!(log_dir = ?config.log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Config::load().context("Échec du chargement de la configuration")?;

    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(api = %config.api_base_url, offline = config.offline, page_size = config.page_size, "Demandes starting up");

    let dispatchers = build_dispatchers(&config)?;

    // CONCEPT RUST : Arc<Mutex<>> pour partage entre threads
    // - L'UI lit App à chaque frame, le worker n'y touche pas directement :
    //   il renvoie des AppResult que l'event loop applique
    let app = Arc::new(Mutex::new(App::new(config.page_size)));

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    let worker = spawn_background_worker(dispatchers, command_rx, result_tx);

    // Chargement initial : un fetch par type de demande
    {
        let mut app_lock = lock(&app)?;
        for command in app_lock.initial_commands() {
            if command_tx.send(command).is_err() {
                error!("Worker thread is gone, command dropped");
            }
        }
    }

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &app, &events, &command_tx, &result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    // Fermer le channel arrête le worker
    drop(command_tx);
    if worker.join().is_err() {
        error!("Worker thread panicked");
    }

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

/// Crée un dispatcher par type de demande
///
/// Mode hors-ligne : backend en mémoire avec des données de démonstration
fn build_dispatchers(config: &Config) -> Result<HashMap<DemandeKind, ActionDispatcher>> {
    let mut dispatchers = HashMap::new();

    for kind in DemandeKind::ALL {
        let service: Arc<dyn DemandeService> = if config.offline {
            info!(kind = kind.label(), "Using in-memory demo backend");
            Arc::new(MemoryDemandeService::demo(kind))
        } else {
            let service = HttpDemandeService::new(config, kind)?;
            info!(kind = kind.label(), url = %service.collection_url(), "Using HTTP backend");
            Arc::new(service)
        };
        dispatchers.insert(kind, ActionDispatcher::new(service));
    }

    Ok(dispatchers)
}

/// Verrouille l'état partagé
///
/// Un mutex empoisonné (panic pendant un lock) est remonté comme erreur
fn lock(app: &Mutex<App>) -> Result<std::sync::MutexGuard<'_, App>> {
    app.lock()
        .map_err(|_| anyhow::anyhow!("État de l'application inutilisable (mutex empoisonné)"))
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Appliquer les résultats du worker
//   1. Dessiner l'interface
//   2. Traiter l'événement clavier
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: &mpsc::Sender<AppCommand>,
    result_rx: &mpsc::Receiver<AppResult>,
) -> Result<()> {
    loop {
        if !lock(app)?.is_running() {
            break;
        }

        // 0. RÉSULTATS : try_recv ne bloque pas
        loop {
            match result_rx.try_recv() {
                Ok(result) => lock(app)?.apply_result(result),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Worker thread disconnected!");
                    break;
                }
            }
        }

        // 1. RENDER
        {
            let app_lock = lock(app)?;
            terminal.draw(|frame| render(frame, &app_lock))?;
        }

        // 2. INPUT
        match events.next() {
            Ok(event) => {
                let mut app_lock = lock(app)?;
                if let Some(command) = handle_event(&mut app_lock, event) {
                    debug!(?command, "Sending command to worker");
                    if command_tx.send(command).is_err() {
                        error!("Worker thread is gone, command dropped");
                    }
                }
            }
            Err(e) => error!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement, retourne éventuellement une commande pour le worker
fn handle_event(app: &mut App, event: Event) -> Option<AppCommand> {
    let Event::Key(key) = event else {
        return None;
    };

    // Saisie d'un filtre : toutes les touches vont au buffer
    if app.is_in_input_mode() {
        match input_key(&key)? {
            InputKey::Char(c) => app.append_char(c),
            InputKey::Backspace => app.backspace(),
            InputKey::Submit => app.submit_input(),
            InputKey::Cancel => app.cancel_input(),
        }
        return None;
    }

    let action = list_action(&key);

    // Toute autre touche annule les confirmations en attente
    if action != Some(Action::Quit) {
        app.cancel_quit();
    }
    if action != Some(Action::Cancel) {
        app.reset_cancel_confirmation();
    }

    let action = action?;

    // Popup de détail ouvert : le tableau dessous ne bouge pas
    if app.is_on_details() && moves_list(action) {
        return None;
    }

    match action {
        Action::Quit => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                app.request_quit();
            }
            None
        }
        Action::Close if app.is_on_details() => {
            app.hide_details();
            None
        }
        Action::Close => None,
        Action::Up => {
            app.navigate_up();
            None
        }
        Action::Down => {
            app.navigate_down();
            None
        }
        Action::NextState => {
            app.focus_next_state();
            None
        }
        Action::PreviousState => {
            app.focus_previous_state();
            None
        }
        Action::FocusState(state) => {
            app.focus_state(state);
            None
        }
        Action::NextPage => {
            app.next_page();
            None
        }
        Action::PreviousPage => {
            app.previous_page();
            None
        }
        Action::SwitchKind => {
            app.switch_kind();
            None
        }
        Action::FilterCode => {
            app.start_filter_input(FilterField::Code);
            None
        }
        Action::FilterDate => {
            app.start_filter_input(FilterField::Date);
            None
        }
        Action::ClearFilters => {
            app.clear_filters();
            None
        }
        Action::Sort(field) => {
            app.toggle_sort(field);
            None
        }
        Action::Details => {
            app.show_details();
            None
        }
        Action::Validate => app.validate_selected(),
        Action::Cancel => app.cancel_selected(),
        Action::ToggleDeliverable => app.toggle_deliverable_selected(),
        Action::Reload => {
            info!(kind = app.active_kind.label(), "User requested reload");
            Some(app.reload())
        }
    }
}

/// Actions qui déplacent le curseur, la page, le focus ou l'ordre du tableau
fn moves_list(action: Action) -> bool {
    matches!(
        action,
        Action::Up
            | Action::Down
            | Action::NextState
            | Action::PreviousState
            | Action::FocusState(_)
            | Action::NextPage
            | Action::PreviousPage
            | Action::SwitchKind
            | Action::Sort(_)
            | Action::FilterCode
            | Action::FilterDate
            | Action::ClearFilters
            | Action::Details
    )
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use demandes::listing::{Mutation, SortDirection, SortField};
    use demandes::models::{Demande, DemandeState};

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn loaded_app() -> App {
        let mut app = App::default();
        app.apply_result(AppResult::Loaded {
            kind: DemandeKind::Echange,
            demandes: vec![
                Demande::new(1, DemandeState::Pending).with_client("B"),
                Demande::new(2, DemandeState::Pending).with_client("A"),
            ],
        });
        app
    }

    #[test]
    fn test_quit_needs_two_presses() {
        let mut app = App::default();
        handle_event(&mut app, press(KeyCode::Char('q')));
        assert!(app.is_running());
        handle_event(&mut app, press(KeyCode::Char('q')));
        assert!(!app.is_running());
    }

    #[test]
    fn test_other_key_resets_quit_confirmation() {
        let mut app = App::default();
        handle_event(&mut app, press(KeyCode::Char('q')));
        handle_event(&mut app, press(KeyCode::Down));
        assert!(!app.is_awaiting_quit_confirmation());
    }

    #[test]
    fn test_cancel_flow_sends_command() {
        let mut app = loaded_app();
        assert!(handle_event(&mut app, press(KeyCode::Char('x'))).is_none());
        let command = handle_event(&mut app, press(KeyCode::Char('x')));
        assert!(matches!(command, Some(AppCommand::Mutate { id: 1, .. })));
    }

    #[test]
    fn test_filter_typing_goes_to_buffer() {
        let mut app = loaded_app();
        handle_event(&mut app, press(KeyCode::Char('/')));
        // 'q' est un caractère de filtre, pas un quit
        handle_event(&mut app, press(KeyCode::Char('q')));
        assert!(app.is_running());
        assert_eq!(app.input_buffer, "q");
        handle_event(&mut app, press(KeyCode::Esc));
        assert!(!app.is_in_input_mode());
    }

    #[test]
    fn test_sort_key() {
        let mut app = loaded_app();
        handle_event(&mut app, press(KeyCode::Char('c')));
        assert_eq!(
            app.active_view().sort_direction(SortField::Code),
            SortDirection::Desc
        );
    }

    #[test]
    fn test_details_popup_keeps_action_on_shown_record() {
        let mut app = loaded_app();
        handle_event(&mut app, press(KeyCode::Enter));
        assert!(app.is_on_details());

        // 'j' ne déplace pas le curseur sous le popup
        handle_event(&mut app, press(KeyCode::Char('j')));
        assert_eq!(app.selected_row, 0);

        let command = handle_event(&mut app, press(KeyCode::Char('v')));
        assert_eq!(
            command,
            Some(AppCommand::Mutate {
                kind: DemandeKind::Echange,
                id: 1,
                mutation: Mutation::Status(DemandeState::Validated),
            })
        );

        // ESC ferme, la navigation reprend
        handle_event(&mut app, press(KeyCode::Esc));
        handle_event(&mut app, press(KeyCode::Char('j')));
        assert_eq!(app.selected_demande().map(|d| d.id), Some(2));
    }

    #[test]
    fn test_reload_sends_fetch() {
        let mut app = loaded_app();
        let command = handle_event(&mut app, press(KeyCode::Char('r')));
        assert_eq!(command, Some(AppCommand::Fetch { kind: DemandeKind::Echange }));
    }
}
