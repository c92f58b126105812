// ============================================================================
// Dashboard - Rendu de la vue liste
// ============================================================================
// Onglets (échanges / levées de fonds), barre de filtres, trois tableaux
// (en cours / validées / annulées) et footer.
//
// CONCEPTS RATATUI :
// 1. Layout : découpage de l'écran en zones
// 2. Table + TableState : tableau avec ligne sélectionnée
// 3. Tabs : onglets
// 4. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs},
    Frame,
};

use crate::app::{App, Screen};
use crate::listing::{ListView, SortField};
use crate::models::{Demande, DemandeKind, DemandeState};
use crate::ui::details;

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - La vue liste est toujours dessinée
/// - La vue détail s'affiche par-dessus (popup)
/// - En saisie, le footer devient la ligne d'input
pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.size();
    let chunks = create_layout(size);

    render_tabs(frame, app, chunks[0]);
    render_filter_bar(frame, app, chunks[1]);
    render_tables(frame, app, chunks[2]);

    match &app.current_screen {
        Screen::List => render_footer(frame, app, chunks[3]),
        Screen::Details => {
            render_footer(frame, app, chunks[3]);
            if let Some(demande) = app.active_view().selected() {
                details::render_details(frame, demande, size);
            }
        }
        Screen::Filter { field, .. } => {
            render_input_footer(frame, field.prompt(), &app.input_buffer, chunks[3]);
        }
    }
}

/// Crée le layout principal (onglets, filtres, tableaux, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Onglets
            Constraint::Length(3), // Filtres
            Constraint::Min(0),    // Tableaux
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Onglets et filtres
// ============================================================================

/// Dessine les onglets des deux types de demande
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = DemandeKind::ALL
        .iter()
        .map(|kind| {
            let count = app.view(*kind).demandes().len();
            Line::from(format!(" {} ({}) ", kind.label(), count))
        })
        .collect();

    let mut title = String::from(" Back-office · demandes ");
    if app.is_loading() {
        title.push_str("· chargement… ");
    }

    let tabs = Tabs::new(titles)
        .select(app.active_kind.index())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title)
                .title_alignment(Alignment::Center),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

/// Dessine les filtres actifs de l'onglet courant
fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let filters = app.active_view().filters();
    let value_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let empty_style = Style::default().fg(Color::DarkGray);

    let show = |value: &str| -> Span<'static> {
        if value.is_empty() {
            Span::styled("—", empty_style)
        } else {
            Span::styled(value.to_string(), value_style)
        }
    };

    let line = Line::from(vec![
        Span::styled("Code : ", Style::default().fg(Color::Cyan)),
        show(&filters.code),
        Span::raw("    "),
        Span::styled("Date : ", Style::default().fg(Color::Cyan)),
        show(&filters.date),
    ]);

    // Filtres actifs : bordure jaune et rappel de la touche d'effacement
    let (border_color, title) = if filters.is_empty() {
        (Color::Cyan, " Filtres ")
    } else {
        (Color::Yellow, " Filtres actifs · [e] effacer ")
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(title),
    );

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tableaux par état
// ============================================================================

/// Dessine les trois tableaux, un par état, empilés
fn render_tables(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let view = app.active_view();
    for (state, chunk) in DemandeState::ALL.into_iter().zip(chunks.iter()) {
        let focused = state == app.focused_state;
        let selected_row = focused.then_some(app.selected_row);
        render_state_table(frame, view, state, selected_row, *chunk);
    }
}

/// Titre d'un tableau : "En cours (12) · pages 1 [2] 3"
fn table_title(view: &ListView, state: DemandeState) -> String {
    let subset = view.subset(state);
    let current = view.current_page(state);

    let pages: Vec<String> = view
        .pages(state)
        .into_iter()
        .map(|page| {
            if page == current {
                format!("[{}]", page)
            } else {
                page.to_string()
            }
        })
        .collect();

    if pages.is_empty() {
        format!(" {} ({}) ", state.title(), subset.len())
    } else {
        format!(" {} ({}) · pages {} ", state.title(), subset.len(), pages.join(" "))
    }
}

/// En-tête de colonne avec la flèche du sens de tri
fn sort_header(view: &ListView, field: SortField, label: &str) -> String {
    format!("{} {}", label, view.sort_direction(field).arrow())
}

/// Couleur associée à un état
pub fn state_color(state: DemandeState) -> Color {
    match state {
        DemandeState::Pending => Color::Yellow,
        DemandeState::Validated => Color::Green,
        DemandeState::Cancelled => Color::Red,
    }
}

/// Une ligne du tableau
fn demande_row(demande: &Demande) -> Row<'static> {
    let date = demande
        .created_at
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "—".to_string());

    Row::new(vec![
        Cell::from(demande.id.to_string()),
        Cell::from(demande.client_code().unwrap_or("—").to_string()),
        Cell::from(demande.responsible_code().unwrap_or("—").to_string()),
        Cell::from(date),
        Cell::from(if demande.deliverable { "✓" } else { " " }),
    ])
}

/// Dessine le tableau d'un état
///
/// CONCEPT RATATUI : render_stateful_widget
/// - TableState porte la ligne sélectionnée
/// - Seul le tableau qui a le focus a une sélection
fn render_state_table(
    frame: &mut Frame,
    view: &ListView,
    state: DemandeState,
    selected_row: Option<usize>,
    area: Rect,
) {
    let color = state_color(state);
    let border_style = if selected_row.is_some() {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(table_title(view, state), Style::default().fg(color)));

    let header = Row::new(vec![
        "N°".to_string(),
        sort_header(view, SortField::Code, "Client"),
        "Responsable".to_string(),
        sort_header(view, SortField::Date, "Créée le"),
        "Livrer".to_string(),
    ])
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = view.paginated(state).into_iter().map(demande_row).collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Percentage(25),
        Constraint::Percentage(25),
        Constraint::Length(18),
        Constraint::Length(7),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

    let mut table_state = TableState::default();
    table_state.select(selected_row);

    frame.render_stateful_widget(table, area, &mut table_state);
}

// ============================================================================
// Footer : raccourcis, confirmations et statut
// ============================================================================

/// Dessine le footer
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key = |k: &'static str, color: Color| {
        Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
    };
    let warning = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let blinking = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::SLOW_BLINK),
        )
    };

    let line = if let Some(id) = app.confirm_cancel {
        Line::from(vec![
            Span::styled("⚠  Appuyez sur ", warning),
            blinking("[x]"),
            Span::styled(
                format!(" à nouveau pour annuler la demande {} ou autre touche pour abandonner ⚠", id),
                warning,
            ),
        ])
    } else if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Appuyez sur ", warning),
            blinking("[q]"),
            Span::styled(" à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠", warning),
        ])
    } else if let Some(status) = &app.status {
        let color = if status.is_error { Color::Red } else { Color::Green };
        Line::from(Span::styled(status.text.clone(), Style::default().fg(color)))
    } else {
        Line::from(vec![
            key("[Tab]", Color::Yellow),
            Span::raw(" Onglet  "),
            key("[←→ 1 2 3]", Color::Yellow),
            Span::raw(" Tableau  "),
            key("[n p]", Color::Yellow),
            Span::raw(" Page  "),
            key("[/ t e]", Color::Yellow),
            Span::raw(" Filtres  "),
            key("[c o]", Color::Yellow),
            Span::raw(" Tri  "),
            key("[v]", Color::Green),
            Span::raw(" Valider  "),
            key("[x]", Color::Red),
            Span::raw(" Annuler  "),
            key("[l]", Color::Yellow),
            Span::raw(" Livrer  "),
            key("[q]", Color::Yellow),
            Span::raw(" Quit"),
        ])
    };

    let paragraph = Paragraph::new(vec![line])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Dessine le footer en mode saisie de filtre
fn render_input_footer(frame: &mut Frame, prompt: &str, buffer: &str, area: Rect) {
    let input_line = Line::from(vec![
        Span::styled(
            prompt.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(buffer.to_string(), Style::default().fg(Color::White)),
        Span::styled(
            "█", // Curseur
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ),
        Span::raw("   "),
        Span::styled("[Enter]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw(" Garder  "),
        Span::styled("[ESC]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(" Annuler"),
    ]);

    let paragraph = Paragraph::new(vec![input_line])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)), // Vert pour indiquer mode input
        )
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn view_with(count: i64) -> ListView {
        let mut view = ListView::default();
        view.load(
            (0..count)
                .map(|i| Demande::new(i, DemandeState::Pending).with_client(format!("C{}", i)))
                .collect(),
        );
        view
    }

    #[test]
    fn test_table_title_lists_pages() {
        let mut view = view_with(12);
        view.change_page(DemandeState::Pending, 2);

        assert_eq!(
            table_title(&view, DemandeState::Pending),
            " En cours (12) · pages 1 [2] 3 "
        );
        assert_eq!(table_title(&view, DemandeState::Cancelled), " Annulées (0) ");
    }

    #[test]
    fn test_render_does_not_panic() {
        let mut app = App::default();
        app.view_mut(DemandeKind::Echange).load(
            (0..7)
                .map(|i| Demande::new(i, DemandeState::Pending).with_client(format!("C{}", i)))
                .collect(),
        );
        app.show_details();

        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(content.contains("Échanges"));
        assert!(content.contains("C0"));
    }
}
