// ============================================================================
// Vue détail : popup d'une demande
// ============================================================================
// CONCEPTS RATATUI :
// 1. Clear : efface la zone avant de dessiner le popup
// 2. Layout imbriqués : centrer un rectangle dans l'écran
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::models::Demande;
use crate::ui::dashboard::state_color;

/// Dessine le popup de détail au centre de `area`
pub fn render_details(frame: &mut Frame, demande: &Demande, area: Rect) {
    let popup = centered_rect(60, 60, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(state_color(demande.state)))
        .title(format!(" Demande {} ", demande.id));

    let paragraph = Paragraph::new(detail_lines(demande))
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

/// Lignes "libellé : valeur" de la demande
pub fn detail_lines(demande: &Demande) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let field = |name: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<14}", name), label),
            Span::raw(value),
        ])
    };

    let mut lines = vec![
        field("État", demande.state.to_string()),
        field(
            "Créée le",
            demande
                .created_at
                .map(|d| d.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "—".to_string()),
        ),
        field("Client", demande.client_code().unwrap_or("—").to_string()),
        field("Responsable", demande.responsible_code().unwrap_or("—").to_string()),
        field("Livrer", if demande.deliverable { "oui" } else { "non" }.to_string()),
    ];

    // Champs non interprétés, dans l'ordre alphabétique (BTreeMap)
    if !demande.extra.is_empty() {
        lines.push(Line::from(""));
        for (name, value) in &demande.extra {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            lines.push(field(name.as_str(), value));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[ESC] Fermer  [v] Valider  [x] Annuler  [l] Livrer",
        Style::default().fg(Color::DarkGray),
    )));

    lines
}

/// Rectangle centré de `percent_x` × `percent_y` pourcents de `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DemandeState;

    #[test]
    fn test_detail_lines_include_extra_fields() {
        let mut demande = Demande::new(7, DemandeState::Pending).with_client("C7");
        demande.extra.insert("montant".to_string(), serde_json::json!(1200));

        let text: Vec<String> = detail_lines(&demande)
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();

        assert!(text.iter().any(|l| l.contains("C7")));
        assert!(text.iter().any(|l| l.contains("montant") && l.contains("1200")));
        assert!(text.iter().any(|l| l.contains("en cours")));
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 60, area);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
    }
}
