// ============================================================================
// Trieur
// ============================================================================
// Réordonne un sous-ensemble (liste d'indices) selon le code client ou la
// date de création, dans un sens ascendant ou descendant.
//
// CONCEPT RUST : tri total
// - sort_by exige un ordre total
// - Les demandes sans clé de tri gardent leur position ; seules les demandes
//   qui ont une clé sont triées entre elles, dans les positions qu'elles
//   occupaient déjà
// ============================================================================

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::models::Demande;

/// Colonne de tri
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    /// Code client
    Code,

    /// Date de création
    Date,
}

impl SortField {
    /// Libellé de la colonne
    pub fn label(&self) -> &'static str {
        match self {
            SortField::Code => "Code",
            SortField::Date => "Date",
        }
    }
}

/// Sens du tri
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Inverse le sens
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Flèche affichée dans l'en-tête de colonne
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Clé de tri extraite d'une demande
#[derive(Debug, Clone, PartialEq, Eq)]
enum SortKey<'a> {
    Code(&'a str),
    Date(DateTime<Utc>),
}

fn sort_key(demande: &Demande, field: SortField) -> Option<SortKey<'_>> {
    match field {
        SortField::Code => demande
            .client_code()
            .filter(|code| !code.is_empty())
            .map(SortKey::Code),
        SortField::Date => demande.created_at.map(SortKey::Date),
    }
}

fn compare_keys(a: &SortKey<'_>, b: &SortKey<'_>) -> Ordering {
    match (a, b) {
        (SortKey::Code(a), SortKey::Code(b)) => locale_compare(a, b),
        (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
        // Jamais mélangées : une seule colonne par tri
        (SortKey::Code(_), SortKey::Date(_)) => Ordering::Less,
        (SortKey::Date(_), SortKey::Code(_)) => Ordering::Greater,
    }
}

/// Comparaison "naturelle" des codes
///
/// Ignore d'abord la casse ("c10" et "C10" voisins), puis départage sur
/// la chaîne exacte, minuscules d'abord ("c10" < "C10"), pour rester un
/// ordre total.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));

    // En ASCII les majuscules précèdent les minuscules : ordre inversé
    folded.then_with(|| b.cmp(a))
}

/// Trie `indices` (positions dans `demandes`) sur place
///
/// Tri stable : à clé égale, l'ordre relatif est conservé.
pub fn sort_indices(
    demandes: &[Demande],
    indices: &mut [usize],
    field: SortField,
    direction: SortDirection,
) {
    // Positions (dans `indices`) des demandes qui ont une clé
    let slots: Vec<usize> = (0..indices.len())
        .filter(|&slot| sort_key(&demandes[indices[slot]], field).is_some())
        .collect();

    let mut keyed: Vec<usize> = slots.iter().map(|&slot| indices[slot]).collect();
    keyed.sort_by(|&a, &b| {
        // Les deux clés existent : filtrées juste au-dessus
        match (sort_key(&demandes[a], field), sort_key(&demandes[b], field)) {
            (Some(key_a), Some(key_b)) => direction.apply(compare_keys(&key_a, &key_b)),
            _ => Ordering::Equal,
        }
    });

    for (slot, index) in slots.into_iter().zip(keyed) {
        indices[slot] = index;
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
