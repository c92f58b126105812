// ============================================================================
// Classifieur : filtres + répartition par état
// ============================================================================
// Répartit les demandes chargées en trois sous-ensembles disjoints
// (en cours / validées / annulées) après application de deux filtres :
// - filtre code : sous-chaîne du code client OU du code responsable
// - filtre date : jour de création exact ("YYYY-MM-DD", UTC)
//
// CONCEPT RUST : indices plutôt que copies
// - Les sous-ensembles stockent des positions dans le Vec<Demande> principal
// - Une mise à jour de la demande est donc visible partout sans recopie
// ============================================================================

use crate::models::{ByState, Demande};

/// Filtres saisis par l'utilisateur (vides = tout passe)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    /// Sous-chaîne recherchée dans le code client ou responsable
    pub code: String,

    /// Jour de création recherché, au format "YYYY-MM-DD"
    pub date: String,
}

impl Filters {
    /// Vrai si aucun filtre n'est actif
    pub fn is_empty(&self) -> bool {
        self.code.is_empty() && self.date.trim().is_empty()
    }

    /// Vérifie si une demande passe les deux filtres (l'état n'est pas regardé)
    pub fn matches(&self, demande: &Demande) -> bool {
        self.matches_code(demande) && self.matches_date(demande)
    }

    /// Filtre code : sensible à la casse, null-safe
    fn matches_code(&self, demande: &Demande) -> bool {
        if self.code.is_empty() {
            return true;
        }

        let in_client = demande
            .client_code()
            .is_some_and(|code| code.contains(&self.code));
        let in_responsible = demande
            .responsible_code()
            .is_some_and(|code| code.contains(&self.code));

        in_client || in_responsible
    }

    /// Filtre date : égalité stricte sur le jour
    ///
    /// Une saisie partielle ("2024-01") ne correspond à aucun jour,
    /// une demande sans date ne passe jamais un filtre date actif.
    fn matches_date(&self, demande: &Demande) -> bool {
        let wanted = self.date.trim();
        if wanted.is_empty() {
            return true;
        }

        demande.created_day().is_some_and(|day| day == wanted)
    }
}

/// Répartit les demandes filtrées par état
///
/// Retourne, pour chaque état, les indices (dans `demandes`) des demandes
/// de cet état qui passent les filtres, dans l'ordre de chargement.
pub fn classify(demandes: &[Demande], filters: &Filters) -> ByState<Vec<usize>> {
    let mut subsets: ByState<Vec<usize>> = ByState::default();

    // CONCEPT : un seul passage
    // - Chaque demande tombe dans exactement un sous-ensemble (son état)
    for (index, demande) in demandes.iter().enumerate() {
        if filters.matches(demande) {
            subsets[demande.state].push(index);
        }
    }

    subsets
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DemandeState;
    use chrono::{TimeZone, Utc};

    fn sample() -> Vec<Demande> {
        vec![
            Demande::new(1, DemandeState::Pending)
                .with_client("C1")
                .with_created_at(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()),
            Demande::new(2, DemandeState::Validated)
                .with_client("C2")
                .with_created_at(Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap()),
        ]
    }

    #[test]
    fn test_filters_is_empty() {
        assert!(Filters::default().is_empty());
        // Date faite d'espaces : pas de filtre
        assert!(Filters { code: String::new(), date: "  ".to_string() }.is_empty());
        assert!(!Filters { code: "C1".to_string(), date: String::new() }.is_empty());
    }

    #[test]
    fn test_classify_without_filters() {
        let subsets = classify(&sample(), &Filters::default());

        assert_eq!(subsets[DemandeState::Pending], vec![0]);
        assert_eq!(subsets[DemandeState::Validated], vec![1]);
        assert!(subsets[DemandeState::Cancelled].is_empty());
    }

    #[test]
    fn test_code_filter() {
        let filters = Filters {
            code: "C2".to_string(),
            ..Filters::default()
        };
        let subsets = classify(&sample(), &filters);

        assert!(subsets[DemandeState::Pending].is_empty());
        assert_eq!(subsets[DemandeState::Validated], vec![1]);
    }

    #[test]
    fn test_code_filter_matches_responsible() {
        let demandes = vec![
            Demande::new(1, DemandeState::Pending).with_responsible("RESP-9"),
            Demande::new(2, DemandeState::Pending),
        ];
        let filters = Filters {
            code: "SP-9".to_string(),
            ..Filters::default()
        };

        let subsets = classify(&demandes, &filters);
        assert_eq!(subsets[DemandeState::Pending], vec![0]);
    }

    #[test]
    fn test_code_filter_is_case_sensitive() {
        let filters = Filters {
            code: "c1".to_string(),
            ..Filters::default()
        };
        assert!(!filters.matches(&sample()[0]));
    }

    #[test]
    fn test_date_filter() {
        let mut filters = Filters {
            date: "2024-01-01".to_string(),
            ..Filters::default()
        };
        let subsets = classify(&sample(), &filters);
        assert_eq!(subsets[DemandeState::Pending], vec![0]);
        assert!(subsets[DemandeState::Validated].is_empty());

        // Saisie en cours : rien ne correspond
        filters.date = "2024-01".to_string();
        let subsets = classify(&sample(), &filters);
        assert!(subsets.iter().all(|(_, indices)| indices.is_empty()));
    }

    #[test]
    fn test_date_filter_skips_undated() {
        let filters = Filters {
            date: "2024-01-01".to_string(),
            ..Filters::default()
        };
        assert!(!filters.matches(&Demande::new(3, DemandeState::Pending)));
    }

    #[test]
    fn test_classification_is_a_partition() {
        let states = [
            DemandeState::Pending,
            DemandeState::Cancelled,
            DemandeState::Validated,
            DemandeState::Pending,
            DemandeState::Cancelled,
            DemandeState::Pending,
        ];
        let demandes: Vec<Demande> = states
            .iter()
            .enumerate()
            .map(|(i, &state)| Demande::new(i as i64, state).with_client(format!("C{}", i % 2)))
            .collect();
        let filters = Filters {
            code: "C1".to_string(),
            ..Filters::default()
        };

        let subsets = classify(&demandes, &filters);

        let mut all: Vec<usize> = subsets
            .iter()
            .flat_map(|(_, indices)| indices.iter().copied())
            .collect();
        all.sort_unstable();

        let expected: Vec<usize> = (0..demandes.len())
            .filter(|&i| filters.matches(&demandes[i]))
            .collect();
        assert_eq!(all, expected);

        for (state, indices) in subsets.iter() {
            assert!(indices.iter().all(|&i| demandes[i].state == state));
        }
    }
}
