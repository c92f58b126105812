// ============================================================================
// Enum : DemandeState
// ============================================================================
// État d'une demande côté back-office : "en cours", "valider" ou "annuler"
//
// CONCEPTS RUST :
// 1. Enum fermé : le compilateur garantit qu'un état est toujours l'un des trois
// 2. #[serde(rename)] : mappe les libellés JSON du backend vers les variants
// 3. Index / IndexMut : ByState<T> se lit comme un tableau indexé par état
// ============================================================================

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// État d'une demande
///
/// Transitions exposées par l'UI : Pending → Validated ou Pending → Cancelled.
/// Les deux sont terminales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DemandeState {
    /// Demande en attente de traitement
    #[serde(rename = "en cours")]
    Pending,

    /// Demande validée
    #[serde(rename = "valider")]
    Validated,

    /// Demande annulée
    #[serde(rename = "annuler")]
    Cancelled,
}

impl DemandeState {
    /// Les trois états, dans l'ordre d'affichage
    pub const ALL: [DemandeState; 3] = [
        DemandeState::Pending,
        DemandeState::Validated,
        DemandeState::Cancelled,
    ];

    /// Libellé tel qu'envoyé par le backend
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandeState::Pending => "en cours",
            DemandeState::Validated => "valider",
            DemandeState::Cancelled => "annuler",
        }
    }

    /// Titre affiché au-dessus du tableau correspondant
    pub fn title(&self) -> &'static str {
        match self {
            DemandeState::Pending => "En cours",
            DemandeState::Validated => "Validées",
            DemandeState::Cancelled => "Annulées",
        }
    }

    /// Position dans ALL
    fn index(self) -> usize {
        match self {
            DemandeState::Pending => 0,
            DemandeState::Validated => 1,
            DemandeState::Cancelled => 2,
        }
    }

    /// État suivant (cycle, utilisé pour déplacer le focus entre tableaux)
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// État précédent (cycle inverse)
    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Une demande dans cet état peut-elle encore être validée ou annulée ?
    pub fn is_actionable(self) -> bool {
        self == DemandeState::Pending
    }
}

impl fmt::Display for DemandeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Structure : ByState<T>
// ============================================================================
// CONCEPT : Mapping total état → valeur
// - Remplace les triplets de champs "encour / valider / annuler"
// - Chaque état a toujours une valeur (pas d'Option à gérer)
// - by_state[DemandeState::Pending] fonctionne grâce au trait Index
// ============================================================================

/// Une valeur par état de demande
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByState<T> {
    slots: [T; 3],
}

impl<T> ByState<T> {
    /// Construit le mapping en appelant `f` pour chaque état
    pub fn from_fn(mut f: impl FnMut(DemandeState) -> T) -> Self {
        Self {
            slots: DemandeState::ALL.map(&mut f),
        }
    }

    /// Itère sur (état, valeur) dans l'ordre d'affichage
    pub fn iter(&self) -> impl Iterator<Item = (DemandeState, &T)> {
        DemandeState::ALL.into_iter().zip(self.slots.iter())
    }
}

impl<T> Index<DemandeState> for ByState<T> {
    type Output = T;

    fn index(&self, state: DemandeState) -> &T {
        &self.slots[state.index()]
    }
}

impl<T> IndexMut<DemandeState> for ByState<T> {
    fn index_mut(&mut self, state: DemandeState) -> &mut T {
        &mut self.slots[state.index()]
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
