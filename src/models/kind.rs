// ============================================================================
// Enum : DemandeKind
// ============================================================================
// Les deux collections gérées par le back-office :
// - Echange : demandes d'échange
// - LeveeFond : demandes de levée de fonds
//
// Même pipeline (filtre → tri → pagination) pour les deux, seuls le libellé
// et la ressource REST changent.
// ============================================================================

/// Type de demande (un onglet dans l'interface)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemandeKind {
    Echange,
    LeveeFond,
}

impl DemandeKind {
    /// Les deux types, dans l'ordre des onglets
    pub const ALL: [DemandeKind; 2] = [DemandeKind::Echange, DemandeKind::LeveeFond];

    /// Libellé de l'onglet
    pub fn label(&self) -> &'static str {
        match self {
            DemandeKind::Echange => "Échanges",
            DemandeKind::LeveeFond => "Levées de fonds",
        }
    }

    /// Ressource REST par défaut (surchargée par la configuration)
    pub fn default_resource(&self) -> &'static str {
        match self {
            DemandeKind::Echange => "echanges",
            DemandeKind::LeveeFond => "leveefonds",
        }
    }

    /// Onglet suivant (cycle)
    pub fn next(self) -> Self {
        match self {
            DemandeKind::Echange => DemandeKind::LeveeFond,
            DemandeKind::LeveeFond => DemandeKind::Echange,
        }
    }

    /// Position de l'onglet
    pub fn index(self) -> usize {
        match self {
            DemandeKind::Echange => 0,
            DemandeKind::LeveeFond => 1,
        }
    }
}
