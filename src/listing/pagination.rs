// ============================================================================
// Paginateur
// ============================================================================
// Découpe un sous-ensemble en pages de taille fixe (5 par défaut)
//
// CONCEPTS RUST :
// 1. div_ceil : division arrondie au supérieur sans flottants
// 2. clamp : borne la page demandée dans [1, max(nb_pages, 1)]
// 3. Range<usize> : la tranche de la page courante
// ============================================================================

use std::ops::{Range, RangeInclusive};

/// Taille de page par défaut
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// État de pagination d'un sous-ensemble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
    current_page: usize,
    page_count: usize,
}

impl Pagination {
    /// Crée une pagination vide (page 1, aucune page)
    ///
    /// Une taille de page nulle est ramenée à 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
            page_count: 0,
        }
    }

    /// Taille de page
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Page courante (commence à 1)
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Nombre de pages
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Numéros de pages à afficher (1..=page_count, vide si aucune page)
    pub fn pages(&self) -> RangeInclusive<usize> {
        1..=self.page_count
    }

    /// Recalcule le nombre de pages pour `len` éléments
    ///
    /// La page courante est conservée puis bornée.
    pub fn update(&mut self, len: usize) {
        self.page_count = len.div_ceil(self.page_size);
        self.go_to(self.current_page);
    }

    /// Change de page, bornée dans [1, max(page_count, 1)]
    pub fn go_to(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.page_count.max(1));
    }

    /// Page suivante (reste sur la dernière)
    pub fn next(&mut self) {
        self.go_to(self.current_page + 1);
    }

    /// Page précédente (reste sur la première)
    pub fn previous(&mut self) {
        self.go_to(self.current_page.saturating_sub(1));
    }

    /// Tranche [(page-1)*taille, page*taille) coupée à `len`
    pub fn slice_range(&self, len: usize) -> Range<usize> {
        let start = ((self.current_page - 1) * self.page_size).min(len);
        let end = (start + self.page_size).min(len);
        start..end
    }

    /// Applique la tranche de la page courante à une liste
    pub fn page_of<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.slice_range(items.len())]
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        let mut pagination = Pagination::default();

        pagination.update(0);
        assert_eq!(pagination.page_count(), 0);
        assert!(pagination.pages().next().is_none());

        pagination.update(5);
        assert_eq!(pagination.page_count(), 1);

        pagination.update(12);
        assert_eq!(pagination.page_count(), 3);
        assert_eq!(pagination.pages().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_last_page_is_partial() {
        let items: Vec<u32> = (0..12).collect();
        let mut pagination = Pagination::default();
        pagination.update(items.len());

        pagination.go_to(3);
        assert_eq!(pagination.page_of(&items), &[10, 11]);

        pagination.go_to(1);
        assert_eq!(pagination.page_of(&items), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        let items: Vec<u32> = (0..12).collect();
        let mut pagination = Pagination::default();
        pagination.update(items.len());

        pagination.go_to(42);
        assert_eq!(pagination.current_page(), 3);
        assert_eq!(pagination.page_of(&items), &[10, 11]);

        pagination.go_to(0);
        assert_eq!(pagination.current_page(), 1);
    }

    #[test]
    fn test_shrinking_subset_clamps_current_page() {
        let mut pagination = Pagination::default();
        pagination.update(12);
        pagination.go_to(3);

        pagination.update(4);
        assert_eq!(pagination.current_page(), 1);

        // Sous-ensemble vide : page 1, tranche vide
        pagination.update(0);
        assert_eq!(pagination.current_page(), 1);
        assert_eq!(pagination.slice_range(0), 0..0);
    }

    #[test]
    fn test_next_previous() {
        let mut pagination = Pagination::new(2);
        pagination.update(5);

        pagination.next();
        pagination.next();
        pagination.next();
        assert_eq!(pagination.current_page(), 3);

        pagination.previous();
        assert_eq!(pagination.current_page(), 2);
    }

    #[test]
    fn test_zero_page_size_is_raised() {
        let pagination = Pagination::new(0);
        assert_eq!(pagination.page_size(), 1);
    }
}
