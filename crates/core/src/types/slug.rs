//! Category slug normalization.

/// Normalize a category slug for lookups.
///
/// Clients address categories with dash or underscore variants
/// interchangeably (`smart_home` vs `smart-home`). Stored slugs use dashes,
/// so underscores are folded to dashes and the result lowercased before any
/// equality match.
#[must_use]
pub fn normalize_slug(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underscores_become_dashes() {
        assert_eq!(normalize_slug("smart_home"), "smart-home");
        assert_eq!(normalize_slug("zero_waste"), "zero-waste");
    }

    #[test]
    fn dashed_slugs_pass_through() {
        assert_eq!(normalize_slug("eco-transport"), "eco-transport");
    }

    #[test]
    fn case_and_whitespace_are_folded() {
        assert_eq!(normalize_slug("  Urban_Farming "), "urban-farming");
    }
}
