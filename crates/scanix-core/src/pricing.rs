//! # Pricing Module
//!
//! Volume-pricing resolution: maps a requested quantity onto a product's
//! tier set and yields the unit price a sale line must freeze.
//!
//! ## Resolution Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Product: base $10.00                                               │
//! │  Tiers:   10..=49  → $8.00                                          │
//! │           50..     → $7.00                                          │
//! │                                                                     │
//! │  resolve_unit_price(base, tiers, 9)   → $10.00  (no tier matches)   │
//! │  resolve_unit_price(base, tiers, 10)  → $8.00   (boundary, incl.)   │
//! │  resolve_unit_price(base, tiers, 120) → $7.00   (highest min wins)  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Among all tiers that cover the quantity, the one with the **highest
//! `min_quantity`** wins. On a well-formed (non-overlapping) set exactly
//! one tier can match; on a malformed set the tie-break keeps resolution
//! deterministic and picks the deepest discount the buyer qualified for.
//!
//! No side effects, no I/O: the resolver is trivially unit-testable and
//! the db layer calls it inside sale transactions with rules it fetched.

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{PriceRule, PriceRuleSpec};
use crate::validation::ValidationResult;

// =============================================================================
// Resolution
// =============================================================================

/// Resolves the unit price for `quantity` units of a product.
///
/// - Empty `rules` → `base_price`.
/// - Otherwise the matching tier with the highest `min_quantity` wins;
///   both range bounds are inclusive, `max_quantity = None` is unbounded.
/// - No tier matches → `base_price`.
///
/// Quantities ≤ 0 are a caller error rejected upstream by
/// [`crate::validation::validate_quantity`]; this function does not
/// re-validate.
///
/// ## Example
/// ```rust
/// use scanix_core::money::Money;
/// use scanix_core::pricing::resolve_unit_price;
/// use scanix_core::types::PriceRule;
///
/// let base = Money::from_cents(1000);
/// let rules = [PriceRule::tier("p1", 10, None, Money::from_cents(800))];
///
/// assert_eq!(resolve_unit_price(base, &rules, 9).cents(), 1000);
/// assert_eq!(resolve_unit_price(base, &rules, 10).cents(), 800);
/// assert_eq!(resolve_unit_price(base, &rules, 100).cents(), 800);
/// ```
pub fn resolve_unit_price(base_price: Money, rules: &[PriceRule], quantity: i64) -> Money {
    rules
        .iter()
        .filter(|rule| rule.applies_to(quantity))
        .max_by_key(|rule| rule.min_quantity)
        .map(PriceRule::unit_price)
        .unwrap_or(base_price)
}

// =============================================================================
// Rule-Set Validation
// =============================================================================

/// Validates a tier set before it is persisted.
///
/// ## Rules
/// - `min_quantity` must be positive
/// - `max_quantity`, when set, must be ≥ `min_quantity`
/// - `unit_price_cents` must be non-negative
/// - Ranges must not overlap: sorted by `min_quantity`, each tier must
///   end (have a `max_quantity`) below the next tier's start
///
/// Run on every product create/update path; a set that fails here never
/// reaches the database, so the resolver's tie-break stays a formality.
pub fn validate_rule_set(rules: &[PriceRuleSpec]) -> ValidationResult<()> {
    for rule in rules {
        if rule.min_quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "min_quantity".to_string(),
            });
        }

        if let Some(max) = rule.max_quantity {
            if max < rule.min_quantity {
                return Err(ValidationError::InvalidFormat {
                    field: "max_quantity".to_string(),
                    reason: "upper bound is below the lower bound".to_string(),
                });
            }
        }

        if rule.unit_price_cents < 0 {
            return Err(ValidationError::OutOfRange {
                field: "unit_price".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
    }

    // Overlap check over the min-sorted set: every tier but the last must
    // be bounded, and must end before the next one starts.
    let mut sorted: Vec<&PriceRuleSpec> = rules.iter().collect();
    sorted.sort_by_key(|rule| rule.min_quantity);

    for pair in sorted.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        match current.max_quantity {
            None => {
                return Err(ValidationError::OverlappingRanges {
                    field: "price_rules".to_string(),
                    at: next.min_quantity,
                });
            }
            Some(max) if max >= next.min_quantity => {
                return Err(ValidationError::OverlappingRanges {
                    field: "price_rules".to_string(),
                    at: next.min_quantity,
                });
            }
            Some(_) => {}
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(min: i64, max: Option<i64>, cents: i64) -> PriceRule {
        PriceRule::tier("p1", min, max, Money::from_cents(cents))
    }

    fn spec(min: i64, max: Option<i64>, cents: i64) -> PriceRuleSpec {
        PriceRuleSpec {
            min_quantity: min,
            max_quantity: max,
            unit_price_cents: cents,
        }
    }

    #[test]
    fn test_empty_rules_fall_back_to_base() {
        let base = Money::from_cents(1000);
        assert_eq!(resolve_unit_price(base, &[], 1).cents(), 1000);
        assert_eq!(resolve_unit_price(base, &[], 999).cents(), 1000);
    }

    #[test]
    fn test_single_open_ended_tier() {
        // Base $10, tier {min:10, max:null, price:$8}
        let base = Money::from_cents(1000);
        let rules = [rule(10, None, 800)];

        assert_eq!(resolve_unit_price(base, &rules, 9).cents(), 1000);
        assert_eq!(resolve_unit_price(base, &rules, 10).cents(), 800);
        assert_eq!(resolve_unit_price(base, &rules, 100).cents(), 800);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let base = Money::from_cents(1000);
        let rules = [rule(10, Some(20), 800)];

        assert_eq!(resolve_unit_price(base, &rules, 10).cents(), 800);
        assert_eq!(resolve_unit_price(base, &rules, 20).cents(), 800);
        assert_eq!(resolve_unit_price(base, &rules, 21).cents(), 1000);
    }

    #[test]
    fn test_highest_matching_tier_wins() {
        let base = Money::from_cents(1000);
        let rules = [rule(10, Some(49), 800), rule(50, None, 700)];

        assert_eq!(resolve_unit_price(base, &rules, 12).cents(), 800);
        assert_eq!(resolve_unit_price(base, &rules, 50).cents(), 700);
        assert_eq!(resolve_unit_price(base, &rules, 500).cents(), 700);
    }

    #[test]
    fn test_overlapping_tiers_resolve_deterministically() {
        // Malformed set: both tiers cover 15. The higher min wins.
        let base = Money::from_cents(1000);
        let rules = [rule(5, Some(30), 900), rule(10, Some(20), 800)];

        assert_eq!(resolve_unit_price(base, &rules, 15).cents(), 800);
        // Order in the slice must not matter.
        let reversed = [rule(10, Some(20), 800), rule(5, Some(30), 900)];
        assert_eq!(resolve_unit_price(base, &reversed, 15).cents(), 800);
    }

    #[test]
    fn test_resolution_is_pure() {
        let base = Money::from_cents(1000);
        let rules = [rule(10, Some(49), 800), rule(50, None, 700)];

        let first = resolve_unit_price(base, &rules, 50);
        let second = resolve_unit_price(base, &rules, 50);
        assert_eq!(first, second);
    }

    #[test]
    fn test_validate_accepts_well_formed_set() {
        let rules = [spec(1, Some(9), 1000), spec(10, Some(49), 800), spec(50, None, 700)];
        assert!(validate_rule_set(&rules).is_ok());
    }

    #[test]
    fn test_validate_accepts_gaps() {
        // Gaps are fine; uncovered quantities use the base price.
        let rules = [spec(10, Some(19), 800), spec(50, None, 700)];
        assert!(validate_rule_set(&rules).is_ok());
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let rules = [spec(10, Some(30), 800), spec(20, None, 700)];
        assert!(matches!(
            validate_rule_set(&rules),
            Err(ValidationError::OverlappingRanges { at: 20, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unbounded_tier_below_another() {
        let rules = [spec(10, None, 800), spec(50, None, 700)];
        assert!(validate_rule_set(&rules).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_bounds() {
        assert!(validate_rule_set(&[spec(0, None, 800)]).is_err());
        assert!(validate_rule_set(&[spec(10, Some(5), 800)]).is_err());
        assert!(validate_rule_set(&[spec(10, None, -1)]).is_err());
    }
}
