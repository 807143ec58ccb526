//! Property-based tests for the expression language and the cut pipeline.
//!
//! These verify that:
//! 1. **No panics**: parsing never crashes, whatever the input text
//! 2. **Determinism**: the same cut over the same table always yields the
//!    same verdicts
//! 3. **Invariants**: verdict columns match the documented semantics,
//!    including NaN handling and chained-comparison desugaring

use proptest::prelude::*;

use cutflow::dataset::Column;
use cutflow::expr;
use cutflow::{Cut, Dataset, IntervalCut};

// =============================================================================
// Test strategies
// =============================================================================

/// Arbitrary text, biased toward expression-looking fragments.
fn expression_like() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z_][a-z0-9_]{0,10}( [<>&|+*/-] [a-z0-9_.]{1,8}){0,4}",
        "[ -~]{0,40}",
        "\\(+[a-z]{1,5}\\)*",
    ]
}

/// Finite f64 values in a physically plausible range.
fn finite_value() -> impl Strategy<Value = f64> {
    -1e6..1e6f64
}

/// Values that may also be NaN.
fn value_or_nan() -> impl Strategy<Value = f64> {
    prop_oneof![9 => finite_value(), 1 => Just(f64::NAN)]
}

fn dataset_with(name: &str, values: Vec<f64>) -> Dataset {
    let mut ds = Dataset::with_rows(values.len());
    ds.insert(name, Column::Float(values)).unwrap();
    ds
}

// =============================================================================
// Parser robustness
// =============================================================================

proptest! {
    #[test]
    fn parsing_never_panics(source in expression_like()) {
        let _ = expr::parse_predicate(&source);
        let _ = expr::parse_numeric(&source);
    }

    #[test]
    fn parsing_is_deterministic(source in expression_like()) {
        let first = expr::parse_predicate(&source).is_ok();
        let second = expr::parse_predicate(&source).is_ok();
        prop_assert_eq!(first, second);
    }
}

// =============================================================================
// Evaluation semantics
// =============================================================================

proptest! {
    #[test]
    fn interval_cut_matches_half_open_range(
        values in prop::collection::vec(value_or_nan(), 0..50),
        low in finite_value(),
        width in 0.0..1e6f64,
    ) {
        let high = low + width;
        let mut ds = dataset_with("x", values.clone());
        IntervalCut::new("Range", 0, "x", low, high).evaluate(&mut ds).unwrap();

        let verdicts = ds.boolean("Range").unwrap();
        prop_assert_eq!(verdicts.len(), values.len());
        for (&v, &pass) in values.iter().zip(verdicts) {
            // NaN always fails; otherwise half-open [low, high).
            prop_assert_eq!(pass, low <= v && v < high);
        }
    }

    #[test]
    fn evaluation_is_deterministic(
        values in prop::collection::vec(value_or_nan(), 1..50),
        threshold in finite_value(),
    ) {
        let expr = expr::parse_predicate("x < t").unwrap();
        let params = std::collections::HashMap::from([("t".to_string(), threshold)]);

        let ds = dataset_with("x", values);
        let first = expr::evaluate_predicate(&expr, &ds, &params).unwrap();
        let second = expr::evaluate_predicate(&expr, &ds, &params).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn chained_comparison_desugars_to_conjunction(
        values in prop::collection::vec(value_or_nan(), 1..50),
        low in finite_value(),
        high in finite_value(),
    ) {
        let chained = expr::parse_predicate("@low < x < @high").unwrap();
        let explicit = expr::parse_predicate("(@low < x) & (x < @high)").unwrap();
        let params = std::collections::HashMap::from([
            ("low".to_string(), low),
            ("high".to_string(), high),
        ]);

        let ds = dataset_with("x", values);
        prop_assert_eq!(
            expr::evaluate_predicate(&chained, &ds, &params).unwrap(),
            expr::evaluate_predicate(&explicit, &ds, &params).unwrap()
        );
    }

    #[test]
    fn comparison_binds_tighter_than_combinators(
        values in prop::collection::vec(finite_value(), 1..50),
        low in finite_value(),
        high in finite_value(),
    ) {
        // Without precedence parentheses the source reads exactly as the
        // parenthesized form.
        let bare = expr::parse_predicate("x < @high & x > @low").unwrap();
        let grouped = expr::parse_predicate("(x < @high) & (x > @low)").unwrap();
        let params = std::collections::HashMap::from([
            ("low".to_string(), low),
            ("high".to_string(), high),
        ]);

        let ds = dataset_with("x", values);
        prop_assert_eq!(
            expr::evaluate_predicate(&bare, &ds, &params).unwrap(),
            expr::evaluate_predicate(&grouped, &ds, &params).unwrap()
        );
    }

    #[test]
    fn nan_comparisons_are_false_and_negation_flips_them(
        values in prop::collection::vec(value_or_nan(), 1..50),
    ) {
        let direct = expr::parse_predicate("x >= 0").unwrap();
        let negated = expr::parse_predicate("~(x >= 0)").unwrap();
        let params = std::collections::HashMap::new();

        let ds = dataset_with("x", values.clone());
        let direct = expr::evaluate_predicate(&direct, &ds, &params).unwrap();
        let negated = expr::evaluate_predicate(&negated, &ds, &params).unwrap();

        for ((&v, &d), &n) in values.iter().zip(&direct).zip(&negated) {
            if v.is_nan() {
                // The comparison is false, so its negation is true.
                prop_assert!(!d);
                prop_assert!(n);
            } else {
                prop_assert_eq!(d, v >= 0.0);
                prop_assert_eq!(n, !d);
            }
        }
    }
}

// =============================================================================
// Pipeline invariants
// =============================================================================

proptest! {
    #[test]
    fn verdict_columns_never_change_row_count(
        values in prop::collection::vec(value_or_nan(), 0..50),
    ) {
        let rows = values.len();
        let mut ds = dataset_with("x", values);
        IntervalCut::new("Range", 0, "x", -1.0, 1.0).evaluate(&mut ds).unwrap();
        prop_assert_eq!(ds.row_count(), rows);
    }

    #[test]
    fn ln_gamma_satisfies_the_recurrence(x in 0.5..50.0f64) {
        use cutflow::physics::stats::ln_gamma;
        // Gamma(x + 1) = x * Gamma(x).
        let lhs = ln_gamma(x + 1.0);
        let rhs = ln_gamma(x) + x.ln();
        prop_assert!((lhs - rhs).abs() < 1e-8 * lhs.abs().max(1.0));
    }
}
