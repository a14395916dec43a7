// Property-based tests for the reference codec and formula translation.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use gridcalc_engine::engine::{CellRef, col_to_letters, letters_to_col, translate_formula};
use proptest::prelude::*;

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn arb_cell() -> impl Strategy<Value = CellRef> {
    (0usize..100_000, 0usize..20_000).prop_map(|(row, col)| CellRef::new(row, col))
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn column_letters_round_trip(col in 0usize..10_000_000) {
        let letters = col_to_letters(col);
        prop_assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
        prop_assert_eq!(letters_to_col(&letters), Ok(col));
    }

    #[test]
    fn cell_ref_display_round_trip(cell in arb_cell()) {
        let text = cell.to_string();
        prop_assert_eq!(CellRef::parse(&text), Ok(cell));
    }

    #[test]
    fn translate_then_back_restores_formula(
        cell in arb_cell(),
        dr in 0isize..50,
        dc in 0isize..50,
    ) {
        let formula = format!("{cell}*2+$A$1");
        let forward = translate_formula(&formula, dr, dc);
        prop_assert_eq!(translate_formula(&forward, -dr, -dc), formula);
    }

    #[test]
    fn absolute_refs_never_move(
        cell in arb_cell(),
        dr in -50isize..50,
        dc in -50isize..50,
    ) {
        let formula = format!("${}${}", col_to_letters(cell.col), cell.row + 1);
        prop_assert_eq!(translate_formula(&formula, dr, dc), formula);
    }
}
