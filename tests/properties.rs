use chrono::NaiveDate;
use proptest::prelude::*;
use truck_compare::{
    ClassifyOptions, MatchOptions, NormalizedRecord, Role, Sheet, TabularDataset, classify,
    normalize::extract_identifier, reconcile,
};

fn record_strategy() -> impl Strategy<Value = NormalizedRecord> {
    (
        "[A-Z0-9]{6,11}",
        proptest::option::of(1u32..=28),
        prop_oneof![Just(String::new()), "[0-9]{4,7}"],
    )
        .prop_map(|(id, day, invoice)| {
            let date = day.and_then(|d| NaiveDate::from_ymd_opt(2024, 1, d));
            NormalizedRecord::new(id, date, invoice, "ledger.csv", "Sheet1")
        })
}

fn cell_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[A-Za-z0-9 ]{0,14}",
        "[0-9]{1,2}/[0-9]{1,2}/20[0-9]{2}",
        "INV-[0-9]{2,6}",
    ]
}

proptest! {
    #[test]
    fn normalized_identifiers_are_fixed_points(id in "[A-Z0-9]{6,11}") {
        let once = extract_identifier(&id).expect("valid identifier");
        prop_assert_eq!(&once, &id);
        let twice = extract_identifier(&once).expect("still valid");
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn lowercase_identifiers_normalize_to_uppercase(id in "[a-z0-9]{6,11}") {
        let normalized = extract_identifier(&format!("  {id} ")).expect("valid identifier");
        prop_assert_eq!(normalized, id.to_ascii_uppercase());
    }

    #[test]
    fn reconcile_emits_one_result_per_main_record_in_order(
        main in proptest::collection::vec(record_strategy(), 0..20),
        bills in proptest::collection::vec(record_strategy(), 0..20),
    ) {
        let results = reconcile(&main, &bills, &MatchOptions::default());
        prop_assert_eq!(results.len(), main.len());
        for (result, record) in results.iter().zip(&main) {
            prop_assert_eq!(&result.id, &record.id);
            prop_assert_eq!(result.date, record.date);
            prop_assert_eq!(&result.invoice, &record.invoice);
        }
    }

    #[test]
    fn assigned_roles_have_enough_sampled_hits(
        rows in proptest::collection::vec(proptest::collection::vec(cell_strategy(), 1..5), 1..40),
    ) {
        let dataset = TabularDataset::from_sheets([Sheet::new("f.csv", "f", rows)]);
        let options = ClassifyOptions::default();
        let roles = classify(&dataset, &options);
        for role in Role::ALL {
            if let Some(column) = roles.get(role) {
                let hits = dataset
                    .non_empty_values(column)
                    .take(options.sample_size)
                    .filter(|value| role.matches(value))
                    .count();
                prop_assert!(hits >= options.min_matches, "{role} in {column} had {hits} hit(s)");
            }
        }
    }
}
