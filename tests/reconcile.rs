mod common;

use chrono::NaiveDate;
use truck_compare::{
    ColumnId, CompareOptions, MatchOptions, MatchStatus, NormalizedRecord, compare_datasets,
    reconcile,
    reconcile::NOT_FOUND,
};

use common::dataset;

fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn record(
    id: &str,
    date: Option<NaiveDate>,
    invoice: &str,
    file: &str,
    sheet: &str,
) -> NormalizedRecord {
    NormalizedRecord::new(id, date, invoice, file, sheet)
}

#[test]
fn date_key_match_ignores_invoice_mismatch() {
    let main = [record("TRK12345", ymd(2024, 1, 5), "", "main.xlsx", "Jan")];
    let bills = [record("TRK12345", ymd(2024, 1, 5), "9981", "bills.xlsx", "Jan")];

    let results = reconcile(&main, &bills, &MatchOptions::default());

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, MatchStatus::Found);
    assert_eq!(results[0].matched_origin, "bills.xlsx | Jan");
}

#[test]
fn invoice_key_matches_when_dates_differ() {
    let main = [record("ABC123XY", None, "99871", "main.xlsx", "Jan")];
    let bills = [
        record("ABC123XY", ymd(2024, 2, 1), "99871", "bills.xlsx", "Feb"),
        record("ABC123XY", ymd(2024, 3, 1), "11111", "bills.xlsx", "Mar"),
    ];

    let results = reconcile(&main, &bills, &MatchOptions::default());

    assert_eq!(results[0].status, MatchStatus::FoundViaInvoice);
    assert_eq!(results[0].matched_origin, "bills.xlsx | Feb");
}

#[test]
fn primary_key_wins_over_fallback() {
    let main = [record("TRK12345", ymd(2024, 1, 5), "4455", "main.xlsx", "Jan")];
    let bills = [
        record("TRK12345", ymd(2024, 1, 9), "4455", "bills.xlsx", "ByInvoice"),
        record("TRK12345", ymd(2024, 1, 5), "7777", "bills.xlsx", "ByDate"),
    ];

    let results = reconcile(&main, &bills, &MatchOptions::default());

    assert_eq!(results[0].status, MatchStatus::Found);
    assert_eq!(results[0].matched_origin, "bills.xlsx | ByDate");
}

#[test]
fn unmatched_entry_is_missing() {
    let main = [record("TRK12345", ymd(2024, 1, 5), "4455", "main.xlsx", "Jan")];
    let bills = [
        record("TRK99999", ymd(2024, 1, 5), "4455", "bills.xlsx", "Jan"),
        record("TRK12345", ymd(2024, 1, 6), "4456", "bills.xlsx", "Jan"),
    ];

    let results = reconcile(&main, &bills, &MatchOptions::default());

    assert_eq!(results[0].status, MatchStatus::Missing);
    assert_eq!(results[0].matched_origin, NOT_FOUND);
}

#[test]
fn duplicate_bill_keys_resolve_to_the_last_bill() {
    let main = [record("TRK12345", ymd(2024, 1, 5), "", "main.xlsx", "Jan")];
    let bills = [
        record("TRK12345", ymd(2024, 1, 5), "1000", "first.xlsx", "Jan"),
        record("TRK12345", ymd(2024, 1, 5), "2000", "second.xlsx", "Jan"),
    ];

    let results = reconcile(&main, &bills, &MatchOptions::default());

    assert_eq!(results[0].matched_origin, "second.xlsx | Jan");
}

#[test]
fn duplicate_invoice_keys_resolve_to_the_last_bill() {
    let main = [record("ABC123XY", None, "99871", "main.xlsx", "Jan")];
    let bills = [
        record("ABC123XY", ymd(2024, 2, 1), "99871", "first.xlsx", "Feb"),
        record("ABC123XY", ymd(2024, 3, 1), "99871", "second.xlsx", "Mar"),
    ];

    let results = reconcile(&main, &bills, &MatchOptions::default());

    assert_eq!(results[0].status, MatchStatus::FoundViaInvoice);
    assert_eq!(results[0].matched_origin, "second.xlsx | Mar");
}

#[test]
fn results_follow_main_order_and_copy_main_fields() {
    let main = [
        record("ZZZ99999", None, "", "main.xlsx", "A"),
        record("TRK12345", ymd(2024, 1, 5), "", "main.xlsx", "B"),
        record("ABC123XY", None, "99871", "main.xlsx", "C"),
    ];
    let bills = [
        record("ABC123XY", None, "99871", "bills.xlsx", "X"),
        record("TRK12345", ymd(2024, 1, 5), "", "bills.xlsx", "Y"),
    ];

    let results = reconcile(&main, &bills, &MatchOptions::default());

    assert_eq!(results.len(), main.len());
    for (result, source) in results.iter().zip(&main) {
        assert_eq!(result.id, source.id);
        assert_eq!(result.date, source.date);
        assert_eq!(result.invoice, source.invoice);
        assert_eq!(result.sheet_name, source.sheet_name);
    }
    assert_eq!(results[0].status, MatchStatus::Missing);
    assert_eq!(results[1].status, MatchStatus::Found);
    assert_eq!(results[2].status, MatchStatus::Found);
}

#[test]
fn inputs_are_not_mutated() {
    let main = vec![record("TRK12345", ymd(2024, 1, 5), "", "main.xlsx", "Jan")];
    let bills = vec![record("TRK12345", ymd(2024, 1, 5), "9981", "bills.xlsx", "Jan")];
    let main_before = main.clone();
    let bills_before = bills.clone();

    let _ = reconcile(&main, &bills, &MatchOptions::default());

    assert_eq!(main, main_before);
    assert_eq!(bills, bills_before);
}

#[test]
fn full_pipeline_over_raw_sheets() {
    let main = dataset(
        "main.xlsx",
        "Trips",
        &[
            &["S.No", "Truck", "Bill", "Trip Date"],
            &["1", "trkab123", "INV 40011", "05/01/2024"],
            &["2", "ABC123XY", "INV 40012", "garbled"],
            &["3", "MHXY999Z", "INV 40013", "07/01/2024"],
            &["4", "--", "INV 40014", "08/01/2024"],
        ],
    );
    let bills = dataset(
        "bills.xlsx",
        "January",
        &[
            &["Bill for TRKAB123", "ref 77001", "dated 5 Jan 2024"],
            &["Bill for ABC123XY", "ref 40012", "dated 9 Jan 2024"],
        ],
    );

    let comparison = compare_datasets(&main, &bills, &CompareOptions::default()).expect("compare");

    assert_eq!(comparison.main_roles.identifier, Some(ColumnId(1)));
    assert_eq!(comparison.main_roles.invoice, Some(ColumnId(2)));
    assert_eq!(comparison.main_roles.date, Some(ColumnId(3)));
    assert_eq!(comparison.dropped_main, 2);
    assert_eq!(comparison.results.len(), 3);

    let statuses = comparison
        .results
        .iter()
        .map(|r| (r.id.as_str(), r.status))
        .collect::<Vec<_>>();
    assert_eq!(
        statuses,
        vec![
            ("TRKAB123", MatchStatus::Found),
            ("ABC123XY", MatchStatus::FoundViaInvoice),
            ("MHXY999Z", MatchStatus::Missing),
        ]
    );
    assert_eq!(comparison.results[0].matched_origin, "bills.xlsx | January");
    assert_eq!(comparison.summary.missing, 1);
}

#[test]
fn absent_dates_only_fall_through_to_invoice_when_incomplete_keys_are_skipped() {
    let main = [record("ABC123XY", None, "99871", "main.xlsx", "Jan")];
    let bills = [record("ABC123XY", None, "99871", "bills.xlsx", "Jan")];

    let legacy = reconcile(&main, &bills, &MatchOptions::default());
    assert_eq!(legacy[0].status, MatchStatus::Found);

    let strict = reconcile(
        &main,
        &bills,
        &MatchOptions {
            skip_incomplete_keys: true,
        },
    );
    assert_eq!(strict[0].status, MatchStatus::FoundViaInvoice);
}
