//! Integration tests for bracket loading against the SQLite backend.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use sqlx::sqlite::SqlitePoolOptions;
use tax_core::{BracketStore, TaxBracket, TaxRepository, compute_tax};
use tax_data::{TaxBracketLoader, TaxBracketLoaderError};
use tax_db_sqlite::SqliteRepository;

const TEST_CSV: &str = include_str!("../test-data/tax_brackets.csv");

/// Migrated database with no seed data, as after `--migrate` without `--seeds`.
async fn setup_test_db_without_seeds() -> SqliteRepository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    let repo = SqliteRepository::new_with_pool(pool).await;
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");

    repo
}

async fn setup_test_db() -> SqliteRepository {
    let repo = setup_test_db_without_seeds().await;
    let seeds = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../tax-db-sqlite/seeds");
    repo.run_seeds(&seeds)
        .await
        .expect("Failed to run seeds");
    repo
}

#[tokio::test]
async fn test_load_all_brackets() {
    let repo = setup_test_db().await;

    let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
    let inserted = TaxBracketLoader::load(&repo, &records)
        .await
        .expect("Failed to load brackets");

    assert_eq!(inserted, 13);
}

#[tokio::test]
async fn test_loaded_table_replaces_seeded_one() {
    let repo = setup_test_db().await;

    let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
    TaxBracketLoader::load(&repo, &records)
        .await
        .expect("Failed to load brackets");

    let de = repo.resolve_brackets("DE").await.expect("Should get DE");
    assert_eq!(
        de,
        vec![
            TaxBracket::new("DE", dec!(0), Some(dec!(12096)), dec!(0)),
            TaxBracket::new("DE", dec!(12096), Some(dec!(68429)), dec!(24)),
            TaxBracket::new("DE", dec!(68429), Some(dec!(277825)), dec!(42)),
            TaxBracket::new("DE", dec!(277825), None, dec!(45)),
        ]
    );

    // Countries absent from the file keep their seeded tables.
    let us = repo.resolve_brackets("US").await.expect("Should get US");
    assert_eq!(us.len(), 7);
}

#[tokio::test]
async fn test_load_is_idempotent() {
    let repo = setup_test_db().await;
    let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

    TaxBracketLoader::load(&repo, &records)
        .await
        .expect("First load failed");
    let first = repo.resolve_brackets("CA").await.expect("Should get CA");
    TaxBracketLoader::load(&repo, &records)
        .await
        .expect("Second load failed");
    let second = repo.resolve_brackets("CA").await.expect("Should get CA");

    assert_eq!(first, second);
    assert_eq!(second.len(), 5);
}

#[tokio::test]
async fn test_loaded_brackets_drive_the_calculator() {
    let repo = setup_test_db().await;
    let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
    TaxBracketLoader::load(&repo, &records)
        .await
        .expect("Failed to load brackets");

    let brackets = repo.resolve_brackets("CA").await.expect("Should get CA");
    let result = compute_tax(dec!(60000), &brackets);

    // 57375 * 15% + 2625 * 20.5%
    assert_eq!(result.total_tax, dec!(9144.375));
}

#[tokio::test]
async fn test_load_without_seeds_reports_missing_country() {
    let repo = setup_test_db_without_seeds().await;
    let records = TaxBracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

    let err = TaxBracketLoader::load(&repo, &records)
        .await
        .expect_err("Should fail without the country catalog");

    // Countries are loaded in code order, so CA is the first one checked.
    match err {
        TaxBracketLoaderError::CountryNotFound(code) => assert_eq!(code, "CA"),
        other => panic!("expected CountryNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_schedule_writes_nothing() {
    let repo = setup_test_db().await;
    let csv = "country_code,min_income,max_income,rate_percent\n\
               AU,0,10000,0\n\
               AU,10000,,10\n\
               GB,0,10000,0\n\
               GB,20000,,20\n";
    let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

    let err = TaxBracketLoader::load(&repo, &records)
        .await
        .expect_err("GB has a gap");

    assert!(matches!(err, TaxBracketLoaderError::InvalidSchedule { ref country_code, .. } if country_code == "GB"));
    // AU validated fine but must not have been replaced either.
    let au = repo.resolve_brackets("AU").await.expect("Should get AU");
    assert_eq!(au.len(), 5);
}

#[tokio::test]
async fn test_unknown_country_leaves_other_tables_untouched() {
    let repo = setup_test_db().await;
    let gb_before = repo.resolve_brackets("GB").await.expect("Should get GB");
    let csv = "country_code,min_income,max_income,rate_percent\n\
               GB,0,20000,0\n\
               GB,20000,,30\n\
               ZZ,0,10000,0\n\
               ZZ,10000,,10\n";
    let records = TaxBracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

    let err = TaxBracketLoader::load(&repo, &records)
        .await
        .expect_err("ZZ is not in the country catalog");

    match err {
        TaxBracketLoaderError::CountryNotFound(code) => assert_eq!(code, "ZZ"),
        other => panic!("expected CountryNotFound, got {other:?}"),
    }
    let gb_after = repo.resolve_brackets("GB").await.expect("Should get GB");
    assert_eq!(gb_after, gb_before);
    assert_eq!(gb_after.len(), 4);
}

#[tokio::test]
async fn test_countries_are_available_after_seeding() {
    let repo = setup_test_db().await;

    let countries = repo.list_countries().await.expect("Should list countries");

    assert_eq!(countries.len(), 35);
    assert!(countries.iter().any(|c| c.code == "EU" && c.currency == "EUR"));
}
