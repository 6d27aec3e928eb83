use std::collections::BTreeMap;
use std::io::Read;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{RepositoryError, ScheduleError, TaxBracket, TaxRepository, validate_schedule};
use thiserror::Error;
use tracing::{debug, info};

static COUNTRY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("country code pattern is valid"));

/// Errors that can occur when loading tax bracket data.
#[derive(Debug, Error)]
pub enum TaxBracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid country code '{0}' (expected two uppercase letters)")]
    InvalidCountryCode(String),

    #[error("Invalid schedule for {country_code}: {source}")]
    InvalidSchedule {
        country_code: String,
        #[source]
        source: ScheduleError,
    },

    #[error("Country '{0}' not found in database (have you run the seeds?)")]
    CountryNotFound(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for TaxBracketLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxBracketLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of a bracket CSV file.
///
/// - `country_code`: ISO 3166-1 alpha-2 code, e.g. `GB`
/// - `min_income`: floor of the bracket
/// - `max_income`: ceiling of the bracket, empty for the top bracket
/// - `rate_percent`: marginal rate in percent, e.g. `20.5`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub country_code: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate_percent: Decimal,
}

impl From<&TaxBracketRecord> for TaxBracket {
    fn from(record: &TaxBracketRecord) -> Self {
        TaxBracket::new(
            record.country_code.clone(),
            record.min_income,
            record.max_income,
            record.rate_percent,
        )
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for per-country bracket tables from CSV.
///
/// Works against any [`TaxRepository`] backend.
pub struct TaxBracketLoader;

impl TaxBracketLoader {
    /// Parse tax bracket records from a CSV reader.
    ///
    /// Leading and trailing whitespace in fields is ignored.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBracketRecord>, TaxBracketLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        csv_reader
            .deserialize()
            .map(|result| result.map_err(TaxBracketLoaderError::from))
            .collect()
    }

    /// Groups records by country, ordered by floor, and checks each group is
    /// a complete schedule. Nothing is written.
    pub fn schedules(
        records: &[TaxBracketRecord]
    ) -> Result<BTreeMap<String, Vec<TaxBracket>>, TaxBracketLoaderError> {
        let mut groups: BTreeMap<String, Vec<TaxBracket>> = BTreeMap::new();

        for record in records {
            if !COUNTRY_CODE.is_match(&record.country_code) {
                return Err(TaxBracketLoaderError::InvalidCountryCode(
                    record.country_code.clone(),
                ));
            }
            groups
                .entry(record.country_code.clone())
                .or_default()
                .push(record.into());
        }

        for (country_code, brackets) in &mut groups {
            brackets.sort_by(|a, b| a.min_income.cmp(&b.min_income));
            validate_schedule(brackets).map_err(|source| TaxBracketLoaderError::InvalidSchedule {
                country_code: country_code.clone(),
                source,
            })?;
        }

        Ok(groups)
    }

    /// Load tax bracket records into the database.
    ///
    /// Every country's schedule is validated, and every country is checked
    /// against the catalog, before anything is written. The tables are then
    /// replaced in one all-or-nothing write, so loading the same file twice
    /// gives the same tables and a failed load changes none of them.
    ///
    /// Returns the number of brackets inserted.
    pub async fn load<R: TaxRepository + ?Sized>(
        repo: &R,
        records: &[TaxBracketRecord],
    ) -> Result<usize, TaxBracketLoaderError> {
        let schedules = Self::schedules(records)?;

        for country_code in schedules.keys() {
            repo.get_country(country_code).await.map_err(|e| match e {
                RepositoryError::NotFound => {
                    TaxBracketLoaderError::CountryNotFound(country_code.clone())
                }
                other => TaxBracketLoaderError::Repository(other),
            })?;
        }

        repo.replace_tax_brackets(&schedules).await?;

        for (country_code, brackets) in &schedules {
            debug!(country = %country_code, brackets = brackets.len(), "replaced bracket table");
        }
        let inserted: usize = schedules.values().map(Vec::len).sum();
        info!(inserted, countries = schedules.len(), "tax brackets loaded");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const HEADER: &str = "country_code,min_income,max_income,rate_percent\n";

    fn csv(rows: &str) -> String {
        format!("{HEADER}{rows}")
    }

    #[test]
    fn test_parse_csv_single_bracket() {
        let records =
            TaxBracketLoader::parse(csv("GB,0,12570,0").as_bytes()).expect("Failed to parse CSV");

        assert_eq!(
            records,
            vec![TaxBracketRecord {
                country_code: "GB".to_string(),
                min_income: dec!(0),
                max_income: Some(dec!(12570)),
                rate_percent: dec!(0),
            }]
        );
    }

    #[test]
    fn test_parse_csv_unbounded_and_fractional() {
        let records = TaxBracketLoader::parse(csv("CA, 253414 , ,33\nCA,57375,114750,20.5").as_bytes())
            .expect("Failed to parse CSV");

        assert_eq!(records[0].min_income, dec!(253414));
        assert_eq!(records[0].max_income, None);
        assert_eq!(records[1].rate_percent, dec!(20.5));
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let bad = "country_code,min_income,max_income\nGB,0,12570";

        let err = TaxBracketLoader::parse(bad.as_bytes()).expect_err("Should fail for missing column");

        let TaxBracketLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(msg.contains("missing field"), "got: {msg}");
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let err = TaxBracketLoader::parse(csv("GB,abc,12570,0").as_bytes())
            .expect_err("Should fail for invalid decimal");

        assert!(matches!(err, TaxBracketLoaderError::CsvParse(_)), "got: {err:?}");
    }

    #[test]
    fn test_parse_empty_csv() {
        let records = TaxBracketLoader::parse(HEADER.as_bytes()).expect("Failed to parse CSV");

        assert!(records.is_empty());
    }

    #[test]
    fn test_schedules_group_and_sort_per_country() {
        let records = TaxBracketLoader::parse(
            csv("GB,50270,,40\nAU,0,18200,0\nGB,0,12570,0\nAU,18200,,16\nGB,12570,50270,20").as_bytes(),
        )
        .expect("Failed to parse CSV");

        let schedules = TaxBracketLoader::schedules(&records).expect("valid schedules");

        assert_eq!(schedules.keys().collect::<Vec<_>>(), vec!["AU", "GB"]);
        let floors: Vec<_> = schedules["GB"].iter().map(|b| b.min_income).collect();
        assert_eq!(floors, vec![dec!(0), dec!(12570), dec!(50270)]);
    }

    #[test]
    fn test_schedules_reject_bad_country_codes() {
        for code in ["gb", "GBR", "G1", ""] {
            let records = vec![TaxBracketRecord {
                country_code: code.to_string(),
                min_income: dec!(0),
                max_income: None,
                rate_percent: dec!(10),
            }];

            let err = TaxBracketLoader::schedules(&records).expect_err("code should be rejected");

            assert!(
                matches!(&err, TaxBracketLoaderError::InvalidCountryCode(c) if c == code),
                "code {code:?}: {err:?}"
            );
        }
    }

    #[test]
    fn test_schedules_reject_gaps() {
        let records =
            TaxBracketLoader::parse(csv("GB,0,12570,0\nGB,15000,,20").as_bytes()).expect("parse");

        let err = TaxBracketLoader::schedules(&records).expect_err("gap should be rejected");

        match err {
            TaxBracketLoaderError::InvalidSchedule {
                country_code,
                source,
            } => {
                assert_eq!(country_code, "GB");
                assert_eq!(
                    source,
                    ScheduleError::NotContiguous {
                        index: 1,
                        expected: dec!(12570),
                        found: dec!(15000),
                    }
                );
            }
            other => panic!("expected InvalidSchedule, got {other:?}"),
        }
    }

    #[test]
    fn test_schedules_reject_bounded_top_bracket() {
        let records =
            TaxBracketLoader::parse(csv("AU,0,18200,0\nAU,18200,45000,16").as_bytes()).expect("parse");

        let err = TaxBracketLoader::schedules(&records).expect_err("top must be unbounded");

        assert!(matches!(
            err,
            TaxBracketLoaderError::InvalidSchedule {
                source: ScheduleError::BoundedTopBracket,
                ..
            }
        ));
    }
}
