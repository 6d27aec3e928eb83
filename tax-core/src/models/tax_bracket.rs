use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One marginal rate band of a country's income-tax table.
///
/// `max_income` of `None` means the bracket is unbounded above.
/// `rate_percent` is expressed in percent (e.g. `20` for 20%).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub country_code: String,
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub rate_percent: Decimal,
}

impl TaxBracket {
    pub fn new(
        country_code: impl Into<String>,
        min_income: Decimal,
        max_income: Option<Decimal>,
        rate_percent: Decimal,
    ) -> Self {
        Self {
            country_code: country_code.into(),
            min_income,
            max_income,
            rate_percent,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_income.is_none()
    }
}

/// Reasons a country's bracket table is rejected at ingestion.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("bracket schedule is empty")]
    Empty,

    #[error("first bracket must start at 0, found {0}")]
    FirstBracketNotAtZero(Decimal),

    #[error("bracket {index} has rate {rate_percent}% outside 0-100")]
    RateOutOfRange { index: usize, rate_percent: Decimal },

    #[error("bracket {index} has max_income {max_income} not above min_income {min_income}")]
    EmptyRange {
        index: usize,
        min_income: Decimal,
        max_income: Decimal,
    },

    #[error("bracket {index} starts at {found} but previous bracket ends at {expected}")]
    NotContiguous {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index} is unbounded but is not the last bracket")]
    UnboundedBeforeEnd { index: usize },

    #[error("last bracket must be unbounded")]
    BoundedTopBracket,
}

/// Checks that a country's brackets form a single ascending, gap-free table
/// starting at zero and ending in an unbounded bracket. Contiguity from a zero
/// floor also rules out negative `min_income` values.
///
/// The calculator never calls this; tables are checked once when loaded.
pub fn validate_schedule(brackets: &[TaxBracket]) -> Result<(), ScheduleError> {
    let first = brackets.first().ok_or(ScheduleError::Empty)?;
    if first.min_income != Decimal::ZERO {
        return Err(ScheduleError::FirstBracketNotAtZero(first.min_income));
    }

    let last_index = brackets.len() - 1;
    let mut previous_max: Option<Decimal> = None;

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.rate_percent < Decimal::ZERO || bracket.rate_percent > Decimal::ONE_HUNDRED {
            return Err(ScheduleError::RateOutOfRange {
                index,
                rate_percent: bracket.rate_percent,
            });
        }
        if let Some(expected) = previous_max
            && bracket.min_income != expected
        {
            return Err(ScheduleError::NotContiguous {
                index,
                expected,
                found: bracket.min_income,
            });
        }

        match bracket.max_income {
            Some(max_income) if max_income <= bracket.min_income => {
                return Err(ScheduleError::EmptyRange {
                    index,
                    min_income: bracket.min_income,
                    max_income,
                });
            }
            Some(max_income) => previous_max = Some(max_income),
            None if index != last_index => {
                return Err(ScheduleError::UnboundedBeforeEnd { index });
            }
            None => {}
        }
    }

    if brackets[last_index].is_unbounded() {
        Ok(())
    } else {
        Err(ScheduleError::BoundedTopBracket)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn bracket(
        min: Decimal,
        max: Option<Decimal>,
        rate: Decimal,
    ) -> TaxBracket {
        TaxBracket::new("XX", min, max, rate)
    }

    fn three_band_schedule() -> Vec<TaxBracket> {
        vec![
            bracket(dec!(0), Some(dec!(10000)), dec!(10)),
            bracket(dec!(10000), Some(dec!(50000)), dec!(20)),
            bracket(dec!(50000), None, dec!(30)),
        ]
    }

    #[test]
    fn accepts_contiguous_schedule() {
        assert_eq!(validate_schedule(&three_band_schedule()), Ok(()));
    }

    #[test]
    fn accepts_single_unbounded_bracket() {
        let schedule = vec![bracket(dec!(0), None, dec!(0))];

        assert_eq!(validate_schedule(&schedule), Ok(()));
    }

    #[test]
    fn rejects_empty_schedule() {
        assert_eq!(validate_schedule(&[]), Err(ScheduleError::Empty));
    }

    #[test]
    fn rejects_schedule_not_starting_at_zero() {
        let mut schedule = three_band_schedule();
        schedule[0].min_income = dec!(100);

        assert_eq!(
            validate_schedule(&schedule),
            Err(ScheduleError::FirstBracketNotAtZero(dec!(100)))
        );
    }

    #[test]
    fn rejects_gap_between_brackets() {
        let mut schedule = three_band_schedule();
        schedule[1].min_income = dec!(12000);

        assert_eq!(
            validate_schedule(&schedule),
            Err(ScheduleError::NotContiguous {
                index: 1,
                expected: dec!(10000),
                found: dec!(12000),
            })
        );
    }

    #[test]
    fn rejects_overlapping_brackets() {
        let mut schedule = three_band_schedule();
        schedule[2].min_income = dec!(40000);

        assert!(matches!(
            validate_schedule(&schedule),
            Err(ScheduleError::NotContiguous { index: 2, .. })
        ));
    }

    #[test]
    fn rejects_descending_order() {
        let mut schedule = three_band_schedule();
        schedule.swap(0, 1);

        assert_eq!(
            validate_schedule(&schedule),
            Err(ScheduleError::FirstBracketNotAtZero(dec!(10000)))
        );
    }

    #[test]
    fn rejects_bounded_top_bracket() {
        let mut schedule = three_band_schedule();
        schedule[2].max_income = Some(dec!(90000));

        assert_eq!(
            validate_schedule(&schedule),
            Err(ScheduleError::BoundedTopBracket)
        );
    }

    #[test]
    fn rejects_unbounded_bracket_in_the_middle() {
        let mut schedule = three_band_schedule();
        schedule[1].max_income = None;

        assert_eq!(
            validate_schedule(&schedule),
            Err(ScheduleError::UnboundedBeforeEnd { index: 1 })
        );
    }

    #[test]
    fn rejects_rate_above_one_hundred() {
        let mut schedule = three_band_schedule();
        schedule[2].rate_percent = dec!(100.5);

        assert_eq!(
            validate_schedule(&schedule),
            Err(ScheduleError::RateOutOfRange {
                index: 2,
                rate_percent: dec!(100.5),
            })
        );
    }

    #[test]
    fn rejects_negative_rate() {
        let mut schedule = three_band_schedule();
        schedule[0].rate_percent = dec!(-1);

        assert!(matches!(
            validate_schedule(&schedule),
            Err(ScheduleError::RateOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_zero_width_bracket() {
        let schedule = vec![
            bracket(dec!(0), Some(dec!(0)), dec!(10)),
            bracket(dec!(0), None, dec!(20)),
        ];

        assert_eq!(
            validate_schedule(&schedule),
            Err(ScheduleError::EmptyRange {
                index: 0,
                min_income: dec!(0),
                max_income: dec!(0),
            })
        );
    }
}
