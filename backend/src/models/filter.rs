//! Filter normalization.
//!
//! Raw query input arrives as optional strings. [`normalize`] turns it into an
//! immutable [`FilterCriteria`] in which "no constraint" has exactly one
//! representation (`None`): blank values and the `all` sentinel never become
//! equality predicates.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::exposure::{Channel, TripType};
use super::time::Period;

/// Sentinel meaning "unconstrained" for text filters.
pub const ALL_SENTINEL: &str = "all";

/// Default histogram bin width in KRW.
pub const DEFAULT_BIN_SIZE: i64 = 10_000;

/// Smallest accepted histogram bin width in KRW.
pub const MIN_BIN_SIZE: i64 = 10_000;

/// Validation failure for filter input. Each variant names the offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("missing required filters: {field}")]
    MissingField { field: &'static str },

    #[error("invalid period '{value}': expected 24h or 7d")]
    InvalidPeriod { value: String },

    #[error("invalid {field} '{value}': expected a non-negative integer")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid binSize {value}: must be at least {min}")]
    BinSizeTooSmall { value: i64, min: i64 },

    #[error("invalid {field} '{value}': expected one of {expected}")]
    InvalidEnum {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl FilterError {
    /// Query parameter that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            FilterError::MissingField { field } => field,
            FilterError::InvalidPeriod { .. } => "period",
            FilterError::InvalidNumber { field, .. } => field,
            FilterError::BinSizeTooSmall { .. } => "binSize",
            FilterError::InvalidEnum { field, .. } => field,
        }
    }
}

/// Text-valued filter dimension, as used by the cascading option menus.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Airline,
    Origin,
    Destination,
    TripType,
    Channel,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Airline,
        Dimension::Origin,
        Dimension::Destination,
        Dimension::TripType,
        Dimension::Channel,
    ];
}

/// Raw, unvalidated filter parameters as received at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFilterQuery {
    #[serde(default)]
    pub airline: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub dest: Option<String>,
    #[serde(default)]
    pub trip_type: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub min_price: Option<String>,
    #[serde(default)]
    pub max_price: Option<String>,
    #[serde(default)]
    pub departure_date: Option<String>,
    #[serde(default)]
    pub arrival_date: Option<String>,
}

/// Normalized filter snapshot.
///
/// Fields are private so that every constructed value upholds the
/// normalization invariants; derive narrower criteria with [`without`],
/// [`only_airline`] and [`route_scope`].
///
/// [`without`]: FilterCriteria::without
/// [`only_airline`]: FilterCriteria::only_airline
/// [`route_scope`]: FilterCriteria::route_scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    period: Period,
    airlines: Option<BTreeSet<String>>,
    origin: Option<String>,
    destination: Option<String>,
    trip_type: Option<TripType>,
    channel: Option<Channel>,
    min_price: Option<i64>,
    max_price: Option<i64>,
    departure_date: Option<NaiveDate>,
    arrival_date: Option<NaiveDate>,
}

impl FilterCriteria {
    /// Unconstrained criteria over the given period.
    pub fn new(period: Period) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn airlines(&self) -> Option<&BTreeSet<String>> {
        self.airlines.as_ref()
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn trip_type(&self) -> Option<TripType> {
        self.trip_type
    }

    pub fn channel(&self) -> Option<Channel> {
        self.channel
    }

    pub fn min_price(&self) -> Option<i64> {
        self.min_price
    }

    pub fn max_price(&self) -> Option<i64> {
        self.max_price
    }

    pub fn departure_date(&self) -> Option<NaiveDate> {
        self.departure_date
    }

    pub fn arrival_date(&self) -> Option<NaiveDate> {
        self.arrival_date
    }

    /// Restrict to a set of airline codes. Blank codes and `all` are ignored;
    /// an empty result leaves airlines unconstrained.
    pub fn with_airlines<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = codes
            .into_iter()
            .filter_map(|c| text_filter(Some(c.as_ref())).map(str::to_string))
            .collect();
        self.airlines = if set.is_empty() { None } else { Some(set) };
        self
    }

    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = text_filter(Some(origin)).map(str::to_string);
        self
    }

    pub fn with_destination(mut self, destination: &str) -> Self {
        self.destination = text_filter(Some(destination)).map(str::to_string);
        self
    }

    pub fn with_trip_type(mut self, trip_type: TripType) -> Self {
        self.trip_type = Some(trip_type);
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Inclusive price bounds.
    pub fn with_price_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn with_departure_date(mut self, date: NaiveDate) -> Self {
        self.departure_date = Some(date);
        self
    }

    pub fn with_arrival_date(mut self, date: NaiveDate) -> Self {
        self.arrival_date = Some(date);
        self
    }

    /// Whether this criteria constrains `dimension`.
    pub fn constrains(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Airline => self.airlines.is_some(),
            Dimension::Origin => self.origin.is_some(),
            Dimension::Destination => self.destination.is_some(),
            Dimension::TripType => self.trip_type.is_some(),
            Dimension::Channel => self.channel.is_some(),
        }
    }

    /// Copy of this criteria with exactly one dimension's constraint removed.
    pub fn without(&self, dimension: Dimension) -> Self {
        let mut stripped = self.clone();
        match dimension {
            Dimension::Airline => stripped.airlines = None,
            Dimension::Origin => stripped.origin = None,
            Dimension::Destination => stripped.destination = None,
            Dimension::TripType => stripped.trip_type = None,
            Dimension::Channel => stripped.channel = None,
        }
        stripped
    }

    /// Period and airline constraint only.
    pub fn only_airline(&self) -> Self {
        Self {
            period: self.period,
            airlines: self.airlines.clone(),
            ..Default::default()
        }
    }

    /// Route-level constraints (airlines, origin, destination, trip type,
    /// channel, period) without price bounds or travel dates.
    pub fn route_scope(&self) -> Self {
        Self {
            min_price: None,
            max_price: None,
            departure_date: None,
            arrival_date: None,
            ..self.clone()
        }
    }
}

/// Normalize raw filter input. Blank and `all` mean unconstrained; malformed
/// dates are dropped; malformed periods, prices and enum values fail.
pub fn normalize(raw: &RawFilterQuery) -> Result<FilterCriteria, FilterError> {
    let period = match raw.period.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        None => Period::default(),
        Some(value) => value.parse().map_err(|_| FilterError::InvalidPeriod {
            value: value.to_string(),
        })?,
    };

    let airlines = text_filter(raw.airline.as_deref()).and_then(|value| {
        let codes: BTreeSet<String> = value
            .split(',')
            .filter_map(|code| text_filter(Some(code)).map(str::to_string))
            .collect();
        if codes.is_empty() {
            None
        } else {
            Some(codes)
        }
    });

    Ok(FilterCriteria {
        period,
        airlines,
        origin: text_filter(raw.origin.as_deref()).map(str::to_string),
        destination: text_filter(raw.dest.as_deref()).map(str::to_string),
        trip_type: parse_enum("tripType", "OW, RT, MC", raw.trip_type.as_deref())?,
        channel: parse_enum("channel", "web, mobile, api", raw.channel.as_deref())?,
        min_price: parse_non_negative("minPrice", raw.min_price.as_deref())?,
        max_price: parse_non_negative("maxPrice", raw.max_price.as_deref())?,
        departure_date: parse_date(raw.departure_date.as_deref()),
        arrival_date: parse_date(raw.arrival_date.as_deref()),
    })
}

/// Like [`normalize`], but airline, origin, dest and tripType must all be set.
pub fn normalize_strict(raw: &RawFilterQuery) -> Result<FilterCriteria, FilterError> {
    let criteria = normalize(raw)?;
    let required = [
        (Dimension::Airline, "airline"),
        (Dimension::Origin, "origin"),
        (Dimension::Destination, "dest"),
        (Dimension::TripType, "tripType"),
    ];
    for (dimension, field) in required {
        if !criteria.constrains(dimension) {
            return Err(FilterError::MissingField { field });
        }
    }
    Ok(criteria)
}

/// Histogram bin width: defaults to [`DEFAULT_BIN_SIZE`], rejects values
/// below [`MIN_BIN_SIZE`].
pub fn normalize_bin_size(value: Option<&str>) -> Result<i64, FilterError> {
    let bin_size = parse_non_negative("binSize", value)?.unwrap_or(DEFAULT_BIN_SIZE);
    if bin_size < MIN_BIN_SIZE {
        return Err(FilterError::BinSizeTooSmall {
            value: bin_size,
            min: MIN_BIN_SIZE,
        });
    }
    Ok(bin_size)
}

/// Parse an optional non-negative integer parameter. Blank means absent.
pub fn parse_non_negative(field: &'static str, value: Option<&str>) -> Result<Option<i64>, FilterError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match value.parse::<i64>() {
        Ok(n) if n >= 0 => Ok(Some(n)),
        _ => Err(FilterError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}

/// `1` or `true` (any case) switch a flag on; anything else leaves it off.
pub fn parse_flag(value: Option<&str>) -> bool {
    matches!(value.map(|v| v.trim().to_ascii_lowercase()).as_deref(), Some("1") | Some("true"))
}

fn text_filter(value: Option<&str>) -> Option<&str> {
    let value = value?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(ALL_SENTINEL) {
        None
    } else {
        Some(value)
    }
}

fn parse_enum<T: FromStr>(
    field: &'static str,
    expected: &'static str,
    value: Option<&str>,
) -> Result<Option<T>, FilterError> {
    match text_filter(value) {
        None => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| FilterError::InvalidEnum {
            field,
            value: v.to_string(),
            expected,
        }),
    }
}

/// Strict `YYYY-MM-DD`; anything else is treated as absent.
fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    let shaped = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| {
            if i == 4 || i == 7 {
                b == b'-'
            } else {
                b.is_ascii_digit()
            }
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawFilterQuery {
        RawFilterQuery::default()
    }

    #[test]
    fn test_blank_and_all_are_unconstrained() {
        let q = RawFilterQuery {
            airline: Some("  ".into()),
            origin: Some("all".into()),
            dest: Some("".into()),
            trip_type: Some("all".into()),
            channel: Some(" all ".into()),
            ..raw()
        };
        let c = normalize(&q).unwrap();
        assert_eq!(c, FilterCriteria::new(Period::Last24Hours));
        for d in Dimension::ALL {
            assert!(!c.constrains(d));
        }
    }

    #[test]
    fn test_values_are_trimmed() {
        let q = RawFilterQuery {
            origin: Some(" ICN ".into()),
            dest: Some("NRT\t".into()),
            ..raw()
        };
        let c = normalize(&q).unwrap();
        assert_eq!(c.origin(), Some("ICN"));
        assert_eq!(c.destination(), Some("NRT"));
    }

    #[test]
    fn test_airline_list_becomes_set() {
        let q = RawFilterQuery {
            airline: Some("KE, OZ,,7C ,KE".into()),
            ..raw()
        };
        let c = normalize(&q).unwrap();
        let airlines: Vec<&str> = c.airlines().unwrap().iter().map(String::as_str).collect();
        assert_eq!(airlines, vec!["7C", "KE", "OZ"]);

        let single = normalize(&RawFilterQuery {
            airline: Some("KE".into()),
            ..raw()
        })
        .unwrap();
        assert_eq!(single.airlines().unwrap().len(), 1);

        let only_commas = normalize(&RawFilterQuery {
            airline: Some(" , ,".into()),
            ..raw()
        })
        .unwrap();
        assert!(only_commas.airlines().is_none());
    }

    #[test]
    fn test_period_default_and_invalid() {
        assert_eq!(normalize(&raw()).unwrap().period(), Period::Last24Hours);
        let seven = normalize(&RawFilterQuery {
            period: Some("7d".into()),
            ..raw()
        })
        .unwrap();
        assert_eq!(seven.period(), Period::Last7Days);

        let err = normalize(&RawFilterQuery {
            period: Some("30d".into()),
            ..raw()
        })
        .unwrap_err();
        assert_eq!(err.field(), "period");
    }

    #[test]
    fn test_dates_strict_format_or_dropped() {
        let q = RawFilterQuery {
            departure_date: Some("2025-04-01".into()),
            arrival_date: Some("2025/04/05".into()),
            ..raw()
        };
        let c = normalize(&q).unwrap();
        assert_eq!(c.departure_date(), NaiveDate::from_ymd_opt(2025, 4, 1));
        assert!(c.arrival_date().is_none());

        for bad in ["2025-4-01", "20250401", "2025-02-30", "next week", "2025-04-01T00"] {
            let c = normalize(&RawFilterQuery {
                departure_date: Some(bad.into()),
                ..raw()
            })
            .unwrap();
            assert!(c.departure_date().is_none(), "{bad} should be dropped");
        }
    }

    #[test]
    fn test_price_bounds() {
        let c = normalize(&RawFilterQuery {
            min_price: Some("100000".into()),
            max_price: Some(" ".into()),
            ..raw()
        })
        .unwrap();
        assert_eq!(c.min_price(), Some(100_000));
        assert_eq!(c.max_price(), None);

        let err = normalize(&RawFilterQuery {
            max_price: Some("-5".into()),
            ..raw()
        })
        .unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidNumber {
                field: "maxPrice",
                value: "-5".into()
            }
        );
        assert!(normalize(&RawFilterQuery {
            min_price: Some("12.5".into()),
            ..raw()
        })
        .is_err());
    }

    #[test]
    fn test_enum_filters() {
        let c = normalize(&RawFilterQuery {
            trip_type: Some("RT".into()),
            channel: Some("mobile".into()),
            ..raw()
        })
        .unwrap();
        assert_eq!(c.trip_type(), Some(TripType::RoundTrip));
        assert_eq!(c.channel(), Some(Channel::Mobile));

        let err = normalize(&RawFilterQuery {
            channel: Some("fax".into()),
            ..raw()
        })
        .unwrap_err();
        assert_eq!(err.field(), "channel");
    }

    #[test]
    fn test_strict_requires_route() {
        let full = RawFilterQuery {
            airline: Some("KE".into()),
            origin: Some("ICN".into()),
            dest: Some("NRT".into()),
            trip_type: Some("OW".into()),
            ..raw()
        };
        assert!(normalize_strict(&full).is_ok());

        let missing_dest = RawFilterQuery {
            dest: Some("all".into()),
            ..full.clone()
        };
        assert_eq!(
            normalize_strict(&missing_dest).unwrap_err(),
            FilterError::MissingField { field: "dest" }
        );

        let err = normalize_strict(&raw()).unwrap_err();
        assert_eq!(err.to_string(), "missing required filters: airline");
    }

    #[test]
    fn test_bin_size() {
        assert_eq!(normalize_bin_size(None).unwrap(), DEFAULT_BIN_SIZE);
        assert_eq!(normalize_bin_size(Some("50000")).unwrap(), 50_000);
        assert!(matches!(
            normalize_bin_size(Some("5000")),
            Err(FilterError::BinSizeTooSmall { value: 5000, .. })
        ));
        assert!(normalize_bin_size(Some("abc")).is_err());
    }

    #[test]
    fn test_without_strips_exactly_one_dimension() {
        let c = FilterCriteria::new(Period::Last7Days)
            .with_airlines(["KE"])
            .with_origin("ICN")
            .with_destination("NRT")
            .with_trip_type(TripType::OneWay)
            .with_channel(Channel::Web)
            .with_price_range(Some(1), Some(2));

        for d in Dimension::ALL {
            let stripped = c.without(d);
            for other in Dimension::ALL {
                assert_eq!(stripped.constrains(other), other != d);
            }
            assert_eq!(stripped.period(), Period::Last7Days);
            assert_eq!(stripped.min_price(), Some(1));
        }
        // original untouched
        assert!(c.constrains(Dimension::Airline));
    }

    #[test]
    fn test_only_airline_and_route_scope() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let c = FilterCriteria::new(Period::Last7Days)
            .with_airlines(["KE", "OZ"])
            .with_origin("ICN")
            .with_channel(Channel::Api)
            .with_price_range(Some(10), None)
            .with_departure_date(date);

        let a = c.only_airline();
        assert_eq!(a.airlines().unwrap().len(), 2);
        assert!(a.origin().is_none());
        assert!(a.channel().is_none());
        assert!(a.min_price().is_none());
        assert_eq!(a.period(), Period::Last7Days);

        let r = c.route_scope();
        assert_eq!(r.origin(), Some("ICN"));
        assert_eq!(r.channel(), Some(Channel::Api));
        assert!(r.min_price().is_none());
        assert!(r.departure_date().is_none());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("1")));
        assert!(parse_flag(Some("TRUE")));
        assert!(!parse_flag(Some("0")));
        assert!(!parse_flag(None));
    }
}
