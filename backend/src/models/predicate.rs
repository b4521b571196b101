//! Translation of [`FilterCriteria`] into a flat predicate list.
//!
//! Every record store evaluates the same list: the local store matches
//! predicates against in-memory rows, the Postgres store maps each one onto a
//! query filter.

use chrono::{DateTime, NaiveDate, Utc};

use super::exposure::ExposureEvent;
use super::filter::FilterCriteria;

/// Text column compared by equality.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextColumn {
    Origin,
    Destination,
    TripType,
    Channel,
}

/// Calendar date column compared by equality.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DateColumn {
    Departure,
    Arrival,
}

/// A single conjunctive condition on an exposure record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    TimestampAtLeast(DateTime<Utc>),
    AirlineIn(Vec<String>),
    TextEquals(TextColumn, String),
    DateEquals(DateColumn, NaiveDate),
    PriceAtLeast(i64),
    PriceAtMost(i64),
    PriceEquals(i64),
}

impl Predicate {
    pub fn matches(&self, event: &ExposureEvent) -> bool {
        match self {
            Predicate::TimestampAtLeast(cutoff) => event.timestamp >= *cutoff,
            Predicate::AirlineIn(codes) => codes.iter().any(|c| *c == event.airline),
            Predicate::TextEquals(column, value) => {
                let actual = match column {
                    TextColumn::Origin => event.origin.as_str(),
                    TextColumn::Destination => event.destination.as_str(),
                    TextColumn::TripType => event.trip_type.as_str(),
                    TextColumn::Channel => event.channel.as_str(),
                };
                actual == value
            }
            Predicate::DateEquals(column, date) => {
                let actual = match column {
                    DateColumn::Departure => event.departure_date,
                    DateColumn::Arrival => event.arrival_date,
                };
                actual == Some(*date)
            }
            Predicate::PriceAtLeast(min) => event.price_krw >= *min,
            Predicate::PriceAtMost(max) => event.price_krw <= *max,
            Predicate::PriceEquals(price) => event.price_krw == *price,
        }
    }
}

impl FilterCriteria {
    /// Predicate list for this criteria, bounded below by `cutoff`.
    /// Absent constraints contribute nothing.
    pub fn predicates(&self, cutoff: DateTime<Utc>) -> Vec<Predicate> {
        let mut predicates = vec![Predicate::TimestampAtLeast(cutoff)];

        if let Some(airlines) = self.airlines() {
            predicates.push(Predicate::AirlineIn(airlines.iter().cloned().collect()));
        }
        if let Some(origin) = self.origin() {
            predicates.push(Predicate::TextEquals(TextColumn::Origin, origin.to_string()));
        }
        if let Some(destination) = self.destination() {
            predicates.push(Predicate::TextEquals(
                TextColumn::Destination,
                destination.to_string(),
            ));
        }
        if let Some(trip_type) = self.trip_type() {
            predicates.push(Predicate::TextEquals(
                TextColumn::TripType,
                trip_type.as_str().to_string(),
            ));
        }
        if let Some(channel) = self.channel() {
            predicates.push(Predicate::TextEquals(
                TextColumn::Channel,
                channel.as_str().to_string(),
            ));
        }
        if let Some(date) = self.departure_date() {
            predicates.push(Predicate::DateEquals(DateColumn::Departure, date));
        }
        if let Some(date) = self.arrival_date() {
            predicates.push(Predicate::DateEquals(DateColumn::Arrival, date));
        }
        if let Some(min) = self.min_price() {
            predicates.push(Predicate::PriceAtLeast(min));
        }
        if let Some(max) = self.max_price() {
            predicates.push(Predicate::PriceAtMost(max));
        }

        predicates
    }

    /// Whether `event` satisfies every predicate of this criteria.
    pub fn matches(&self, event: &ExposureEvent, cutoff: DateTime<Utc>) -> bool {
        self.predicates(cutoff).iter().all(|p| p.matches(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ExposureId;
    use crate::models::{Channel, Period, TripType};
    use chrono::TimeZone;

    fn event(airline: &str, price: i64, hour: u32) -> ExposureEvent {
        ExposureEvent {
            id: ExposureId::generate(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap(),
            airline: airline.to_string(),
            origin: "ICN".to_string(),
            destination: "NRT".to_string(),
            trip_type: TripType::RoundTrip,
            channel: Channel::Web,
            session_id: "s".to_string(),
            search_id: "q".to_string(),
            result_rank: 0,
            price_krw: price,
            is_discounted: false,
            departure_date: NaiveDate::from_ymd_opt(2025, 4, 1),
            arrival_date: None,
            metadata: Default::default(),
        }
    }

    #[test]
    fn test_unconstrained_criteria_has_only_time_bound() {
        let cutoff = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let preds = FilterCriteria::new(Period::Last24Hours).predicates(cutoff);
        assert_eq!(preds, vec![Predicate::TimestampAtLeast(cutoff)]);
    }

    #[test]
    fn test_all_fields_translate() {
        let cutoff = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let c = FilterCriteria::new(Period::Last24Hours)
            .with_airlines(["OZ", "KE"])
            .with_origin("ICN")
            .with_destination("NRT")
            .with_trip_type(TripType::RoundTrip)
            .with_channel(Channel::Web)
            .with_departure_date(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap())
            .with_price_range(Some(100), Some(200));
        let preds = c.predicates(cutoff);
        assert_eq!(preds.len(), 9);
        assert!(preds.contains(&Predicate::AirlineIn(vec!["KE".into(), "OZ".into()])));
        assert!(preds.contains(&Predicate::TextEquals(TextColumn::TripType, "RT".into())));
        assert!(preds.contains(&Predicate::PriceAtMost(200)));
    }

    #[test]
    fn test_matching() {
        let cutoff = Utc.with_ymd_and_hms(2025, 3, 1, 5, 0, 0).unwrap();
        let c = FilterCriteria::new(Period::Last24Hours)
            .with_airlines(["KE", "OZ"])
            .with_price_range(Some(100), Some(200));

        assert!(c.matches(&event("KE", 100, 5), cutoff));
        assert!(c.matches(&event("OZ", 200, 6), cutoff));
        assert!(!c.matches(&event("KE", 201, 6), cutoff));
        assert!(!c.matches(&event("7C", 150, 6), cutoff));
        assert!(!c.matches(&event("KE", 150, 4), cutoff));

        let dated = c.with_departure_date(NaiveDate::from_ymd_opt(2025, 4, 2).unwrap());
        assert!(!dated.matches(&event("KE", 150, 6), cutoff));
    }
}
