use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ExposureId;
use crate::models::{Channel, ExposureEvent, TripType};

// =========================================================
// Recent exposures types + route
// =========================================================

/// Newest-first projection of a single exposure record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentExposure {
    pub id: ExposureId,
    pub ts: DateTime<Utc>,
    pub airline: String,
    pub origin: String,
    pub dest: String,
    pub trip_type: TripType,
    pub channel: Channel,
    pub result_rank: i32,
    #[serde(rename = "priceKRW")]
    pub price_krw: i64,
    pub is_discounted: bool,
    pub departure_date: Option<NaiveDate>,
    pub arrival_date: Option<NaiveDate>,
}

impl From<&ExposureEvent> for RecentExposure {
    fn from(event: &ExposureEvent) -> Self {
        Self {
            id: event.id.clone(),
            ts: event.timestamp,
            airline: event.airline.clone(),
            origin: event.origin.clone(),
            dest: event.destination.clone(),
            trip_type: event.trip_type,
            channel: event.channel,
            result_rank: event.result_rank,
            price_krw: event.price_krw,
            is_discounted: event.is_discounted,
            departure_date: event.departure_date,
            arrival_date: event.arrival_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentData {
    pub items: Vec<RecentExposure>,
}

/// Maximum number of records returned by the recent endpoint.
pub const RECENT_LIMIT: usize = 30;

/// Route path for the recent endpoint
pub const RECENT_PATH: &str = "/exposures/recent";
