//! Exposure event records.
//!
//! An exposure event is one instance of a fare being shown to a user. Records
//! are written by the ingestion path and are read-only everywhere else.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::ExposureId;

/// Kind of itinerary the fare was quoted for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TripType {
    #[serde(rename = "OW")]
    OneWay,
    #[serde(rename = "RT")]
    RoundTrip,
    #[serde(rename = "MC")]
    MultiCity,
}

impl TripType {
    /// Wire/storage code (`OW`, `RT`, `MC`).
    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::OneWay => "OW",
            TripType::RoundTrip => "RT",
            TripType::MultiCity => "MC",
        }
    }
}

impl FromStr for TripType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OW" => Ok(Self::OneWay),
            "RT" => Ok(Self::RoundTrip),
            "MC" => Ok(Self::MultiCity),
            _ => Err(format!("Unknown trip type: {}", s)),
        }
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sales channel the fare was shown on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Web,
    Mobile,
    Api,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Web => "web",
            Channel::Mobile => "mobile",
            Channel::Api => "api",
        }
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web" => Ok(Self::Web),
            "mobile" => Ok(Self::Mobile),
            "api" => Ok(Self::Api),
            _ => Err(format!("Unknown channel: {}", s)),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One price exposure.
///
/// `price_krw` and `result_rank` are non-negative by contract of the
/// ingestion path; nothing here re-validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureEvent {
    #[serde(default = "ExposureId::generate")]
    pub id: ExposureId,
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    pub airline: String,
    pub origin: String,
    #[serde(rename = "dest")]
    pub destination: String,
    pub trip_type: TripType,
    pub channel: Channel,
    pub session_id: String,
    pub search_id: String,
    pub result_rank: i32,
    #[serde(rename = "priceKRW")]
    pub price_krw: i64,
    #[serde(default)]
    pub is_discounted: bool,
    #[serde(default)]
    pub departure_date: Option<NaiveDate>,
    #[serde(default)]
    pub arrival_date: Option<NaiveDate>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ExposureEvent {
    /// Value of a text-valued filter dimension for this record.
    pub fn dimension_value(&self, dimension: crate::models::Dimension) -> &str {
        use crate::models::Dimension;
        match dimension {
            Dimension::Airline => &self.airline,
            Dimension::Origin => &self.origin,
            Dimension::Destination => &self.destination,
            Dimension::TripType => self.trip_type.as_str(),
            Dimension::Channel => self.channel.as_str(),
        }
    }
}
