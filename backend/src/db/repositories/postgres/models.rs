use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use super::schema::exposure_events;
use crate::api::ExposureId;
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::ExposureEvent;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = exposure_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ExposureRow {
    pub id: Uuid,
    pub ts: DateTime<Utc>,
    pub airline: String,
    pub origin: String,
    pub dest: String,
    pub trip_type: String,
    pub channel: String,
    pub session_id: String,
    pub search_id: String,
    pub result_rank: i32,
    pub price_krw: i64,
    pub is_discounted: bool,
    pub departure_date: Option<NaiveDate>,
    pub arrival_date: Option<NaiveDate>,
    pub meta: Value,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = exposure_events)]
pub struct NewExposureRow {
    pub id: Uuid,
    pub ts: DateTime<Utc>,
    pub airline: String,
    pub origin: String,
    pub dest: String,
    pub trip_type: String,
    pub channel: String,
    pub session_id: String,
    pub search_id: String,
    pub result_rank: i32,
    pub price_krw: i64,
    pub is_discounted: bool,
    pub departure_date: Option<NaiveDate>,
    pub arrival_date: Option<NaiveDate>,
    pub meta: Value,
}

impl From<ExposureEvent> for NewExposureRow {
    fn from(event: ExposureEvent) -> Self {
        Self {
            id: event.id.value(),
            ts: event.timestamp,
            airline: event.airline,
            origin: event.origin,
            dest: event.destination,
            trip_type: event.trip_type.as_str().to_string(),
            channel: event.channel.as_str().to_string(),
            session_id: event.session_id,
            search_id: event.search_id,
            result_rank: event.result_rank,
            price_krw: event.price_krw,
            is_discounted: event.is_discounted,
            departure_date: event.departure_date,
            arrival_date: event.arrival_date,
            meta: Value::Object(event.metadata),
        }
    }
}

impl TryFrom<ExposureRow> for ExposureEvent {
    type Error = RepositoryError;

    fn try_from(row: ExposureRow) -> RepositoryResult<Self> {
        let invalid = |column: &str, value: &str| {
            RepositoryError::ValidationError {
                message: format!("unexpected {} value '{}'", column, value),
                context: ErrorContext::new("decode_row")
                    .with_entity("exposure_events")
                    .with_entity_id(row.id),
            }
        };
        let trip_type = row
            .trip_type
            .parse()
            .map_err(|_| invalid("trip_type", &row.trip_type))?;
        let channel = row
            .channel
            .parse()
            .map_err(|_| invalid("channel", &row.channel))?;
        let metadata = match row.meta {
            Value::Object(map) => map,
            _ => Default::default(),
        };

        Ok(ExposureEvent {
            id: ExposureId::new(row.id),
            timestamp: row.ts,
            airline: row.airline,
            origin: row.origin,
            destination: row.dest,
            trip_type,
            channel,
            session_id: row.session_id,
            search_id: row.search_id,
            result_rank: row.result_rank,
            price_krw: row.price_krw,
            is_discounted: row.is_discounted,
            departure_date: row.departure_date,
            arrival_date: row.arrival_date,
            metadata,
        })
    }
}
