#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use fare_anchor::api::ExposureId;
use fare_anchor::models::{Channel, ExposureEvent, TripType};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to process-global env
/// vars, since Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Fixed request instant used by service-level tests.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

/// Fluent builder for exposure fixtures. Defaults to a KE ICN→NRT round
/// trip on the web channel, one minute before `now`.
#[derive(Debug, Clone)]
pub struct ExposureBuilder {
    event: ExposureEvent,
}

impl ExposureBuilder {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            event: ExposureEvent {
                id: ExposureId::generate(),
                timestamp: now - Duration::minutes(1),
                airline: "KE".to_string(),
                origin: "ICN".to_string(),
                destination: "NRT".to_string(),
                trip_type: TripType::RoundTrip,
                channel: Channel::Web,
                session_id: "session-1".to_string(),
                search_id: "search-1".to_string(),
                result_rank: 1,
                price_krw: 500_000,
                is_discounted: false,
                departure_date: None,
                arrival_date: None,
                metadata: Default::default(),
            },
        }
    }

    pub fn airline(mut self, code: &str) -> Self {
        self.event.airline = code.to_string();
        self
    }

    pub fn route(mut self, origin: &str, dest: &str) -> Self {
        self.event.origin = origin.to_string();
        self.event.destination = dest.to_string();
        self
    }

    pub fn trip_type(mut self, trip_type: TripType) -> Self {
        self.event.trip_type = trip_type;
        self
    }

    pub fn channel(mut self, channel: Channel) -> Self {
        self.event.channel = channel;
        self
    }

    pub fn price(mut self, price: i64) -> Self {
        self.event.price_krw = price;
        self
    }

    pub fn session(mut self, session: &str) -> Self {
        self.event.session_id = session.to_string();
        self
    }

    pub fn at(mut self, ts: DateTime<Utc>) -> Self {
        self.event.timestamp = ts;
        self
    }

    pub fn minutes_before(mut self, now: DateTime<Utc>, minutes: i64) -> Self {
        self.event.timestamp = now - Duration::minutes(minutes);
        self
    }

    pub fn departure(mut self, date: NaiveDate) -> Self {
        self.event.departure_date = Some(date);
        self
    }

    pub fn build(self) -> ExposureEvent {
        self.event
    }
}
