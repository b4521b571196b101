//! Domain models: exposure records, filter criteria and time windows.

pub mod exposure;
pub mod filter;
pub mod predicate;
pub mod time;

pub use exposure::{Channel, ExposureEvent, TripType};
pub use filter::{
    normalize, normalize_bin_size, normalize_strict, parse_flag, parse_non_negative, Dimension,
    FilterCriteria, FilterError, RawFilterQuery, DEFAULT_BIN_SIZE, MIN_BIN_SIZE,
};
pub use predicate::{DateColumn, Predicate, TextColumn};
pub use time::{hour_key, hour_label, Period, QueryWindow};
