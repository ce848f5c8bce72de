//! Academic calendar retrieval for a portal session.
//!
//! The calendar is always looked up against the institution's civil date
//! (India Standard Time), whatever the timezone of the host running this
//! code. If the zone cannot be loaded the lookup degrades to UTC instead
//! of failing.

use chrono::DateTime;
use chrono_tz::Tz;

pub mod config;
pub mod day_order;
pub mod fetcher;
pub mod model;
pub mod timezone;

pub use config::{Config, ConfigError};
pub use day_order::DayOrder;
pub use fetcher::{CalendarFetcher, FetchError, PortalFetcher};
pub use model::{CalendarDay, CalendarMonth, CalendarResponse};
pub use timezone::{resolve_zone, ZoneResolution, INSTITUTION_TIMEZONE};

/// Fetches the calendar for `token` from the portal described by `config`.
pub fn get_calendar(config: &Config, token: &str) -> Result<CalendarResponse, FetchError> {
    get_calendar_with(&config.timezone, token, |now, token| {
        PortalFetcher::new(config, now, token)
    })
}

/// Resolves "now" in `zone_name` and hands it with `token` to a fresh fetcher.
///
/// Whatever the fetcher returns is passed back untouched. The token is not
/// inspected here; rejecting a bad one is up to the fetcher.
pub fn get_calendar_with<F, M>(
    zone_name: &str,
    token: &str,
    make_fetcher: M,
) -> Result<CalendarResponse, F::Error>
where
    F: CalendarFetcher,
    M: FnOnce(DateTime<Tz>, String) -> F,
{
    let now = resolve_zone(zone_name).now();
    let fetcher = make_fetcher(now, token.to_owned());
    fetcher.get_calendar()
}
