//! Resolution of the civil timezone used for "now".

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Zone of the institution whose calendar is fetched (IST, UTC+05:30, no DST).
pub const INSTITUTION_TIMEZONE: &str = "Asia/Kolkata";

/// A zone that is always usable, plus whether it is the one that was asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneResolution {
    pub zone: Tz,
    pub preferred: bool,
}

impl ZoneResolution {
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.zone)
    }
}

/// Looks up `name` in the timezone database, falling back to UTC.
///
/// A failed lookup is logged and never returned as an error: calendar
/// retrieval goes ahead with a shifted day boundary instead.
pub fn resolve_zone(name: &str) -> ZoneResolution {
    match name.parse::<Tz>() {
        Ok(zone) => ZoneResolution {
            zone,
            preferred: true,
        },
        Err(err) => {
            tracing::warn!("Could not load timezone {:?} ({}), using UTC", name, err);
            ZoneResolution {
                zone: Tz::UTC,
                preferred: false,
            }
        }
    }
}

pub fn localized_now() -> DateTime<Tz> {
    resolve_zone(INSTITUTION_TIMEZONE).now()
}
