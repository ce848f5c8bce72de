//! Retrieval of the academic planner from the institutional portal.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader};
use std::time;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;

use crate::config::Config;
use crate::model::{CalendarDay, CalendarResponse};

/// Header the portal reads the session token from.
pub const TOKEN_HEADER: &str = "X-CSRF-Token";

/// Something that can produce the calendar for one session at one instant.
///
/// Implementations are built per call from `(now, token)` and dropped
/// afterwards.
pub trait CalendarFetcher {
    type Error;

    fn get_calendar(&self) -> Result<CalendarResponse, Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to the portal failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("portal rejected the session ({0})")]
    SessionRejected(StatusCode),
    #[error("portal responded with {0}")]
    Status(StatusCode),
    #[error("could not parse the calendar feed: {0}")]
    Feed(#[from] ical::parser::ParserError),
    #[error("calendar feed is empty")]
    EmptyFeed,
}

/// Fetches the iCalendar planner feed the portal publishes for a session.
#[derive(Debug, Clone)]
pub struct PortalFetcher {
    calendar_url: String,
    timeout: time::Duration,
    now: DateTime<Tz>,
    token: String,
}

impl PortalFetcher {
    pub fn new(config: &Config, now: DateTime<Tz>, token: String) -> Self {
        PortalFetcher {
            calendar_url: config.calendar_url.clone(),
            timeout: config.timeout,
            now,
            token,
        }
    }

    pub fn now(&self) -> &DateTime<Tz> {
        &self.now
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl CalendarFetcher for PortalFetcher {
    type Error = FetchError;

    fn get_calendar(&self) -> Result<CalendarResponse, FetchError> {
        let client = Client::builder().timeout(self.timeout).build()?;

        tracing::debug!("Requesting academic planner from {}", self.calendar_url);
        let response = client
            .get(&self.calendar_url)
            .header(TOKEN_HEADER, self.token.as_str())
            .header(ACCEPT, "text/calendar")
            .send()?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!("Portal rejected the session token with {}", status);
            return Err(FetchError::SessionRejected(status));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let calendar = read_feed(BufReader::new(response), &self.now)?;
        tracing::info!(
            "Fetched {} calendar entries across {} months",
            calendar.entry_count(),
            calendar.calendar.len()
        );
        Ok(calendar)
    }
}

/// Reads the first calendar in an iCalendar feed and lays it out around `now`.
pub fn read_feed<R: BufRead>(
    reader: R,
    now: &DateTime<Tz>,
) -> Result<CalendarResponse, FetchError> {
    let mut parser = ical::IcalParser::new(reader);
    let calendar = parser.next().ok_or(FetchError::EmptyFeed)??;

    let entries = parse_events(&calendar.events, &now.timezone());
    Ok(CalendarResponse::build(merge_days(entries), now))
}

#[derive(Debug, PartialEq)]
struct PlannerEntry {
    date: NaiveDate,
    summary: Option<String>,
    day_order: Option<String>,
}

fn parse_events(events: &[IcalEvent], zone: &Tz) -> Vec<PlannerEntry> {
    events
        .iter()
        .filter_map(|event| {
            let start = find_property(event, "DTSTART")?;
            let date = start_date(start, zone)?;

            Some(PlannerEntry {
                date,
                summary: text_value(event, "SUMMARY"),
                day_order: text_value(event, "X-DAY-ORDER"),
            })
        })
        .collect()
}

fn find_property<'a>(event: &'a IcalEvent, name: &str) -> Option<&'a Property> {
    event.properties.iter().find(|p| p.name == name)
}

fn find_param<'a>(property: &'a Property, name: &str) -> Option<&'a str> {
    property
        .params
        .as_ref()?
        .iter()
        .find(|(param_name, _)| param_name == name)
        .and_then(|(_, values)| values.first())
        .map(String::as_str)
}

fn text_value(event: &IcalEvent, name: &str) -> Option<String> {
    let value = find_property(event, name)?.value.as_ref()?;
    let text = unescape_text(value);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Undoes iCalendar TEXT escaping, reading each `\x` pair exactly once.
fn unescape_text(value: &str) -> String {
    let mut text = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => text.push(' '),
            Some(escaped) => text.push(escaped),
            None => text.push('\\'),
        }
    }
    text
}

/// Civil date, in `zone`, on which an event starts.
fn start_date(start: &Property, zone: &Tz) -> Option<NaiveDate> {
    let value = start.value.as_ref()?.trim();

    if find_param(start, "VALUE") == Some("DATE") || value.len() == 8 {
        return NaiveDate::parse_from_str(value, "%Y%m%d").ok();
    }

    //Try getting an UTC time first
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%SZ") {
        return Some(Utc.from_utc_datetime(&naive).with_timezone(zone).date_naive());
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
    match find_param(start, "TZID").and_then(|tzid| tzid.parse::<Tz>().ok()) {
        // A local time skipped by a DST jump is read as the hour after.
        Some(timezone) => timezone
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| timezone.from_local_datetime(&(naive + Duration::hours(1))).earliest())
            .map(|dt| dt.with_timezone(zone).date_naive()),
        // Floating time, already civil.
        None => Some(naive.date()),
    }
}

fn merge_days(entries: Vec<PlannerEntry>) -> Vec<(NaiveDate, CalendarDay)> {
    let mut days: BTreeMap<NaiveDate, CalendarDay> = BTreeMap::new();

    for entry in entries {
        let date = entry.date;
        let day = days.entry(date).or_insert_with(|| CalendarDay::new(date));

        if let Some(summary) = entry.summary {
            day.event = Some(match day.event.take() {
                Some(existing) => format!("{} / {}", existing, summary),
                None => summary,
            });
        }
        if day.day_order.is_none() {
            day.day_order = entry.day_order;
        }
    }

    days.into_iter().collect()
}
