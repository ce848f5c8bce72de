//! The calendar as handed back to callers.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use serde::Serialize;

use crate::day_order::DayOrder;

const DATE_FORMAT: &str = "%d-%m-%Y";
const MONTH_FORMAT: &str = "%B'%y";

const LAST_DAY_MARKERS: &[&str] = &["Last Working Day", "End of Semester", "Last Day of Classes"];
const EXAM_START_MARKERS: &[&str] = &[
    "Examination Begins",
    "Final Exams Begin",
    "End of Teaching Period",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    /// `DD-MM-YYYY`
    pub date: String,
    /// Weekday name, e.g. `Wednesday`.
    pub day: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_order: Option<String>,
}

impl CalendarDay {
    pub fn new(date: NaiveDate) -> Self {
        CalendarDay {
            date: date.format(DATE_FORMAT).to_string(),
            day: date.format("%A").to_string(),
            event: None,
            day_order: None,
        }
    }

    pub fn naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }

    pub fn day_order(&self) -> DayOrder {
        DayOrder::parse(self.day_order.as_deref().unwrap_or(""))
    }

    fn mentions(&self, markers: &[&str]) -> bool {
        self.event
            .as_deref()
            .map_or(false, |event| markers.iter().any(|m| event.contains(m)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarMonth {
    /// Month label such as `May'25`.
    pub month: String,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResponse {
    pub calendar: Vec<CalendarMonth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today: Option<CalendarDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tomorrow: Option<CalendarDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_after_tomorrow: Option<CalendarDay>,
    /// Position in `calendar` of the month that contains today.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl CalendarResponse {
    /// Groups `days` into months and picks out the entries around `now`.
    ///
    /// `days` may come in any order but must not repeat a date.
    pub fn build<Z: TimeZone>(
        mut days: Vec<(NaiveDate, CalendarDay)>,
        now: &DateTime<Z>,
    ) -> Self {
        days.sort_by_key(|(date, _)| *date);

        let mut calendar: Vec<CalendarMonth> = Vec::new();
        let mut current: Option<(i32, u32)> = None;
        for (date, day) in days {
            let key = (date.year(), date.month());
            if current != Some(key) {
                calendar.push(CalendarMonth {
                    month: date.format(MONTH_FORMAT).to_string(),
                    days: Vec::new(),
                });
                current = Some(key);
            }
            if let Some(month) = calendar.last_mut() {
                month.days.push(day);
            }
        }

        let mut response = CalendarResponse {
            calendar,
            ..Default::default()
        };

        let today = now.date_naive();
        response.today = response.day(today).cloned();
        response.tomorrow = response.day(today + Duration::days(1)).cloned();
        response.day_after_tomorrow = response.day(today + Duration::days(2)).cloned();
        response.index = response.month_index(today);
        response
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.calendar
            .iter()
            .flat_map(|month| month.days.iter())
            .find(|day| day.naive_date() == Some(date))
    }

    fn month_index(&self, date: NaiveDate) -> Option<usize> {
        self.calendar.iter().position(|month| {
            month
                .days
                .first()
                .and_then(CalendarDay::naive_date)
                .map_or(false, |d| d.year() == date.year() && d.month() == date.month())
        })
    }

    pub fn entry_count(&self) -> usize {
        self.calendar.iter().map(|month| month.days.len()).sum()
    }

    /// Best guess at the last day of teaching in the semester.
    pub fn last_working_day(&self) -> Option<&CalendarDay> {
        let mut days = self.calendar.iter().flat_map(|month| month.days.iter());
        if let Some(day) = days.find(|day| day.mentions(LAST_DAY_MARKERS)) {
            return Some(day);
        }

        for month in &self.calendar {
            if let Some(i) = month.days.iter().position(|day| day.mentions(EXAM_START_MARKERS)) {
                return Some(&month.days[i.saturating_sub(1)]);
            }
        }

        self.calendar.last().and_then(|month| month.days.last())
    }
}
