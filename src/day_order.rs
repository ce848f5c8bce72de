use std::fmt;

/// Position of a working day in the timetable rotation, or a holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOrder {
    Holiday,
    Order(u32),
}

impl DayOrder {
    /// Interprets the portal's free-form day order text.
    ///
    /// The portal writes things like `"2"`, `"Day-2"`, `"DO 3"`, `"-"` or
    /// `"Holiday"`. Blank and unrecognised text is treated as day order 1.
    pub fn parse(text: &str) -> DayOrder {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return DayOrder::Order(1);
        }

        if trimmed.eq_ignore_ascii_case("holiday") || trimmed == "-" {
            return DayOrder::Holiday;
        }
        if trimmed.contains("---") || trimmed.contains("null") || trimmed.contains("undefined") {
            return DayOrder::Holiday;
        }

        let digits_start = trimmed
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i);

        match digits_start.and_then(|i| trimmed[i..].parse::<u32>().ok()) {
            Some(order) => DayOrder::Order(order),
            None => {
                tracing::debug!("Unparseable day order {:?}", text);
                DayOrder::Order(1)
            }
        }
    }

    pub fn is_holiday(&self) -> bool {
        matches!(self, DayOrder::Holiday)
    }
}

impl fmt::Display for DayOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayOrder::Holiday => write!(f, "Holiday"),
            DayOrder::Order(n) => write!(f, "{}", n),
        }
    }
}
