//! Business-hours parsing and formatting.
//!
//! Turns free text such as `"Mon-Fri 9am-5pm, Sat 10:00 AM - 2:00 PM, Sun closed"`
//! into a [`WeeklySchedule`] and renders it back in a canonical form that groups
//! consecutive days with identical hours. Days that are never mentioned are
//! closed; a later segment overrides an earlier one for the same day.

use std::sync::LazyLock;

use chrono::{NaiveTime, Timelike, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HoursError {
    #[error("business hours text is empty")]
    Empty,
    #[error("unknown day \"{0}\"")]
    UnknownDay(String),
    #[error("invalid time \"{0}\"")]
    InvalidTime(String),
    #[error("cannot parse hours segment \"{0}\"")]
    MalformedSegment(String),
}

/// Opening hours for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DayHours {
    #[default]
    Closed,
    AllDay,
    /// `closes <= opens` means the span runs past midnight.
    Open { opens: NaiveTime, closes: NaiveTime },
}

/// Hours for Monday through Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeeklySchedule {
    days: [DayHours; 7],
}

const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

static SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<days>[a-z]+(?:\s*(?:-|–|\bto\b)\s*[a-z]+)?)\s*:?\s+(?P<hours>.+)$")
        .expect("segment regex is valid")
});

static RANGE_SEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*(?:-|–|\bto\b)\s*").expect("range regex is valid"));

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<h>\d{1,2})(?::(?P<m>\d{2}))?\s*(?P<ampm>a\.?m\.?|p\.?m\.?)?$")
        .expect("time regex is valid")
});

impl WeeklySchedule {
    #[must_use]
    pub fn day(&self, weekday: Weekday) -> DayHours {
        self.days[weekday.num_days_from_monday() as usize]
    }

    pub fn set(&mut self, weekday: Weekday, hours: DayHours) {
        self.days[weekday.num_days_from_monday() as usize] = hours;
    }

    /// Whether the business is open at `time` on `weekday`, including spans
    /// that started the previous evening and run past midnight.
    #[must_use]
    pub fn is_open_at(&self, weekday: Weekday, time: NaiveTime) -> bool {
        let today = match self.day(weekday) {
            DayHours::Closed => false,
            DayHours::AllDay => true,
            DayHours::Open { opens, closes } if opens < closes => time >= opens && time < closes,
            DayHours::Open { opens, .. } => time >= opens,
        };
        if today {
            return true;
        }
        match self.day(weekday.pred()) {
            DayHours::Open { opens, closes } if closes <= opens => time < closes,
            _ => false,
        }
    }

    /// Parse free-text business hours.
    ///
    /// # Errors
    ///
    /// Returns [`HoursError`] if the text is blank, names an unknown day, or
    /// contains a segment or time that cannot be read.
    pub fn parse(text: &str) -> Result<Self, HoursError> {
        let segments: Vec<&str> = text
            .split([',', ';', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if segments.is_empty() {
            return Err(HoursError::Empty);
        }

        let mut schedule = Self::default();
        for segment in segments {
            let caps = SEGMENT_RE
                .captures(segment)
                .ok_or_else(|| HoursError::MalformedSegment(segment.to_string()))?;
            let days = parse_days(&caps["days"])?;
            let hours = parse_day_hours(caps["hours"].trim())?;
            for day in days {
                schedule.set(day, hours);
            }
        }
        Ok(schedule)
    }
}

impl std::fmt::Display for WeeklySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut groups: Vec<(usize, usize, DayHours)> = Vec::new();
        for (idx, hours) in self.days.iter().enumerate() {
            match groups.last_mut() {
                Some((_, end, prev)) if prev == hours => *end = idx,
                _ => groups.push((idx, idx, *hours)),
            }
        }

        for (i, (start, end, hours)) in groups.into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if start == end {
                write!(f, "{}", DAY_LABELS[start])?;
            } else {
                write!(f, "{}-{}", DAY_LABELS[start], DAY_LABELS[end])?;
            }
            write!(f, " {}", format_day_hours(hours))?;
        }
        Ok(())
    }
}

fn format_time(t: NaiveTime) -> String {
    t.format("%-I:%M %p").to_string()
}

fn format_day_hours(hours: DayHours) -> String {
    match hours {
        DayHours::Closed => "Closed".to_string(),
        DayHours::AllDay => "Open 24 hours".to_string(),
        DayHours::Open { opens, closes } => {
            format!("{} - {}", format_time(opens), format_time(closes))
        }
    }
}

fn parse_weekday(token: &str) -> Result<Weekday, HoursError> {
    let day = match token.trim().to_lowercase().as_str() {
        "mo" | "mon" | "monday" => Weekday::Mon,
        "tu" | "tue" | "tues" | "tuesday" => Weekday::Tue,
        "we" | "wed" | "weds" | "wednesday" => Weekday::Wed,
        "th" | "thu" | "thur" | "thurs" | "thursday" => Weekday::Thu,
        "fr" | "fri" | "friday" => Weekday::Fri,
        "sa" | "sat" | "saturday" => Weekday::Sat,
        "su" | "sun" | "sunday" => Weekday::Sun,
        _ => return Err(HoursError::UnknownDay(token.trim().to_string())),
    };
    Ok(day)
}

fn parse_days(text: &str) -> Result<Vec<Weekday>, HoursError> {
    let all = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    match text.trim().to_lowercase().as_str() {
        "daily" | "everyday" => return Ok(all.to_vec()),
        "weekdays" => return Ok(all[..5].to_vec()),
        "weekends" => return Ok(all[5..].to_vec()),
        _ => {}
    }

    let parts: Vec<&str> = RANGE_SEP_RE.split(text.trim()).collect();
    match parts.as_slice() {
        [single] => Ok(vec![parse_weekday(single)?]),
        [from, to] => {
            let mut day = parse_weekday(from)?;
            let last = parse_weekday(to)?;
            let mut days = vec![day];
            while day != last {
                day = day.succ();
                days.push(day);
            }
            Ok(days)
        }
        _ => Err(HoursError::MalformedSegment(text.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Reads one clock time, reporting which suffix (if any) was written.
fn parse_time(text: &str) -> Result<(NaiveTime, Option<Meridiem>), HoursError> {
    let trimmed = text.trim();
    match trimmed.to_lowercase().as_str() {
        "noon" => {
            let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
            return Ok((noon, Some(Meridiem::Pm)));
        }
        "midnight" => return Ok((NaiveTime::MIN, Some(Meridiem::Am))),
        _ => {}
    }

    let invalid = || HoursError::InvalidTime(trimmed.to_string());
    let caps = TIME_RE.captures(trimmed).ok_or_else(invalid)?;
    let hour: u32 = caps["h"].parse().map_err(|_| invalid())?;
    let minute: u32 = caps
        .name("m")
        .map_or(Ok(0), |m| m.as_str().parse())
        .map_err(|_| invalid())?;

    let meridiem = caps.name("ampm").map(|m| {
        if m.as_str().to_lowercase().starts_with('p') {
            Meridiem::Pm
        } else {
            Meridiem::Am
        }
    });
    let hour = match meridiem {
        Some(_) if !(1..=12).contains(&hour) => return Err(invalid()),
        Some(Meridiem::Am) if hour == 12 => 0,
        Some(Meridiem::Pm) if hour < 12 => hour + 12,
        _ => hour,
    };

    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)?;
    Ok((time, meridiem))
}

/// Bare-hour shorthand such as `9-5` means 9 AM to 5 PM: when the closing
/// time has no suffix, both hours fit a 12-hour clock, and the opening time
/// is not marked PM, a closing time at or before the opening one is read as
/// afternoon. `Ok(None)` leaves the reading unchanged.
fn afternoon_closing(
    opens: (NaiveTime, Option<Meridiem>),
    closes: (NaiveTime, Option<Meridiem>),
    closes_text: &str,
) -> Result<Option<NaiveTime>, HoursError> {
    let (open_time, open_suffix) = opens;
    let (close_time, close_suffix) = closes;
    let applies = close_suffix.is_none()
        && open_suffix != Some(Meridiem::Pm)
        && open_time.hour() <= 12
        && close_time.hour() <= 12
        && close_time <= open_time;
    if !applies {
        return Ok(None);
    }
    if !(1..12).contains(&close_time.hour()) {
        return Err(HoursError::InvalidTime(closes_text.trim().to_string()));
    }
    Ok(NaiveTime::from_hms_opt(close_time.hour() + 12, close_time.minute(), 0))
}

fn parse_day_hours(text: &str) -> Result<DayHours, HoursError> {
    let lower = text.to_lowercase();
    if lower == "closed" {
        return Ok(DayHours::Closed);
    }
    if lower.contains("24 hours") || lower == "24h" || lower == "24/7" {
        return Ok(DayHours::AllDay);
    }

    let parts: Vec<&str> = RANGE_SEP_RE.split(text).collect();
    match parts.as_slice() {
        [opens_text, closes_text] => {
            let opens = parse_time(opens_text)?;
            let closes = parse_time(closes_text)?;
            let closes_at = afternoon_closing(opens, closes, closes_text)?.unwrap_or(closes.0);
            if opens.0 == closes_at {
                Ok(DayHours::AllDay)
            } else {
                Ok(DayHours::Open {
                    opens: opens.0,
                    closes: closes_at,
                })
            }
        }
        _ => Err(HoursError::MalformedSegment(text.to_string())),
    }
}

#[cfg(test)]
#[path = "hours_test.rs"]
mod tests;
