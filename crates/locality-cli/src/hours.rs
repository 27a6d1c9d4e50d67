//! `hours` command: normalise free-text business hours.

use anyhow::Context;
use chrono::{NaiveTime, Weekday};
use locality_core::WeeklySchedule;

/// Parses `"<day> <HH:MM>"`, e.g. `"tue 10:30"`.
fn parse_moment(text: &str) -> anyhow::Result<(Weekday, NaiveTime)> {
    let (day, time) = text
        .trim()
        .split_once(char::is_whitespace)
        .with_context(|| format!("expected \"<day> <HH:MM>\", got \"{text}\""))?;
    let weekday: Weekday = day
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown day \"{day}\""))?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .with_context(|| format!("invalid time \"{}\"", time.trim()))?;
    Ok((weekday, time))
}

pub(crate) fn describe(text: &str, at: Option<&str>, json: bool) -> anyhow::Result<String> {
    let schedule = WeeklySchedule::parse(text)?;
    let mut out = if json {
        serde_json::to_string_pretty(&schedule)?
    } else {
        schedule.to_string()
    };

    if let Some(moment) = at {
        let (weekday, time) = parse_moment(moment)?;
        let state = if schedule.is_open_at(weekday, time) {
            "open"
        } else {
            "closed"
        };
        out.push_str(&format!("\n{weekday} {} : {state}", time.format("%H:%M")));
    }
    Ok(out)
}

pub(crate) fn run_hours(text: &str, at: Option<&str>, json: bool) -> anyhow::Result<()> {
    println!("{}", describe(text, at, json)?);
    Ok(())
}
