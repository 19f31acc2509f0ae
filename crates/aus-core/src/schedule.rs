//! Upgrade schedules
//!
//! A schedule is a five field cron expression (minute, hour, day of month,
//! month, day of week) or one of the named presets. The tool only stores the
//! schedule; evaluation happens in the upgrade service.

use std::str::FromStr;

use crate::error::InputError;

/// Named schedule presets and their cron expressions
pub const PRESETS: [(&str, &str); 2] = [("anytime", "* * * * *"), ("weekdays", "* * * * 1-4")];

/// Names of the supported presets
pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|(name, _)| *name)
}

/// Resolve a schedule to a cron expression
///
/// Presets are expanded; anything else must be a valid five field cron
/// expression and is returned unchanged.
///
/// # Errors
/// Returns [`InputError::MissingSchedule`] for an empty schedule and
/// [`InputError::InvalidSchedule`] if the expression does not parse
pub fn translate(schedule: &str) -> Result<String, InputError> {
    let schedule = schedule.trim();
    if schedule.is_empty() {
        return Err(InputError::MissingSchedule);
    }

    if let Some((_, expression)) = PRESETS.iter().find(|(name, _)| *name == schedule) {
        return Ok((*expression).to_string());
    }

    validate_cron(schedule)?;
    Ok(schedule.to_string())
}

fn validate_cron(expression: &str) -> Result<(), InputError> {
    let fields = expression.split_whitespace().count();
    if fields != 5 {
        return Err(InputError::invalid_schedule(
            expression,
            format!("expected 5 fields, found {fields}"),
        ));
    }
    let mut fields: Vec<&str> = expression.split_whitespace().collect();
    let day_of_week = shift_day_of_week(fields[4]);
    fields[4] = &day_of_week;
    // the parser expects a leading seconds field and counts weekdays from 1
    cron::Schedule::from_str(&format!("0 {}", fields.join(" ")))
        .map(|_| ())
        .map_err(|e| InputError::invalid_schedule(expression, e))
}

/// Renumber a day of week field from Sunday = 0 to Sunday = 1
///
/// Steps and day names are kept as they are.
fn shift_day_of_week(field: &str) -> String {
    let shift = |value: &str| match value.parse::<u8>() {
        Ok(day) => (u16::from(day) + 1).to_string(),
        Err(_) => value.to_string(),
    };
    field
        .split(',')
        .map(|part| {
            let (range, step) = match part.split_once('/') {
                Some((range, step)) => (range, Some(step)),
                None => (part, None),
            };
            let mut shifted = match range.split_once('-') {
                Some((start, end)) => format!("{}-{}", shift(start), shift(end)),
                None => shift(range),
            };
            if let Some(step) = step {
                shifted.push('/');
                shifted.push_str(step);
            }
            shifted
        })
        .collect::<Vec<_>>()
        .join(",")
}
