use anyhow::{anyhow, Result};

/// Weekday labels offered by the day menu, in display order.
pub const WEEKDAYS: [&str; 7] = [
    "Lundi",
    "Mardi",
    "Mercredi",
    "Jeudi",
    "Vendredi",
    "Samedi",
    "Dimanche",
];

/// First bookable starting hour (inclusive).
pub const OPENING_HOUR: u32 = 9;

/// Last bookable starting hour (inclusive); that slot runs until 21h.
pub const CLOSING_HOUR: u32 = 20;

/// Every bookable starting hour, 9h through 20h.
pub fn booking_hours() -> impl Iterator<Item = u32> {
    OPENING_HOUR..=CLOSING_HOUR
}

pub fn is_known_day(day: &str) -> bool {
    WEEKDAYS.contains(&day)
}

/// Canonical label identifying a slot, e.g. "Lundi 9h - 10h".
///
/// Slot identity everywhere (store keys, notices, channel names) goes
/// through this exact format.
pub fn slot_label(day: &str, hour: u32) -> String {
    format!("{} {}", day, hour_span(hour))
}

/// The one-hour span part of a label, e.g. "9h - 10h".
pub fn hour_span(hour: u32) -> String {
    format!("{}h - {}h", hour, hour + 1)
}

/// Hour-menu option label; taken hours carry a marker so users can
/// steer around them.
pub fn hour_option_label(hour: u32, taken: bool) -> String {
    if taken {
        format!("{} (Pris)", hour_span(hour))
    } else {
        hour_span(hour)
    }
}

/// Parses an hour-menu value back into a starting hour.
pub fn parse_hour(value: &str) -> Result<u32> {
    let hour: u32 = value
        .trim()
        .parse()
        .map_err(|_| anyhow!("Invalid hour value: '{}'", value))?;

    if !(OPENING_HOUR..=CLOSING_HOUR).contains(&hour) {
        return Err(anyhow!(
            "Hour {} is outside opening hours ({}h-{}h)",
            hour,
            OPENING_HOUR,
            CLOSING_HOUR
        ));
    }

    Ok(hour)
}
