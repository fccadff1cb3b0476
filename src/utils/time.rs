use chrono::{NaiveDate, Utc};

/// Locale-agnostic format birthdates are stored in.
pub const STORAGE_FORMAT: &str = "%d/%m/%Y";
const US_FORMAT: &str = "%m/%d/%Y";

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn parse_birthdate(birthdate: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(birthdate.trim(), STORAGE_FORMAT).ok()
}

/// Accepts the storage layout first, then the month-first layout typed on
/// English keyboards.
pub fn parse_birthdate_input(input: &str) -> Option<NaiveDate> {
    [STORAGE_FORMAT, US_FORMAT]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input.trim(), format).ok())
}

pub fn format_birthdate_for_database(date: NaiveDate) -> String {
    date.format(STORAGE_FORMAT).to_string()
}

/// French shows day first, every other language month first.
pub fn format_birthdate_for_display(date: NaiveDate, language: &str) -> String {
    let format = if language.eq_ignore_ascii_case("fr") {
        STORAGE_FORMAT
    } else {
        US_FORMAT
    };
    date.format(format).to_string()
}

pub fn age_on(birthdate: NaiveDate, today: NaiveDate) -> u32 {
    today.years_since(birthdate).unwrap_or(0)
}

/// Age in whole years of a stored birthdate, `None` when it does not parse.
pub fn age_from_stored(birthdate: &str, today: NaiveDate) -> Option<u32> {
    parse_birthdate(birthdate).map(|date| age_on(date, today))
}
