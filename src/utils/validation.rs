use crate::utils::time::parse_birthdate_input;
use regex::Regex;
use std::sync::LazyLock;
use validator::ValidationError;

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+[0-9]+[\- .]*)?(\([0-9]+\)[\- .]*)?[0-9][0-9\- .]+[0-9]$")
        .expect("phone pattern compiles")
});

pub fn is_phone_number_valid(phone: &str) -> bool {
    PHONE_RE.is_match(phone.trim())
}

pub fn is_birthdate_valid(birthdate: &str) -> bool {
    parse_birthdate_input(birthdate).is_some()
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("mandatory_field"));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if !is_phone_number_valid(phone) {
        return Err(ValidationError::new("invalid_phone"));
    }
    Ok(())
}

pub fn validate_birthdate(birthdate: &str) -> Result<(), ValidationError> {
    if !is_birthdate_valid(birthdate) {
        return Err(ValidationError::new("invalid_birthdate"));
    }
    Ok(())
}
