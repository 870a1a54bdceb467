//! Input validation for registrations and movements

use crate::money::{Money, MAX_VALUE};
use crate::time::current_year;
use crate::{Error, Result};

pub const AIH_NUMBER_LEN: usize = 11;
pub const MAX_ATTENDANCE_LEN: usize = 20;
pub const MIN_COMPETENCY_YEAR: i32 = 2020;

/// AIH numbers are exactly 11 ASCII digits
pub fn validate_aih_number(number: &str) -> Result<()> {
    if number.len() != AIH_NUMBER_LEN || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Validation(format!(
            "AIH number must have {} digits: {:?}",
            AIH_NUMBER_LEN, number
        )));
    }
    Ok(())
}

/// Split a competency into (month, year) without range checks
pub fn parse_competency(competency: &str) -> Option<(u32, i32)> {
    let (month, year) = competency.split_once('/')?;
    if month.len() != 2 || year.len() != 4 {
        return None;
    }
    if !month.bytes().chain(year.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((month.parse().ok()?, year.parse().ok()?))
}

/// Competency is MM/YYYY, month 1-12, year in [2020, current year + 1]
pub fn validate_competency(competency: &str) -> Result<()> {
    validate_competency_for_year(competency, current_year())
}

pub fn validate_competency_for_year(competency: &str, this_year: i32) -> Result<()> {
    let (month, year) = parse_competency(competency).ok_or_else(|| {
        Error::Validation(format!("Competency must be MM/YYYY: {:?}", competency))
    })?;
    if !(1..=12).contains(&month) {
        return Err(Error::Validation(format!(
            "Competency month must be 01-12: {:?}",
            competency
        )));
    }
    if year < MIN_COMPETENCY_YEAR || year > this_year + 1 {
        return Err(Error::Validation(format!(
            "Competency year must be {}-{}: {:?}",
            MIN_COMPETENCY_YEAR,
            this_year + 1,
            competency
        )));
    }
    Ok(())
}

/// Registration amounts are in (0, 999999.99]
pub fn validate_initial_value(value: Money) -> Result<()> {
    if value <= Money::ZERO {
        return Err(Error::Validation("Value must be greater than zero".to_string()));
    }
    check_max(value)
}

/// Movement amounts are in [0, 999999.99]; a fully glossed account is zero
pub fn validate_movement_value(value: Money) -> Result<()> {
    if value < Money::ZERO {
        return Err(Error::Validation("Value must not be negative".to_string()));
    }
    check_max(value)
}

fn check_max(value: Money) -> Result<()> {
    if value > MAX_VALUE {
        return Err(Error::Validation(format!(
            "Value too high (maximum {}): {}",
            MAX_VALUE, value
        )));
    }
    Ok(())
}

/// At least one attendance; each token non-empty and at most 20 chars
///
/// Returns the trimmed tokens in input order.
pub fn validate_attendances(attendances: &[String]) -> Result<Vec<String>> {
    if attendances.is_empty() {
        return Err(Error::Validation(
            "At least one attendance is required".to_string(),
        ));
    }
    attendances
        .iter()
        .map(|token| {
            let token = token.trim();
            if token.is_empty() {
                return Err(Error::Validation("Attendance must not be empty".to_string()));
            }
            if token.chars().count() > MAX_ATTENDANCE_LEN {
                return Err(Error::Validation(format!(
                    "Attendance longer than {} characters: {:?}",
                    MAX_ATTENDANCE_LEN, token
                )));
            }
            Ok(token.to_string())
        })
        .collect()
}

/// Trimmed, non-empty text field
pub fn require_text(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}
