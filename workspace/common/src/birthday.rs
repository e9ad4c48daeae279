use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid birthday '{0}', expected YYYY-MM-DD")]
pub struct BirthdayError(pub String);

/// Blank input clears the birthday; anything else must be an ISO date.
pub fn normalize_birthday(raw: &str) -> Result<Option<NaiveDate>, BirthdayError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| BirthdayError(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_birthday_is_none() {
        assert_eq!(normalize_birthday(""), Ok(None));
        assert_eq!(normalize_birthday("   "), Ok(None));
    }

    #[test]
    fn test_birthday_is_trimmed() {
        assert_eq!(
            normalize_birthday(" 1990-05-17 "),
            Ok(NaiveDate::from_ymd_opt(1990, 5, 17))
        );
    }

    #[test]
    fn test_invalid_birthday() {
        assert_eq!(
            normalize_birthday("17/05/1990"),
            Err(BirthdayError("17/05/1990".to_string()))
        );
    }
}
