//! Request-body validation, applied at the endpoint boundary before any
//! handler logic runs.

use chrono::NaiveDate;

use crate::error::{Error, FieldError, Result};

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Basic email shape: `local@domain.tld`, single `@`, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) || email.matches('@').count() != 1 {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain
            .rsplit_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    if !is_valid_email(email.trim()) {
        errors.push(FieldError {
            field: "email",
            message: "Please provide a valid email address",
        });
    }
}

fn check_password(password: &str, errors: &mut Vec<FieldError>) {
    if password.trim().chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError {
            field: "password",
            message: "Password must be at least 6 characters long",
        });
    }
}

pub fn validate_signup(name: &str, email: &str, password: &str) -> Result<()> {
    let mut errors = Vec::new();
    if name.trim().chars().count() < MIN_NAME_LEN {
        errors.push(FieldError {
            field: "name",
            message: "Name must be at least 2 characters long",
        });
    }
    check_email(email, &mut errors);
    check_password(password, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

pub fn validate_login(email: &str, password: &str) -> Result<()> {
    let mut errors = Vec::new();
    check_email(email, &mut errors);
    check_password(password, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

pub fn validate_chat_message(message: &str) -> Result<()> {
    if message.trim().is_empty() {
        return Err(Error::Validation(vec![FieldError {
            field: "message",
            message: "Message content is required",
        }]));
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` trip date, recording a field error on failure.
pub fn parse_trip_date(
    field: &'static str,
    value: &str,
    errors: &mut Vec<FieldError>,
) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(FieldError {
                field,
                message: "Date must be in YYYY-MM-DD format",
            });
            None
        }
    }
}

pub fn check_date_order(start: NaiveDate, end: NaiveDate, errors: &mut Vec<FieldError>) {
    if end < start {
        errors.push(FieldError {
            field: "endDate",
            message: "End date must be after start date",
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("test@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("trailing@example."));
    }

    #[test]
    fn signup_collects_every_field_error() {
        let err = validate_signup("x", "bad-email", "short").unwrap_err();
        match err {
            Error::Validation(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
                assert_eq!(fields, vec!["name", "email", "password"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn signup_accepts_valid_payload() {
        assert!(validate_signup("Test User", "test@example.com", "password123").is_ok());
    }

    #[test]
    fn chat_message_must_have_content_after_trim() {
        assert!(validate_chat_message("  \t ").is_err());
        assert!(validate_chat_message("Hi").is_ok());
    }

    #[test]
    fn trip_dates_parse_and_order() {
        let mut errors = Vec::new();
        let start = parse_trip_date("startDate", "2024-06-01", &mut errors).unwrap();
        let end = parse_trip_date("endDate", "2024-06-07", &mut errors).unwrap();
        check_date_order(start, end, &mut errors);
        assert!(errors.is_empty());

        check_date_order(end, start, &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "endDate");

        let mut errors = Vec::new();
        assert!(parse_trip_date("startDate", "not-a-date", &mut errors).is_none());
        assert_eq!(errors[0].field, "startDate");
    }
}
