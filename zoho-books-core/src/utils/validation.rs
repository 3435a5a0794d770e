//! Semantic argument checks run before any request leaves the process.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::types::LineItem;

/// Implemented by every request type; failures are [`CoreError::ValidationError`].
pub trait Validate {
    fn validate(&self) -> CoreResult<()>;
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::ValidationError(message.into())
}

/// Identifiers end up in the URL path, so they must be a single clean segment.
pub fn require_id(field: &str, value: &str) -> CoreResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(format!("{field} is required")));
    }
    if trimmed.len() != value.len()
        || value.contains(['/', '?', '#', '%', ' '])
        || value.chars().all(|c| c == '.')
    {
        return Err(invalid(format!("{field} '{value}' is not a valid identifier")));
    }
    Ok(())
}

pub fn require_text(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

pub fn optional_id(field: &str, value: Option<&str>) -> CoreResult<()> {
    value.map_or(Ok(()), |v| require_id(field, v))
}

/// `YYYY-MM-DD`, a real calendar date.
pub fn check_date(field: &str, value: &str) -> CoreResult<NaiveDate> {
    if value.len() != 10 {
        return Err(invalid(format!("{field} must use the YYYY-MM-DD format")));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| invalid(format!("{field} '{value}' is not a valid YYYY-MM-DD date")))
}

pub fn optional_date(field: &str, value: Option<&str>) -> CoreResult<Option<NaiveDate>> {
    value.map(|v| check_date(field, v)).transpose()
}

/// Both ends optional; when both are present `from` must not be after `to`.
pub fn check_date_range(
    from_field: &str,
    from: Option<&str>,
    to_field: &str,
    to: Option<&str>,
) -> CoreResult<()> {
    let from_date = optional_date(from_field, from)?;
    let to_date = optional_date(to_field, to)?;
    if let (Some(start), Some(end)) = (from_date, to_date)
        && start > end
    {
        return Err(invalid(format!("{from_field} must not be after {to_field}")));
    }
    Ok(())
}

/// Basic shape check: one `@`, non-empty local part, dotted domain.
pub fn check_email(field: &str, value: &str) -> CoreResult<()> {
    let bad = || invalid(format!("{field} '{value}' is not a valid email address"));
    let (local, domain) = value.split_once('@').ok_or_else(bad)?;
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok || value.chars().any(char::is_whitespace) {
        return Err(bad());
    }
    Ok(())
}

pub fn optional_email(field: &str, value: Option<&str>) -> CoreResult<()> {
    value.map_or(Ok(()), |v| check_email(field, v))
}

pub fn check_positive(field: &str, value: f64) -> CoreResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(format!("{field} must be greater than 0")));
    }
    Ok(())
}

pub fn check_non_negative(field: &str, value: f64) -> CoreResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!("{field} must not be negative")));
    }
    Ok(())
}

pub fn optional_non_negative(field: &str, value: Option<f64>) -> CoreResult<()> {
    value.map_or(Ok(()), |v| check_non_negative(field, v))
}

/// At least one line; each names an item and carries sane numbers.
pub fn check_line_items(line_items: &[LineItem]) -> CoreResult<()> {
    if line_items.is_empty() {
        return Err(invalid("line_items must contain at least one line"));
    }
    for (index, line) in line_items.iter().enumerate() {
        let prefix = format!("line_items[{index}]");
        match (line.item_id.as_deref(), line.name.as_deref()) {
            (Some(id), _) => require_id(&format!("{prefix}.item_id"), id)?,
            (None, Some(name)) => require_text(&format!("{prefix}.name"), name)?,
            (None, None) => {
                return Err(invalid(format!("{prefix} needs an item_id or a name")));
            }
        }
        if let Some(quantity) = line.quantity {
            check_positive(&format!("{prefix}.quantity"), quantity)?;
        }
        optional_non_negative(&format!("{prefix}.rate"), line.rate)?;
    }
    Ok(())
}

/// Serialize an update request and insist it changes something.
///
/// Fields marked `skip_serializing` (the record id) never count.
pub fn update_body<T: Serialize>(request: &T, message: &str) -> CoreResult<Value> {
    let body = serde_json::to_value(request)?;
    match body.as_object() {
        Some(fields) if !fields.is_empty() => Ok(body),
        _ => Err(invalid(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_single_path_segments() {
        assert!(require_id("contact_id", "460000000026049").is_ok());
        assert!(require_id("contact_id", "").is_err());
        assert!(require_id("contact_id", "   ").is_err());
        assert!(require_id("contact_id", "12/../34").is_err());
        assert!(require_id("contact_id", "12?x=1").is_err());
        assert!(require_id("contact_id", " 12").is_err());
        assert!(require_id("contact_id", ".").is_err());
        assert!(require_id("contact_id", "..").is_err());
        assert!(require_id("contact_id", "1.5").is_ok());
    }

    #[test]
    fn dates_are_strict() {
        assert!(check_date("date", "2024-02-29").is_ok());
        assert!(check_date("date", "2023-02-29").is_err());
        assert!(check_date("date", "2024-2-1").is_err());
        assert!(check_date("date", "01/02/2024").is_err());
    }

    #[test]
    fn reversed_range_rejected() {
        assert!(check_date_range("from", Some("2024-01-01"), "to", Some("2024-01-31")).is_ok());
        assert!(check_date_range("from", Some("2024-02-01"), "to", Some("2024-01-31")).is_err());
        assert!(check_date_range("from", None, "to", Some("2024-01-31")).is_ok());
    }

    #[test]
    fn email_shape() {
        assert!(check_email("email", "john@example.com").is_ok());
        assert!(check_email("email", "john@example").is_err());
        assert!(check_email("email", "@example.com").is_err());
        assert!(check_email("email", "john doe@example.com").is_err());
        assert!(check_email("email", "john@@example.com").is_err());
    }

    #[test]
    fn amounts() {
        assert!(check_positive("amount", 0.01).is_ok());
        assert!(check_positive("amount", 0.0).is_err());
        assert!(check_positive("amount", f64::NAN).is_err());
        assert!(check_non_negative("rate", 0.0).is_ok());
        assert!(check_non_negative("rate", -1.0).is_err());
    }

    #[test]
    fn line_items_rules() {
        assert!(check_line_items(&[]).is_err());

        let unnamed = LineItem {
            quantity: Some(1.0),
            ..LineItem::default()
        };
        assert!(check_line_items(&[unnamed]).is_err());

        let zero_quantity = LineItem {
            item_id: Some("1".into()),
            quantity: Some(0.0),
            ..LineItem::default()
        };
        let err = check_line_items(&[zero_quantity]).unwrap_err();
        assert!(err.to_string().contains("line_items[0].quantity"));

        let ok = LineItem {
            name: Some("Consulting".into()),
            quantity: Some(2.0),
            rate: Some(150.0),
            ..LineItem::default()
        };
        assert!(check_line_items(&[ok]).is_ok());
    }

    #[test]
    fn empty_update_rejected() {
        #[derive(Serialize)]
        struct Update {
            #[serde(skip_serializing)]
            _id: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            notes: Option<String>,
        }

        let empty = Update {
            _id: "1".into(),
            notes: None,
        };
        let err = update_body(&empty, "At least one field must be provided").unwrap_err();
        assert_eq!(
            err,
            CoreError::ValidationError("At least one field must be provided".into())
        );

        let some = Update {
            _id: "1".into(),
            notes: Some("Net 30".into()),
        };
        assert_eq!(
            update_body(&some, "x").unwrap(),
            serde_json::json!({"notes": "Net 30"})
        );
    }
}
