//! Shared helper functions for CLI commands
//!
//! Parsing of the `--set`, `--change` and `--take` arguments lives here so
//! the command modules only deal with validated values.

use chrono::NaiveDate;

use crate::core::ops::OpError;
use crate::core::schema::CategorySchema;
use crate::core::validate::parse_quantity;

/// Today's date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Convert a 1-based row or batch number to an index
pub fn to_index(number: usize) -> Option<usize> {
    number.checked_sub(1)
}

/// Parse `FIELD=VALUE`, resolving the field against the schema.
///
/// The value may itself contain `=`.
pub fn parse_assignment(
    schema: &CategorySchema,
    arg: &str,
) -> Result<(&'static str, String), OpError> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| OpError::MalformedArgument(arg.to_string()))?;
    let field = schema
        .resolve_field(name)
        .ok_or_else(|| OpError::UnknownField(name.trim().to_string()))?;
    Ok((field, value.to_string()))
}

/// A `--change BATCH:FIELD=VALUE` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchChange {
    /// 1-based batch number
    pub batch: usize,
    pub field: &'static str,
    pub value: String,
}

/// Parse `BATCH:FIELD=VALUE`
pub fn parse_change(schema: &CategorySchema, arg: &str) -> Result<BatchChange, OpError> {
    let (batch, assignment) = arg
        .split_once(':')
        .ok_or_else(|| OpError::MalformedArgument(arg.to_string()))?;
    let batch = parse_batch_number(batch, arg)?;
    let (field, value) = parse_assignment(schema, assignment)?;
    Ok(BatchChange {
        batch,
        field,
        value,
    })
}

/// Parse `BATCH=QTY`
pub fn parse_take(arg: &str) -> Result<(usize, u32), OpError> {
    let (batch, qty) = arg
        .split_once('=')
        .ok_or_else(|| OpError::MalformedArgument(arg.to_string()))?;
    let batch = parse_batch_number(batch, arg)?;
    let qty = parse_quantity(qty).map_err(|source| OpError::InvalidBatch { batch, source })?;
    Ok((batch, qty))
}

fn parse_batch_number(text: &str, arg: &str) -> Result<usize, OpError> {
    match text.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(OpError::MalformedArgument(arg.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::Category;
    use crate::core::validate::ValidationError;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("15 × 20 mm", 7), "15 ×...");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }

    #[test]
    fn test_parse_assignment_resolves_labels() {
        let schema = Category::Membranes.schema();
        assert_eq!(
            parse_assignment(&schema, "Membrane Type=d-PTFE").unwrap(),
            ("membrane_type", "d-PTFE".to_string())
        );
        assert_eq!(
            parse_assignment(&schema, "sn=A=1").unwrap(),
            ("sn", "A=1".to_string())
        );
        assert_eq!(
            parse_assignment(&schema, "colour=blue"),
            Err(OpError::UnknownField("colour".into()))
        );
        assert!(matches!(
            parse_assignment(&schema, "brand"),
            Err(OpError::MalformedArgument(_))
        ));
    }

    #[test]
    fn test_parse_change() {
        let schema = Category::Implants.schema();
        assert_eq!(
            parse_change(&schema, "2:qty=7").unwrap(),
            BatchChange {
                batch: 2,
                field: "qty",
                value: "7".into()
            }
        );
        assert!(matches!(
            parse_change(&schema, "0:qty=7"),
            Err(OpError::MalformedArgument(_))
        ));
        assert!(matches!(
            parse_change(&schema, "qty=7"),
            Err(OpError::MalformedArgument(_))
        ));
    }

    #[test]
    fn test_parse_take() {
        assert_eq!(parse_take("1=3"), Ok((1, 3)));
        assert_eq!(
            parse_take("2=-1"),
            Err(OpError::InvalidBatch {
                batch: 2,
                source: ValidationError::BadQuantity("-1".into())
            })
        );
        assert!(matches!(parse_take("x=1"), Err(OpError::MalformedArgument(_))));
    }

    #[test]
    fn test_to_index() {
        assert_eq!(to_index(1), Some(0));
        assert_eq!(to_index(0), None);
    }
}
