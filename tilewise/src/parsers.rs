//! Parsers for string-valued command line and workflow arguments.
//!
//! Workflow engines pass every parameter as a named string, so flags arrive
//! as `"True"`/`"False"` and year ranges as `"1990_1995"`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("'{0}' is not a valid datetime: expected <year> or <year>_<year>")]
    InvalidDatetime(String),

    #[error("'{0}' is an empty year range: the first year is after the second")]
    EmptyRange(String),
}

/// Expands `"<year>"` or `"<start>_<end>"` into the years it covers,
/// inclusive. A single value is passed through unchanged.
pub fn datetime_parser(datetime: &str) -> Result<Vec<String>, ParseError> {
    let parts: Vec<&str> = datetime.split('_').collect();
    match parts.as_slice() {
        [single] if !single.is_empty() => Ok(vec![single.to_string()]),
        [start, end] => {
            let invalid = || ParseError::InvalidDatetime(datetime.to_string());
            let start: i32 = start.trim().parse().map_err(|_| invalid())?;
            let end: i32 = end.trim().parse().map_err(|_| invalid())?;
            if start > end {
                return Err(ParseError::EmptyRange(datetime.to_string()));
            }
            Ok((start..=end).map(|y| y.to_string()).collect())
        }
        _ => Err(ParseError::InvalidDatetime(datetime.to_string())),
    }
}

/// `"False"` is false, anything else is true.
pub fn bool_parser(raw: &str) -> bool {
    raw != "False"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_range() {
        assert_eq!(
            datetime_parser("1990_1995").unwrap(),
            vec!["1990", "1991", "1992", "1993", "1994", "1995"]
        );
    }

    #[test]
    fn test_datetime_single() {
        assert_eq!(datetime_parser("2023").unwrap(), vec!["2023"]);
        assert_eq!(datetime_parser("2023-01/2023-06").unwrap(), vec!["2023-01/2023-06"]);
    }

    #[test]
    fn test_datetime_invalid() {
        assert!(matches!(
            datetime_parser("1990_1991_1992"),
            Err(ParseError::InvalidDatetime(_))
        ));
        assert!(datetime_parser("abc_1991").is_err());
        assert!(datetime_parser("").is_err());
        assert!(matches!(
            datetime_parser("1995_1990"),
            Err(ParseError::EmptyRange(_))
        ));
    }

    #[test]
    fn test_bool_parser() {
        assert!(!bool_parser("False"));
        assert!(bool_parser("True"));
        assert!(bool_parser("false"));
        assert!(bool_parser(""));
    }
}
