//! Request validation utilities.

use garde::{Report, Validate};

use crate::error::DomainError;

/// Convert a garde validation report to a DomainError.
pub fn validate_struct<T>(value: &T) -> Result<(), DomainError>
where
    T: Validate,
    T::Context: Default,
{
    value
        .validate()
        .map_err(|report| DomainError::ValidationError(format_validation_errors(&report)))
}

/// Format validation errors from a garde Report into a human-readable string.
fn format_validation_errors(report: &Report) -> String {
    report
        .iter()
        .map(|(path, error)| {
            if path.to_string().is_empty() {
                error.message().to_string()
            } else {
                format!("{}: {}", path, error.message())
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Strict dotted-quad IPv4 check: exactly four octets, each 0-255 without
/// leading zeros, and no surrounding text.
pub fn is_valid_ipv4(value: &str) -> bool {
    let octets: Vec<&str> = value.split('.').collect();
    if octets.len() != 4 {
        return false;
    }

    octets.into_iter().all(|octet| {
        if octet.is_empty() || octet.len() > 3 || !octet.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        if octet.len() > 1 && octet.starts_with('0') {
            return false;
        }
        octet.parse::<u16>().map_or(false, |n| n <= 255)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use garde::Validate;

    #[derive(Validate)]
    struct TestRequest {
        #[garde(length(min = 1))]
        field: String,
    }

    #[test]
    fn test_validate_success() {
        let request = TestRequest {
            field: "value".to_string(),
        };
        assert!(validate_struct(&request).is_ok());
    }

    #[test]
    fn test_validate_failure_names_the_field() {
        let request = TestRequest {
            field: "".to_string(),
        };
        let result = validate_struct(&request);
        if let Err(DomainError::ValidationError(msg)) = result {
            assert!(msg.contains("field"));
        } else {
            panic!("Expected ValidationError");
        }
    }

    #[test]
    fn test_accepts_well_formed_addresses() {
        for address in ["0.0.0.0", "255.255.255.255", "192.168.1.1", "10.0.0.1"] {
            assert!(is_valid_ipv4(address), "{address} should be valid");
        }
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        let malformed = [
            "",
            "192.168.1",
            "192.168.1.1.1",
            "256.1.1.1",
            "1.2.3.256",
            "01.2.3.4",
            "1.2.3.a",
            " 1.2.3.4",
            "1.2.3.4 ",
            "1..2.3",
            "1.2.3.",
            ".1.2.3",
            "1234.1.2.3",
            "not-an-ip",
        ];
        for address in malformed {
            assert!(!is_valid_ipv4(address), "{address:?} should be rejected");
        }
    }
}
