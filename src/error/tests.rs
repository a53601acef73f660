//! Unit tests for error handling

use super::*;
use std::io;

#[cfg(test)]
mod club_error_tests {
    use super::*;

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let club_error = ClubError::from(json_error);

        match club_error {
            ClubError::Json(_) => (),
            _ => panic!("Expected Json error variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let club_error = ClubError::from(io_error);

        match club_error {
            ClubError::Io(_) => (),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_invalid_header_error_conversion() {
        let header_error = reqwest::header::HeaderValue::from_str("invalid\nheader").unwrap_err();
        let club_error = ClubError::from(header_error);

        match club_error {
            ClubError::InvalidHeader(_) => (),
            _ => panic!("Expected InvalidHeader error variant"),
        }
    }

    #[test]
    fn test_parse_int_error_conversion() {
        let parse_error = "not_a_number".parse::<i64>().unwrap_err();
        let club_error = ClubError::from(parse_error);

        match club_error {
            ClubError::InvalidId(_) => (),
            _ => panic!("Expected InvalidId error variant"),
        }
    }

    #[test]
    fn test_database_error_conversion() {
        let db_error = rusqlite::Error::QueryReturnedNoRows;
        let club_error = ClubError::from(db_error);

        match club_error {
            ClubError::Database(_) => (),
            _ => panic!("Expected Database error variant"),
        }
    }

    #[test]
    fn test_anyhow_error_keeps_context() {
        let err = anyhow::anyhow!("disk full").context("Failed to open club database");
        let club_error = ClubError::from(err);

        match club_error {
            ClubError::Storage { message } => {
                assert!(message.contains("Failed to open club database"));
                assert!(message.contains("disk full"));
            }
            _ => panic!("Expected Storage error variant"),
        }
    }

    #[test]
    fn test_box_error_conversion() {
        let box_error: Box<dyn std::error::Error + Send + Sync> = Box::new(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "Access denied",
        ));
        let club_error = ClubError::from(box_error);

        match club_error {
            ClubError::Storage { message } => assert!(message.contains("Access denied")),
            _ => panic!("Expected Storage error variant"),
        }
    }

    #[test]
    fn test_validation_error_message() {
        let error = ClubError::validation("first name", "must not be blank");
        assert_eq!(error.to_string(), "Invalid first name: must not be blank");
    }

    #[test]
    fn test_not_found_error_message() {
        let error = ClubError::NotFound {
            entity: "Player",
            id: 42,
        };
        assert_eq!(error.to_string(), "Player 42 not found");
    }

    #[test]
    fn test_missing_service_config_error() {
        let error = ClubError::MissingServiceConfig {
            env_var: "CLUBHOUSE_SERVICE_URL".to_string(),
        };

        let error_string = error.to_string();
        assert!(error_string.contains("Service not configured"));
        assert!(error_string.contains("CLUBHOUSE_SERVICE_URL"));
    }

    #[test]
    fn test_overpayment_error_message() {
        let error = ClubError::Overpayment {
            amount: "60.00".to_string(),
            outstanding: "50.00".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Payment of 60.00 exceeds the outstanding balance of 50.00"
        );
    }

    #[test]
    fn test_error_source_chain() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let club_error = ClubError::from(io_error);

        let error_trait: &dyn std::error::Error = &club_error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_result_type_alias_error() {
        fn lookup() -> Result<String> {
            Err(ClubError::NoTermForDate {
                date: "2025-01-01".to_string(),
            })
        }

        match lookup().unwrap_err() {
            ClubError::NoTermForDate { date } => assert_eq!(date, "2025-01-01"),
            _ => panic!("Expected NoTermForDate error"),
        }
    }
}
