//! Unit tests for request parsing and calendar validity

use movecast::error::{is_transient_sqlstate, MovecastError};
use movecast::models::{is_valid_calendar_day, ForecastRequest};

#[test]
fn request_accepts_move_type_alias() {
    let request: ForecastRequest =
        serde_json::from_str(r#"{"date": "2025-06-11", "branch": "Dallas", "move_type": "Local"}"#)
            .unwrap();
    assert_eq!(request.category(), Some("Local"));
}

#[test]
fn request_category_is_optional() {
    let request: ForecastRequest =
        serde_json::from_str(r#"{"date": "2025-06-11", "branch": "Dallas"}"#).unwrap();
    assert_eq!(request.category(), None);

    let blank = ForecastRequest::new("2025-06-11", "Dallas", Some(""));
    assert_eq!(blank.category(), None);
}

#[test]
fn reference_year_has_no_leap_day() {
    assert!(is_valid_calendar_day(2, 28));
    assert!(!is_valid_calendar_day(2, 29));
    assert!(!is_valid_calendar_day(4, 31));
    assert!(is_valid_calendar_day(12, 31));
    assert!(!is_valid_calendar_day(13, 1));
}

#[test]
fn validation_errors_display_their_message() {
    let err = MovecastError::Validation("Branch X not found".into());
    assert_eq!(err.to_string(), "Branch X not found");
    assert!(!err.is_transient());
    assert!(MovecastError::TransientStore("timeout".into()).is_transient());
}

#[test]
fn only_connection_and_resource_sqlstates_are_retried() {
    for code in ["08006", "08001", "53300", "53100", "57P01", "57P03", "40001", "40P01"] {
        assert!(is_transient_sqlstate(code), "{}", code);
    }
    // undefined table, undefined column, permission denied, datatype mismatch, query canceled
    for code in ["42P01", "42703", "42501", "42804", "57014", "23505"] {
        assert!(!is_transient_sqlstate(code), "{}", code);
    }
    assert!(!MovecastError::Store("relation \"move_df\" does not exist".into()).is_transient());
}
