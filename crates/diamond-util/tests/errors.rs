use diamond_util::errors::DiamondError;

#[test]
fn test_config_error_display() {
    let err = DiamondError::Config {
        message: "bad syntax".to_string(),
    };
    assert_eq!(err.to_string(), "Configuration error: bad syntax");
}

#[test]
fn test_metadata_error_display() {
    let err = DiamondError::Metadata {
        message: "missing id".to_string(),
    };
    assert_eq!(err.to_string(), "Metadata error: missing id");
}

#[test]
fn test_resolution_error_display() {
    let err = DiamondError::Resolution {
        message: "C".to_string(),
    };
    assert_eq!(err.to_string(), "Unresolved dependency conflict: C");
}

#[test]
fn test_search_error_display() {
    let err = DiamondError::Search {
        message: "budget exhausted".to_string(),
    };
    assert_eq!(err.to_string(), "Search failed: budget exhausted");
}

#[test]
fn test_error_converts_into_miette_report() {
    let report: miette::Report = DiamondError::Resolution {
        message: "A, B".to_string(),
    }
    .into();
    assert!(report.to_string().contains("A, B"));
}
