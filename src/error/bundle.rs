//! Bundle structure and validation errors

use super::CourierError;
use crate::validate::ValidationReport;

/// Creates a structural bundle error carrying the info collected so far
pub fn bad_bundle(message: impl Into<String>, report: ValidationReport) -> CourierError {
    CourierError::BadBundle {
        message: message.into(),
        report: Box::new(report),
    }
}

/// Creates a structural bundle error with no validation info attached
pub fn structural(message: impl Into<String>) -> CourierError {
    bad_bundle(message, ValidationReport::default())
}

/// Creates a validation failure error
pub fn invalid(report: ValidationReport) -> CourierError {
    CourierError::BundleInvalid {
        report: Box::new(report),
    }
}
