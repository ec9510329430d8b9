//! Optional binding of an upload to a device fingerprint.

use photoguard_core::AppError;

/// Exact comparison of the declared and signed device ids.
pub fn matches(declared: &str, signed: &str) -> bool {
    declared == signed
}

/// Apply the binding only when both sides are present.
pub fn check(declared: Option<&str>, signed: Option<&str>) -> Result<(), AppError> {
    match (declared, signed) {
        (Some(declared), Some(signed)) if !matches(declared, signed) => {
            Err(AppError::DeviceMismatch {
                declared: declared.to_string(),
                signed: signed.to_string(),
            })
        }
        _ => Ok(()),
    }
}
