//! App registry push errors

use super::CourierError;

/// Creates an error for a push that never received a response
pub fn communication(url: impl Into<String>, reason: impl Into<String>) -> CourierError {
    CourierError::RegistryCommunication {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates an error for a token that is not a valid header value
pub fn invalid_token(reason: impl Into<String>) -> CourierError {
    CourierError::InvalidToken {
        reason: reason.into(),
    }
}

/// Creates an error for a push the registry answered with a non-2xx status
pub fn rejected(status: u16, message: impl Into<String>, body: serde_json::Value) -> CourierError {
    CourierError::RegistryRejected {
        status,
        message: message.into(),
        body,
    }
}
