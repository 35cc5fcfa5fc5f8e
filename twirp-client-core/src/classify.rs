//! Response status classification.
//!
//! The outcome of a call is decided by the HTTP status alone, in a fixed
//! precedence order kept in [`CLASSIFICATION_TABLE`].

use std::ops::RangeInclusive;

use http::StatusCode;

/// What to do with a response body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Success with no response message. The body is not looked at.
    NoContent,
    /// Decode the body as the method's response message.
    DecodeMessage,
    /// Decode the body as a Twirp error payload.
    DecodeError,
}

/// Status ranges and their disposition, checked top to bottom.
///
/// Statuses matching no entry are [`Disposition::DecodeError`].
pub const CLASSIFICATION_TABLE: &[(RangeInclusive<u16>, Disposition)] = &[
    (204..=205, Disposition::NoContent),
    (200..=200, Disposition::DecodeMessage),
];

/// Classify a response status.
pub fn classify(status: StatusCode) -> Disposition {
    let status = status.as_u16();
    CLASSIFICATION_TABLE
        .iter()
        .find(|(range, _)| range.contains(&status))
        .map(|(_, disposition)| *disposition)
        .unwrap_or(Disposition::DecodeError)
}
