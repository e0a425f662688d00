//! This module provides the error type shared by every disk and volume
//! operation in the crate.
//!
//! `DiskToolsError` carries the raw Win32 error code of the call that failed,
//! the message the system message table holds for that code, and a context
//! string naming the path or volume identifier involved, so that a failure can
//! be diagnosed from its `Display` output alone.

use thiserror::Error;

use crate::message::{format_native_error, LANG_NEUTRAL_DEFAULT};

/// Win32 `ERROR_FILE_NOT_FOUND`.
pub const ERROR_FILE_NOT_FOUND: u32 = 2;
/// Win32 `ERROR_ACCESS_DENIED`.
pub const ERROR_ACCESS_DENIED: u32 = 5;
/// Win32 `ERROR_SHARING_VIOLATION`.
pub const ERROR_SHARING_VIOLATION: u32 = 32;
/// Win32 `ERROR_INSUFFICIENT_BUFFER`.
pub const ERROR_INSUFFICIENT_BUFFER: u32 = 122;
/// Win32 `ERROR_MORE_DATA`.
pub const ERROR_MORE_DATA: u32 = 234;

const SHARING_VIOLATION_HINT: &str = "Try closing any programs that may be using the disk.";
const ACCESS_DENIED_HINT: &str = "Try running the program as administrator.";

/// Classification of a [`DiskToolsError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum DiskToolsErrorKind {
    /// The failure could not be attributed to an OS call.
    Unknown,
    /// An OS call failed with the contained Win32 error code.
    Native(u32),
    /// A path or identifier did not resolve to anything.
    NotFound,
}

/// Represents a failed disk or volume operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum DiskToolsError {
    #[error("DiskToolsError: {message} context: {context}")]
    Unknown { message: String, context: String },

    #[error("DiskToolsError: {message} ({code}: {formatted}) context: {context}")]
    Native {
        message: String,
        code: u32,
        formatted: String,
        context: String,
    },

    #[error("DiskToolsError: {message} context: {context}")]
    NotFound { message: String, context: String },
}

impl DiskToolsError {
    /// Creates a `Native` error, formatting `code` with the neutral system
    /// language.
    ///
    /// # Arguments
    ///
    /// * `message` - What the crate was trying to do.
    /// * `code` - The Win32 error code returned by the failing call.
    /// * `context` - The path or volume identifier the call was made on.
    ///
    /// # Examples
    ///
    /// ```
    /// use win_volume_extents::{DiskToolsError, ERROR_ACCESS_DENIED};
    ///
    /// let error = DiskToolsError::native("Failed to open volume", ERROR_ACCESS_DENIED, "C:\\");
    /// assert_eq!(error.code(), Some(ERROR_ACCESS_DENIED));
    /// assert!(error.has_further_info());
    /// ```
    pub fn native(message: impl Into<String>, code: u32, context: impl Into<String>) -> Self {
        Self::native_with_language(message, code, context, LANG_NEUTRAL_DEFAULT)
    }

    /// Creates a `Native` error whose OS message is looked up in `language_id`.
    pub fn native_with_language(
        message: impl Into<String>,
        code: u32,
        context: impl Into<String>,
        language_id: u32,
    ) -> Self {
        Self::Native {
            message: message.into(),
            code,
            formatted: format_native_error(language_id, code, false),
            context: context.into(),
        }
    }

    pub fn not_found(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            context: context.into(),
        }
    }

    pub fn unknown(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
            context: context.into(),
        }
    }

    pub fn kind(&self) -> DiskToolsErrorKind {
        match self {
            Self::Unknown { .. } => DiskToolsErrorKind::Unknown,
            Self::Native { code, .. } => DiskToolsErrorKind::Native(*code),
            Self::NotFound { .. } => DiskToolsErrorKind::NotFound,
        }
    }

    /// Returns the Win32 error code, if the error came from an OS call.
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Native { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Unknown { message, .. }
            | Self::Native { message, .. }
            | Self::NotFound { message, .. } => message,
        }
    }

    /// Returns the path or identifier the failing operation was working on.
    pub fn context(&self) -> &str {
        match self {
            Self::Unknown { context, .. }
            | Self::Native { context, .. }
            | Self::NotFound { context, .. } => context,
        }
    }

    /// Returns the system message table text for a `Native` error.
    pub fn formatted(&self) -> Option<&str> {
        match self {
            Self::Native { formatted, .. } => Some(formatted),
            _ => None,
        }
    }

    /// Returns a remediation hint for the few codes a user can act on.
    pub fn further_info(&self) -> Option<&'static str> {
        match self.code()? {
            ERROR_SHARING_VIOLATION => Some(SHARING_VIOLATION_HINT),
            ERROR_ACCESS_DENIED => Some(ACCESS_DENIED_HINT),
            _ => None,
        }
    }

    pub fn has_further_info(&self) -> bool {
        self.further_info().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_further_info_for_sharing_violation() {
        let error = DiskToolsError::native("Failed to open volume", ERROR_SHARING_VIOLATION, "D:\\");
        assert!(error.has_further_info());
        assert_eq!(
            error.further_info(),
            Some("Try closing any programs that may be using the disk.")
        );
    }

    #[test]
    fn test_further_info_for_access_denied() {
        let error = DiskToolsError::native("Failed to open volume", ERROR_ACCESS_DENIED, "D:\\");
        assert_eq!(
            error.further_info(),
            Some("Try running the program as administrator.")
        );
    }

    #[test]
    fn test_no_further_info_for_other_codes() {
        let error = DiskToolsError::native("Failed to open volume", ERROR_FILE_NOT_FOUND, "D:\\");
        assert!(!error.has_further_info());
        assert_eq!(error.further_info(), None);

        // A non-native error never gets a hint, whatever its message says.
        let error = DiskToolsError::not_found("Volume has no mount point", "\\\\?\\Volume{x}");
        assert!(!error.has_further_info());
    }

    #[test]
    fn test_kind_and_accessors() {
        let error = DiskToolsError::native("Failed to open volume", ERROR_MORE_DATA, "\\\\?\\Volume{a}");
        assert_eq!(error.kind(), DiskToolsErrorKind::Native(ERROR_MORE_DATA));
        assert_eq!(error.code(), Some(ERROR_MORE_DATA));
        assert_eq!(error.message(), "Failed to open volume");
        assert_eq!(error.context(), "\\\\?\\Volume{a}");
        assert!(error.formatted().is_some());

        let error = DiskToolsError::unknown("Drive letter out of range", "1");
        assert_eq!(error.kind(), DiskToolsErrorKind::Unknown);
        assert_eq!(error.code(), None);
        assert_eq!(error.formatted(), None);
    }

    #[test]
    fn test_display_names_code_and_context() {
        let error = DiskToolsError::native("Failed to open volume", ERROR_ACCESS_DENIED, "C:\\");
        let formatted = error.formatted().unwrap().to_string();
        assert_eq!(
            error.to_string(),
            format!("DiskToolsError: Failed to open volume (5: {formatted}) context: C:\\")
        );

        let error = DiskToolsError::not_found("Volume has no mount point", "vol");
        assert_eq!(
            error.to_string(),
            "DiskToolsError: Volume has no mount point context: vol"
        );
    }
}
