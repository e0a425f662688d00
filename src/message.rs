//! Lookup of Win32 error codes in the system message table.

/// `MAKELANGID(LANG_NEUTRAL, SUBLANG_DEFAULT)`, the user's default language.
pub const LANG_NEUTRAL_DEFAULT: u32 = 0x0400;

/// Size of the message buffer, in UTF-16 units.
#[cfg(windows)]
const MESSAGE_BUFFER_LEN: usize = 1024;

/// Formats a Win32 error code as the system message table text for it.
///
/// The message table terminates every entry with `"\r\n"`; that terminator is
/// removed unless `keep_newline` is set. On Windows, a code with no message
/// table entry yields an empty string.
///
/// # Arguments
///
/// * `language_id` - A language identifier such as [`LANG_NEUTRAL_DEFAULT`]
/// * `code` - The Win32 error code, e.g. the value of `GetLastError()`
/// * `keep_newline` - Whether to keep the trailing line terminator
///
/// # Examples
///
/// ```
/// use win_volume_extents::{format_native_error, LANG_NEUTRAL_DEFAULT};
///
/// let message = format_native_error(LANG_NEUTRAL_DEFAULT, 5, false);
/// assert!(!message.ends_with('\n'));
/// ```
pub fn format_native_error(language_id: u32, code: u32, keep_newline: bool) -> String {
    trim_message(system_message(language_id, code), keep_newline)
}

/// Applies the newline policy of [`format_native_error`] to a raw message.
pub(crate) fn trim_message(mut message: String, keep_newline: bool) -> String {
    if !keep_newline {
        while message.ends_with(['\r', '\n']) {
            message.pop();
        }
    }
    message
}

#[cfg(windows)]
fn system_message(language_id: u32, code: u32) -> String {
    use windows::core::PWSTR;
    use windows::Win32::System::Diagnostics::Debug::{
        FormatMessageW, FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS,
    };

    let mut buffer = [0u16; MESSAGE_BUFFER_LEN];
    let len = unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
            None,
            code,
            language_id,
            PWSTR(buffer.as_mut_ptr()),
            buffer.len() as u32,
            None,
        )
    };

    String::from_utf16_lossy(&buffer[..(len as usize).min(buffer.len())])
}

// Non-Windows builds only exist to run the portable core under test; they
// mirror the message table's "\r\n" terminator so the trim policy is the same.
#[cfg(not(windows))]
fn system_message(_language_id: u32, code: u32) -> String {
    format!("{}\r\n", std::io::Error::from_raw_os_error(code as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_message_strips_terminator() {
        assert_eq!(
            trim_message("Access is denied.\r\n".to_string(), false),
            "Access is denied."
        );
        assert_eq!(
            trim_message("Access is denied.\r\n".to_string(), true),
            "Access is denied.\r\n"
        );
    }

    #[test]
    fn test_trim_message_empty() {
        assert_eq!(trim_message(String::new(), false), "");
        assert_eq!(trim_message(String::new(), true), "");
        assert_eq!(trim_message("\r\n".to_string(), false), "");
    }

    #[test]
    fn test_trim_message_without_terminator() {
        assert_eq!(trim_message("No newline".to_string(), false), "No newline");
    }

    #[test]
    fn test_format_native_error_newline_policy() {
        // ERROR_ACCESS_DENIED has a message table entry.
        let trimmed = format_native_error(LANG_NEUTRAL_DEFAULT, 5, false);
        let kept = format_native_error(LANG_NEUTRAL_DEFAULT, 5, true);

        assert!(!trimmed.is_empty());
        assert!(!trimmed.ends_with('\n'));
        assert!(kept.ends_with("\r\n"));
        assert_eq!(kept.trim_end_matches(['\r', '\n']), trimmed);
    }

    #[cfg(windows)]
    #[test]
    fn test_format_native_error_unknown_code_is_empty() {
        assert_eq!(format_native_error(LANG_NEUTRAL_DEFAULT, 0x0000_FFFF, false), "");
        assert_eq!(format_native_error(LANG_NEUTRAL_DEFAULT, 0x0000_FFFF, true), "");
    }

    #[test]
    fn test_format_native_error_is_deterministic() {
        assert_eq!(
            format_native_error(LANG_NEUTRAL_DEFAULT, 32, false),
            format_native_error(LANG_NEUTRAL_DEFAULT, 32, false)
        );
        assert_eq!(
            format_native_error(LANG_NEUTRAL_DEFAULT, 32, true),
            format_native_error(LANG_NEUTRAL_DEFAULT, 32, true)
        );
    }
}
