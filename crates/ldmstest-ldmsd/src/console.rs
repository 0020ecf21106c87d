//! Framed console messages and terminal output cleanup.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::MessageError;

const START: u8 = 0x01;
const TEXT: u8 = 0x02;
const END: u8 = 0x03;

/// ESC [ parameter bytes, intermediate bytes, final byte.
static CONTROL_SEQUENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[\x30-\x3f]*[\x20-\x2f]*[\x40-\x7e]").expect("valid control sequence regex")
});

/// One `\x01TYPE\x02TEXT\x03` frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub kind: String,
    /// Text with NUL padding removed.
    pub text: String,
    /// Parsed `text` of `json` messages.
    pub obj: Option<Value>,
}

/// Read the frame at the start of `buf`.
///
/// Returns the message and the number of bytes it occupied.
pub fn read_message(buf: &[u8]) -> Result<(Message, usize), MessageError> {
    match buf.first() {
        None => return Err(MessageError::EndOfInput),
        Some(&START) => {}
        Some(_) => return Err(MessageError::NotStartOfMessage),
    }

    let header_end = buf[1..]
        .iter()
        .position(|&b| b == TEXT)
        .map(|i| i + 1)
        .ok_or(MessageError::BadHeader)?;
    let kind = String::from_utf8_lossy(&buf[1..header_end]).into_owned();

    let body = &buf[header_end + 1..];
    let text_len = body
        .iter()
        .position(|&b| b == END)
        .ok_or(MessageError::Incomplete)?;
    let text = String::from_utf8_lossy(&body[..text_len])
        .trim_matches('\0')
        .to_string();

    let obj = if kind == "json" {
        Some(serde_json::from_str(&text).map_err(|e| MessageError::Json(e.to_string()))?)
    } else {
        None
    };

    let consumed = header_end + 1 + text_len + 1;
    Ok((Message { kind, text, obj }, consumed))
}

/// Read consecutive frames until the input is exhausted.
pub fn read_messages(mut buf: &[u8]) -> Result<Vec<Message>, MessageError> {
    let mut messages = Vec::new();
    while !buf.is_empty() {
        let (message, consumed) = read_message(buf)?;
        messages.push(message);
        buf = &buf[consumed..];
    }
    Ok(messages)
}

/// Remove ANSI control sequences.
pub fn strip_control_sequences(text: &str) -> String {
    CONTROL_SEQUENCE_RE.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_message() {
        let buf = b"\x01log\x02hello\0\0\x03rest";
        let (msg, consumed) = read_message(buf).unwrap();
        assert_eq!(msg.kind, "log");
        assert_eq!(msg.text, "hello");
        assert_eq!(msg.obj, None);
        assert_eq!(&buf[consumed..], b"rest");
    }

    #[test]
    fn test_json_message() {
        let (msg, _) = read_message(b"\x01json\x02{\"rc\": 0}\x03").unwrap();
        assert_eq!(msg.obj, Some(json!({"rc": 0})));
    }

    #[test]
    fn test_framing_errors() {
        assert_eq!(read_message(b"").unwrap_err(), MessageError::EndOfInput);
        assert_eq!(read_message(b"x").unwrap_err(), MessageError::NotStartOfMessage);
        assert_eq!(read_message(b"\x01log").unwrap_err(), MessageError::BadHeader);
        assert_eq!(read_message(b"\x01log\x02abc").unwrap_err(), MessageError::Incomplete);
        assert!(matches!(
            read_message(b"\x01json\x02{\x03"),
            Err(MessageError::Json(_))
        ));
    }

    #[test]
    fn test_read_messages() {
        let msgs = read_messages(b"\x01a\x021\x03\x01b\x022\x03").unwrap();
        let kinds: Vec<&str> = msgs.iter().map(|m| m.kind.as_str()).collect();
        assert_eq!(kinds, ["a", "b"]);
    }

    #[test]
    fn test_strip_control_sequences() {
        assert_eq!(
            strip_control_sequences("\x1b[1;32mOK\x1b[0m done\x1b[2K"),
            "OK done"
        );
        assert_eq!(strip_control_sequences("plain"), "plain");
    }
}
