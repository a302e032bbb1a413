//! File names derived from conversation ids.

/// Bytes outside `[A-Za-z0-9_-]` are written as `%XX`, so distinct ids
/// never map to the same name and no id can leave its directory.
pub(crate) fn escape_id(conversation_id: &str) -> String {
    let mut name = String::with_capacity(conversation_id.len());
    for byte in conversation_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            name.push(char::from(byte));
        } else {
            name.push_str(&format!("%{:02X}", byte));
        }
    }
    name
}
