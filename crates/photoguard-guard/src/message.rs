//! Canonical signed upload message.
//!
//! ```text
//! upload_image:<imageHashHex>:<unixTimestamp>:<identity>
//! upload_image:<imageHashHex>:<deviceId>:<unixTimestamp>:<identity>
//! ```
//!
//! The message is the only signed artifact, so everything the server needs to trust
//! (hash, identity, timestamp, device) is carried inside it.

use photoguard_core::constants::{MESSAGE_SEPARATOR, UPLOAD_MESSAGE_TAG};

/// Fields recovered from a signed upload message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub image_hash: String,
    pub timestamp: i64,
    pub identity: String,
    pub device_id: Option<String>,
}

/// Build the 4-field message stamped with the current time.
pub fn encode(image_hash: &str, identity: &str) -> (String, i64) {
    let timestamp = chrono::Utc::now().timestamp();
    (encode_at(image_hash, None, timestamp, identity), timestamp)
}

/// Build the 5-field message, carrying a device id, stamped with the current time.
pub fn encode_with_device(image_hash: &str, device_id: &str, identity: &str) -> (String, i64) {
    let timestamp = chrono::Utc::now().timestamp();
    (
        encode_at(image_hash, Some(device_id), timestamp, identity),
        timestamp,
    )
}

/// Build a message for an explicit timestamp.
pub fn encode_at(
    image_hash: &str,
    device_id: Option<&str>,
    timestamp: i64,
    identity: &str,
) -> String {
    let sep = MESSAGE_SEPARATOR;
    match device_id {
        Some(device_id) => format!(
            "{UPLOAD_MESSAGE_TAG}{sep}{image_hash}{sep}{device_id}{sep}{timestamp}{sep}{identity}"
        ),
        None => format!("{UPLOAD_MESSAGE_TAG}{sep}{image_hash}{sep}{timestamp}{sep}{identity}"),
    }
}

/// Parse a signed message. Returns `None` unless it matches one of the two grammars
/// exactly: literal tag, no empty field, integer timestamp.
pub fn parse(message: &str) -> Option<ParsedMessage> {
    let fields: Vec<&str> = message.split(MESSAGE_SEPARATOR).collect();
    if fields.iter().any(|f| f.is_empty()) {
        return None;
    }

    let (tag, image_hash, device_id, timestamp, identity) = match fields.as_slice() {
        [tag, hash, ts, identity] => (*tag, *hash, None, *ts, *identity),
        [tag, hash, device, ts, identity] => (*tag, *hash, Some(*device), *ts, *identity),
        _ => return None,
    };

    if tag != UPLOAD_MESSAGE_TAG {
        return None;
    }

    let timestamp = timestamp.parse::<i64>().ok()?;

    Some(ParsedMessage {
        image_hash: image_hash.to_string(),
        timestamp,
        identity: identity.to_string(),
        device_id: device_id.map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    #[test]
    fn encode_then_parse() {
        let (message, ts) = encode(HASH, "0xABC");
        assert_eq!(message, format!("upload_image:{HASH}:{ts}:0xABC"));

        let parsed = parse(&message).unwrap();
        assert_eq!(parsed.image_hash, HASH);
        assert_eq!(parsed.timestamp, ts);
        assert_eq!(parsed.identity, "0xABC");
        assert_eq!(parsed.device_id, None);
    }

    #[test]
    fn encode_with_device_then_parse() {
        let (message, ts) = encode_with_device(HASH, "pixel-8", "0xABC");
        let parsed = parse(&message).unwrap();
        assert_eq!(parsed.device_id.as_deref(), Some("pixel-8"));
        assert_eq!(parsed.timestamp, ts);
        assert_eq!(parsed.identity, "0xABC");
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(parse("upload_image:abc:123").is_none());
        assert!(parse("upload_image:abc:dev:123:0xabc:extra").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn rejects_wrong_tag() {
        assert!(parse("download_image:abc:123:0xabc").is_none());
        assert!(parse("UPLOAD_IMAGE:abc:123:0xabc").is_none());
    }

    #[test]
    fn rejects_non_integer_timestamp() {
        assert!(parse("upload_image:abc:soon:0xabc").is_none());
        assert!(parse("upload_image:abc:dev:12.5:0xabc").is_none());
    }

    #[test]
    fn rejects_empty_fields() {
        assert!(parse("upload_image::123:0xabc").is_none());
        assert!(parse("upload_image:abc:123:").is_none());
        assert!(parse("upload_image:abc::123:0xabc").is_none());
    }

    #[test]
    fn negative_timestamp_parses() {
        let parsed = parse("upload_image:abc:-5:0xabc").unwrap();
        assert_eq!(parsed.timestamp, -5);
    }
}
