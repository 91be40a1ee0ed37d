//! JSON line encoder
//!
//! Every record becomes one JSON object followed by `\n`, with keys in a
//! fixed order:
//!
//! ```text
//! {"level":"ERROR","@timestamp":"2026-10-19T14:03:07.123+0200","caller":"src/jobs.rs:88","msg":"boom","service":"api","namespace":"prod","attempt":3}
//! ```
//!
//! Log shippers and pub/sub consumers parse this layout, so key names and
//! ordering are part of the contract.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::domain::models::Record;

/// Timestamp layout: ISO-8601 with milliseconds and numeric offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Key of the level name.
pub const LEVEL_KEY: &str = "level";
/// Key of the emission timestamp.
pub const TIME_KEY: &str = "@timestamp";
/// Key of the `file:line` call site.
pub const CALLER_KEY: &str = "caller";
/// Key of the message.
pub const MESSAGE_KEY: &str = "msg";
/// Key of the service tag.
pub const SERVICE_KEY: &str = "service";
/// Key of the namespace tag.
pub const NAMESPACE_KEY: &str = "namespace";

/// Encodes records into JSON lines tagged with the engine's service and namespace.
#[derive(Debug, Clone, Default)]
pub struct JsonEncoder {
    service: String,
    namespace: String,
}

impl JsonEncoder {
    /// Encoder stamping every record with `service` and `namespace`.
    pub fn new(service: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            namespace: namespace.into(),
        }
    }

    /// Encode one record. Never fails.
    pub fn encode(&self, record: &Record) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);
        let line = Line {
            record,
            service: &self.service,
            namespace: &self.namespace,
        };

        if serde_json::to_writer(&mut buf, &line).is_err() {
            buf.clear();
            let fallback = serde_json::json!({
                LEVEL_KEY: record.level().as_str(),
                TIME_KEY: record.timestamp().format(TIMESTAMP_FORMAT).to_string(),
                MESSAGE_KEY: record.message(),
            });
            buf.extend_from_slice(fallback.to_string().as_bytes());
        }

        buf.push(b'\n');
        buf
    }
}

struct Line<'a> {
    record: &'a Record,
    service: &'a str,
    namespace: &'a str,
}

impl Serialize for Line<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = self.record;
        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry(LEVEL_KEY, record.level().as_str())?;
        map.serialize_entry(
            TIME_KEY,
            &record.timestamp().format(TIMESTAMP_FORMAT).to_string(),
        )?;
        if let Some(caller) = record.caller() {
            map.serialize_entry(CALLER_KEY, &caller.to_string())?;
        }
        map.serialize_entry(MESSAGE_KEY, record.message())?;
        map.serialize_entry(SERVICE_KEY, self.service)?;
        map.serialize_entry(NAMESPACE_KEY, self.namespace)?;

        for (key, value) in record.fields().iter() {
            map.serialize_entry(key, value)?;
        }

        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CallSite, Fields, Level};
    use chrono::{DateTime, Local, TimeZone};
    use serde_json::Value;

    fn sample_time() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 10, 19, 14, 3, 7)
            .single()
            .unwrap()
    }

    #[test]
    fn test_encodes_single_json_line() {
        let encoder = JsonEncoder::new("api", "prod");
        let record = Record::new(sample_time(), Level::Error, "boom", Fields::new(), None);

        let buf = encoder.encode(&record);
        assert_eq!(buf.last(), Some(&b'\n'));
        assert_eq!(buf.iter().filter(|b| **b == b'\n').count(), 1);

        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["level"], "ERROR");
        assert_eq!(value["msg"], "boom");
        assert_eq!(value["service"], "api");
        assert_eq!(value["namespace"], "prod");
        assert!(value.get("caller").is_none());
    }

    #[test]
    fn test_key_order_is_fixed() {
        let encoder = JsonEncoder::new("svc", "ns");
        let caller = CallSite {
            file: "src/jobs.rs",
            line: 88,
        };
        let fields = Fields::new().with("attempt", 3).with("queue", "mail");
        let record = Record::new(sample_time(), Level::Info, "sent", fields, Some(caller));

        let line = String::from_utf8(encoder.encode(&record)).unwrap();
        let positions: Vec<usize> = [
            "\"level\"",
            "\"@timestamp\"",
            "\"caller\"",
            "\"msg\"",
            "\"service\"",
            "\"namespace\"",
            "\"attempt\"",
            "\"queue\"",
        ]
        .iter()
        .map(|key| line.find(key).unwrap())
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{line}");
        assert!(line.contains("\"caller\":\"src/jobs.rs:88\""));
    }

    #[test]
    fn test_timestamp_is_iso8601_with_millis() {
        let encoder = JsonEncoder::default();
        let ts = sample_time() + chrono::Duration::milliseconds(123);
        let record = Record::new(ts, Level::Debug, "tick", Fields::new(), None);

        let value: Value = serde_json::from_slice(&encoder.encode(&record)).unwrap();
        let raw = value["@timestamp"].as_str().unwrap();
        assert!(raw.starts_with("2026-10-19T14:03:07.123"), "{raw}");

        let parsed = DateTime::parse_from_str(raw, TIMESTAMP_FORMAT).unwrap();
        assert_eq!(parsed.timestamp_millis(), ts.timestamp_millis());
    }

    #[test]
    fn test_unencodable_values_become_text() {
        let encoder = JsonEncoder::default();
        let fields = Fields::new()
            .with("ratio", f64::NAN)
            .with("peer", crate::domain::models::FieldValue::display(std::net::Ipv4Addr::LOCALHOST));
        let record = Record::new(sample_time(), Level::Warn, "odd", fields, None);

        let value: Value = serde_json::from_slice(&encoder.encode(&record)).unwrap();
        assert_eq!(value["ratio"], "NaN");
        assert_eq!(value["peer"], "127.0.0.1");
    }

    #[test]
    fn test_message_is_escaped() {
        let encoder = JsonEncoder::default();
        let record = Record::new(
            sample_time(),
            Level::Info,
            "line one\nline \"two\"",
            Fields::new(),
            None,
        );

        let buf = encoder.encode(&record);
        assert_eq!(buf.iter().filter(|b| **b == b'\n').count(), 1);
        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["msg"], "line one\nline \"two\"");
    }
}
