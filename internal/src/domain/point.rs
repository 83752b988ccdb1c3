use std::collections::BTreeMap;

use time::OffsetDateTime;

use super::frame::TelemetryFrame;

pub const MEASUREMENT: &str = "temperature";
pub const BREW_ID_TAG: &str = "brew-id";

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Bool(bool),
    Text(String),
}

/// Record persisted by the telemetry sink.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryPoint {
    pub measurement: &'static str,
    pub brew_id: String,
    pub fields: BTreeMap<String, FieldValue>,
    pub timestamp: OffsetDateTime,
}

impl TelemetryPoint {
    /// Every frame field except `json-size` becomes a point field. Readings are
    /// stored as floats whatever the device sent.
    pub fn from_frame(frame: &TelemetryFrame, brew_id: &str, received_at: OffsetDateTime) -> Self {
        let mut fields = BTreeMap::new();
        for (name, value) in [
            ("instant", frame.instant),
            ("average", frame.average),
            ("min", frame.min),
            ("max", frame.max),
            ("target", frame.target),
            ("ambient", frame.ambient),
        ] {
            fields.insert(name.to_string(), FieldValue::Float(value));
        }
        fields.insert("action".into(), FieldValue::Text(frame.action.name().into()));
        for (name, flag) in [("rest", frame.rest), ("heat", frame.heat), ("cool", frame.cool)] {
            if let Some(flag) = flag {
                fields.insert(name.to_string(), FieldValue::Bool(flag));
            }
        }
        fields.insert("reason-code".into(), FieldValue::Text(frame.reason_code.clone()));

        TelemetryPoint {
            measurement: MEASUREMENT,
            brew_id: brew_id.to_string(),
            fields,
            timestamp: truncate_to_millis(received_at),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// Most recent point as read back from the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestRecord {
    pub brew_id: String,
    pub timestamp: OffsetDateTime,
    pub fields: BTreeMap<String, FieldValue>,
}

fn truncate_to_millis(at: OffsetDateTime) -> OffsetDateTime {
    at.replace_millisecond(at.millisecond()).unwrap_or(at)
}

#[cfg(test)]
mod test {
    use time::macros::datetime;

    use super::*;
    use crate::domain::frame::ControllerAction;

    #[test]
    fn should_build_point_from_frame() {
        let frame = TelemetryFrame {
            action: ControllerAction::Heat,
            rest: None,
            heat: Some(true),
            cool: None,
            reason_code: "H1".into(),
            json_size: Some(187),
            ..TelemetryFrame::resting_at(19.0)
        };
        let point = TelemetryPoint::from_frame(&frame, "42-IPA-01", datetime!(2024-03-01 10:00:00 UTC));

        assert_eq!(point.measurement, "temperature");
        assert_eq!(point.brew_id, "42-IPA-01");
        assert_eq!(point.field("target"), Some(&FieldValue::Float(19.0)));
        assert_eq!(point.field("action"), Some(&FieldValue::Text("Heat".into())));
        assert_eq!(point.field("heat"), Some(&FieldValue::Bool(true)));
        assert_eq!(point.field("reason-code"), Some(&FieldValue::Text("H1".into())));
        assert_eq!(point.field("rest"), None);
        assert_eq!(point.field("json-size"), None);
        assert_eq!(point.fields.len(), 9);
    }

    #[test]
    fn should_keep_millisecond_precision() {
        let received_at = datetime!(2024-03-01 10:00:00.123456789 UTC);
        let point = TelemetryPoint::from_frame(&TelemetryFrame::resting_at(18.0), "42-IPA-01", received_at);
        assert_eq!(point.timestamp, datetime!(2024-03-01 10:00:00.123 UTC));
    }
}
