use std::str::FromStr;

use internal::domain::{
    error::ControllerError,
    frame::{ControllerAction, TelemetryFrame},
};
use log::debug;
use serde::Deserialize;
use serde_json::Value;

/// A line as printed by the fermenter firmware.
#[derive(Deserialize, Debug)]
pub struct FrameRecord {
    pub instant: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub target: f64,
    pub ambient: f64,
    pub action: String,
    #[serde(default)]
    pub rest: Option<bool>,
    #[serde(default)]
    pub heat: Option<bool>,
    #[serde(default)]
    pub cool: Option<bool>,
    #[serde(rename = "reason-code")]
    pub reason_code: String,
    /// Diagnostics only. Some firmware revisions print it quoted.
    #[serde(rename = "json-size", default)]
    pub json_size: Option<Value>,
}

impl FrameRecord {
    pub fn decode(line: &[u8]) -> Result<TelemetryFrame, ControllerError> {
        let utf8_str = std::str::from_utf8(line)
            .map_err(|e| ControllerError::FrameDecode(format!("UTF-8 conversion error: {e}")))?;
        let utf8_str = utf8_str.trim();
        let record: FrameRecord = serde_json::from_str(utf8_str)
            .map_err(|e| ControllerError::FrameDecode(format!("JSON deserialization error: {e}, {utf8_str}")))?;
        TelemetryFrame::try_from(record)
    }

    fn json_size(value: Option<Value>) -> Option<u64> {
        let size = match &value {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        if size.is_none() && value.is_some() {
            debug!("Ignoring unreadable json-size {value:?}");
        }
        size
    }
}

impl TryFrom<FrameRecord> for TelemetryFrame {
    type Error = ControllerError;

    fn try_from(record: FrameRecord) -> Result<Self, Self::Error> {
        Ok(TelemetryFrame {
            instant: record.instant,
            average: record.average,
            min: record.min,
            max: record.max,
            target: record.target,
            ambient: record.ambient,
            action: ControllerAction::from_str(&record.action)?,
            rest: record.rest,
            heat: record.heat,
            cool: record.cool,
            reason_code: record.reason_code,
            json_size: FrameRecord::json_size(record.json_size),
        })
    }
}

#[cfg(test)]
mod tests {
    use internal::domain::{error::ControllerError, frame::ControllerAction};

    use super::FrameRecord;

    const LINE: &str = r#"{"instant":18.25,"average":18.31,"min":18.0,"max":18.5,"target":19,"ambient":14.75,"action":"Heat","heat":true,"reason-code":"H2","json-size":172}"#;

    #[test]
    fn should_decode_device_line() {
        let frame = FrameRecord::decode(format!("{LINE}\r\n").as_bytes()).unwrap();
        assert_eq!(frame.instant, 18.25);
        assert_eq!(frame.target, 19.0);
        assert_eq!(frame.action, ControllerAction::Heat);
        assert_eq!(frame.heat, Some(true));
        assert_eq!(frame.rest, None);
        assert_eq!(frame.reason_code, "H2");
        assert_eq!(frame.json_size, Some(172));
    }

    #[test]
    fn should_accept_quoted_json_size() {
        let line = r#"{
            "instant" : 21,
            "average" : 21.3,
            "min" : 18.9,
            "max" : 23.4,
            "target" : 20,
            "ambient" : 12.3,
            "action" : "Cool",
            "cool" : true,
            "reason-code" : "RC5.1",
            "json-size" : "123"
        }"#;
        let frame = FrameRecord::decode(line.as_bytes()).unwrap();
        assert_eq!(frame.instant, 21.0);
        assert_eq!(frame.target, 20.0);
        assert_eq!(frame.action, ControllerAction::Cool);
        assert_eq!(frame.cool, Some(true));
        assert_eq!(frame.rest, None);
        assert_eq!(frame.reason_code, "RC5.1");
        assert_eq!(frame.json_size, Some(123));
    }

    #[test]
    fn should_ignore_unreadable_json_size() {
        for size in [r#""big""#, "-4", "1.5", "null", "[1]"] {
            let line = LINE.replace("172", size);
            let frame = FrameRecord::decode(line.as_bytes()).unwrap();
            assert_eq!(frame.json_size, None, "json-size {size}");
            assert_eq!(frame.target, 19.0);
        }
    }

    #[test]
    fn should_reject_invalid_utf8() {
        let err = FrameRecord::decode(&[0x7b, 0xff, 0xfe, 0x7d]).unwrap_err();
        assert!(matches!(err, ControllerError::FrameDecode(_)));
    }

    #[test]
    fn should_reject_truncated_json() {
        let err = FrameRecord::decode(br#"{"instant":18.25,"aver"#).unwrap_err();
        assert!(matches!(err, ControllerError::FrameDecode(_)));
    }

    #[test]
    fn should_reject_unknown_action() {
        let line = LINE.replace("\"Heat\"", "\"Boil\"");
        let err = FrameRecord::decode(line.as_bytes()).unwrap_err();
        assert!(matches!(err, ControllerError::FrameDecode(_)));
    }
}
