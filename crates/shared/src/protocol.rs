use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

/// Prefix the worker puts in front of every command it starts.
pub const COMMAND_PREFIX: &str = "$ ";

pub const LOG_MESSAGE_TYPE: &str = "log";
pub const UPDATE_MESSAGE_TYPE: &str = "update";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum InboundMessage {
    /// Full state: element 0 is the command, the rest are its output lines.
    /// Empty means nothing is running.
    #[serde(rename = "log")]
    Snapshot(Vec<String>),
    /// One new line, or a new command when it starts with [`COMMAND_PREFIX`].
    #[serde(rename = "update")]
    Delta(String),
}

impl InboundMessage {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

pub fn is_command_marker(line: &str) -> bool {
    line.starts_with(COMMAND_PREFIX)
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<Value>,
}

pub fn decode(raw: &str) -> Result<InboundMessage, ProtocolError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| ProtocolError::decode(raw, err.to_string()))?;
    if !value.is_object() {
        return Err(ProtocolError::decode(raw, "frame must be a JSON object"));
    }
    let frame: RawFrame =
        serde_json::from_value(value).map_err(|err| ProtocolError::decode(raw, err.to_string()))?;

    match frame.kind.as_str() {
        LOG_MESSAGE_TYPE => {
            let data = frame
                .data
                .ok_or_else(|| ProtocolError::decode(raw, "`log` frame without `data`"))?;
            let entries = serde_json::from_value::<Vec<String>>(data).map_err(|err| {
                ProtocolError::decode(raw, format!("`log` data must be a list of strings: {err}"))
            })?;
            Ok(InboundMessage::Snapshot(entries))
        }
        UPDATE_MESSAGE_TYPE => {
            let data = frame
                .data
                .ok_or_else(|| ProtocolError::decode(raw, "`update` frame without `data`"))?;
            let Value::String(line) = data else {
                return Err(ProtocolError::decode(raw, "`update` data must be a string"));
            };
            Ok(InboundMessage::Delta(line))
        }
        other => Err(ProtocolError::unknown_type(raw, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_log_frame_as_snapshot() {
        let message = decode(r#"{"type":"log","data":["$ build","line1","line2"]}"#)
            .expect("decode");
        assert_eq!(
            message,
            InboundMessage::Snapshot(vec![
                "$ build".to_string(),
                "line1".to_string(),
                "line2".to_string()
            ])
        );
    }

    #[test]
    fn decodes_empty_log_frame() {
        let message = decode(r#"{"type":"log","data":[]}"#).expect("decode");
        assert_eq!(message, InboundMessage::Snapshot(Vec::new()));
    }

    #[test]
    fn decodes_update_frame_as_delta() {
        let message = decode(r#"{"type":"update","data":"frame=  120 fps= 48"}"#).expect("decode");
        assert_eq!(message, InboundMessage::Delta("frame=  120 fps= 48".to_string()));
    }

    #[test]
    fn ignores_extra_fields() {
        let message =
            decode(r#"{"type":"update","data":"DONE","sent_at":"2024-01-01"}"#).expect("decode");
        assert_eq!(message, InboundMessage::Delta("DONE".to_string()));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = decode("{not json").expect_err("should fail");
        assert!(matches!(err, ProtocolError::Decode { .. }));
        assert_eq!(err.raw(), "{not json");
    }

    #[test]
    fn rejects_non_object_payload() {
        for raw in [r#"["log", []]"#, r#""update""#, "42", "null"] {
            let err = decode(raw).expect_err("should fail");
            assert!(matches!(err, ProtocolError::Decode { .. }), "{raw}");
        }
    }

    #[test]
    fn rejects_missing_type() {
        let err = decode(r#"{"data":"hi"}"#).expect_err("should fail");
        assert!(matches!(err, ProtocolError::Decode { .. }));
    }

    #[test]
    fn rejects_missing_data() {
        let err = decode(r#"{"type":"update"}"#).expect_err("should fail");
        assert!(matches!(err, ProtocolError::Decode { .. }));

        let err = decode(r#"{"type":"log","data":null}"#).expect_err("should fail");
        assert!(matches!(err, ProtocolError::Decode { .. }));
    }

    #[test]
    fn rejects_wrongly_shaped_data() {
        let err = decode(r#"{"type":"update","data":["hi"]}"#).expect_err("should fail");
        assert!(matches!(err, ProtocolError::Decode { .. }));

        let err = decode(r#"{"type":"log","data":["$ ls", 3]}"#).expect_err("should fail");
        assert!(matches!(err, ProtocolError::Decode { .. }));
    }

    #[test]
    fn reports_unknown_type_with_raw_payload() {
        let raw = r#"{"type":"progress","data":0.5}"#;
        let err = decode(raw).expect_err("should fail");
        assert_eq!(
            err,
            ProtocolError::UnknownMessageType {
                kind: "progress".to_string(),
                raw: raw.to_string(),
            }
        );
        assert_eq!(err.to_string(), "unknown message type `progress`");
    }

    #[test]
    fn encodes_in_wire_shape() {
        let snapshot = InboundMessage::Snapshot(vec!["$ ls".to_string()]);
        assert_eq!(
            snapshot.encode().expect("encode"),
            r#"{"type":"log","data":["$ ls"]}"#
        );

        let delta = InboundMessage::Delta("hi".to_string());
        let encoded = delta.encode().expect("encode");
        assert_eq!(encoded, r#"{"type":"update","data":"hi"}"#);
        assert_eq!(decode(&encoded).expect("decode"), delta);
    }

    #[test]
    fn command_marker_requires_dollar_and_space() {
        assert!(is_command_marker("$ ffmpeg -i in.mkv out.mkv"));
        assert!(!is_command_marker("$HOME is set"));
        assert!(!is_command_marker(" $ indented"));
        assert!(!is_command_marker("DONE"));
    }
}
