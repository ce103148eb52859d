//! JSON body format of `POST /playwithutf`.
//!
//! Wire notes for clients:
//! - Encode `output` is a JSON array of byte values (`[72, 105]`), not a
//!   base64 string.
//! - Failure bodies omit `data` entirely. They carry `error`, plus
//!   `error_kind` when the codec rejected the input.

use serde::{Deserialize, Serialize};

use crate::codec::Codec;
use crate::service::{self, Operation, Output, ServiceError};

use super::http::{Response, StatusCode};

/// `{"operation": "encode", "input": "Hello"}`
///
/// `operation` is kept as a string so an unknown value gets its own error
/// message instead of a generic JSON one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RequestBody {
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseBody {
    pub success: bool,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseData {
    pub operation: Operation,
    pub input: String,
    pub output: Output,
}

impl ResponseBody {
    pub fn ok(data: ResponseData) -> Self {
        Self {
            success: true,
            code: StatusCode::OK.as_u16(),
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: status.as_u16(),
            data: None,
            error: Some(message.into()),
            error_kind: None,
        }
    }

    fn status(&self) -> StatusCode {
        StatusCode(self.code)
    }

    pub fn into_response(self) -> Response {
        Response::json(self.status(), &self)
    }
}

/// Handle one request body. Every failure is a 400 with a JSON error body.
pub fn play(codec: &Codec, body: &[u8]) -> ResponseBody {
    let request: RequestBody = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => return ResponseBody::failure(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let result = request
        .operation
        .parse::<Operation>()
        .and_then(|op| service::run(op, &request.input, codec).map(|out| (op, out)));

    match result {
        Ok((operation, output)) => ResponseBody::ok(ResponseData {
            operation,
            input: request.input,
            output,
        }),
        Err(e) => {
            tracing::debug!(operation = %request.operation, error = %e, "request rejected");
            service_failure(&e)
        }
    }
}

fn service_failure(e: &ServiceError) -> ResponseBody {
    let mut body = ResponseBody::failure(StatusCode::BAD_REQUEST, e.to_string());
    body.error_kind = e.codec_kind();
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn play_json(body: serde_json::Value) -> serde_json::Value {
        let resp = play(&Codec::default(), body.to_string().as_bytes());
        serde_json::to_value(resp).unwrap()
    }

    #[test]
    fn test_encode() {
        let v = play_json(json!({"operation": "encode", "input": "Hé"}));
        assert_eq!(
            v,
            json!({
                "success": true,
                "code": 200,
                "data": {"operation": "encode", "input": "Hé", "output": [72, 195, 169]}
            })
        );
    }

    #[test]
    fn test_decode() {
        let v = play_json(json!({"operation": "decode", "input": "E2,82,AC"}));
        assert_eq!(v["data"]["output"], "€");
        assert_eq!(v["data"]["operation"], "decode");
    }

    #[test]
    fn test_invalid_operation() {
        let v = play_json(json!({"operation": "rot13", "input": "x"}));
        assert_eq!(
            v,
            json!({
                "success": false,
                "code": 400,
                "error": "Invalid operation. Use 'encode' or 'decode'."
            })
        );
    }

    #[test]
    fn test_decode_error_kind() {
        let v = play_json(json!({"operation": "decode", "input": "C2,41"}));
        assert_eq!(v["success"], false);
        assert_eq!(v["error_kind"], "invalid_continuation_byte");
        assert!(v["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid UTF-8 sequence at position 0"));
    }

    #[test]
    fn test_malformed_json() {
        let resp = play(&Codec::default(), b"{not json");
        assert!(!resp.success);
        assert_eq!(resp.code, 400);
        assert!(resp.error.is_some());
        assert!(resp.data.is_none());
    }

    #[test]
    fn test_failure_has_no_data_key() {
        let v = play_json(json!({"operation": "decode", "input": "zz"}));
        let obj = v.as_object().unwrap();
        assert!(!obj.contains_key("data"));
        assert!(!obj.contains_key("error_kind"));
        assert_eq!(obj["error"], "invalid hexadecimal value: zz");

        let v = play_json(json!({"operation": "encode", "input": "é"}));
        assert!(v["data"]["output"].is_array());
    }
}
