use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Shape of the success envelope around a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Envelope {
    /// `{"success": true, "data": payload}`
    Data,
    /// `{"success": true, "<key>": payload}`
    Keyed(&'static str),
    /// `{"success": true, ...payload fields}`
    Flat,
}

/// Wrapper for API responses that adds the success envelope.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
    envelope: Envelope,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with the payload under `data`
    pub fn success(data: T) -> Self {
        Self { data, status_code: StatusCode::OK, envelope: Envelope::Data }
    }

    /// 200 with the payload under a named key, e.g. `{"success": true, "goal": {...}}`
    pub fn keyed(key: &'static str, data: T) -> Self {
        Self { data, status_code: StatusCode::OK, envelope: Envelope::Keyed(key) }
    }

    /// 200 with the payload's own fields merged into the envelope
    pub fn flat(data: T) -> Self {
        Self { data, status_code: StatusCode::OK, envelope: Envelope::Flat }
    }

    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn created(self) -> Self {
        self.with_status(StatusCode::CREATED)
    }
}

impl ApiResponse<Value> {
    /// `{"success": true, "message": ...}`
    pub fn message(message: &str) -> Self {
        Self::flat(json!({ "message": message }))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize response data"
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = Map::new();
        envelope.insert("success".into(), Value::Bool(true));
        match (self.envelope, data_value) {
            (Envelope::Flat, Value::Object(fields)) => envelope.extend(fields),
            (Envelope::Keyed(key), value) => {
                envelope.insert(key.into(), value);
            }
            (_, value) => {
                envelope.insert("data".into(), value);
            }
        }

        (self.status_code, Json(Value::Object(envelope))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
