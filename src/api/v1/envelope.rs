use crate::application_port::ApiError;
use crate::domain_model::HttpResponse;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// JSON body shape shared by every backend endpoint. The backend reports
/// success either as `success: bool` or as `status: "success" | "error"`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: Option<bool>,
    pub status: Option<String>,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        let status_ok = !matches!(self.status.as_deref(), Some("error" | "fail" | "failed"));
        self.success.unwrap_or(true) && status_ok
    }

    fn rejection(&self) -> ApiError {
        ApiError::Rejected {
            message: self
                .message
                .clone()
                .unwrap_or_else(|| "request was not successful".to_string()),
        }
    }
}

pub fn decode_data<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    let envelope: Envelope<T> = response.json()?;
    if !envelope.is_success() {
        return Err(envelope.rejection());
    }
    envelope
        .data
        .ok_or_else(|| ApiError::Decode("response envelope has no data".to_string()))
}

/// Success check for mutations. Bodies that are empty or not JSON count as
/// success; only an explicit failure indicator is an error.
pub fn ensure_success(response: &HttpResponse) -> Result<(), ApiError> {
    if response.body.is_empty() {
        return Ok(());
    }
    match response.json::<Envelope<serde_json::Value>>() {
        Ok(envelope) if !envelope.is_success() => Err(envelope.rejection()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_data_reads_payload() {
        let response = HttpResponse::json_body(
            200,
            &json!({ "success": true, "message": "ok", "data": { "n": 3 } }),
        );
        let value: serde_json::Value = decode_data(&response).unwrap();
        assert_eq!(value, json!({ "n": 3 }));
    }

    #[test]
    fn explicit_failure_is_rejected() {
        let response =
            HttpResponse::json_body(200, &json!({ "status": "error", "message": "already liked" }));
        let err = ensure_success(&response).unwrap_err();
        assert_eq!(
            err,
            ApiError::Rejected {
                message: "already liked".to_string()
            }
        );
    }

    #[test]
    fn empty_or_plain_bodies_succeed() {
        assert!(ensure_success(&HttpResponse::new(204, Vec::new())).is_ok());
        assert!(ensure_success(&HttpResponse::new(200, "OK")).is_ok());
    }

    #[test]
    fn missing_data_is_a_decode_error() {
        let response = HttpResponse::json_body(200, &json!({ "success": true }));
        let err = decode_data::<serde_json::Value>(&response).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
