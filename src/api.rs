use serde::{Deserialize, Serialize};

// ============================================================================
// Uniform API Envelope
// ============================================================================
//
// Every service wraps its responses in the same envelope, and the order
// workflow expects it back when calling the restaurant directory:
//
//   { "success": bool, "message": string, "statusCode": int, "data": T }
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub status_code: u16,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, status_code: u16, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            status_code,
            data: Some(data),
        }
    }

    /// A successful response that carries no payload.
    pub fn message_only(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            success: true,
            message: message.into(),
            status_code,
            data: None,
        }
    }

    pub fn error(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            success: false,
            message: message.into(),
            status_code,
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wire_format() {
        let response = ApiResponse::success("Order created successfully", 201, "abc");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["statusCode"], 201);
        assert_eq!(json["data"], "abc");
    }

    #[test]
    fn test_envelope_deserializes_without_data() {
        let json = r#"{"success":false,"message":"nope","statusCode":404}"#;
        let response: ApiResponse<String> = serde_json::from_str(json).unwrap();

        assert!(!response.success);
        assert!(response.data.is_none());
    }
}
