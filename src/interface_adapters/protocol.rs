use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::{GeneratedRecommendations, Recommendation};
use crate::domain::errors::ApiError;
use crate::domain::ports::ApiResponse;
use crate::domain::session::{Role, Session};

// Error body returned by the backend alongside non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// Pull `data` out of the `{ data: ... }` envelope.
pub fn decode_data<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    let data = match body {
        Value::Object(mut map) => map.remove("data"),
        _ => None,
    };
    match data {
        None | Some(Value::Null) => Err(ApiError::EmptyResponse),
        Some(data) => serde_json::from_value(data).map_err(|err| ApiError::Decode(err.to_string())),
    }
}

// Non-success responses become upstream errors carrying the body's code.
pub fn into_result(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.is_success() {
        return Ok(response);
    }
    let error = serde_json::from_value::<ErrorBody>(response.body).unwrap_or_default();
    Err(ApiError::Upstream {
        status: response.status,
        code: error.code,
        message: error.message,
    })
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest<'a> {
    pub id_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub display_name: &'a str,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cafe_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<&'a str>,
}

// Payload inside the envelope of a successful login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Session,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    // Rotated refresh token, when the backend issues one.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest<'a> {
    pub purpose: &'a str,
    pub material_type: &'a str,
}

// Every field may be absent, and each recommendation is decoded on its own
// so one broken entry does not discard the rest of the reply.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub recommendation: Option<Value>,
    #[serde(default)]
    pub alternatives: Vec<Value>,
}

impl GenerateResponse {
    pub fn into_recommendations(self) -> GeneratedRecommendations {
        GeneratedRecommendations {
            primary: self.recommendation.and_then(decode_recommendation),
            alternates: self
                .alternatives
                .into_iter()
                .filter_map(decode_recommendation)
                .collect(),
        }
    }
}

fn decode_recommendation(value: Value) -> Option<Recommendation> {
    match serde_json::from_value(value) {
        Ok(recommendation) => Some(recommendation),
        Err(err) => {
            tracing::warn!(error = %err, "skipping unreadable recommendation");
            None
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupStatusRequest {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPickupRequest<'a> {
    pub cafe_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<&'a str>,
    pub scheduled_at: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroundsRequest<'a> {
    pub amount_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bean_origin: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_from: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CafeRequest<'a> {
    pub name: &'a str,
    pub address: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeanRequest<'a> {
    pub name: &'a str,
    pub origin: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roast_level: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_data_is_an_empty_response() {
        let result = decode_data::<Vec<String>>(json!({ "message": "ok" }));
        assert_eq!(result, Err(ApiError::EmptyResponse));

        let result = decode_data::<Vec<String>>(json!({ "data": null }));
        assert_eq!(result, Err(ApiError::EmptyResponse));
    }

    #[test]
    fn broken_alternate_does_not_discard_the_primary() {
        let reply: GenerateResponse = decode_data(json!({ "data": {
            "recommendation": { "id": "r1", "title": "커피 방향제" },
            "alternatives": [
                { "title": "no id here" },
                { "id": "r3", "title": 7 },
                { "id": "r4", "title": "커피 향초" }
            ]
        } }))
        .expect("reply");

        let generated = reply.into_recommendations();

        assert_eq!(generated.primary.map(|r| r.id), Some("r1".to_string()));
        let titles: Vec<_> = generated.alternates.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["no id here", "커피 향초"]);
    }

    #[test]
    fn mistyped_data_is_a_decode_error() {
        let result = decode_data::<Vec<String>>(json!({ "data": 12 }));
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn error_response_keeps_code_and_message() {
        let result = into_result(ApiResponse {
            status: 401,
            body: json!({ "code": "TOKEN_EXPIRED", "message": "jwt expired" }),
        });

        let err = result.expect_err("401 should be an error");
        assert!(err.is_token_expired());
        assert_eq!(err.to_string(), "upstream error 401 (TOKEN_EXPIRED): jwt expired");
    }

    #[test]
    fn error_response_with_non_json_body_still_maps_status() {
        let result = into_result(ApiResponse {
            status: 502,
            body: Value::String("Bad Gateway".into()),
        });

        assert_eq!(
            result,
            Err(ApiError::Upstream {
                status: 502,
                code: None,
                message: None
            })
        );
    }
}
