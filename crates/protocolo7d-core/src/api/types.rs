//! Request and response bodies of the backend.
//!
//! Field names follow the backend's Portuguese JSON; Rust names are renamed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::progress::ToolAnswers;

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct OnboardingRequest<'a> {
    pub email: &'a str,
    pub vicio_alvo: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompleteDayRequest<'a> {
    pub email: &'a str,
    pub dia: u32,
    pub pontos: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct SaveToolDataRequest<'a> {
    pub email: &'a str,
    pub dia: u32,
    pub data: &'a ToolAnswers,
}

/// Answer to a login. Brand-new accounts come back without
/// `has_onboarding`, which then reads as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub has_onboarding: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteStepResponse {
    #[serde(rename = "novas_medalhas", default)]
    pub newly_earned_badges: Vec<String>,
    #[serde(rename = "pontos_ganhos", default)]
    pub points_awarded: Option<u32>,
    /// The backend had this step already; nothing was awarded.
    #[serde(default)]
    pub already_completed: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Account record. Fields the client does not know are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub email: String,
    /// The habit the user set out to break.
    #[serde(rename = "vicio_alvo", default)]
    pub target_behavior: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_active: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_user_login_has_no_onboarding() {
        let resp: LoginResponse = serde_json::from_value(json!({
            "success": true,
            "message": "Novo usuário criado",
            "email": "a@b.com",
            "is_new": true
        }))
        .unwrap();
        assert!(!resp.has_onboarding);
        assert!(resp.is_new);
    }

    #[test]
    fn complete_step_defaults_to_no_badges() {
        let resp: CompleteStepResponse = serde_json::from_value(json!({
            "success": true,
            "message": "Dia já estava completo",
            "already_completed": true
        }))
        .unwrap();
        assert!(resp.newly_earned_badges.is_empty());
        assert!(resp.already_completed);
        assert_eq!(resp.points_awarded, None);
    }

    #[test]
    fn profile_keeps_unknown_fields() {
        let profile: UserProfile = serde_json::from_value(json!({
            "_id": "abc",
            "email": "a@b.com",
            "vicio_alvo": "redes sociais",
            "created_at": "2024-03-01T10:00:00"
        }))
        .unwrap();
        assert_eq!(profile.target_behavior.as_deref(), Some("redes sociais"));
        assert_eq!(profile.extra["_id"], "abc");
        assert_eq!(profile.last_active, None);
    }

    #[test]
    fn requests_use_backend_field_names() {
        let answers = ToolAnswers::from([("momento".to_string(), "20h".to_string())]);
        let body = serde_json::to_value(SaveToolDataRequest {
            email: "a@b.com",
            dia: 1,
            data: &answers,
        })
        .unwrap();
        assert_eq!(body, json!({"email": "a@b.com", "dia": 1, "data": {"momento": "20h"}}));

        let body = serde_json::to_value(CompleteDayRequest {
            email: "a@b.com",
            dia: 2,
            pontos: 150,
        })
        .unwrap();
        assert_eq!(body, json!({"email": "a@b.com", "dia": 2, "pontos": 150}));
    }
}
