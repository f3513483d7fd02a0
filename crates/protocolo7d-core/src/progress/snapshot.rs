//! Progress as reported by the backend.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Free-form answers for one step, keyed by tool field.
pub type ToolAnswers = BTreeMap<String, String>;

/// Key under which a step's answers live in `tool_data`.
pub fn tool_answers_key(step: u32) -> String {
    format!("dia_{step}")
}

/// Full cached progress of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(rename = "dia_atual", default = "first_step")]
    pub current_step: u32,
    #[serde(rename = "dias_completados", default)]
    pub completed_steps: BTreeSet<u32>,
    #[serde(rename = "pontos_totais", default)]
    pub total_points: u32,
    /// Start of the clean streak, as the backend formatted it.
    #[serde(rename = "tempo_limpo_inicio", default)]
    pub clean_streak_start: Option<String>,
    #[serde(rename = "medalhas", default)]
    pub badges: BTreeSet<String>,
    #[serde(
        rename = "tool_data",
        default,
        deserialize_with = "deserialize_tool_data"
    )]
    pub tool_answers: BTreeMap<String, ToolAnswers>,
}

fn first_step() -> u32 {
    1
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            current_step: first_step(),
            completed_steps: BTreeSet::new(),
            total_points: 0,
            clean_streak_start: None,
            badges: BTreeSet::new(),
            tool_answers: BTreeMap::new(),
        }
    }
}

/// A subset of snapshot fields to lay over the cached state.
///
/// `None` means "leave that field as it is", not "clear it".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressPatch {
    pub current_step: Option<u32>,
    pub completed_steps: Option<BTreeSet<u32>>,
    pub total_points: Option<u32>,
    pub clean_streak_start: Option<Option<String>>,
    pub badges: Option<BTreeSet<String>>,
    pub tool_answers: Option<BTreeMap<String, ToolAnswers>>,
}

impl From<ProgressSnapshot> for ProgressPatch {
    fn from(snapshot: ProgressSnapshot) -> Self {
        Self {
            current_step: Some(snapshot.current_step),
            completed_steps: Some(snapshot.completed_steps),
            total_points: Some(snapshot.total_points),
            clean_streak_start: Some(snapshot.clean_streak_start),
            badges: Some(snapshot.badges),
            tool_answers: Some(snapshot.tool_answers),
        }
    }
}

// The backend stores tool data as arbitrary JSON; answers are shown as text
// so scalars are stringified and anything that is not an object is dropped.
fn deserialize_tool_data<'de, D>(deserializer: D) -> Result<BTreeMap<String, ToolAnswers>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    let mut out = BTreeMap::new();
    for (step_key, value) in raw.unwrap_or_default() {
        let serde_json::Value::Object(fields) = value else {
            continue;
        };
        let answers = fields
            .into_iter()
            .map(|(k, v)| {
                let text = match v {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                (k, text)
            })
            .collect();
        out.insert(step_key, answers);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_document() {
        let body = json!({
            "_id": "65f0c0ffee",
            "user_email": "a@b.com",
            "dia_atual": 2,
            "dias_completados": [1],
            "pontos_totais": 100,
            "tempo_limpo_inicio": "2024-03-01T10:00:00.123000",
            "medalhas": ["primeira_vitoria"],
            "tool_data": {
                "dia_1": {"momento": "20h", "emocao": "tédio", "ambiente": "quarto"},
                "dia_9": "garbage",
                "dia_2": {"tempo_resistencia": 30, "situacao": null}
            },
            "updated_at": "2024-03-02T10:00:00"
        });

        let snapshot: ProgressSnapshot = serde_json::from_value(body).unwrap();
        assert_eq!(snapshot.current_step, 2);
        assert!(snapshot.completed_steps.contains(&1));
        assert_eq!(snapshot.total_points, 100);
        assert!(snapshot.badges.contains("primeira_vitoria"));
        assert_eq!(snapshot.tool_answers["dia_1"]["emocao"], "tédio");
        assert_eq!(snapshot.tool_answers["dia_2"]["tempo_resistencia"], "30");
        assert_eq!(snapshot.tool_answers["dia_2"]["situacao"], "");
        assert!(!snapshot.tool_answers.contains_key("dia_9"));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let snapshot: ProgressSnapshot = serde_json::from_value(json!({})).unwrap();
        assert_eq!(snapshot, ProgressSnapshot::default());
        assert_eq!(snapshot.current_step, 1);
    }

    #[test]
    fn duplicate_completed_steps_collapse() {
        let snapshot: ProgressSnapshot =
            serde_json::from_value(json!({"dias_completados": [1, 1, 2]})).unwrap();
        assert_eq!(snapshot.completed_steps.len(), 2);
    }

    #[test]
    fn encodes_with_wire_names() {
        let value = serde_json::to_value(ProgressSnapshot::default()).unwrap();
        assert_eq!(value["dia_atual"], 1);
        assert!(value["dias_completados"].as_array().unwrap().is_empty());
        assert!(value["tempo_limpo_inicio"].is_null());
    }

    #[test]
    fn answers_key_format() {
        assert_eq!(tool_answers_key(3), "dia_3");
    }
}
