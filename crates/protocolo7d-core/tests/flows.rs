//! End-to-end flows of the application root against a mock backend.

use mockito::Matcher;
use protocolo7d_core::program::Action;
use protocolo7d_core::{
    ApiClient, FileStore, FlowError, KeyValueStore, MemoryStore, Program, Route, ToolAnswers,
    ValidationError,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn answers(pairs: &[(&str, &str)]) -> ToolAnswers {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn signed_in(server: &mockito::ServerGuard, email: &str) -> (Program<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();
    store.set("userEmail", email).unwrap();
    store.set("isOnboarded", "true").unwrap();
    let api = ApiClient::new(&server.url(), Duration::from_secs(10)).unwrap();
    let mut program = Program::new(store.clone(), api);
    assert_eq!(program.start(), Route::Dashboard);
    (program, store)
}

#[tokio::test]
async fn first_login_routes_to_onboarding() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/auth/login")
        .match_body(Matcher::Json(json!({"email": "test@x.com"})))
        .with_status(200)
        .with_body(r#"{"has_onboarding":false}"#)
        .create_async()
        .await;

    let store = MemoryStore::new();
    let api = ApiClient::new(&server.url(), Duration::from_secs(10)).unwrap();
    let mut program = Program::new(store.clone(), api);

    let route = program.login("  Test@X.com ").await.unwrap();

    assert_eq!(route, Route::Onboarding);
    assert_eq!(program.auth().email(), Some("test@x.com"));
    assert!(!program.auth().is_onboarded());
    assert_eq!(store.get("isOnboarded").unwrap().as_deref(), Some("false"));
    mock.assert_async().await;
}

#[tokio::test]
async fn onboarding_then_restart_lands_on_dashboard() {
    let mut server = mockito::Server::new_async().await;
    let _login = server
        .mock("POST", "/api/auth/login")
        .with_status(200)
        .with_body(r#"{"success":true,"is_new":true}"#)
        .create_async()
        .await;
    let onboarding = server
        .mock("POST", "/api/auth/onboarding")
        .match_body(Matcher::Json(json!({"email": "a@b.com", "vicio_alvo": "redes sociais"})))
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let api = ApiClient::new(&server.url(), Duration::from_secs(10)).unwrap();

    let mut program = Program::new(FileStore::new(&path), api.clone());
    assert_eq!(program.start(), Route::Login);
    assert_eq!(program.login("a@b.com").await.unwrap(), Route::Onboarding);
    program.complete_onboarding("  redes sociais ").await.unwrap();
    assert_eq!(program.route(), Route::Dashboard);
    onboarding.assert_async().await;

    let mut relaunched = Program::new(FileStore::new(&path), api);
    assert_eq!(relaunched.start(), Route::Dashboard);
    assert_eq!(relaunched.auth().email(), Some("a@b.com"));
}

#[tokio::test]
async fn corrupt_session_file_still_allows_login_and_logout() {
    let mut server = mockito::Server::new_async().await;
    let _login = server
        .mock("POST", "/api/auth/login")
        .with_status(200)
        .with_body(r#"{"has_onboarding":true}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, r#"{"userEmail": 42}"#).unwrap();
    let api = ApiClient::new(&server.url(), Duration::from_secs(10)).unwrap();

    let mut program = Program::new(FileStore::new(&path), api.clone());
    assert_eq!(program.start(), Route::Login);
    assert_eq!(program.login("a@b.com").await.unwrap(), Route::Dashboard);

    let mut relaunched = Program::new(FileStore::new(&path), api.clone());
    assert_eq!(relaunched.start(), Route::Dashboard);

    std::fs::write(&path, r#"{"userEmail": "a@b"#).unwrap();
    relaunched.logout().unwrap();
    assert_eq!(relaunched.route(), Route::Login);

    let mut after_logout = Program::new(FileStore::new(&path), api);
    assert_eq!(after_logout.start(), Route::Login);
}

#[tokio::test]
async fn failed_login_keeps_user_signed_out() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/auth/login")
        .with_status(500)
        .with_body(r#"{"detail":"boom"}"#)
        .create_async()
        .await;

    let store = MemoryStore::new();
    let api = ApiClient::new(&server.url(), Duration::from_secs(10)).unwrap();
    let mut program = Program::new(store.clone(), api);

    let err = program.login("a@b.com").await.unwrap_err();
    assert!(matches!(err, FlowError::Network { action: Action::Login, .. }));
    assert_eq!(err.user_message().title, "Erro de Conexão");
    assert_eq!(program.route(), Route::Login);
    assert_eq!(store.get("userEmail").unwrap(), None);
}

#[tokio::test]
async fn step_one_saves_then_completes_and_records_badge() {
    let mut server = mockito::Server::new_async().await;
    let calls: Arc<Mutex<Vec<&'static str>>> = Arc::default();

    let log = Arc::clone(&calls);
    let save = server
        .mock("POST", "/api/progress/save-tool-data")
        .match_body(Matcher::Json(json!({
            "email": "a@b.com",
            "dia": 1,
            "data": {"momento": "20h", "emocao": "tédio", "ambiente": "quarto"}
        })))
        .with_status(200)
        .with_body_from_request(move |_| {
            log.lock().unwrap().push("save");
            br#"{"success":true}"#.to_vec()
        })
        .create_async()
        .await;

    let log = Arc::clone(&calls);
    let complete = server
        .mock("POST", "/api/progress/complete-day")
        .match_body(Matcher::Json(json!({"email": "a@b.com", "dia": 1, "pontos": 100})))
        .with_status(200)
        .with_body_from_request(move |_| {
            log.lock().unwrap().push("complete");
            br#"{"success":true,"pontos_ganhos":100,"novas_medalhas":["primeira_vitoria"],"already_completed":false}"#.to_vec()
        })
        .create_async()
        .await;

    let (mut program, _store) = signed_in(&server, "a@b.com");
    let done = program
        .complete_step(1, answers(&[("momento", "20h"), ("emocao", "tédio"), ("ambiente", "quarto")]))
        .await
        .unwrap();

    assert_eq!(*calls.lock().unwrap(), vec!["save", "complete"]);
    save.assert_async().await;
    complete.assert_async().await;

    assert_eq!(done.new_badges, vec!["primeira_vitoria".to_string()]);
    assert_eq!(done.points, 100);
    assert!(!done.shows_paywall);

    let snapshot = program.progress().snapshot();
    assert!(snapshot.completed_steps.contains(&1));
    assert_eq!(snapshot.current_step, 2);
    assert!(snapshot.badges.contains("primeira_vitoria"));
    // points are only refreshed from the next server read
    assert_eq!(snapshot.total_points, 0);
}

#[tokio::test]
async fn step_two_with_blank_field_makes_no_request() {
    let mut server = mockito::Server::new_async().await;
    let save = server
        .mock("POST", "/api/progress/save-tool-data")
        .expect(0)
        .create_async()
        .await;
    let complete = server
        .mock("POST", "/api/progress/complete-day")
        .expect(0)
        .create_async()
        .await;

    let (mut program, _store) = signed_in(&server, "a@b.com");
    let err = program
        .complete_step(
            2,
            answers(&[("situacao", "Instagram"), ("acao_alternativa", ""), ("tempo_resistencia", "30 min")]),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FlowError::Validation(ValidationError::MissingAnswers { step: 2, .. })
    ));
    assert!(!program.progress().is_step_complete(2));
    save.assert_async().await;
    complete.assert_async().await;
}

#[tokio::test]
async fn failed_completion_leaves_progress_untouched() {
    let mut server = mockito::Server::new_async().await;
    let save = server
        .mock("POST", "/api/progress/save-tool-data")
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;
    let _complete = server
        .mock("POST", "/api/progress/complete-day")
        .with_status(500)
        .with_body(r#"{"detail":"db down"}"#)
        .create_async()
        .await;

    let (mut program, _store) = signed_in(&server, "a@b.com");
    let before = program.progress().snapshot().clone();
    let err = program
        .complete_step(
            3,
            answers(&[
                ("comportamento_antigo", "Instagram"),
                ("novo_comportamento", "Ler"),
                ("recompensa", "Série"),
            ]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::Network { action: Action::CompleteStep, .. }));
    assert_eq!(program.progress().snapshot(), &before);
    save.assert_async().await;
}

#[tokio::test]
async fn step_three_completion_leads_to_paywall() {
    let mut server = mockito::Server::new_async().await;
    let _save = server
        .mock("POST", "/api/progress/save-tool-data")
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;
    let _complete = server
        .mock("POST", "/api/progress/complete-day")
        .with_status(200)
        .with_body(r#"{"novas_medalhas":["guerreiro_3_dias"]}"#)
        .create_async()
        .await;

    let (mut program, _store) = signed_in(&server, "a@b.com");
    let done = program
        .complete_step(
            3,
            answers(&[
                ("comportamento_antigo", "Instagram"),
                ("novo_comportamento", "Ler"),
                ("recompensa", "Série"),
            ]),
        )
        .await
        .unwrap();

    assert!(done.shows_paywall);
    assert_eq!(program.progress().snapshot().current_step, 4);
}

#[tokio::test]
async fn dashboard_replaces_cached_progress() {
    let mut server = mockito::Server::new_async().await;
    let _user = server
        .mock("GET", Matcher::Regex(r"^/api/user/".into()))
        .with_status(200)
        .with_body(r#"{"email":"a@b.com","vicio_alvo":"jogos"}"#)
        .create_async()
        .await;
    let _progress = server
        .mock("GET", Matcher::Regex(r"^/api/progress/".into()))
        .with_status(200)
        .with_body(
            r#"{"dia_atual":3,"dias_completados":[1,2],"pontos_totais":250,
                "tempo_limpo_inicio":"2024-03-01T10:00:00","medalhas":["primeira_vitoria"],
                "tool_data":{"dia_1":{"momento":"20h"}}}"#,
        )
        .create_async()
        .await;

    let (mut program, _store) = signed_in(&server, "a@b.com");
    let dashboard = program.load_dashboard().await.unwrap();

    assert_eq!(dashboard.profile.target_behavior.as_deref(), Some("jogos"));
    assert_eq!(dashboard.progress.total_points, 250);
    assert!(dashboard.clean_time.is_some());
    let completed: Vec<u32> = dashboard
        .steps
        .iter()
        .filter(|s| s.completed)
        .map(|s| s.index)
        .collect();
    assert_eq!(completed, vec![1, 2]);
    assert_eq!(dashboard.steps.iter().filter(|s| s.locked).count(), 4);
    assert_eq!(program.progress().answers_for(1).unwrap()["momento"], "20h");
}

#[tokio::test]
async fn open_step_prefills_saved_answers() {
    let mut server = mockito::Server::new_async().await;
    let _progress = server
        .mock("GET", Matcher::Regex(r"^/api/progress/".into()))
        .with_status(200)
        .with_body(r#"{"dias_completados":[2],"tool_data":{"dia_2":{"situacao":"Instagram"}}}"#)
        .create_async()
        .await;

    let (mut program, _store) = signed_in(&server, "a@b.com");
    let view = program.open_step(2).await.unwrap();

    assert!(view.completed);
    assert_eq!(view.definition.index, 2);
    assert_eq!(view.answers["situacao"], "Instagram");
}

#[tokio::test]
async fn dashboard_without_session_is_rejected() {
    let server = mockito::Server::new_async().await;
    let api = ApiClient::new(&server.url(), Duration::from_secs(10)).unwrap();
    let mut program = Program::new(MemoryStore::new(), api);

    let err = program.load_dashboard().await.unwrap_err();
    assert!(matches!(err, FlowError::NotSignedIn));
}
