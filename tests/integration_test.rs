// Integration tests for ad-dashboard

use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use ad_dashboard::api::model::{UserAction, UserUpdate};
use ad_dashboard::api::{DirectoryApi, HttpApi};
use ad_dashboard::app::panel::LoadState;
use ad_dashboard::app::worker::execute;
use ad_dashboard::app::{AppState, Effect, FetchTarget, ModalState};
use ad_dashboard::error::ApiError;
use axum::extract::{Json, Path};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Router;
use serde_json::{Value, json};

fn temp_path(tag: &str) -> String {
    let mut path = std::env::temp_dir();
    let nonce = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    path.push(format!("ad_dashboard_{tag}_{}_{}.conf", std::process::id(), nonce));
    path.to_string_lossy().to_string()
}

// 1) Config files: write then read back
#[test]
fn theme_and_keymap_files_roundtrip() {
    use ad_dashboard::app::Theme;
    use ad_dashboard::app::keymap::{KeyAction, Keymap};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    let theme_path = temp_path("theme");
    let t = Theme::mocha();
    t.write_file(&theme_path).expect("write theme");
    let t2 = Theme::from_file(&theme_path).expect("read theme");
    assert_eq!(format!("{:?}", t.error), format!("{:?}", t2.error));
    assert_eq!(format!("{:?}", t.active), format!("{:?}", t2.active));

    let keys_path = temp_path("keys");
    Keymap::default().write_file(&keys_path).expect("write keymap");
    let km = Keymap::from_file(&keys_path).expect("read keymap");
    let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
    assert_eq!(km.resolve(&q), Some(KeyAction::Quit));
    assert_eq!(km.all_bindings().len(), Keymap::default().all_bindings().len());

    let _ = std::fs::remove_file(&theme_path);
    let _ = std::fs::remove_file(&keys_path);
}

#[test]
fn settings_file_never_stores_password() {
    use ad_dashboard::config::Settings;

    let path = temp_path("settings");
    let s = Settings {
        email: Some("admin@corp.local".into()),
        password: Some("hunter2".into()),
        close_delay_ms: 750,
        ..Default::default()
    };
    s.write_file(&path).expect("write settings");
    let contents = std::fs::read_to_string(&path).expect("read settings");
    assert!(!contents.contains("hunter2"));
    let back = Settings::from_file(&path).expect("parse settings");
    assert_eq!(back.close_delay_ms, 750);
    assert_eq!(back.email.as_deref(), Some("admin@corp.local"));
    assert_eq!(back.password, None);

    let fresh = temp_path("settings_init");
    let _ = Settings::load_or_init(&fresh);
    assert!(
        PathBuf::from(&fresh).exists() || ad_dashboard::config::config_file_read_path("dashboard.conf").is_some()
    );
    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_file(&fresh);
}

// 2) HTTP client against an in-process mock backend

async fn users(headers: HeaderMap) -> impl IntoResponse {
    let has_session = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|c| c.contains("session=abc"));
    if !has_session {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Login required" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "users": [
                { "sAMAccountName": "jdoe", "cn": "John Doe", "mail": "jdoe@corp.local", "enabled": true },
                { "sAMAccountName": "asmith", "givenName": "Ann", "sn": "Smith", "mail": null, "enabled": false }
            ]
        })),
    )
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["password"] == "right" {
        (
            StatusCode::OK,
            [(header::SET_COOKIE, "session=abc; Path=/")],
            Json(json!({ "success": true, "message": "Login successful" })),
        )
            .into_response()
    } else {
        Json(json!({ "success": false, "message": "Invalid email or password" })).into_response()
    }
}

async fn update_user(Path(name): Path<String>, Json(body): Json<Value>) -> impl IntoResponse {
    match body["action"].as_str() {
        Some("reset_password") if name == "locked user" => {
            Json(json!({ "success": false, "message": "Password does not meet complexity requirements" }))
        }
        Some("reset_password") | Some("enable") | Some("disable") => Json(json!({ "success": true })),
        _ => Json(json!({ "success": false })),
    }
}

async fn members(Path(name): Path<String>) -> impl IntoResponse {
    if name == "Broken" {
        return (StatusCode::BAD_GATEWAY, "upstream down").into_response();
    }
    Json(json!({ "success": true, "members": ["CN=John Doe,OU=Users,DC=corp,DC=local"] })).into_response()
}

async fn remove_member(Json(body): Json<Value>) -> impl IntoResponse {
    Json(json!({ "success": body["dn"].is_string(), "message": "Member removed from group" }))
}

async fn dashboard() -> impl IntoResponse {
    Json(json!({
        "success": false,
        "error": "Cannot contact domain controller",
        "users": 0, "groups": 0, "computers": 0, "domainControllers": 0
    }))
}

async fn groups() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>")
}

async fn spawn_backend() -> String {
    let router = Router::new()
        .route("/login", post(login))
        .route("/api/ad/users", get(users))
        .route("/api/ad/groups", get(groups))
        .route("/api/ad/user/:name", put(update_user))
        .route("/api/ad/group/:name/members", get(members).delete(remove_member))
        .route("/api/dashboard-data", get(dashboard));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn session_cookie_from_login_is_reused() {
    let api = HttpApi::new(&spawn_backend().await, None).unwrap();

    let err = api.list_users().await.unwrap_err();
    assert_eq!(err, ApiError::Server { status: 401, message: "Login required".into() });

    let denied = api.login("admin@corp.local", "wrong").await.unwrap();
    assert!(!denied.success);
    let reply = api.login("admin@corp.local", "right").await.unwrap();
    assert!(reply.success);

    let users = api.list_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].display_name(), "Ann Smith");
    assert_eq!(users[1].mail, None);
}

#[tokio::test]
async fn non_json_error_bodies_fall_back_to_status_text() {
    let api = HttpApi::new(&spawn_backend().await, None).unwrap();
    let err = api.list_groups().await.unwrap_err();
    assert_eq!(err.to_string(), "Server returned 500 Internal Server Error");
    let err = api.group_members("Broken").await.unwrap_err();
    assert_eq!(err.to_string(), "Server returned 502 Bad Gateway");
}

#[tokio::test]
async fn dashboard_success_false_is_a_failure() {
    let api = HttpApi::new(&spawn_backend().await, None).unwrap();
    let err = api.dashboard().await.unwrap_err();
    assert_eq!(err, ApiError::Domain("Cannot contact domain controller".into()));
}

#[tokio::test]
async fn writes_encode_paths_and_bodies() {
    let api = HttpApi::new(&spawn_backend().await, None).unwrap();
    let ok = api.update_user("jdoe", &UserUpdate::from(UserAction::Disable)).await.unwrap();
    assert!(ok.success);
    let refused = api
        .update_user("locked user", &UserUpdate::ResetPassword { password: "x".into() })
        .await
        .unwrap();
    assert_eq!(refused.message_or("Failed to reset password"), "Password does not meet complexity requirements");
    let members = api.group_members("Domain Admins").await.unwrap();
    assert_eq!(members.len(), 1);
    let removed = api.remove_group_member("Domain Admins", &members[0]).await.unwrap();
    assert!(removed.success);
}

// 3) State machine driven through the real client

#[tokio::test]
async fn reset_password_domain_failure_keeps_dialog_open() {
    let api = HttpApi::new(&spawn_backend().await, None).unwrap();
    let mut app = AppState::default();
    app.open_reset_password("locked user");
    if let Some(ModalState::ResetPassword(form)) = &mut app.modal {
        for c in "Secr3t!".chars() {
            form.password.push(c);
            form.confirm.push(c);
        }
    }
    app.submit_reset_password();
    let now = Instant::now();
    for effect in app.take_effects() {
        let outcome = execute(&api, effect).await;
        app.apply_outcome(outcome, now);
    }
    app.tick(now + std::time::Duration::from_secs(5));
    match &app.modal {
        Some(ModalState::ResetPassword(form)) => assert_eq!(
            form.result.as_ref().map(|r| r.text.as_str()),
            Some("Password does not meet complexity requirements")
        ),
        other => panic!("dialog should stay open, got {other:?}"),
    }
}

#[tokio::test]
async fn startup_without_session_shows_errors_per_panel() {
    let api = HttpApi::new(&spawn_backend().await, None).unwrap();
    let mut app = AppState::default();
    app.start(None);
    let now = Instant::now();
    let effects = app.take_effects();
    assert!(effects.iter().all(|e| matches!(e, Effect::Fetch { .. })));
    for effect in effects {
        let outcome = execute(&api, effect).await;
        app.apply_outcome(outcome, now);
    }
    assert_eq!(app.users.state(), &LoadState::Failed("Login required".into()));
    assert!(matches!(app.dashboard.state(), LoadState::Failed(_)));

    app.request(FetchTarget::Groups);
    for effect in app.take_effects() {
        let outcome = execute(&api, effect).await;
        app.apply_outcome(outcome, now);
    }
    assert_eq!(app.groups.state(), &LoadState::Failed("Server returned 500 Internal Server Error".into()));
}
