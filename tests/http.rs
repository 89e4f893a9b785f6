use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct RecordResponse {
    name: String,
    date: String,
    took_break: bool,
    diet_penalty: i64,
    score: i64,
}

#[derive(Debug, Deserialize)]
struct StandingResponse {
    name: String,
    score: i64,
}

#[derive(Debug, Deserialize)]
struct LeaderboardResponse {
    standings: Vec<StandingResponse>,
    winner: Option<StandingResponse>,
}

#[derive(Debug, Deserialize)]
struct DashboardResponse {
    today: String,
    entries: Vec<RecordResponse>,
    daily: LeaderboardResponse,
    weekly: LeaderboardResponse,
}

#[derive(Debug, Deserialize)]
struct ResetResponse {
    state: String,
    cleared: bool,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("habit_board_http_{}_{}", std::process::id(), nanos));
    path.push("scores.csv");
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/roster")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_habit_board"))
        .env("PORT", port.to_string())
        .env("APP_STORE", "local")
        .env("APP_DATA_PATH", data_path)
        .env("APP_TIMEZONE", "Asia/Colombo")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn dashboard(client: &Client, base_url: &str) -> DashboardResponse {
    client
        .get(format!("{base_url}/api/dashboard"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn records(client: &Client, base_url: &str) -> Vec<RecordResponse> {
    client
        .get(format!("{base_url}/api/records"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn reset(client: &Client, base_url: &str, action: &str) -> ResetResponse {
    let response = client
        .post(format!("{base_url}/api/reset"))
        .json(&json!({ "action": action }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

async fn clear_all(client: &Client, base_url: &str) {
    reset(client, base_url, "request").await;
    reset(client, base_url, "confirm").await;
}

#[tokio::test]
async fn http_resubmission_keeps_latest_entry() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    clear_all(&client, &server.base_url).await;

    let first: RecordResponse = client
        .post(format!("{}/api/submit", server.base_url))
        .json(&json!({
            "name": "Teju",
            "took_break": false,
            "diet_ok": true,
            "workout_ok": true,
            "social_ok": true
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first.score, 3);
    assert_eq!(first.diet_penalty, 1);

    let second: RecordResponse = client
        .post(format!("{}/api/submit", server.base_url))
        .json(&json!({
            "name": "Teju",
            "took_break": false,
            "diet_ok": false,
            "workout_ok": true,
            "social_ok": false,
            "diet_mistakes": 2
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second.score, -1);
    assert_eq!(second.date, first.date);

    let stored: Vec<_> = records(&client, &server.base_url)
        .await
        .into_iter()
        .filter(|record| record.name == "Teju" && record.date == first.date)
        .collect();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].score, -1);

    let board = dashboard(&client, &server.base_url).await;
    assert_eq!(board.today, first.date);
    assert_eq!(board.entries.len(), 1);
    let weekly_teju = board
        .weekly
        .standings
        .iter()
        .find(|standing| standing.name == "Teju")
        .expect("Teju missing from weekly standings");
    assert_eq!(weekly_teju.score, -1);
}

#[tokio::test]
async fn http_reset_needs_confirmation() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    clear_all(&client, &server.base_url).await;

    let response = client
        .post(format!("{}/api/submit", server.base_url))
        .json(&json!({
            "name": "Udaya",
            "took_break": false,
            "diet_ok": false,
            "workout_ok": false,
            "social_ok": false,
            "diet_mistakes": 4
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let premature = reset(&client, &server.base_url, "confirm").await;
    assert_eq!(premature.state, "idle");
    assert!(!premature.cleared);
    assert_eq!(records(&client, &server.base_url).await.len(), 1);

    let pending = reset(&client, &server.base_url, "request").await;
    assert_eq!(pending.state, "pending_confirm");
    let cancelled = reset(&client, &server.base_url, "cancel").await;
    assert_eq!(cancelled.state, "idle");
    assert!(!cancelled.cleared);
    assert_eq!(records(&client, &server.base_url).await.len(), 1);

    reset(&client, &server.base_url, "request").await;
    let confirmed = reset(&client, &server.base_url, "confirm").await;
    assert!(confirmed.cleared);
    assert!(records(&client, &server.base_url).await.is_empty());

    let board = dashboard(&client, &server.base_url).await;
    assert!(board.daily.winner.is_none());
    assert!(board.weekly.standings.is_empty());
}

#[tokio::test]
async fn http_rejects_invalid_submissions() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let unknown = client
        .post(format!("{}/api/submit", server.base_url))
        .json(&json!({
            "name": "Stranger",
            "took_break": false,
            "diet_ok": true,
            "workout_ok": true,
            "social_ok": true
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

    let too_many = client
        .post(format!("{}/api/submit", server.base_url))
        .json(&json!({
            "name": "Kavya",
            "took_break": false,
            "diet_ok": false,
            "workout_ok": true,
            "social_ok": true,
            "diet_mistakes": 11
        }))
        .send()
        .await
        .unwrap();
    assert!(too_many.status().is_client_error());

    let bad_flag = client
        .post(format!("{}/submit", server.base_url))
        .form(&[
            ("name", "Kavya"),
            ("diet", "maybe"),
            ("workout", "Yes"),
            ("social", "Yes"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(bad_flag.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_form_submission_shows_on_dashboard() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    clear_all(&client, &server.base_url).await;

    let response = client
        .post(format!("{}/submit", server.base_url))
        .form(&[
            ("name", "Kavya"),
            ("diet", "Yes"),
            ("workout", "No"),
            ("social", "Yes"),
            ("took_break", "Yes"),
            ("diet_mistakes", "1"),
        ])
        .send()
        .await
        .unwrap();
    // redirect followed back to the dashboard page
    assert!(response.status().is_success());
    let html = response.text().await.unwrap();
    assert!(html.contains("Weekly Winner: Kavya (0 points)"));

    let stored = records(&client, &server.base_url).await;
    assert_eq!(stored.len(), 1);
    assert!(stored[0].took_break);
    assert_eq!(stored[0].score, 0);
    assert_eq!(stored[0].diet_penalty, 0);
}

#[tokio::test]
async fn http_score_preview_ignores_break_on_workout_day() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let preview: serde_json::Value = client
        .post(format!("{}/api/score", server.base_url))
        .json(&json!({
            "took_break": true,
            "diet_ok": true,
            "workout_ok": true,
            "social_ok": false
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(preview["score"], 2);
    assert_eq!(preview["diet_penalty"], 1);
}
