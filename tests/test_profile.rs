use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use teacher_profile::teacher::error::FetchError;
use teacher_profile::teacher::mock_data::{mock_teacher_data, MockProvider};
use teacher_profile::teacher::models::teacher_model::{
    TeacherDetails, TeacherDetailsPatch, TeacherSnapshot,
};
use teacher_profile::teacher::models::{Args, Config};
use teacher_profile::teacher::run_tool::run;
use teacher_profile::teacher::store::TeacherStore;
use teacher_profile::teacher::teacher_fetcher::{ProfileFetcher, RemoteFetcher, TeacherFetcher};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Serves whatever lies in a JSON file, the way a real API would.
pub struct TestFetcher {
    pub snapshot_path: String,
}

impl TestFetcher {
    fn read(&self) -> TeacherSnapshot {
        let file = BufReader::new(File::open(&self.snapshot_path).unwrap());
        serde_json::from_reader(file).unwrap()
    }
}

impl TeacherFetcher for TestFetcher {
    async fn fetch_all(&self, _teacher_id: &str) -> Result<TeacherSnapshot, FetchError> {
        Ok(self.read())
    }

    async fn fetch_details(&self, _teacher_id: &str) -> Result<TeacherDetails, FetchError> {
        Ok(self.read().details)
    }

    async fn update_details(
        &self,
        patch: TeacherDetailsPatch,
    ) -> Result<TeacherDetailsPatch, FetchError> {
        Ok(patch)
    }
}

fn args() -> Args {
    Args {
        config_json_path: PathBuf::from("_"),
        teacher_id: "42".to_owned(),
        from: None,
        to: None,
        week: None,
    }
}

fn offline_config() -> Config {
    Config {
        api_base_url: None,
        ..Config::default()
    }
}

fn remote_fetcher(base_url: &str, timeout: Duration, fallback: MockProvider) -> RemoteFetcher {
    // Keep proxies configured in the environment away from the local listener.
    let client = Client::builder().no_proxy().build().unwrap();
    RemoteFetcher::with_client(client, base_url, timeout, fallback)
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Answers one request with `status` and `body`; the handle yields the raw request.
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/teachers", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = stream.shutdown().await;
        request
    });
    (base_url, handle)
}

/// Accepts a connection and never answers.
async fn serve_silence() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/teachers", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
    });
    base_url
}

/// A base URL nothing listens on.
async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/teachers", addr)
}

#[tokio::test]
async fn run_prints_sorted_profile() {
    let fetcher = TestFetcher {
        snapshot_path: "tests/test.teacher.json".to_owned(),
    };
    let out = run(fetcher, &args()).await.unwrap();

    assert!(out.starts_with("Kazimir Malevich (42)\n    Role: Head of Fine Arts\n"));
    assert!(out.contains("    Home phone: -\n"));
    assert!(out.contains("Private qualifications:\n    Suprematist Composition - £45.00\n"));
    assert!(out.contains("Group qualifications:\n    Studio Workshop - £20.00\n"));
    assert!(out.contains("    Work: Dvortsovaya Square 6/8, Saint Petersburg, Leningrad Oblast, Russia\n"));

    // June before July, and 9am before 10am.
    let colour = out.find("Colour Theory").unwrap();
    let cubism = out.find("From Cubism to Suprematism").unwrap();
    let square = out.find("Black Square Critique").unwrap();
    assert!(colour < cubism && cubism < square);
    assert!(out.contains("    09-07-2025 10am-11am [Class] Black Square Critique\n"));
}

#[tokio::test]
async fn run_filters_schedule_and_draws_week() {
    let fetcher = TestFetcher {
        snapshot_path: "tests/test.teacher.json".to_owned(),
    };
    let args = Args {
        from: Some("01-07-2025".to_owned()),
        to: Some("31-07-2025".to_owned()),
        week: Some("09-07-2025".to_owned()),
        ..args()
    };
    let out = run(fetcher, &args).await.unwrap();
    let (profile, week) = out.split_once("\n\n        ").unwrap();
    assert!(!profile.contains("Colour Theory"));
    assert!(profile.contains("From Cubism to Suprematism"));
    assert!(week.contains("Wed 09"));
    assert!(week.ends_with("Week of 06-07-2025: 2 classes, 0 meetings, 0 breaks\n"));
}

#[tokio::test]
async fn run_rejects_bad_filter_dates() {
    let fetcher = TestFetcher {
        snapshot_path: "tests/test.teacher.json".to_owned(),
    };
    let args = Args {
        from: Some("July".to_owned()),
        to: Some("31-07-2025".to_owned()),
        ..args()
    };
    let err = run(fetcher, &args).await.unwrap_err();
    assert!(err.to_string().contains("`July` is not a DD-MM-YYYY date"));
}

#[tokio::test]
async fn run_fails_when_fallback_is_broken() {
    let config = Config {
        fixture_path: Some(PathBuf::from("tests/test.malformed.json")),
        simulate_latency: false,
        ..offline_config()
    };
    let err = run(ProfileFetcher::from_config(&config), &args())
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Failed to fetch teacher data: Fallback data unavailable"));
}

#[tokio::test(start_paused = true)]
async fn offline_load_all_serves_mock_data_after_delay() {
    let mut store = TeacherStore::new(ProfileFetcher::from_config(&offline_config()));
    let started = Instant::now();
    store.load_all("1").await;
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(1000));
    assert!(elapsed < Duration::from_millis(1100));

    let state = store.state();
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(state.details.name, "Alynia Allan");
    assert_eq!(state.qualifications.len(), 7);
    assert_eq!(state.addresses.len(), 2);
    assert_eq!(state.schedule.len(), 15);
}

#[tokio::test(start_paused = true)]
async fn offline_update_details_merges_after_delay() {
    let mut store = TeacherStore::new(ProfileFetcher::from_config(&offline_config()));
    store.load_all("1").await;
    store.set_editing(true);
    let before = store.state().details.clone();

    let started = Instant::now();
    store
        .update_details(TeacherDetailsPatch {
            id: Some("1".to_owned()),
            phone: Some("+1 555".to_owned()),
            ..TeacherDetailsPatch::default()
        })
        .await;
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(800));
    assert!(elapsed < Duration::from_millis(1000));

    let state = store.state();
    assert!(!state.is_editing);
    assert!(!state.details_loading);
    assert_eq!(
        state.details,
        TeacherDetails {
            phone: "+1 555".to_owned(),
            ..before
        }
    );
}

#[tokio::test]
async fn unreachable_api_falls_back_to_mock_data() {
    let base_url = unreachable_base_url().await;
    let fetcher = remote_fetcher(&base_url, Duration::from_secs(10), MockProvider::builtin());
    let mut store = TeacherStore::new(fetcher);
    store.load_all("1").await;

    let state = store.state();
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(state.details.name, "Alynia Allan");
    assert_eq!(state.qualifications.len(), 7);
    assert_eq!(state.schedule.len(), 15);
}

#[tokio::test]
async fn unreachable_api_with_broken_fixture_sets_error() {
    let base_url = unreachable_base_url().await;
    let fetcher = remote_fetcher(
        &base_url,
        Duration::from_secs(10),
        MockProvider::from_fixture(PathBuf::from("tests/test.malformed.json")),
    );
    let mut store = TeacherStore::new(fetcher);
    store.load_all("1").await;
    assert!(!store.state().loading);
    assert!(store.state().error.is_some());
    assert!(store.state().schedule.is_empty());
}

#[tokio::test]
async fn api_snapshot_is_loaded_and_sorted() {
    let body = std::fs::read_to_string("tests/test.teacher.json").unwrap();
    let (base_url, request) = serve_once("200 OK", body).await;
    let fetcher = remote_fetcher(&base_url, Duration::from_secs(10), MockProvider::builtin());
    let mut store = TeacherStore::new(fetcher);
    store.load_all("42").await;

    let request = request.await.unwrap();
    assert!(request.starts_with("GET /teachers/42 HTTP/1.1\r\n"));
    assert!(request.to_ascii_lowercase().contains("content-type: application/json"));

    let state = store.state();
    assert_eq!(state.details.name, "Kazimir Malevich");
    let ids = state
        .schedule
        .iter()
        .map(|slot| slot.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, ["s3", "s1", "s2"]);
}

#[tokio::test]
async fn api_http_error_falls_back() {
    let (base_url, _request) = serve_once("500 Internal Server Error", "{}".to_owned()).await;
    let fetcher = remote_fetcher(&base_url, Duration::from_secs(10), MockProvider::builtin());
    let snapshot = fetcher.fetch_all("1").await.unwrap();
    assert_eq!(snapshot, mock_teacher_data());
}

#[tokio::test]
async fn api_invalid_json_falls_back() {
    let (base_url, _request) = serve_once("200 OK", "<html>maintenance</html>".to_owned()).await;
    let fetcher = remote_fetcher(&base_url, Duration::from_secs(10), MockProvider::builtin());
    let snapshot = fetcher.fetch_all("1").await.unwrap();
    assert_eq!(snapshot, mock_teacher_data());
}

#[tokio::test]
async fn api_unknown_slot_kind_falls_back() {
    let body = std::fs::read_to_string("tests/test.teacher.json")
        .unwrap()
        .replace("\"type\": \"meeting\"", "\"type\": \"lunch\"");
    let (base_url, _request) = serve_once("200 OK", body).await;
    let fetcher = remote_fetcher(&base_url, Duration::from_secs(10), MockProvider::builtin());
    let snapshot = fetcher.fetch_all("1").await.unwrap();
    assert_eq!(snapshot.details.name, "Alynia Allan");
}

#[tokio::test]
async fn slow_api_times_out_into_fallback() {
    let base_url = serve_silence().await;
    let fetcher = remote_fetcher(&base_url, Duration::from_millis(200), MockProvider::builtin());
    let started = std::time::Instant::now();
    let snapshot = fetcher.fetch_all("1").await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(snapshot.details.name, "Alynia Allan");
}

#[tokio::test]
async fn api_details_are_loaded() {
    let body = serde_json::json!({
        "id": "42",
        "name": "Kazimir Malevich",
        "email": "k.malevich@unovis.org"
    })
    .to_string();
    let (base_url, request) = serve_once("200 OK", body).await;
    let fetcher = remote_fetcher(&base_url, Duration::from_secs(10), MockProvider::builtin());
    let mut store = TeacherStore::new(fetcher);
    store.load_details("42").await;

    assert!(request.await.unwrap().starts_with("GET /teachers/42/details HTTP/1.1\r\n"));
    let details = &store.state().details;
    assert_eq!(details.name, "Kazimir Malevich");
    assert_eq!(details.role, "");
    assert!(!store.state().details_loading);
}

#[tokio::test]
async fn api_details_failure_falls_back_to_mock_details() {
    let base_url = unreachable_base_url().await;
    let fetcher = remote_fetcher(&base_url, Duration::from_secs(10), MockProvider::builtin());
    let mut store = TeacherStore::new(fetcher);
    store.load_details("1").await;
    assert_eq!(store.state().details, mock_teacher_data().details);
    assert!(store.state().error.is_none());
}

#[tokio::test]
async fn api_update_merges_server_response() {
    let body = serde_json::json!({ "phone": "+1 999", "unknownField": true }).to_string();
    let (base_url, request) = serve_once("200 OK", body).await;
    let fetcher = remote_fetcher(&base_url, Duration::from_secs(10), MockProvider::builtin());
    let mut store = TeacherStore::new(fetcher);
    store.update_teacher_details(&mock_teacher_data().details.into());
    store.set_editing(true);

    store
        .update_details(TeacherDetailsPatch {
            phone: Some("+1 555".to_owned()),
            ..TeacherDetailsPatch::default()
        })
        .await;

    let request = request.await.unwrap();
    assert!(request.starts_with("PUT /teachers/1 HTTP/1.1\r\n"));
    let (_, sent) = request.split_once("\r\n\r\n").unwrap();
    let sent: serde_json::Value = serde_json::from_str(sent).unwrap();
    assert_eq!(sent, serde_json::json!({ "id": "1", "phone": "+1 555" }));

    let state = store.state();
    assert_eq!(state.details.phone, "+1 999");
    assert_eq!(state.details.name, "Alynia Allan");
    assert!(!state.is_editing);
}

#[tokio::test]
async fn api_update_failure_echoes_patch() {
    let (base_url, _request) = serve_once("503 Service Unavailable", "{}".to_owned()).await;
    let fetcher = remote_fetcher(&base_url, Duration::from_secs(10), MockProvider::builtin());
    let patch = TeacherDetailsPatch {
        id: Some("1".to_owned()),
        email: Some("new@schoolhill.edu".to_owned()),
        ..TeacherDetailsPatch::default()
    };
    assert_eq!(fetcher.update_details(patch.clone()).await.unwrap(), patch);
}

#[tokio::test]
async fn api_update_without_loaded_teacher_stays_local() {
    let body = serde_json::json!({ "phone": "+1 999" }).to_string();
    let (base_url, request) = serve_once("200 OK", body).await;
    let fetcher = remote_fetcher(&base_url, Duration::from_secs(10), MockProvider::builtin());
    let mut store = TeacherStore::new(fetcher);

    store
        .update_details(TeacherDetailsPatch {
            phone: Some("+1 555".to_owned()),
            ..TeacherDetailsPatch::default()
        })
        .await;

    assert!(!request.is_finished());
    request.abort();
    let state = store.state();
    assert_eq!(state.details.phone, "+1 555");
    assert_eq!(state.details.id, "");
    assert!(!state.details_loading);
}

#[tokio::test]
async fn overlapping_loads_keep_the_newest() {
    let body = std::fs::read_to_string("tests/test.teacher.json").unwrap();
    let (base_url, _request) = serve_once("200 OK", body).await;
    let fetcher = remote_fetcher(&base_url, Duration::from_secs(10), MockProvider::builtin());
    let mut store = TeacherStore::new(fetcher);

    let older = store.begin_load_all();
    let newer = store.begin_load_all();
    let newest = store.fetcher().fetch_all("42").await;
    assert!(store.finish_load_all(newer, newest));
    assert!(!store.finish_load_all(older, Ok(mock_teacher_data())));
    assert_eq!(store.state().details.name, "Kazimir Malevich");
}
