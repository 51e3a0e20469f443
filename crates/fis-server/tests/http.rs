//! End-to-end tests: the real router on an ephemeral listener, a mockito
//! upstream, and a tempdir public tree.

use fis_server::config::Settings;
use fis_server::routes::build_router;
use fis_server::state::AppState;
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

struct TestServer {
    addr: SocketAddr,
    store_path: PathBuf,
    _public: tempfile::TempDir,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

async fn spawn_server(upstream_url: &str) -> TestServer {
    let public = tempfile::tempdir().expect("failed to create temp dir");
    std::fs::create_dir_all(public.path().join("json/v1")).expect("failed to create json dir");
    std::fs::write(
        public.path().join("json/v1/overview.json"),
        json!({"profiles": ["generated"]}).to_string(),
    )
    .expect("failed to write overview.json");

    let store_path = public.path().join("branches.json");
    std::fs::write(
        &store_path,
        json!({
            "branches": ["24.10", "23.05"],
            "versions": {"24.10": ["24.10.0"], "23.05": ["23.05.5", "23.05.0"]},
        })
        .to_string(),
    )
    .expect("failed to write store");

    let settings = Settings {
        listen: "127.0.0.1:0".parse().unwrap(),
        upstream_url: upstream_url.to_string(),
        public_path: public.path().to_path_buf(),
        store_path: store_path.clone(),
        cache_ttl: Duration::from_secs(600),
        fetch_timeout: Duration::from_secs(5),
    };
    let state = AppState::new(settings).expect("failed to build state");
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("no local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server error");
    });

    TestServer {
        addr,
        store_path,
        _public: public,
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build client")
}

#[tokio::test]
async fn directory_view_is_the_sorted_store_content() {
    let upstream = mockito::Server::new_async().await;
    let server = spawn_server(&upstream.url()).await;

    let resp = client().get(server.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "23.05": {"versions": ["23.05.0", "23.05.5"]},
            "24.10": {"versions": ["24.10.0"]},
        })
    );
}

#[tokio::test]
async fn target_index_is_generated_once_and_then_cached() {
    let mut upstream = mockito::Server::new_async().await;
    let packages = upstream
        .mock("GET", "/releases/23.05.5/targets/x86/64/packages/Packages")
        .with_body("Package: a\nVersion: 1.0\nArchitecture: x86_64\n")
        .expect(1)
        .create_async()
        .await;
    let server = spawn_server(&upstream.url()).await;

    let url = server.url("/json/v1/releases/23.05.5/targets/x86/64/index.json");
    for _ in 0..2 {
        let resp = client().get(&url).send().await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(
            body,
            json!({"packages": {"a": "1.0"}, "architecture": "x86_64"})
        );
    }
    // The second response came out of the cache.
    packages.assert_async().await;
}

#[tokio::test]
async fn arch_index_merges_feeds_in_order() {
    let mut upstream = mockito::Server::new_async().await;
    let base = "/snapshots/packages/x86_64";
    let _feeds = upstream
        .mock("GET", &*format!("{base}/feeds.conf"))
        .with_body(
            "src/gz base https://example.org/base\nsrc/gz packages https://example.org/packages\nsrc/gz luci https://example.org/luci\n",
        )
        .create_async()
        .await;
    for (feed, version) in [("base", "1"), ("packages", "2"), ("luci", "3")] {
        let _m = upstream
            .mock("GET", &*format!("{base}/{feed}/Packages"))
            .with_body(format!("Package: foo\nVersion: {version}\n"))
            .create_async()
            .await;
    }
    let server = spawn_server(&upstream.url()).await;

    let resp = client()
        .get(server.url("/json/v1/snapshots/packages/x86_64-index.json"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"foo": "3"}));
}

#[tokio::test]
async fn pregenerated_documents_take_precedence() {
    let upstream = mockito::Server::new_async().await;
    let server = spawn_server(&upstream.url()).await;

    // A static file shadowing a path the dynamic handler would serve. No
    // upstream mock exists, so a dynamic attempt would fail loudly.
    std::fs::create_dir_all(
        server
            .store_path
            .parent()
            .unwrap()
            .join("json/v1/snapshots/targets/x86/64"),
    )
    .unwrap();
    std::fs::write(
        server
            .store_path
            .parent()
            .unwrap()
            .join("json/v1/snapshots/targets/x86/64/index.json"),
        json!({"pregenerated": true}).to_string(),
    )
    .unwrap();

    let resp = client()
        .get(server.url("/json/v1/snapshots/targets/x86/64/index.json"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"pregenerated": true}));

    // The seeded overview document is served the same way.
    let resp = client()
        .get(server.url("/json/v1/overview.json"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"profiles": ["generated"]}));
}

#[tokio::test]
async fn overview_redirects_permanently() {
    let upstream = mockito::Server::new_async().await;
    let server = spawn_server(&upstream.url()).await;

    let resp = client().get(server.url("/overview")).send().await.unwrap();
    assert_eq!(resp.status(), 301);
    assert_eq!(
        resp.headers()["location"].to_str().unwrap(),
        "/json/v1/overview.json"
    );
}

#[tokio::test]
async fn doubled_slashes_redirect_to_collapsed_path() {
    let upstream = mockito::Server::new_async().await;
    let server = spawn_server(&upstream.url()).await;

    let resp = client()
        .get(server.url("//json/v1//overview.json"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 301);
    assert_eq!(
        resp.headers()["location"].to_str().unwrap(),
        "/json/v1/overview.json"
    );
}

#[tokio::test]
async fn unknown_document_shape_is_404() {
    let upstream = mockito::Server::new_async().await;
    let server = spawn_server(&upstream.url()).await;

    let resp = client()
        .get(server.url("/json/v1/not-a-document.json"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn missing_target_is_404_and_upstream_failure_is_502() {
    let mut upstream = mockito::Server::new_async().await;
    let _missing = upstream
        .mock("GET", "/releases/23.05.5/targets/a/b/packages/Packages")
        .with_status(404)
        .create_async()
        .await;
    let _broken = upstream
        .mock("GET", "/releases/23.05.5/targets/c/d/packages/Packages")
        .with_status(500)
        .create_async()
        .await;
    let server = spawn_server(&upstream.url()).await;

    let resp = client()
        .get(server.url("/json/v1/releases/23.05.5/targets/a/b/index.json"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client()
        .get(server.url("/json/v1/releases/23.05.5/targets/c/d/index.json"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("upstream"));
}

#[tokio::test]
async fn unreachable_store_is_503() {
    let upstream = mockito::Server::new_async().await;
    let server = spawn_server(&upstream.url()).await;

    std::fs::remove_file(&server.store_path).unwrap();
    let resp = client().get(server.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), 503);
}
