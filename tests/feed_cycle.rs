//! Integration tests for the dashboard's fetch cycle: session gating,
//! filtering, translation fallback, stale results and logout.
//!
//! Each test runs against its own mock aggregator and its own credential
//! file under the system temp directory.

use newsfeed::app::{App, AppEvent, Trigger, View};
use newsfeed::config::Config;
use newsfeed::cycle::FeedCycle;
use newsfeed::feed::Category;
use newsfeed::menu::MenuState;
use newsfeed::session::{CredentialStore, StoredCredential};
use newsfeed::theme::ThemeVariant;
use newsfeed::translate::Language;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("newsfeed_it_{}", name));
    std::fs::remove_dir_all(&dir).ok();
    dir
}

fn config_for(server: &MockServer) -> Config {
    Config {
        headlines_base_url: server.uri(),
        translate_base_url: format!("{}/translate", server.uri()),
        translate_api_key: Some("test-key".to_string()),
        ..Config::default()
    }
}

fn signed_in_store(name: &str) -> CredentialStore {
    let store = CredentialStore::new(temp_dir(name).join("session.toml"));
    store
        .save(&StoredCredential {
            username: "ada".to_string(),
            token: SecretString::from("tok-123".to_string()),
        })
        .unwrap();
    store
}

fn headline(title: &str, image: Option<&str>) -> Value {
    json!({
        "title": title,
        "description": format!("About {}", title),
        "content": null,
        "publishedAt": "2024-03-10T09:00:00Z",
        "url": format!("https://news.example.com/{}", title.len()),
        "urlToImage": image,
    })
}

fn headlines(articles: Vec<Value>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": { "status": "ok", "totalResults": articles.len(), "articles": articles }
    }))
}

fn translated(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": { "translations": [{ "translatedText": text }] }
    }))
}

async fn next_event(rx: &mut mpsc::Receiver<AppEvent>) -> AppEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for cycle")
        .expect("event channel closed")
}

// ============================================================================
// Cycle pipeline
// ============================================================================

#[tokio::test]
async fn test_cycle_filters_removed_and_imageless_articles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("category", "Technology"))
        .respond_with(headlines(vec![
            headline("A", Some("a.jpg")),
            headline("[Removed]", Some("r.jpg")),
            headline("B", None),
        ]))
        .expect(1)
        .mount(&server)
        .await;

    let cycle = FeedCycle::from_config(&config_for(&server), reqwest::Client::new());
    let articles = cycle.run(Category::Technology, Language::En).await.unwrap();

    let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["A"]);
}

#[tokio::test]
async fn test_cycle_keeps_original_text_when_translation_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(headlines(vec![headline("Hello", Some("h.jpg"))]))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(body_partial_json(json!({ "q": "Hello", "target": "fr" })))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(body_partial_json(json!({ "q": "About Hello" })))
        .respond_with(translated("A propos de Hello"))
        .mount(&server)
        .await;

    let cycle = FeedCycle::from_config(&config_for(&server), reqwest::Client::new());
    let articles = cycle.run(Category::General, Language::Fr).await.unwrap();

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "Hello");
    assert_eq!(articles[0].description.as_deref(), Some("A propos de Hello"));
}

#[tokio::test]
async fn test_translation_never_resurrects_removed_articles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(headlines(vec![headline("[Removed]", Some("r.jpg"))]))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(translated("[Supprimé]"))
        .expect(0)
        .mount(&server)
        .await;

    let cycle = FeedCycle::from_config(&config_for(&server), reqwest::Client::new());
    let articles = cycle.run(Category::General, Language::Fr).await.unwrap();
    assert!(articles.is_empty());
}

// ============================================================================
// Dashboard orchestration
// ============================================================================

#[tokio::test]
async fn test_signed_out_mount_redirects_without_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(headlines(vec![]))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let store = CredentialStore::new(temp_dir("signed_out").join("session.toml"));
    let cycle = FeedCycle::from_config(&config, reqwest::Client::new());
    let mut app = App::new(&config, cycle, store);

    let (tx, _rx) = mpsc::channel(8);
    assert!(!app.trigger_cycle(Trigger::Mount, &tx));
    assert_eq!(app.view, View::SignedOut);
    assert!(!app.feed.loading);
}

#[tokio::test]
async fn test_mount_loads_headlines_for_signed_in_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("category", "General"))
        .respond_with(headlines(vec![headline("Top story", Some("t.jpg"))]))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let cycle = FeedCycle::from_config(&config, reqwest::Client::new());
    let mut app = App::new(&config, cycle, signed_in_store("mount"));
    assert_eq!(app.view, View::Dashboard);

    let (tx, mut rx) = mpsc::channel(8);
    assert!(app.trigger_cycle(Trigger::Mount, &tx));
    assert!(app.feed.loading);

    app.handle_event(next_event(&mut rx).await);
    assert!(!app.feed.loading);
    assert_eq!(app.feed.articles.len(), 1);
    assert_eq!(app.feed.articles[0].title, "Top story");
    assert!(!app.unsaved.is_dirty());
}

#[tokio::test]
async fn test_slow_stale_cycle_does_not_overwrite_newer_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("category", "Business"))
        .respond_with(
            headlines(vec![headline("Old", Some("o.jpg"))]).set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("category", "Entertainment"))
        .respond_with(headlines(vec![headline("New", Some("n.jpg"))]))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let cycle = FeedCycle::from_config(&config, reqwest::Client::new());
    let mut app = App::new(&config, cycle, signed_in_store("stale"));

    let (tx, mut rx) = mpsc::channel(8);
    app.select_category(Category::Business, &tx);
    app.select_category(Category::Entertainment, &tx);
    assert_eq!(app.generation, 2);

    // Both cycles complete; only the newest may publish
    app.handle_event(next_event(&mut rx).await);
    app.handle_event(next_event(&mut rx).await);

    assert_eq!(app.feed.articles.len(), 1);
    assert_eq!(app.feed.articles[0].title, "New");
    assert!(!app.feed.loading);
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_headlines() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(headlines(vec![headline("Kept", Some("k.jpg"))]))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let cycle = FeedCycle::from_config(&config, reqwest::Client::new());
    let mut app = App::new(&config, cycle, signed_in_store("refresh_fail"));

    let (tx, mut rx) = mpsc::channel(8);
    app.trigger_cycle(Trigger::Mount, &tx);
    app.handle_event(next_event(&mut rx).await);
    assert_eq!(app.feed.articles[0].title, "Kept");

    app.refresh(&tx);
    app.handle_event(next_event(&mut rx).await);

    assert!(!app.feed.loading);
    assert_eq!(app.feed.articles.len(), 1);
    assert_eq!(app.feed.articles[0].title, "Kept");
    assert!(app.feed.last_error.as_deref().unwrap().contains("503"));
}

#[tokio::test]
async fn test_language_change_translates_headlines() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("language", "en"))
        .respond_with(headlines(vec![headline("Hello", Some("h.jpg"))]))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({ "target": "es" })))
        .respond_with(translated("Hola"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let cycle = FeedCycle::from_config(&config, reqwest::Client::new());
    let mut app = App::new(&config, cycle, signed_in_store("language"));

    let (tx, mut rx) = mpsc::channel(8);
    app.select_language(Language::Es, &tx);
    assert!(app.unsaved.is_dirty());

    app.handle_event(next_event(&mut rx).await);
    assert_eq!(app.feed.articles[0].title, "Hola");
    assert_eq!(app.feed.articles[0].description.as_deref(), Some("Hola"));
    assert!(!app.unsaved.is_dirty());
}

#[tokio::test]
async fn test_logout_discards_in_flight_cycle_and_clears_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            headlines(vec![headline("Late", Some("l.jpg"))]).set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let config = config_for(&server);
    let cycle = FeedCycle::from_config(&config, reqwest::Client::new());
    let store = signed_in_store("logout");
    let session_path = store.path().to_path_buf();
    let mut app = App::new(&config, cycle, store);

    let (tx, mut rx) = mpsc::channel(8);
    app.trigger_cycle(Trigger::Mount, &tx);
    app.toggle_theme();
    app.menu.open();

    app.logout().unwrap();
    assert!(!session_path.exists());
    assert_eq!(app.view, View::SignedOut);
    assert_eq!(app.theme.variant(), ThemeVariant::Light);
    assert_eq!(app.menu.state(), MenuState::Closed);
    assert!(!app.unsaved.is_dirty());

    // The cycle started before logout still finishes but is ignored
    app.handle_event(next_event(&mut rx).await);
    assert!(app.feed.articles.is_empty());
    assert!(!app.feed.loading);

    // Signed out: further cycles are refused
    assert!(!app.trigger_cycle(Trigger::Refresh, &tx));
}

#[tokio::test]
async fn test_repeated_menu_open_registers_one_listener() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let cycle = FeedCycle::from_config(&config, reqwest::Client::new());
    let mut app = App::new(&config, cycle, signed_in_store("menu"));

    app.menu.open();
    app.menu.open();
    app.menu.open();
    assert_eq!(app.menu.listener_count(), 1);

    // Outside click before the menu was ever drawn still closes it
    assert!(app.menu.pointer_down(0, 0));
    assert_eq!(app.menu.listener_count(), 0);
}
