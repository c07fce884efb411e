//! Integration tests for the WebDriver client against a `wiremock` stand-in
//! for chromedriver.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricewatch_scraper::{
    BrowserLauncher, BrowserSession, ElementHandle, ScraperError, WebDriverLauncher,
};

const SESSION: &str = "/session/abc123";
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

fn reply(value: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "value": value }))
}

async fn server_with_session() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .and(body_partial_json(json!({
            "capabilities": { "alwaysMatch": { "browserName": "chrome" } }
        })))
        .respond_with(reply(json!({ "sessionId": "abc123", "capabilities": {} })))
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn launcher(server: &MockServer) -> WebDriverLauncher {
    WebDriverLauncher::new(&server.uri(), "pricewatch-test/0.1", 5).expect("launcher")
}

#[tokio::test]
async fn session_lifecycle_round_trips_commands() {
    let server = server_with_session().await;
    Mock::given(method("POST"))
        .and(path(format!("{SESSION}/url")))
        .and(body_partial_json(json!({ "url": "https://www.mytek.tn/claviers.html" })))
        .respond_with(reply(json!(null)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{SESSION}/source")))
        .respond_with(reply(json!("<html><body>rendered</body></html>")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{SESSION}/url")))
        .respond_with(reply(json!("https://www.mytek.tn/claviers.html?p=2")))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(SESSION))
        .respond_with(reply(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    let session = launcher(&server).launch().await.expect("session");
    session
        .navigate("https://www.mytek.tn/claviers.html")
        .await
        .expect("navigate");
    let html = session.rendered_html().await.expect("source");
    assert!(html.contains("rendered"));
    assert_eq!(
        session.current_url().await.expect("url"),
        "https://www.mytek.tn/claviers.html?p=2"
    );
    session.quit().await.expect("quit");
}

#[tokio::test]
async fn find_scroll_and_click_use_element_references() {
    let server = server_with_session().await;
    Mock::given(method("POST"))
        .and(path(format!("{SESSION}/elements")))
        .and(body_partial_json(json!({ "using": "css selector", "value": "a.action.next" })))
        .respond_with(reply(json!([{ ELEMENT_KEY: "el-1" }, { ELEMENT_KEY: "el-2" }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{SESSION}/execute/sync")))
        .and(body_partial_json(json!({ "args": [{ ELEMENT_KEY: "el-1" }] })))
        .respond_with(reply(json!(null)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{SESSION}/element/el-1/click")))
        .respond_with(reply(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    let session = launcher(&server).launch().await.expect("session");
    let elements = session.find_elements("a.action.next").await.expect("find");
    assert_eq!(
        elements,
        vec![ElementHandle::new("el-1"), ElementHandle::new("el-2")]
    );
    session.scroll_to(&elements[0]).await.expect("scroll");
    session.click(&elements[0]).await.expect("click");
}

#[tokio::test]
async fn command_error_is_reported_with_webdriver_message() {
    let server = server_with_session().await;
    Mock::given(method("POST"))
        .and(path(format!("{SESSION}/element/stale/click")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "value": {
                "error": "stale element reference",
                "message": "element is not attached to the page document"
            }
        })))
        .mount(&server)
        .await;

    let session = launcher(&server).launch().await.expect("session");
    let err = session
        .click(&ElementHandle::new("stale"))
        .await
        .expect_err("click should fail");
    match err {
        ScraperError::WebDriver { command, reason } => {
            assert_eq!(command, "element click");
            assert!(reason.contains("stale element reference"), "reason: {reason}");
        }
        other => panic!("expected WebDriver error, got {other:?}"),
    }
}

#[tokio::test]
async fn launch_fails_when_driver_refuses_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "value": { "error": "session not created", "message": "Chrome failed to start" }
        })))
        .mount(&server)
        .await;

    let result = launcher(&server).launch().await;
    let err = result.expect_err("launch should fail");
    assert!(err.is_fetch_failure());
    assert!(err.to_string().contains("session not created"), "{err}");
}
