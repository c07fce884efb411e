//! Minimal W3C WebDriver client (chromedriver, geckodriver, Selenium Grid).
//!
//! Only the commands the listing walker needs are implemented. Every reply
//! is a JSON object with a `value` member; failed commands carry
//! `value.error` and `value.message`.

use std::time::Duration;

use pricewatch_core::AppConfig;
use reqwest::{Client, Method};
use serde_json::{json, Value};

use super::{BrowserLauncher, BrowserSession, ElementHandle};
use crate::error::ScraperError;

/// Key under which W3C element references are returned.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView({block: 'center'});";

/// Starts headless Chrome sessions through a WebDriver endpoint.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl WebDriverLauncher {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        user_agent: &str,
        command_timeout_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(command_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            user_agent: user_agent.to_owned(),
        })
    }

    /// Returns `None` when no WebDriver endpoint is configured.
    ///
    /// Commands get four times the plain request timeout; a page load in a
    /// real browser is slower than a single GET.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, ScraperError> {
        config
            .webdriver_url
            .as_deref()
            .map(|url| {
                Self::new(
                    url,
                    &config.scraper_user_agent,
                    config.scraper_request_timeout_secs.saturating_mul(4),
                )
            })
            .transpose()
    }

    fn capabilities(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": [
                            "--headless=new",
                            "--no-sandbox",
                            "--disable-dev-shm-usage",
                            "--disable-blink-features=AutomationControlled",
                            format!("user-agent={}", self.user_agent),
                        ],
                        "excludeSwitches": ["enable-automation"],
                        "useAutomationExtension": false,
                    }
                }
            }
        })
    }
}

impl BrowserLauncher for WebDriverLauncher {
    type Session = WebDriverSession;

    async fn launch(&self) -> Result<WebDriverSession, ScraperError> {
        let url = format!("{}/session", self.base_url);
        let value = send_command(
            &self.client,
            Method::POST,
            &url,
            Some(self.capabilities()),
            "new session",
        )
        .await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| ScraperError::WebDriver {
                command: "new session".to_owned(),
                reason: "reply has no sessionId".to_owned(),
            })?
            .to_owned();

        tracing::info!(session_id = %session_id, "browser session started");
        Ok(WebDriverSession {
            client: self.client.clone(),
            session_url: format!("{}/session/{session_id}", self.base_url),
        })
    }
}

/// A live WebDriver session. Must be ended with [`BrowserSession::quit`].
#[derive(Debug)]
pub struct WebDriverSession {
    client: Client,
    /// `{base}/session/{id}`
    session_url: String,
}

impl WebDriverSession {
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        command: &str,
    ) -> Result<Value, ScraperError> {
        let url = format!("{}{path}", self.session_url);
        send_command(&self.client, method, &url, body, command).await
    }
}

impl BrowserSession for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })), "navigate")
            .await
            .map(drop)
    }

    async fn rendered_html(&self) -> Result<String, ScraperError> {
        let value = self
            .command(Method::GET, "/source", None, "page source")
            .await?;
        expect_string(value, "page source")
    }

    async fn find_elements(&self, css_selector: &str) -> Result<Vec<ElementHandle>, ScraperError> {
        let value = self
            .command(
                Method::POST,
                "/elements",
                Some(json!({ "using": "css selector", "value": css_selector })),
                "find elements",
            )
            .await?;

        let Value::Array(entries) = value else {
            return Err(ScraperError::WebDriver {
                command: "find elements".to_owned(),
                reason: "reply value is not an array".to_owned(),
            });
        };
        Ok(entries
            .iter()
            .filter_map(|entry| entry.get(ELEMENT_KEY).and_then(Value::as_str))
            .map(ElementHandle::new)
            .collect())
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), ScraperError> {
        let path = format!("/element/{}/click", element.id());
        self.command(Method::POST, &path, Some(json!({})), "element click")
            .await
            .map(drop)
    }

    async fn scroll_to(&self, element: &ElementHandle) -> Result<(), ScraperError> {
        let body = json!({
            "script": SCROLL_INTO_VIEW,
            "args": [{ ELEMENT_KEY: element.id() }],
        });
        self.command(Method::POST, "/execute/sync", Some(body), "scroll into view")
            .await
            .map(drop)
    }

    async fn current_url(&self) -> Result<String, ScraperError> {
        let value = self
            .command(Method::GET, "/url", None, "current url")
            .await?;
        expect_string(value, "current url")
    }

    async fn quit(self) -> Result<(), ScraperError> {
        self.command(Method::DELETE, "", None, "delete session")
            .await
            .map(drop)?;
        tracing::info!(session = %self.session_url, "browser session closed");
        Ok(())
    }
}

/// Sends one WebDriver command and returns the reply's `value` member.
async fn send_command(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<Value>,
    command: &str,
) -> Result<Value, ScraperError> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            ScraperError::Timeout {
                url: url.to_owned(),
            }
        } else {
            ScraperError::Http(e)
        }
    })?;
    let status = response.status();
    let text = response.text().await?;

    let mut reply: Value =
        serde_json::from_str(&text).map_err(|source| ScraperError::Deserialize {
            context: format!("WebDriver {command} reply"),
            source,
        })?;
    let value = reply.get_mut("value").map(Value::take).unwrap_or_default();

    if !status.is_success() {
        let error = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        let message = value.get("message").and_then(Value::as_str).unwrap_or("");
        return Err(ScraperError::WebDriver {
            command: command.to_owned(),
            reason: format!("{} {error}: {message}", status.as_u16()),
        });
    }

    Ok(value)
}

fn expect_string(value: Value, command: &str) -> Result<String, ScraperError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(ScraperError::WebDriver {
            command: command.to_owned(),
            reason: format!("expected a string value, got {other}"),
        }),
    }
}
