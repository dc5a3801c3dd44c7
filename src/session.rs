//! Authenticated session against the Magnetis website
//!
//! A [`Session`] owns one blocking HTTP client with a cookie jar. Every
//! request issued through it shares that jar, so the session cookie set
//! during sign-in is attached to later data fetches automatically. Use one
//! session per account: cookies are scoped to the host, not the credentials.

use std::sync::LazyLock;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::error::{excerpt, AuthStage, CrawlerError, Result};

/// Production host
pub const DEFAULT_HOST: &str = "https://magnetis.com.br";

pub const SIGN_IN_PATH: &str = "/users/sign_in";

static TOKEN_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("input[name='authenticity_token']").expect("valid token selector")
});

/// Client settings. Without a timeout the HTTP client defaults apply.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_HOST.to_string(),
            timeout: None,
            user_agent: None,
        }
    }
}

impl SessionConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// Cookie-carrying client bound to one host
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    base_url: String,
}

impl Session {
    /// Build an unauthenticated session with an empty cookie jar.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(agent) = config.user_agent.as_deref() {
            builder = builder.user_agent(agent);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sign in with the site's Rails form and return the session holding the
    /// resulting cookies.
    ///
    /// The CSRF token is scraped from the first `input[name=authenticity_token]`
    /// of the sign-in page. A missing token is submitted as an empty string;
    /// if that leaves the session unauthenticated, the failure shows up as a
    /// status error on the next data fetch. Wrong credentials are not
    /// detected here either, for the same reason.
    pub fn authenticate(config: &SessionConfig, username: &str, password: &str) -> Result<Self> {
        let session = Self::new(config)?;
        session.sign_in(username, password)?;
        Ok(session)
    }

    fn sign_in(&self, username: &str, password: &str) -> Result<()> {
        let url = self.url(SIGN_IN_PATH);
        info!("Signing in on {}", url);

        let response = self.client.get(&url).send()?;
        let page = read_success(response).map_err(|failure| failure.into_auth(AuthStage::SignInPage))?;

        let token = extract_authenticity_token(&page);
        match token {
            Some(_) => debug!("Found authenticity token on sign-in page"),
            None => warn!("No authenticity token on sign-in page, submitting an empty one"),
        }

        let form = [
            ("authenticity_token", token.unwrap_or_default()),
            ("utf8", "✓".to_string()),
            ("user[email]", username.to_string()),
            ("user[password]", password.to_string()),
        ];
        let response = self.client.post(&url).form(&form).send()?;
        read_success(response).map_err(|failure| failure.into_auth(AuthStage::Credentials))?;
        debug!("Credentials submitted");
        Ok(())
    }

    /// GET `path` on the session host and return the body of a 2xx response.
    pub fn get_text(&self, path: &str) -> Result<String> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.client.get(&url).send()?;
        read_success(response).map_err(|failure| failure.into_status(url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Value of the first `authenticity_token` input, if the page has one.
pub fn extract_authenticity_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&TOKEN_SELECTOR)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string)
}

enum Failure {
    Status { code: u16, body: String },
    Transport(reqwest::Error),
}

impl Failure {
    fn into_auth(self, stage: AuthStage) -> CrawlerError {
        match self {
            Failure::Status { code, body } => CrawlerError::Auth { stage, code, body },
            Failure::Transport(err) => CrawlerError::Transport(err),
        }
    }

    fn into_status(self, url: String) -> CrawlerError {
        match self {
            Failure::Status { code, body } => CrawlerError::UnexpectedStatus { url, code, body },
            Failure::Transport(err) => CrawlerError::Transport(err),
        }
    }
}

fn read_success(response: Response) -> std::result::Result<String, Failure> {
    let status = response.status();
    let body = response.text().map_err(Failure::Transport)?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(Failure::Status {
            code: status.as_u16(),
            body: excerpt(&body),
        })
    }
}
