//! Blocking HTTP client for the subscription API.
//!
//! Wraps a `reqwest` client bound to one API base URL, attaches the session
//! cookie to every request and folds `Set-Cookie` responses back into the
//! [`SessionStore`].

use std::cell::RefCell;
use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config;
use crate::error::{CalenderError, Result};
use crate::session::SessionStore;

pub struct ApiClient {
    /// Base URL without a trailing slash, e.g. `http://localhost:5001`.
    pub base_url: String,
    client: Client,
    session: RefCell<SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, session: SessionStore) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            // Redirects are returned, not followed, so every Set-Cookie is seen.
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            base_url: config::normalize_base(base_url),
            client,
            session: RefCell::new(session),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn session_cookie(&self) -> Option<String> {
        self.session.borrow().cookie().map(str::to_string)
    }

    pub fn set_session_cookie(&self, cookie: &str) -> Result<()> {
        self.session.borrow_mut().save(cookie)
    }

    pub fn clear_session(&self) -> Result<()> {
        self.session.borrow_mut().clear()
    }

    /// `GET path` and decode the JSON body.
    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.send(self.request(Method::GET, path))?;
        Ok(resp.json()?)
    }

    /// `GET path` and decode the JSON body, treating an empty or `null`
    /// body as `None`.
    pub fn get_optional_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let resp = self.send(self.request(Method::GET, path))?;
        let body = resp.text()?;
        let body = body.trim();
        if body.is_empty() || body == "null" {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(body)?))
    }

    /// Send `body` as JSON with `method` and decode the JSON reply.
    pub fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(self.request(method, path).json(body))?;
        Ok(resp.json()?)
    }

    /// Send a request whose reply body is not needed.
    pub fn send_empty(&self, method: Method, path: &str) -> Result<()> {
        self.send(self.request(method, path))?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match self.session.borrow().cookie() {
            Some(cookie) => builder.header(COOKIE, cookie),
            None => builder,
        }
    }

    fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let resp = builder.send()?;
        let status = resp.status();
        let url = resp.url().to_string();
        debug!("{} <- {}", status, url);

        let set_cookies: Vec<&str> = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if !set_cookies.is_empty() {
            let current = self.session_cookie();
            match merge_cookies(current.as_deref(), &set_cookies) {
                Some(merged) => self.set_session_cookie(&merged)?,
                None => self.clear_session()?,
            }
        }

        if status.is_success() || status.is_redirection() {
            return Ok(resp);
        }
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(CalenderError::Unauthorized),
            StatusCode::NOT_FOUND => Err(CalenderError::NotFound(url)),
            _ => {
                let message = resp
                    .text()
                    .ok()
                    .filter(|body| !body.trim().is_empty())
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
                Err(CalenderError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

/// Fold `Set-Cookie` header values into a `Cookie` header value.
///
/// Each header contributes its leading `name=value` pair, replacing any
/// earlier value of the same name. A cookie set with `Max-Age=0` or an empty
/// value is removed. Returns `None` when no cookies remain.
pub fn merge_cookies(current: Option<&str>, set_cookies: &[&str]) -> Option<String> {
    let mut jar: Vec<(String, String)> = current
        .unwrap_or("")
        .split(';')
        .filter_map(split_pair)
        .collect();

    for header in set_cookies {
        let mut parts = header.split(';');
        let Some((name, value)) = parts.next().and_then(split_pair) else {
            continue;
        };
        let expired = value.is_empty()
            || parts.any(|attr| attr.trim().eq_ignore_ascii_case("max-age=0"));
        jar.retain(|(existing, _)| *existing != name);
        if !expired {
            jar.push((name, value));
        }
    }

    if jar.is_empty() {
        None
    } else {
        Some(
            jar.iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

fn split_pair(pair: &str) -> Option<(String, String)> {
    let (name, value) = pair.trim().split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
