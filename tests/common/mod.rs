//! Shared test fixtures for the CalEnder SDK integration tests.
//!
//! Provides subscription builders and `FakeApi`, a tiny HTTP/1.1 server on
//! a loopback port that behaves like the CalEnder API: session-cookie auth,
//! subscription CRUD with server-assigned ids, and a redirecting logout.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use calender_sdk::{Category, Currency, Frequency, Subscription};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Value};

pub const SESSION: &str = "connect.sid=s%3Atest-session";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// An ongoing monthly subscription with no amount, currency or category.
pub fn sub(id: &str, start: &str) -> Subscription {
    Subscription {
        id: id.to_string(),
        name: format!("Subscription {id}"),
        start_date: start.to_string(),
        ongoing: true,
        ..Default::default()
    }
}

pub fn priced(id: &str, start: &str, frequency: Frequency, amount: Decimal, currency: Currency) -> Subscription {
    Subscription {
        frequency,
        amount: Some(amount),
        currency: Some(currency),
        ..sub(id, start)
    }
}

pub fn categorized(id: &str, start: &str, amount: Decimal, category: Category) -> Subscription {
    Subscription {
        amount: Some(amount),
        category: Some(category),
        ..sub(id, start)
    }
}

/// A subscription that runs from `start` to `end` (not ongoing).
pub fn bounded(id: &str, start: &str, end: &str, frequency: Frequency) -> Subscription {
    Subscription {
        frequency,
        ongoing: false,
        end_date: Some(end.to_string()),
        ..sub(id, start)
    }
}

// ---------------------------------------------------------------------------
// FakeApi
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Default)]
struct State {
    subscriptions: Vec<Value>,
    next_id: u32,
    requests: Vec<RecordedRequest>,
    /// Answer a signed-out `/auth/user` with an empty 200 instead of 401.
    blank_signed_out_user: bool,
}

/// Loopback stand-in for the CalEnder API.
pub struct FakeApi {
    pub base_url: String,
    state: Arc<Mutex<State>>,
}

impl FakeApi {
    pub fn start() -> Self {
        Self::with_subscriptions(Vec::new())
    }

    /// Like [`FakeApi::start`], but `/auth/user` replies `200` with an
    /// empty body when no session cookie is sent.
    pub fn with_blank_signed_out_user() -> Self {
        let api = Self::start();
        api.state.lock().unwrap().blank_signed_out_user = true;
        api
    }

    /// Start the server with `subscriptions` already stored.
    pub fn with_subscriptions(subscriptions: Vec<Value>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(Mutex::new(State {
            subscriptions,
            next_id: 1,
            ..Default::default()
        }));

        let shared = state.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                handle(stream, &shared);
            }
        });

        Self { base_url, state }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().last().cloned().unwrap()
    }

    pub fn stored(&self) -> Vec<Value> {
        self.state.lock().unwrap().subscriptions.clone()
    }
}

fn handle(stream: TcpStream, state: &Arc<Mutex<State>>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).unwrap_or(0) == 0 {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("").to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body).unwrap();

    let request = RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8(body).unwrap(),
    };
    let (status, extra_headers, reply) = route(&request, state);
    state.lock().unwrap().requests.push(request);

    let reason = match status {
        200 => "OK",
        201 => "Created",
        302 => "Found",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Internal Server Error",
    };
    let mut response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.len()
    );
    for (name, value) in extra_headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str("\r\n");
    response.push_str(&reply);

    let mut stream = stream;
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

type Reply = (u16, Vec<(&'static str, String)>, String);

fn route(request: &RecordedRequest, state: &Arc<Mutex<State>>) -> Reply {
    let authed = request
        .headers
        .get("cookie")
        .map(|c| c.contains(SESSION))
        .unwrap_or(false);

    // Logout and /moved redirect to a frontend that is not running.
    if request.path == "/auth/logout" {
        return (
            302,
            vec![
                ("Set-Cookie", "connect.sid=; Path=/; Max-Age=0".to_string()),
                ("Location", "http://127.0.0.1:9/".to_string()),
            ],
            String::new(),
        );
    }
    if request.path == "/moved" {
        return (
            302,
            vec![
                ("Set-Cookie", "theme=dark; Path=/".to_string()),
                ("Location", "http://127.0.0.1:9/".to_string()),
            ],
            String::new(),
        );
    }
    if request.path == "/boom" {
        return (500, Vec::new(), "database unavailable".to_string());
    }
    if !authed && request.path == "/auth/user" && state.lock().unwrap().blank_signed_out_user {
        return (200, Vec::new(), String::new());
    }
    if !authed {
        return (401, Vec::new(), json!({"message": "Unauthorized"}).to_string());
    }

    let mut state = state.lock().unwrap();
    let segments: Vec<&str> = request.path.trim_matches('/').split('/').collect();
    match (request.method.as_str(), segments.as_slice()) {
        ("GET", ["auth", "user"]) => (
            200,
            vec![("Set-Cookie", format!("{SESSION}; Path=/; HttpOnly"))],
            json!({"_id": "u1", "displayName": "Ada Lovelace", "photo": "https://example.com/ada.png"})
                .to_string(),
        ),
        ("GET", ["api", "subscriptions"]) => (
            200,
            Vec::new(),
            Value::Array(state.subscriptions.clone()).to_string(),
        ),
        ("POST", ["api", "subscriptions"]) => {
            let mut created: Value = serde_json::from_str(&request.body).unwrap();
            let id = format!("sub-{}", state.next_id);
            state.next_id += 1;
            created["_id"] = Value::String(id);
            state.subscriptions.push(created.clone());
            (201, Vec::new(), created.to_string())
        }
        ("PUT", ["api", "subscriptions", id]) => {
            let updated: Value = serde_json::from_str(&request.body).unwrap();
            match state.subscriptions.iter_mut().find(|s| s["_id"] == *id) {
                Some(slot) => {
                    *slot = updated.clone();
                    (200, Vec::new(), updated.to_string())
                }
                None => (404, Vec::new(), json!({"message": "Not found"}).to_string()),
            }
        }
        ("DELETE", ["api", "subscriptions", id]) => {
            let before = state.subscriptions.len();
            state.subscriptions.retain(|s| s["_id"] != *id);
            if state.subscriptions.len() < before {
                (200, Vec::new(), json!({"message": "Deleted"}).to_string())
            } else {
                (404, Vec::new(), json!({"message": "Not found"}).to_string())
            }
        }
        _ => (404, Vec::new(), json!({"message": "Not found"}).to_string()),
    }
}
