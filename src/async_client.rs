//! Async wrapper around [`CalenderSdk`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all SDK operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free while
//! the blocking HTTP client waits on the API.
//!
//! # Example
//!
//! ```ignore
//! use calender_sdk::AsyncCalenderSdk;
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() {
//!     let sdk = AsyncCalenderSdk::builder().build().await.unwrap();
//!
//!     let user = sdk.load().await.unwrap();
//!
//!     // Run any sync SDK method via closure
//!     let march = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//!     let totals = sdk.run(move |s| s.totals_by_currency(march)).await.unwrap();
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config;
use crate::error::{CalenderError, Result};
use crate::models::{Subscription, User};
use crate::CalenderSdk;

// ---------------------------------------------------------------------------
// AsyncCalenderSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncCalenderSdk`] instance.
pub struct AsyncCalenderSdkBuilder {
    api_base: Option<String>,
    timeout: Duration,
    session_cookie: Option<String>,
    session_file: Option<PathBuf>,
    ephemeral: bool,
}

impl Default for AsyncCalenderSdkBuilder {
    fn default() -> Self {
        Self {
            api_base: None,
            timeout: config::DEFAULT_TIMEOUT,
            session_cookie: None,
            session_file: None,
            ephemeral: false,
        }
    }
}

impl AsyncCalenderSdkBuilder {
    /// Set the API base URL.
    pub fn api_base(mut self, url: &str) -> Self {
        self.api_base = Some(url.to_string());
        self
    }

    /// Set the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Start with this session cookie.
    pub fn session_cookie(mut self, cookie: &str) -> Self {
        self.session_cookie = Some(cookie.to_string());
        self
    }

    /// Persist the session cookie to a custom file.
    pub fn session_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.session_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Keep the session in memory only.
    pub fn ephemeral_session(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    /// Build the async SDK.
    ///
    /// The blocking HTTP client is created on the blocking thread pool, as
    /// it must not be built inside an async context.
    pub async fn build(self) -> Result<AsyncCalenderSdk> {
        tokio::task::spawn_blocking(move || {
            let mut builder = CalenderSdk::builder()
                .timeout(self.timeout)
                .ephemeral_session(self.ephemeral);
            if let Some(url) = &self.api_base {
                builder = builder.api_base(url);
            }
            if let Some(cookie) = &self.session_cookie {
                builder = builder.session_cookie(cookie);
            }
            if let Some(path) = self.session_file {
                builder = builder.session_file(path);
            }
            let sdk = builder.build()?;
            Ok(AsyncCalenderSdk {
                inner: Arc::new(Mutex::new(sdk)),
            })
        })
        .await
        .map_err(|e| CalenderError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncCalenderSdk
// ---------------------------------------------------------------------------

/// Async wrapper around [`CalenderSdk`].
///
/// All operations are dispatched to a blocking thread pool via
/// [`tokio::task::spawn_blocking`]. The underlying [`CalenderSdk`] is
/// protected by a [`Mutex`] since it uses `RefCell` internally.
pub struct AsyncCalenderSdk {
    inner: Arc<Mutex<CalenderSdk>>,
}

impl AsyncCalenderSdk {
    /// Create a new builder for configuring the async SDK.
    pub fn builder() -> AsyncCalenderSdkBuilder {
        AsyncCalenderSdkBuilder::default()
    }

    /// Run a sync SDK operation on the blocking thread pool.
    ///
    /// The closure receives a `&CalenderSdk` reference and should return a
    /// `Result<T>`.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&CalenderSdk) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sdk = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = sdk
                .lock()
                .map_err(|_| CalenderError::InvalidArgument("SDK lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| CalenderError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Resolve the signed-in user and sync the mirror asynchronously.
    pub async fn load(&self) -> Result<Option<User>> {
        self.run(|s| s.load()).await
    }

    /// Re-fetch the subscription list asynchronously.
    pub async fn refresh(&self) -> Result<Vec<Subscription>> {
        self.run(|s| s.subscriptions().refresh()).await
    }

    /// Log out asynchronously.
    pub async fn logout(&self) -> Result<()> {
        self.run(|s| s.logout()).await
    }
}
