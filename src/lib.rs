//! CalEnder SDK for Rust.
//!
//! Tracks recurring subscriptions on a calendar. Subscriptions live on the
//! CalEnder API; this crate fetches and edits them over HTTP, keeps an
//! ordered local mirror, and answers calendar questions about it: which
//! subscriptions fall on a day, which are active in a month, and how much
//! they add up to per currency, per category and per month of a year.
//!
//! The recurrence and aggregation functions in [`recurrence`],
//! [`aggregate`] and [`calendar`] are pure and can be used without a
//! client.
//!
//! # Quick start
//!
//! ```no_run
//! use calender_sdk::CalenderSdk;
//! use chrono::NaiveDate;
//!
//! let sdk = CalenderSdk::builder().build().unwrap();
//!
//! // Who is signed in? Loads the subscription list when someone is.
//! let user = sdk.load().unwrap();
//!
//! // Totals for March 2024
//! let march = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let totals = sdk.totals_by_currency(march).unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod aggregate;
pub mod calendar;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod queries;
pub mod recurrence;
pub mod session;

#[cfg(feature = "async")]
pub use async_client::AsyncCalenderSdk;
pub use aggregate::{totals_by_category, totals_by_currency, yearly_series};
pub use calendar::{CalendarDay, MonthGrid};
pub use client::ApiClient;
pub use error::{CalenderError, Result};
pub use models::{
    Category, Currency, Frequency, MonthlyTotal, Subscription, SubscriptionDraft, Totals, User,
};
pub use recurrence::{occurs_active_in_month, occurs_on_day, Schedule};
pub use session::SessionStore;

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use log::info;

// ---------------------------------------------------------------------------
// CalenderSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CalenderSdk`] instance.
///
/// Use [`CalenderSdk::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](CalenderSdkBuilder::build) to create the SDK.
pub struct CalenderSdkBuilder {
    api_base: Option<String>,
    timeout: Duration,
    session_cookie: Option<String>,
    session_file: Option<PathBuf>,
    ephemeral: bool,
}

impl Default for CalenderSdkBuilder {
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

impl CalenderSdkBuilder {
    /// Set the API base URL, e.g. `https://calender.example.com`.
    ///
    /// If not set, `CALENDER_API_BASE_URL` is used, then
    /// `http://localhost:5001`.
    pub fn api_base(mut self, url: &str) -> Self {
        self.api_base = Some(url.to_string());
        self
    }

    /// Set the HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Start with this session cookie (`name=value`), e.g. one copied from a
    /// browser after logging in. It replaces any persisted cookie.
    pub fn session_cookie(mut self, cookie: &str) -> Self {
        self.session_cookie = Some(cookie.to_string());
        self
    }

    /// Persist the session cookie to a custom file.
    ///
    /// If not set, the platform config directory is used
    /// (e.g. `~/.config/calender-sdk/session` on Linux).
    pub fn session_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.session_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Keep the session in memory only; nothing is read from or written to
    /// disk. Defaults to `false`.
    pub fn ephemeral_session(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    /// Build the SDK. No request is made until a query runs.
    pub fn build(self) -> Result<CalenderSdk> {
        let mut session = if self.ephemeral {
            SessionStore::in_memory(None)
        } else {
            SessionStore::open(self.session_file)
        };
        if let Some(cookie) = &self.session_cookie {
            session.save(cookie)?;
        }

        let base = match self.api_base {
            Some(url) => config::normalize_base(&url),
            None => config::api_base_from_env(),
        };
        let client = ApiClient::new(&base, self.timeout, session)?;
        Ok(CalenderSdk {
            client,
            subscriptions: RefCell::new(Vec::new()),
        })
    }
}

// ---------------------------------------------------------------------------
// CalenderSdk
// ---------------------------------------------------------------------------

/// The main entry point for the CalEnder SDK.
///
/// Owns the [`ApiClient`] (with its session) and the local mirror of the
/// subscription list. Query interfaces are lightweight borrowing wrappers.
///
/// Created via [`CalenderSdk::builder()`].
pub struct CalenderSdk {
    client: ApiClient,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl CalenderSdk {
    /// Create a new builder for configuring the SDK.
    pub fn builder() -> CalenderSdkBuilder {
        CalenderSdkBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the subscription query interface.
    pub fn subscriptions(&self) -> queries::SubscriptionQuery<'_> {
        queries::SubscriptionQuery::new(&self.client, &self.subscriptions)
    }

    /// Access the session/user interface.
    pub fn auth(&self) -> queries::AuthQuery<'_> {
        queries::AuthQuery::new(&self.client)
    }

    // -- Session lifecycle -------------------------------------------------

    /// Resolve the signed-in user and sync the mirror with it.
    ///
    /// With a user, the subscription list is fetched. Without one, the
    /// mirror is emptied.
    pub fn load(&self) -> Result<Option<User>> {
        let user = self.auth().current_user()?;
        match &user {
            Some(u) => {
                info!("Signed in as {}", u.display_name);
                self.subscriptions().refresh()?;
            }
            None => {
                info!("No active session");
                self.subscriptions.borrow_mut().clear();
            }
        }
        Ok(user)
    }

    /// Log out and empty the mirror.
    pub fn logout(&self) -> Result<()> {
        self.subscriptions.borrow_mut().clear();
        self.auth().logout()
    }

    // -- Summaries over the mirror -----------------------------------------

    /// Per-currency totals of the mirrored subscriptions for a month.
    pub fn totals_by_currency(&self, month_date: NaiveDate) -> Result<Totals> {
        aggregate::totals_by_currency(&self.subscriptions.borrow(), month_date)
    }

    /// Per-category totals of the mirrored subscriptions for a month.
    pub fn totals_by_category(&self, month_date: NaiveDate) -> Result<Totals> {
        aggregate::totals_by_category(&self.subscriptions.borrow(), month_date)
    }

    /// Monthly totals for the year containing `year_anchor`.
    pub fn yearly_series(&self, year_anchor: NaiveDate) -> Result<Vec<MonthlyTotal>> {
        aggregate::yearly_series(&self.subscriptions.borrow(), year_anchor)
    }

    /// Run `f` over the month grid of the mirrored subscriptions.
    ///
    /// The grid borrows the mirror, so it is handed to a closure rather than
    /// returned.
    pub fn with_month_grid<T>(
        &self,
        month_date: NaiveDate,
        f: impl FnOnce(&MonthGrid<'_>) -> T,
    ) -> Result<T> {
        let subs = self.subscriptions.borrow();
        let grid = MonthGrid::build(&subs, month_date)?;
        Ok(f(&grid))
    }

    /// Return a reference to the underlying [`ApiClient`] for advanced usage.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for CalenderSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CalenderSdk(api_base={}, subscriptions={}, session={})",
            self.client.base_url,
            self.subscriptions.borrow().len(),
            if self.client.session_cookie().is_some() {
                "yes"
            } else {
                "no"
            }
        )
    }
}
