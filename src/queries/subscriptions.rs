//! Subscription CRUD against the API, plus lookups over the local mirror.
//!
//! The SDK keeps an ordered copy of the server's subscription list. Every
//! mutation here re-fetches the whole list so the mirror never drifts from
//! the server.

use std::cell::RefCell;

use chrono::NaiveDate;
use log::info;
use reqwest::Method;

use crate::client::ApiClient;
use crate::config;
use crate::error::{CalenderError, Result};
use crate::models::{Subscription, SubscriptionDraft};
use crate::recurrence::Schedule;

// ---------------------------------------------------------------------------
// SubscriptionQuery
// ---------------------------------------------------------------------------

/// Query interface for subscriptions, bound to the SDK's client and mirror.
pub struct SubscriptionQuery<'a> {
    client: &'a ApiClient,
    mirror: &'a RefCell<Vec<Subscription>>,
}

impl<'a> SubscriptionQuery<'a> {
    /// Create a new `SubscriptionQuery` over `client` and `mirror`.
    pub fn new(client: &'a ApiClient, mirror: &'a RefCell<Vec<Subscription>>) -> Self {
        Self { client, mirror }
    }

    /// Re-fetch the full list from the server into the mirror.
    pub fn refresh(&self) -> Result<Vec<Subscription>> {
        let subs: Vec<Subscription> = self.client.get_json(config::SUBSCRIPTIONS_PATH)?;
        info!("Loaded {} subscriptions", subs.len());
        *self.mirror.borrow_mut() = subs.clone();
        Ok(subs)
    }

    /// The mirrored list, in server order. Does not hit the network.
    pub fn list(&self) -> Vec<Subscription> {
        self.mirror.borrow().clone()
    }

    /// Look a subscription up in the mirror by id.
    pub fn get(&self, id: &str) -> Option<Subscription> {
        self.mirror.borrow().iter().find(|s| s.id == id).cloned()
    }

    /// Create a subscription and return it as stored by the server.
    ///
    /// An ongoing draft is sent without an end date. The draft is validated
    /// first; nothing is sent if it fails.
    pub fn create(&self, mut draft: SubscriptionDraft) -> Result<Subscription> {
        draft.prepare_for_save()?;
        let created: Subscription =
            self.client
                .send_json(Method::POST, config::SUBSCRIPTIONS_PATH, &draft)?;
        info!("Created subscription {} ({})", created.id, created.name);
        self.refresh()?;
        Ok(created)
    }

    /// Replace a stored subscription with `subscription`.
    pub fn update(&self, mut subscription: Subscription) -> Result<Subscription> {
        subscription.prepare_for_save()?;
        let path = item_path(&subscription.id);
        let updated: Subscription = self.client.send_json(Method::PUT, &path, &subscription)?;
        info!("Updated subscription {}", updated.id);
        self.refresh()?;
        Ok(updated)
    }

    /// Delete the subscription with `id`.
    pub fn delete(&self, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(CalenderError::InvalidArgument(
                "subscription id must not be empty".into(),
            ));
        }
        self.client.send_empty(Method::DELETE, &item_path(id))?;
        info!("Deleted subscription {}", id);
        self.refresh()?;
        Ok(())
    }

    /// Mirrored subscriptions with an occurrence on `day`.
    pub fn on_day(&self, day: NaiveDate) -> Result<Vec<Subscription>> {
        self.filter(|schedule| schedule.occurs_on(day))
    }

    /// Mirrored subscriptions active in the month containing `month_date`.
    pub fn active_in_month(&self, month_date: NaiveDate) -> Result<Vec<Subscription>> {
        self.filter(|schedule| schedule.active_in_month(month_date))
    }

    fn filter<F>(&self, keep: F) -> Result<Vec<Subscription>>
    where
        F: Fn(&Schedule) -> bool,
    {
        let mirror = self.mirror.borrow();
        let mut found = Vec::new();
        for sub in mirror.iter() {
            if keep(&Schedule::of(sub)?) {
                found.push(sub.clone());
            }
        }
        Ok(found)
    }
}

fn item_path(id: &str) -> String {
    format!("{}/{}", config::SUBSCRIPTIONS_PATH, id)
}
