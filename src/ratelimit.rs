use std::collections::HashMap;
use std::future::{ready, Ready};
use std::marker::PhantomData;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use actix_web::{dev, web, FromRequest, HttpRequest};

use crate::auth::caller_key;
use crate::error::{RestError, RestResult};

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

/// Fixed-window request counter keyed by caller.
///
/// The first hit from a key opens a window of `window` length; at most `max`
/// hits are allowed inside it. Rejected hits do not extend the window.
#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    message: &'static str,
    counters: Mutex<HashMap<String, Window>>,
}

/// A hit over the limit, carrying the message to show the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct LimitExceeded(pub &'static str);

impl RateLimiter {
    pub fn new(max: u32, window: Duration, message: &'static str) -> Self {
        Self {
            max,
            window,
            message,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Count a hit for `key` now
    pub fn check(&self, key: &str) -> Result<(), LimitExceeded> {
        self.check_at(key, Instant::now())
    }

    /// Count a hit for `key` at a given instant
    pub fn check_at(&self, key: &str, now: Instant) -> Result<(), LimitExceeded> {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);

        let window = self.window;
        counters.retain(|_, w| now.saturating_duration_since(w.started) < window);

        let entry = counters.entry(key.to_string()).or_insert(Window {
            started: now,
            hits: 0,
        });
        if entry.hits >= self.max {
            tracing::warn!(key, max = self.max, "Rate limit exceeded");
            return Err(LimitExceeded(self.message));
        }
        entry.hits += 1;
        Ok(())
    }

    /// Forget every counter
    pub fn reset(&self) {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

pub const EMAIL_LIMIT_MESSAGE: &str = "Too many email requests. Please try again in a moment.";
pub const TRANSLATE_LIMIT_MESSAGE: &str =
    "Too many translation requests. Please try again in a moment.";

/// The rate limiters of each limited route family
#[derive(Debug)]
pub struct RateLimits {
    pub email: RateLimiter,
    pub translate: RateLimiter,
}

impl RateLimits {
    pub fn new(window: Duration, email_max: u32, translate_max: u32) -> Self {
        Self {
            email: RateLimiter::new(email_max, window, EMAIL_LIMIT_MESSAGE),
            translate: RateLimiter::new(translate_max, window, TRANSLATE_LIMIT_MESSAGE),
        }
    }
}

/// A family of routes sharing one limiter
pub trait LimitedRoute {
    fn limiter(limits: &RateLimits) -> &RateLimiter;
}

pub struct EmailRoutes;

impl LimitedRoute for EmailRoutes {
    fn limiter(limits: &RateLimits) -> &RateLimiter {
        &limits.email
    }
}

pub struct TranslateRoutes;

impl LimitedRoute for TranslateRoutes {
    fn limiter(limits: &RateLimits) -> &RateLimiter {
        &limits.translate
    }
}

/// Counts a hit against the limiter of `R` when extracted.
///
/// Put it first in a handler's arguments so the hit is counted before
/// authentication, keyed by [`caller_key`].
pub struct Quota<R>(PhantomData<R>);

impl<R: LimitedRoute> Quota<R> {
    fn take(req: &HttpRequest) -> RestResult<Self> {
        let limits = req
            .app_data::<web::Data<RateLimits>>()
            .ok_or_else(|| RestError::Internal("Rate limits not registered".into()))?;

        R::limiter(limits.get_ref()).check(&caller_key(req))?;
        Ok(Self(PhantomData))
    }
}

impl<R: LimitedRoute> FromRequest for Quota<R> {
    type Error = RestError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        ready(Self::take(req))
    }
}
