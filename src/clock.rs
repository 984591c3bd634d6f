//! # Time Source
//!
//! Capture time and formatting time both come from a [`Clock`], so the
//! pipeline can be driven deterministically in tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
