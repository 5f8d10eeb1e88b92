use chrono::{DateTime, Utc};
use rand::Rng;
use std::fmt;
use std::sync::Arc;

use crate::route::RouteId;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

type SuffixSource = Arc<dyn Fn() -> u16 + Send + Sync>;

/// Issues human-facing ticket numbers.
///
/// Format: `T{YYYYmmddHHMMSS}{route_id}{suffix}` where the suffix is a
/// random three digit number. Numbers are traceable to booking time and
/// route but not meant to be unguessable. Ledgers retry with a fresh suffix
/// on collision, up to `max_attempts` times.
#[derive(Clone)]
pub struct TicketNumberGenerator {
    max_attempts: u32,
    suffix: SuffixSource,
}

impl TicketNumberGenerator {
    pub fn new(max_attempts: u32) -> Self {
        Self::with_suffix_source(max_attempts, || rand::thread_rng().gen_range(100..=999))
    }

    /// Generator with a caller supplied suffix, for deterministic tests
    pub fn with_suffix_source<F>(max_attempts: u32, source: F) -> Self
    where
        F: Fn() -> u16 + Send + Sync + 'static,
    {
        Self {
            max_attempts: max_attempts.max(1),
            suffix: Arc::new(source),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn generate(&self, route_id: RouteId, at: DateTime<Utc>) -> String {
        format_ticket_number(route_id, at, (self.suffix)())
    }
}

impl Default for TicketNumberGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl fmt::Debug for TicketNumberGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketNumberGenerator")
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

pub fn format_ticket_number(route_id: RouteId, at: DateTime<Utc>, suffix: u16) -> String {
    format!("T{}{}{:03}", at.format("%Y%m%d%H%M%S"), route_id, suffix)
}
