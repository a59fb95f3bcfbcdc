//! Time handling shared by the query engine and the dashboard
//!
//! Every window is anchored on a single `now` captured by the caller, so
//! callers comparing windows never observe clock skew between them.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SubsecRound, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::errors::{DomainError, DomainResult};

/// Width of the "due soon" window
pub const DUE_SOON_WINDOW: Duration = Duration::hours(24);

/// Width of the "today" window
pub const DAY_WINDOW: Duration = Duration::hours(24);

/// Source of the current instant
pub trait Clock: Send + Sync {
    /// Current instant, normalized to storage precision
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        normalize_instant(Utc::now())
    }
}

/// Clock frozen at a given instant (tests, replays)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(normalize_instant(instant))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Truncate an instant to microseconds, the precision every backend stores
pub fn normalize_instant(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(6)
}

/// Resolve an IANA timezone name
///
/// An empty name means UTC. Unknown names are a configuration error.
pub fn resolve_timezone(name: &str) -> DomainResult<Tz> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(Tz::UTC);
    }
    name.parse::<Tz>().map_err(|_| DomainError::InvalidTimezone {
        name: name.to_string(),
    })
}

/// Resolve a timezone for relative-now computations, falling back to UTC
///
/// Only the overdue and due-soon windows use this: they compare instants,
/// so the fallback cannot change which tasks match.
pub fn resolve_timezone_or_utc(name: &str) -> Tz {
    match resolve_timezone(name) {
        Ok(tz) => tz,
        Err(_) => {
            warn!(timezone = name, "unknown timezone, using UTC for relative window");
            Tz::UTC
        }
    }
}

/// First instant of a local calendar day
pub fn start_of_local_day(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    // A DST gap can swallow midnight; the day then starts an hour later.
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Inclusive bounds of a local calendar day
pub fn local_day_bounds(date: NaiveDate, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_local_day(date, tz);
    let next = date
        .succ_opt()
        .map(|next| start_of_local_day(next, tz))
        .unwrap_or(start + DAY_WINDOW);
    (start, next - Duration::microseconds(1))
}

/// Windows relative to `now`, used by the overdue and due-soon filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeWindow {
    pub now: DateTime<Utc>,
    pub soon_end: DateTime<Utc>,
}

impl RelativeWindow {
    /// Build the window with `now` expressed in `tz`
    pub fn new(now: DateTime<Utc>, tz: &Tz) -> Self {
        let local_now = now.with_timezone(tz);
        Self {
            now,
            soon_end: (local_now + DUE_SOON_WINDOW).with_timezone(&Utc),
        }
    }

    /// Resolve the timezone leniently and build the window
    pub fn for_timezone(now: DateTime<Utc>, timezone: &str) -> Self {
        Self::new(now, &resolve_timezone_or_utc(timezone))
    }
}

/// Half-open "today" window `[start, start + 24h)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Window of the local day containing `now`
    pub fn containing(now: DateTime<Utc>, tz: &Tz) -> Self {
        let start = start_of_local_day(now.with_timezone(tz).date_naive(), tz);
        Self {
            start,
            end: start + DAY_WINDOW,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}
