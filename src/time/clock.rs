// src/time/clock.rs

//! Clock and timezone provider.
//!
//! The provider is constructed explicitly and passed to every resolution call.
//! It owns the source of "now" (a [`Clock`] trait object, so tests can pin
//! time), the local zone of the caller, and two compute-once caches: the
//! timezone metadata table and the guessed default timezone.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::{OffsetName, Tz, TZ_VARIANTS};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TwError};

/// Source of the current instant.
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock of the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    /// Creates a clock that always reports `instant`.
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// Display metadata for a timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimezoneInfo {
    /// IANA id, e.g. `Europe/Kyiv`
    pub id: String,
    /// Label such as `(UTC+02:00) Europe/Kyiv`
    pub display_name: String,
    /// Offset label such as `UTC+02:00`
    pub utc_offset: String,
    /// Offset from UTC in minutes at table build time
    pub utc_offset_minutes: i32,
    /// Zone abbreviation at table build time, e.g. `EET`
    pub abbreviation: String,
}

/// Supplies "now", timezone offsets and timezone metadata.
#[derive(Debug)]
pub struct ClockProvider {
    clock: Arc<dyn Clock>,
    local: Tz,
    timezones: OnceLock<Vec<TimezoneInfo>>,
    default_timezone: OnceLock<String>,
}

impl ClockProvider {
    /// Creates a provider from a clock and the caller's local zone.
    pub fn new(clock: Arc<dyn Clock>, local: Tz) -> Self {
        Self {
            clock,
            local,
            timezones: OnceLock::new(),
            default_timezone: OnceLock::new(),
        }
    }

    /// Provider backed by the system clock and the guessed local zone.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock), guess_local_timezone())
    }

    /// Provider frozen at `instant`, with `local` as the caller's zone.
    pub fn fixed(instant: DateTime<Utc>, local: Tz) -> Self {
        Self::new(Arc::new(FixedClock::new(instant)), local)
    }

    /// Overrides the guessed default timezone.
    ///
    /// # Errors
    ///
    /// Returns `TwError::UnknownTimezone` if `id` is not an IANA zone.
    pub fn with_default_timezone(mut self, id: &str) -> Result<Self> {
        let tz = Self::parse_timezone(id)?;
        self.default_timezone = OnceLock::from(tz.name().to_string());
        Ok(self)
    }

    /// Parses an IANA timezone id.
    pub fn parse_timezone(id: &str) -> Result<Tz> {
        id.parse::<Tz>().map_err(|_| TwError::unknown_timezone(id))
    }

    /// The caller's local zone.
    pub fn local_timezone(&self) -> Tz {
        self.local
    }

    /// Resolves an optional zone id; unset means the local zone.
    pub fn resolve_timezone(&self, tz: Option<&str>) -> Result<Tz> {
        match tz {
            Some(id) => Self::parse_timezone(id),
            None => Ok(self.local_timezone()),
        }
    }

    /// The current instant in UTC.
    pub fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The current instant as epoch milliseconds.
    pub fn now_ms(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    /// The current instant in `tz` (local zone when unset).
    pub fn now(&self, tz: Option<&str>) -> Result<DateTime<Tz>> {
        let zone = self.resolve_timezone(tz)?;
        Ok(self.now_in(&zone))
    }

    /// The current instant in an already parsed zone.
    pub fn now_in(&self, tz: &Tz) -> DateTime<Tz> {
        self.clock.now().with_timezone(tz)
    }

    /// Offset of `tz` from UTC in minutes at the current instant.
    pub fn offset_minutes(&self, tz: &Tz) -> i32 {
        offset_minutes_at(tz, &self.clock.now())
    }

    /// Offset of the local zone from UTC in minutes at the current instant.
    pub fn local_offset_minutes(&self) -> i32 {
        self.offset_minutes(&self.local)
    }

    /// Milliseconds to add to local-relative timestamps to express them in `tz`.
    ///
    /// Zero when `tz` is unset.
    pub fn ts_offset(&self, tz: Option<&str>) -> Result<i64> {
        match tz {
            None => Ok(0),
            Some(id) => {
                let zone = Self::parse_timezone(id)?;
                let diff = self.offset_minutes(&zone) - self.local_offset_minutes();
                Ok(i64::from(diff) * 60_000)
            }
        }
    }

    /// Every known timezone, sorted by offset then id. Built on first use.
    pub fn list_timezones(&self) -> &[TimezoneInfo] {
        self.timezones.get_or_init(|| {
            let now = self.clock.now();
            let mut table: Vec<TimezoneInfo> = TZ_VARIANTS.iter().map(|tz| timezone_info(tz, &now)).collect();
            table.sort_by(|a, b| a.utc_offset_minutes.cmp(&b.utc_offset_minutes).then_with(|| a.id.cmp(&b.id)));
            log::debug!("Built timezone table with {} entries", table.len());
            table
        })
    }

    /// Metadata for a single zone id.
    pub fn timezone_info(&self, id: &str) -> Option<&TimezoneInfo> {
        self.list_timezones().iter().find(|info| info.id == id)
    }

    /// The default zone id, guessed once from the local zone.
    pub fn default_timezone(&self) -> &str {
        self.default_timezone.get_or_init(|| {
            let local = self.local.name();
            if self.timezone_info(local).is_some() {
                return local.to_string();
            }
            let offset = self.local_offset_minutes();
            let guess = self
                .list_timezones()
                .iter()
                .find(|info| info.utc_offset_minutes == offset)
                .map(|info| info.id.clone())
                .unwrap_or_else(|| Tz::UTC.name().to_string());
            log::debug!("Guessed default timezone {} for local zone {}", guess, local);
            guess
        })
    }
}

fn offset_minutes_at(tz: &Tz, instant: &DateTime<Utc>) -> i32 {
    tz.offset_from_utc_datetime(&instant.naive_utc()).fix().local_minus_utc() / 60
}

fn format_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    let abs = minutes.abs();
    format!("UTC{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

fn timezone_info(tz: &Tz, instant: &DateTime<Utc>) -> TimezoneInfo {
    let offset = tz.offset_from_utc_datetime(&instant.naive_utc());
    let minutes = offset.fix().local_minus_utc() / 60;
    let utc_offset = format_offset(minutes);
    TimezoneInfo {
        id: tz.name().to_string(),
        display_name: format!("({}) {}", utc_offset, tz.name()),
        utc_offset,
        utc_offset_minutes: minutes,
        abbreviation: offset.abbreviation().to_string(),
    }
}

/// Guesses the local zone from `TZ`, `/etc/timezone` and the `/etc/localtime` link.
pub fn guess_local_timezone() -> Tz {
    let from_env = std::env::var("TZ").ok().map(|v| v.trim_start_matches(':').to_string());
    let from_file = || std::fs::read_to_string("/etc/timezone").ok().map(|v| v.trim().to_string());
    let from_link = || {
        std::fs::read_link(Path::new("/etc/localtime")).ok().and_then(|target| {
            let target = target.to_string_lossy().into_owned();
            target.split_once("zoneinfo/").map(|(_, id)| id.to_string())
        })
    };

    for candidate in [from_env, from_file(), from_link()].into_iter().flatten() {
        if let Ok(tz) = candidate.parse::<Tz>() {
            return tz;
        }
        log::debug!("Ignoring unparseable local timezone candidate {:?}", candidate);
    }
    Tz::UTC
}
