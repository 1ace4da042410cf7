//! The schedule table — `HH:MM` → job bindings with once-per-day firing.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use wardpost_core::config::ScheduleEntry;
use wardpost_core::error::{Result, WardpostError};
use wardpost_dispatch::JobKind;

/// One time-of-day binding.
#[derive(Debug, Clone)]
struct Binding {
    time: NaiveTime,
    job: JobKind,
    /// Day this binding last fired; guards against re-firing within the
    /// same day when the poll tick lands on the same minute twice.
    last_fired: Option<NaiveDate>,
}

/// The full schedule, parsed once at startup and fixed afterwards.
#[derive(Debug, Clone)]
pub struct Timetable {
    bindings: Vec<Binding>,
}

impl Timetable {
    /// Parse config entries. Any malformed time or unknown job is fatal:
    /// the loop must not start with a table it cannot honor.
    pub fn from_entries(entries: &[ScheduleEntry]) -> Result<Self> {
        let mut bindings = Vec::with_capacity(entries.len());
        for entry in entries {
            let time = NaiveTime::parse_from_str(&entry.time, "%H:%M").map_err(|_| {
                WardpostError::Config(format!(
                    "schedule time '{}' is not 24h HH:MM",
                    entry.time
                ))
            })?;
            let job = JobKind::parse(&entry.job).ok_or_else(|| {
                WardpostError::Config(format!("unknown job '{}' in schedule", entry.job))
            })?;
            bindings.push(Binding {
                time,
                job,
                last_fired: None,
            });
        }
        Ok(Self { bindings })
    }

    /// Jobs due at `now`, in table order. Marks them fired for the day.
    pub fn due(&mut self, now: NaiveDateTime) -> Vec<JobKind> {
        let today = now.date();
        let mut due = Vec::new();
        for binding in &mut self.bindings {
            let matches_minute = binding.time.hour() == now.time().hour()
                && binding.time.minute() == now.time().minute();
            if matches_minute && binding.last_fired != Some(today) {
                binding.last_fired = Some(today);
                due.push(binding.job);
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Human-readable summary for startup logging.
    pub fn describe(&self) -> String {
        self.bindings
            .iter()
            .map(|b| format!("{} → {}", b.time.format("%H:%M"), b.job.as_str()))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
