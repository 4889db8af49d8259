use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};
use tokio::time::MissedTickBehavior;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// Anything that shows timestamps for rendered chirps.
pub trait TimestampSurface {
    /// `(chirp id, epoch seconds)` for every chirp currently rendered.
    fn timestamps(&self) -> Vec<(i64, i64)>;

    fn set_relative_time(&self, chirp_id: i64, label: &str);
}

/// Label for `timestamp` (epoch seconds) as seen at `now`, with the absolute
/// fallback in the local time zone.
pub fn format_relative(timestamp: i64, now: DateTime<Utc>) -> String {
    format_relative_in(timestamp, now, &Local)
}

/// Same as [`format_relative`] with an explicit zone for the absolute form.
pub fn format_relative_in<Tz>(timestamp: i64, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    // Clock skew can put a chirp slightly in the future.
    let delta = (now.timestamp() - timestamp).max(0);

    if delta < MINUTE {
        format!("{}s ago", delta)
    } else if delta < HOUR {
        format!("{}m ago", delta / MINUTE)
    } else if delta < DAY {
        format!("{}h ago", delta / HOUR)
    } else if delta < WEEK {
        format!("{}d ago", delta / DAY)
    } else {
        match DateTime::from_timestamp(timestamp, 0) {
            Some(posted) => posted
                .with_timezone(tz)
                .format("%m/%d/%Y, %I:%M %p")
                .to_string(),
            None => timestamp.to_string(),
        }
    }
}

/// Recompute every label on `surface`.
pub fn refresh_all<S: TimestampSurface + ?Sized>(surface: &S, now: DateTime<Utc>) {
    for (id, timestamp) in surface.timestamps() {
        surface.set_relative_time(id, &format_relative(timestamp, now));
    }
}

/// Refreshes labels on a fixed cadence for as long as it is polled.
pub struct TimestampTicker {
    interval: Duration,
}

impl TimestampTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Never returns; drop the future to stop ticking.
    pub async fn run<S: TimestampSurface + ?Sized>(&self, surface: &S) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            refresh_all(surface, Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn ago(seconds: i64) -> String {
        format_relative_in(now().timestamp() - seconds, now(), &Utc)
    }

    #[test]
    fn relative_buckets_floor() {
        assert_eq!(ago(0), "0s ago");
        assert_eq!(ago(30), "30s ago");
        assert_eq!(ago(59), "59s ago");
        assert_eq!(ago(60), "1m ago");
        assert_eq!(ago(90), "1m ago");
        assert_eq!(ago(3599), "59m ago");
        assert_eq!(ago(7200), "2h ago");
        assert_eq!(ago(DAY - 1), "23h ago");
        assert_eq!(ago(DAY), "1d ago");
        assert_eq!(ago(WEEK - 1), "6d ago");
    }

    #[test]
    fn older_than_a_week_is_absolute() {
        assert_eq!(ago(8 * DAY), "06/07/2024, 12:00 PM");
        assert_eq!(ago(WEEK), "06/08/2024, 12:00 PM");
    }

    #[test]
    fn future_timestamps_clamp_to_zero() {
        assert_eq!(ago(-45), "0s ago");
    }

    struct Labels {
        rows: Vec<(i64, i64)>,
        labels: RefCell<Vec<(i64, String)>>,
    }

    impl TimestampSurface for Labels {
        fn timestamps(&self) -> Vec<(i64, i64)> {
            self.rows.clone()
        }

        fn set_relative_time(&self, chirp_id: i64, label: &str) {
            self.labels.borrow_mut().push((chirp_id, label.to_string()));
        }
    }

    #[test]
    fn refresh_all_labels_every_row() {
        let surface = Labels {
            rows: vec![(1, now().timestamp() - 30), (2, now().timestamp() - 7200)],
            labels: RefCell::new(Vec::new()),
        };

        refresh_all(&surface, now());

        let labels = surface.labels.borrow();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0], (1, "30s ago".to_string()));
        assert_eq!(labels[1], (2, "2h ago".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_refreshes_every_interval() {
        let surface = Labels {
            rows: vec![(1, 0)],
            labels: RefCell::new(Vec::new()),
        };
        let ticker = TimestampTicker::new(Duration::from_secs(1));

        let stopped =
            tokio::time::timeout(Duration::from_millis(3500), ticker.run(&surface)).await;

        assert!(stopped.is_err());
        // Ticks at 0s, 1s, 2s and 3s.
        assert_eq!(surface.labels.borrow().len(), 4);
    }
}
