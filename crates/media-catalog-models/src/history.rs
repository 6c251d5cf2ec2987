use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Items longer than this use the fixed tail rule instead of the percentage rule.
const LONG_FORM_SECS: f64 = 90.0 * 60.0;
/// Remaining time under which long-form items count as finished.
const LONG_FORM_TAIL_SECS: f64 = 10.0 * 60.0;
/// Fraction of the duration under which short-form items count as finished.
const SHORT_FORM_TAIL_RATIO: f64 = 0.05;

/// Watch progress for a single item.
///
/// `is_finished` is derived from position and duration and can only change
/// through [`HistoryRecord::record_progress`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    id: String,
    last_position: f64, // Seconds
    duration: f64,      // Seconds
    is_finished: bool,
    last_watched: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(id: impl Into<String>, position: f64, duration: f64, now: DateTime<Utc>) -> Self {
        let mut record = Self {
            id: id.into(),
            last_position: 0.0,
            duration: 0.0,
            is_finished: false,
            last_watched: now,
        };
        record.record_progress(position, duration, now);
        record
    }

    pub fn record_progress(&mut self, position: f64, duration: f64, now: DateTime<Utc>) {
        self.last_watched = now;
        self.last_position = position;
        self.duration = duration;
        self.is_finished = is_finished(position, duration);
    }

    /// Re-derive the finished flag, e.g. after loading a document written by an older build.
    pub fn normalized(mut self) -> Self {
        self.is_finished = is_finished(self.last_position, self.duration);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn last_position(&self) -> f64 {
        self.last_position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    pub fn last_watched(&self) -> DateTime<Utc> {
        self.last_watched
    }

    /// Fraction watched in `0.0..=1.0`, 0 when the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (self.last_position / self.duration).clamp(0.0, 1.0)
    }
}

/// Finished classification for a position within a stream of `duration` seconds.
pub fn is_finished(position: f64, duration: f64) -> bool {
    let remaining = duration - position;
    if duration > LONG_FORM_SECS {
        remaining < LONG_FORM_TAIL_SECS
    } else {
        remaining < duration * SHORT_FORM_TAIL_RATIO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mins(m: f64) -> f64 {
        m * 60.0
    }

    #[test]
    fn test_short_form_uses_five_percent_tail() {
        // 5 minutes: the tail is 15 seconds
        assert!(is_finished(mins(4.0) + 50.0, mins(5.0)));
        assert!(!is_finished(mins(4.0) + 30.0, mins(5.0)));
    }

    #[test]
    fn test_long_form_uses_ten_minute_tail() {
        assert!(is_finished(mins(91.0), mins(100.0)));
        assert!(!is_finished(mins(85.0), mins(100.0)));
    }

    #[test]
    fn test_exactly_ninety_minutes_is_short_form() {
        // 5% of 90 minutes is 4.5 minutes, so 6 minutes left is not finished
        assert!(!is_finished(mins(84.0), mins(90.0)));
        assert!(is_finished(mins(86.0), mins(90.0)));
    }

    #[test]
    fn test_record_progress_recomputes_finished() {
        let now = Utc::now();
        let mut record = HistoryRecord::new("ep1", mins(1.0), mins(30.0), now);
        assert!(!record.is_finished());

        let later = now + chrono::Duration::minutes(30);
        record.record_progress(mins(29.5), mins(30.0), later);
        assert!(record.is_finished());
        assert_eq!(record.last_watched(), later);

        record.record_progress(mins(2.0), mins(30.0), later);
        assert!(!record.is_finished());
    }

    #[test]
    fn test_normalized_ignores_stored_flag() {
        let json = r#"{
            "id": "ep1",
            "lastPosition": 10.0,
            "duration": 3000.0,
            "isFinished": true,
            "lastWatched": "2025-01-01T00:00:00Z"
        }"#;
        let record: HistoryRecord = serde_json::from_str(json).unwrap();
        assert!(record.is_finished());
        assert!(!record.normalized().is_finished());
    }

    #[test]
    fn test_progress_is_clamped() {
        let now = Utc::now();
        assert_eq!(HistoryRecord::new("a", 50.0, 0.0, now).progress(), 0.0);
        assert_eq!(HistoryRecord::new("a", 150.0, 100.0, now).progress(), 1.0);
        assert_eq!(HistoryRecord::new("a", 25.0, 100.0, now).progress(), 0.25);
    }
}
