//! Human-friendly "last seen" column text.

use std::time::Duration;

use chrono::{DateTime, Utc};

use bridgex_core::LastSeen;

/// `3m ago`, `2h 5m ago`, or the backend's own label.
pub fn format_last_seen(last_seen: Option<&LastSeen>, now: DateTime<Utc>) -> String {
    match last_seen {
        None => "─".into(),
        Some(LastSeen::Label(label)) => label.clone(),
        Some(LastSeen::At(at)) => {
            let secs = (now - *at).num_seconds();
            if secs < 60 {
                return "just now".into();
            }
            // Round to minutes so the column doesn't tick every second.
            let rounded = Duration::from_secs(secs.unsigned_abs() / 60 * 60);
            format!("{} ago", humantime::format_duration(rounded))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn recent_and_old_instants() {
        let now = Utc::now();
        let recent = LastSeen::At(now - TimeDelta::seconds(20));
        assert_eq!(format_last_seen(Some(&recent), now), "just now");

        let old = LastSeen::At(now - TimeDelta::seconds(2 * 3600 + 5 * 60 + 17));
        assert_eq!(format_last_seen(Some(&old), now), "2h 5m ago");
    }

    #[test]
    fn labels_pass_through() {
        let label = LastSeen::Label("yesterday".into());
        assert_eq!(format_last_seen(Some(&label), Utc::now()), "yesterday");
        assert_eq!(format_last_seen(None, Utc::now()), "─");
    }
}
