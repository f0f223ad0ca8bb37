pub mod dialog;
pub mod last_seen;
pub mod pairing_overlay;
pub mod status_indicator;
