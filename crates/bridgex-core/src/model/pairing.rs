use chrono::{DateTime, Utc};
use serde::Serialize;

use bridgex_api::PairResponse;

use super::device::id_prefix;

/// How the pairing overlay presents the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CredentialDisplay {
    /// Image-embeddable payload, exactly as the backend sent it.
    Image { payload: String },
    /// No payload; show the first eight characters of the device id.
    Fallback { id_prefix: String },
    /// Neither payload nor id.
    Placeholder,
}

impl CredentialDisplay {
    /// Interpret a pairing grant. A payload wins over an id.
    pub fn from_grant(grant: &PairResponse) -> Self {
        let non_empty = |field: &Option<String>| {
            field
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        if let Some(payload) = non_empty(&grant.qr_data) {
            return Self::Image { payload };
        }
        match non_empty(&grant.device_id) {
            Some(id) => Self::Fallback {
                id_prefix: id_prefix(&id).to_owned(),
            },
            None => Self::Placeholder,
        }
    }
}

/// The open pairing overlay. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairingSession {
    pub requested_device_name: String,
    pub resulting_device_id: Option<String>,
    pub credential: CredentialDisplay,
    pub expires_at: Option<DateTime<Utc>>,
}

impl PairingSession {
    pub fn new(requested_device_name: impl Into<String>, grant: PairResponse) -> Self {
        let credential = CredentialDisplay::from_grant(&grant);
        Self {
            requested_device_name: requested_device_name.into(),
            resulting_device_id: grant.device_id.filter(|id| !id.is_empty()),
            credential,
            expires_at: grant.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(device_id: Option<&str>, qr_data: Option<&str>) -> PairResponse {
        PairResponse {
            device_id: device_id.map(Into::into),
            qr_data: qr_data.map(Into::into),
            ..PairResponse::default()
        }
    }

    #[test]
    fn payload_is_kept_verbatim() {
        let display = CredentialDisplay::from_grant(&grant(
            Some("dev-42"),
            Some("data:image/png;base64,AAAA"),
        ));
        assert_eq!(
            display,
            CredentialDisplay::Image {
                payload: "data:image/png;base64,AAAA".into()
            }
        );
    }

    #[test]
    fn missing_payload_falls_back_to_id_prefix() {
        let display = CredentialDisplay::from_grant(&grant(Some("dev-42-0000-ffff"), None));
        assert_eq!(
            display,
            CredentialDisplay::Fallback {
                id_prefix: "dev-42-0".into()
            }
        );
    }

    #[test]
    fn empty_payload_counts_as_missing() {
        let display = CredentialDisplay::from_grant(&grant(Some("dev-42"), Some("")));
        assert_eq!(
            display,
            CredentialDisplay::Fallback {
                id_prefix: "dev-42".into()
            }
        );
    }

    #[test]
    fn nothing_usable_gives_placeholder() {
        assert_eq!(
            CredentialDisplay::from_grant(&grant(None, None)),
            CredentialDisplay::Placeholder
        );
        let session = PairingSession::new("Desktop", grant(Some(""), None));
        assert_eq!(session.credential, CredentialDisplay::Placeholder);
        assert!(session.resulting_device_id.is_none());
    }
}
