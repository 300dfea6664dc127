//! Short-lived credentials issued by the platform
//!
//! Access tokens and JS-API tickets share one shape: an opaque value plus the
//! instant after which it must no longer be presented.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WechatError;

/// Seconds shaved off the server-reported lifetime so a credential is
/// refreshed before in-flight requests can race its real expiry.
pub const EXPIRY_MARGIN_SECS: i64 = 100;

/// An issued access token or JS-API ticket.
///
/// Never mutated: a refresh produces a new `Credential`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Credential {
    /// Build a credential issued now with the server-reported `expires_in`.
    pub fn new(value: impl Into<String>, expires_in: i64) -> Result<Self, WechatError> {
        Self::issued_at(value, expires_in, Utc::now())
    }

    /// Build a credential issued at `now`.
    ///
    /// A lifetime of `EXPIRY_MARGIN_SECS` or less yields a credential that is
    /// already unavailable. A lifetime the clock cannot represent is a
    /// [`WechatError::Decode`].
    pub fn issued_at(
        value: impl Into<String>,
        expires_in: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, WechatError> {
        let expires_at = TimeDelta::try_seconds(expires_in.saturating_sub(EXPIRY_MARGIN_SECS))
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| WechatError::Decode("expires_in out of range".to_string()))?;
        Ok(Self {
            value: value.into(),
            expires_at,
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_available(&self) -> bool {
        self.is_available_at(Utc::now())
    }

    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Serialize for storage in a [`CredentialCache`](crate::cache::CredentialCache).
    pub fn encode(&self) -> Result<String, WechatError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Inverse of [`encode`](Self::encode).
    pub fn decode(raw: &str) -> Result<Self, WechatError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_expiry_subtracts_margin() {
        let credential = Credential::issued_at("T1", 7200, epoch()).unwrap();
        assert_eq!(credential.expires_at(), epoch() + TimeDelta::seconds(7100));
        assert_eq!(credential.value(), "T1");
    }

    #[test]
    fn test_available_until_boundary() {
        let credential = Credential::issued_at("T1", 7200, epoch()).unwrap();
        assert!(credential.is_available_at(epoch()));
        assert!(credential.is_available_at(epoch() + TimeDelta::seconds(7099)));
        assert!(!credential.is_available_at(epoch() + TimeDelta::seconds(7100)));
        assert!(!credential.is_available_at(epoch() + TimeDelta::seconds(7200)));
    }

    #[test]
    fn test_short_lifetime_is_immediately_unavailable() {
        assert!(!Credential::issued_at("T", 100, epoch())
            .unwrap()
            .is_available_at(epoch()));
        assert!(!Credential::issued_at("T", 30, epoch())
            .unwrap()
            .is_available_at(epoch()));
        assert!(Credential::issued_at("T", 101, epoch())
            .unwrap()
            .is_available_at(epoch()));
    }

    #[test]
    fn test_unrepresentable_lifetime_is_rejected() {
        for expires_in in [i64::MAX, i64::MIN, 1 << 50] {
            assert!(matches!(
                Credential::issued_at("T", expires_in, epoch()),
                Err(WechatError::Decode(ref m)) if m == "expires_in out of range"
            ));
        }
        assert!(matches!(
            Credential::new("T", i64::MAX),
            Err(WechatError::Decode(_))
        ));
    }

    #[test]
    fn test_fresh_credential_is_available() {
        assert!(Credential::new("T1", 7200).unwrap().is_available());
    }

    #[test]
    fn test_encode_decode_preserves_expiry() {
        let credential = Credential::issued_at("ticket_abc", 7200, epoch()).unwrap();
        let raw = credential.encode().unwrap();
        assert!(raw.contains("ticket_abc"));
        assert_eq!(Credential::decode(&raw).unwrap(), credential);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            Credential::decode("O:11:\"AccessToken\""),
            Err(WechatError::Json(_))
        ));
    }
}
