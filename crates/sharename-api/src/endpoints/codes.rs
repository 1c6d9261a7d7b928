// Share code endpoints
//
// Issuing codes for the caller's contexts and redeeming someone else's.
// Redeeming a consent-gated context fails with 403 until the owner
// approves; `ConsentRequired` pulls the details out of that failure.

use serde_json::{Value, json};
use tracing::debug;

use crate::client::ApiClient;
use crate::envelope;
use crate::error::Error;
use crate::models::{RedeemedContext, ShareCode};

/// Details of a redemption refused because the context needs consent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentRequired {
    pub context_label: Option<String>,
    pub owner: Option<String>,
}

impl ConsentRequired {
    /// Recognize the consent gate in a 403 from `codes/` or `redeem-by-id/`.
    pub fn from_error(error: &Error) -> Option<Self> {
        if error.status() != Some(403) {
            return None;
        }
        let body = error.body()?;
        let errors = if envelope::is_standardized(body) {
            body.get("errors")?
        } else {
            body
        };
        if !errors
            .get("requires_consent")
            .is_some_and(envelope::truthy)
        {
            return None;
        }
        let text = |key: &str| errors.get(key).and_then(Value::as_str).map(str::to_owned);
        Some(Self {
            context_label: text("context_label"),
            owner: text("owner"),
        })
    }
}

impl ApiClient {
    /// Issue a new share code for one of the caller's contexts.
    ///
    /// `POST sharecodes/`
    pub async fn create_share_code(&self, context_id: i64) -> Result<ShareCode, Error> {
        debug!(context_id, "issuing share code");
        self.post_data("sharecodes/", &json!({ "context_id": context_id }))
            .await
    }

    /// `GET codes/{code}/`
    pub async fn redeem_code(&self, code: &str) -> Result<RedeemedContext, Error> {
        let code = code.trim();
        debug!(code, "redeeming share code");
        let url = self.url_with_segment("codes/", code)?;
        self.get_data(url.as_str()).await
    }

    /// Redeem a public context straight from a profile page.
    ///
    /// `POST redeem-by-id/`
    pub async fn redeem_by_id(&self, context_id: i64) -> Result<RedeemedContext, Error> {
        self.post_data("redeem-by-id/", &json!({ "context_id": context_id }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorInfo;

    fn http(status: u16, body: Value) -> Error {
        Error::Http {
            status,
            info: ErrorInfo::classify(Some(status), Some(&body)),
            body: Some(body),
        }
    }

    #[test]
    fn consent_gate_is_recognized() {
        let err = http(
            403,
            json!({
                "success": false,
                "message": "This context requires consent. You need to request access first.",
                "errors": {"requires_consent": true, "context_label": "Work", "owner": "o@x.test"},
                "timestamp": "2024-01-01T00:00:00Z"
            }),
        );
        let gate = ConsentRequired::from_error(&err).expect("consent gate");
        assert_eq!(gate.context_label.as_deref(), Some("Work"));
        assert_eq!(gate.owner.as_deref(), Some("o@x.test"));
        assert_eq!(
            err.user_message(),
            "This context requires consent. You need to request access first."
        );
    }

    #[test]
    fn other_forbidden_responses_are_not_the_gate() {
        assert!(ConsentRequired::from_error(&http(403, json!({"message": "nope"}))).is_none());
        assert!(
            ConsentRequired::from_error(&http(404, json!({"requires_consent": true}))).is_none()
        );
    }
}
