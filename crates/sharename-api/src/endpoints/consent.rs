// Consent workflow endpoints
//
// Owners approve or deny requests on their consent-gated contexts;
// requesters create them by context id or by share code.

use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Ack, ConsentRequest, ConsentStatus};

impl ApiClient {
    /// Requests on the caller's contexts, newest first.
    ///
    /// `GET consent-requests/`
    pub async fn list_consent_requests(&self) -> Result<Vec<ConsentRequest>, Error> {
        self.get_list("consent-requests/").await
    }

    /// `GET consent-requests/{id}/`
    pub async fn get_consent_request(&self, id: i64) -> Result<ConsentRequest, Error> {
        self.get_data(&format!("consent-requests/{id}/")).await
    }

    /// Approve or deny a request.
    ///
    /// `PATCH consent-requests/{id}/`
    pub async fn update_consent_request(
        &self,
        id: i64,
        status: ConsentStatus,
    ) -> Result<ConsentRequest, Error> {
        debug!(id, %status, "updating consent request");
        self.patch_data(
            &format!("consent-requests/{id}/"),
            &json!({ "status": status }),
        )
        .await
    }

    /// `POST consent-requests/create/`
    pub async fn request_consent(
        &self,
        context_id: i64,
        message: Option<&str>,
    ) -> Result<ConsentRequest, Error> {
        self.post_data(
            "consent-requests/create/",
            &json!({ "context": context_id, "message": message.unwrap_or_default() }),
        )
        .await
    }

    /// Ask for access to the context behind a consent-gated share code.
    ///
    /// `POST consent-request-by-code/`
    pub async fn request_consent_by_code(
        &self,
        code: &str,
        message: Option<&str>,
    ) -> Result<Ack, Error> {
        self.post_data(
            "consent-request-by-code/",
            &json!({ "code": code.trim(), "message": message.unwrap_or_default() }),
        )
        .await
    }

    /// Requests the calling company is still waiting on.
    ///
    /// `GET company-pending-requests/`
    pub async fn list_company_pending_requests(&self) -> Result<Vec<ConsentRequest>, Error> {
        self.get_list("company-pending-requests/").await
    }
}
