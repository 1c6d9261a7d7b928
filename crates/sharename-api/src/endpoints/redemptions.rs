// Redemption endpoints

use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Ack, CompanyRedemption, Redemption};

impl ApiClient {
    /// Redemptions of the caller's contexts.
    ///
    /// `GET redemptions/`
    pub async fn list_redemptions(&self) -> Result<Vec<Redemption>, Error> {
        self.get_list("redemptions/").await
    }

    /// Contexts the calling company has redeemed.
    ///
    /// `GET company-redemptions/`
    pub async fn list_company_redemptions(&self) -> Result<Vec<CompanyRedemption>, Error> {
        self.get_list("company-redemptions/").await
    }

    /// `DELETE company-redemptions/{id}/`
    pub async fn delete_company_redemption(&self, id: i64) -> Result<(), Error> {
        self.delete(&format!("company-redemptions/{id}/")).await?;
        Ok(())
    }

    /// Withdraw a company's access granted by one redemption.
    ///
    /// `POST revoke-access/`
    pub async fn revoke_access(&self, audit_id: i64) -> Result<Ack, Error> {
        debug!(audit_id, "revoking access");
        self.post_data("revoke-access/", &json!({ "audit_id": audit_id }))
            .await
    }
}
