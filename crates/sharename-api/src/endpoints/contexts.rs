// Context endpoints
//
// CRUD over the caller's contexts plus the archive. Expiry and archiving
// are decided server-side; `check_expired_contexts` only asks the backend
// to run that pass now.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Ack, Context, ContextInput};

impl ApiClient {
    /// `GET contexts/`
    pub async fn list_contexts(&self) -> Result<Vec<Context>, Error> {
        self.get_list("contexts/").await
    }

    /// `GET contexts/{id}/`
    pub async fn get_context(&self, id: i64) -> Result<Context, Error> {
        self.get_data(&format!("contexts/{id}/")).await
    }

    /// `POST contexts/`
    pub async fn create_context(&self, input: &ContextInput) -> Result<Context, Error> {
        debug!(label = ?input.label, "creating context");
        self.post_data("contexts/", input).await
    }

    /// `PATCH contexts/{id}/`
    pub async fn update_context(&self, id: i64, input: &ContextInput) -> Result<Context, Error> {
        self.patch_data(&format!("contexts/{id}/"), input).await
    }

    /// `DELETE contexts/{id}/`
    pub async fn delete_context(&self, id: i64) -> Result<(), Error> {
        debug!(id, "deleting context");
        self.delete(&format!("contexts/{id}/")).await?;
        Ok(())
    }

    /// `GET contexts/archived/`
    pub async fn list_archived_contexts(&self) -> Result<Vec<Context>, Error> {
        self.get_list("contexts/archived/").await
    }

    /// `DELETE contexts/archived/{id}/`
    pub async fn delete_archived_context(&self, id: i64) -> Result<(), Error> {
        self.delete(&format!("contexts/archived/{id}/")).await?;
        Ok(())
    }

    /// Ask the backend to archive contexts whose codes have all expired.
    ///
    /// `POST check-expired-contexts/`
    pub async fn check_expired_contexts(&self) -> Result<Ack, Error> {
        let resp = self.post_empty("check-expired-contexts/").await?;
        let message = resp.payload.message_or("").to_owned();
        let mut ack: Ack = resp.deserialize().unwrap_or_default();
        if ack.message.is_none() && !message.is_empty() {
            ack.message = Some(message);
        }
        Ok(ack)
    }
}
