// User search

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::UserSearchResult;

impl ApiClient {
    /// Search public profiles. A blank query returns nothing without a
    /// request.
    ///
    /// `GET search/users/?q=`
    pub async fn search_users(&self, query: &str) -> Result<Vec<UserSearchResult>, Error> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.get_with_params("search/users/", &[("q", query.to_owned())])
            .await?
            .into_list()
    }
}
