//! User search.

use sharename_api::models::UserSearchResult;
use sharename_api::{ApiClient, Role};
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: Role,
}

impl From<&UserSearchResult> for UserRow {
    fn from(u: &UserSearchResult) -> Self {
        Self {
            id: u.id,
            name: u.display_name.clone(),
            email: u.email.clone(),
            role: u.role,
        }
    }
}

pub async fn handle(client: &ApiClient, query: &str, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_session(client)?;

    let results = client.search_users(query).await?;
    let out = output::render_list(&global.output, &results, |u| UserRow::from(u), |u| u.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
