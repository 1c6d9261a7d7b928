//! Redemption command handlers.

use sharename_api::ApiClient;
use sharename_api::models::{CompanyRedemption, Redemption, Visibility};
use tabled::Tabled;

use crate::cli::{GlobalOpts, RedemptionsArgs, RedemptionsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct RedemptionRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Context")]
    context: String,
    #[tabled(rename = "Redeemed by")]
    company: String,
    #[tabled(rename = "At")]
    redeemed_at: String,
    #[tabled(rename = "Expires")]
    expires_at: String,
}

impl From<&Redemption> for RedemptionRow {
    fn from(r: &Redemption) -> Self {
        Self {
            id: r.id,
            context: r.context_label.clone(),
            company: util::or_dash(r.company_name.as_deref()),
            redeemed_at: util::or_dash(r.redeemed_at.as_deref()),
            expires_at: util::or_dash(r.expires_at.as_deref()),
        }
    }
}

#[derive(Tabled)]
struct CompanyRedemptionRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Context")]
    context: String,
    #[tabled(rename = "Visibility")]
    visibility: Visibility,
    #[tabled(rename = "Expires")]
    expires_at: String,
}

impl From<&CompanyRedemption> for CompanyRedemptionRow {
    fn from(r: &CompanyRedemption) -> Self {
        Self {
            id: r.id,
            name: r.name.clone(),
            context: r.context.clone(),
            visibility: r.visibility,
            expires_at: util::or_dash(r.expires_at.as_deref()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &ApiClient,
    args: RedemptionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::require_session(client)?;

    match args.command {
        RedemptionsCommand::List => {
            let list = client.list_redemptions().await?;
            let out = output::render_list(&global.output, &list, |r| RedemptionRow::from(r), |r| {
                r.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RedemptionsCommand::Company => {
            let list = client.list_company_redemptions().await?;
            let out = output::render_list(&global.output, &list, |r| CompanyRedemptionRow::from(r), |r| {
                r.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RedemptionsCommand::Delete { id } => {
            if !util::confirm(&format!("Remove redeemed context {id} from your list?"), global.yes)? {
                return Ok(());
            }
            client.delete_company_redemption(id).await?;
            output::notice(&format!("✓ Redemption {id} removed"), global.quiet);
            Ok(())
        }

        RedemptionsCommand::Revoke { audit_id } => {
            if !util::confirm(
                &format!("Revoke access for redemption {audit_id}? This cannot be undone."),
                global.yes,
            )? {
                return Ok(());
            }
            let ack = client.revoke_access(audit_id).await?;
            output::notice(
                ack.message.as_deref().unwrap_or("Access revoked"),
                global.quiet,
            );
            Ok(())
        }
    }
}
