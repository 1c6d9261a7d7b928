//! Consent request command handlers.

use sharename_api::ApiClient;
use sharename_api::models::{ConsentRequest, ConsentStatus};
use tabled::Tabled;

use crate::cli::{ConsentArgs, ConsentCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ConsentRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Context")]
    context: String,
    #[tabled(rename = "Requester")]
    requester: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Requested")]
    created_at: String,
}

impl ConsentRow {
    fn new(r: &ConsentRequest, color: bool) -> Self {
        Self {
            id: r.id,
            context: r.context_label.clone(),
            requester: util::or_dash(r.requester_name.as_deref().or(r.context_owner.as_deref())),
            status: output::status_label(r.status, color),
            message: util::or_dash(r.message.as_deref()),
            created_at: util::or_dash(r.created_at.as_deref()),
        }
    }
}

fn detail(r: &ConsentRequest) -> String {
    output::detail_lines(&[
        ("ID", Some(r.id.to_string())),
        ("Context", Some(r.context_label.clone())),
        ("Owner", r.context_owner.clone()),
        ("Requester", r.requester_name.clone()),
        ("Status", Some(r.status.to_string())),
        ("Message", r.message.clone()),
        ("Requested", r.created_at.clone()),
        ("Updated", r.updated_at.clone()),
    ])
}

fn print_requests(requests: &[ConsentRequest], global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        requests,
        |r| ConsentRow::new(r, color),
        |r| r.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(client: &ApiClient, args: ConsentArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_session(client)?;

    match args.command {
        ConsentCommand::List { status } => {
            let mut requests = client.list_consent_requests().await?;
            if let Some(status) = status.map(ConsentStatus::from) {
                requests.retain(|r| r.status == status);
            }
            print_requests(&requests, global)
        }

        ConsentCommand::Get { id } => {
            let request = client.get_consent_request(id).await?;
            let out = output::render_single(&global.output, &request, detail, |r| r.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConsentCommand::Approve { id } => answer(client, id, ConsentStatus::Approved, global).await,
        ConsentCommand::Deny { id } => answer(client, id, ConsentStatus::Denied, global).await,

        ConsentCommand::Request { context_id, message } => {
            let request = client.request_consent(context_id, message.as_deref()).await?;
            output::notice(
                &format!("✓ Consent requested for '{}' (request {})", request.context_label, request.id),
                global.quiet,
            );
            Ok(())
        }

        ConsentCommand::RequestCode { code, message } => {
            let ack = client.request_consent_by_code(&code, message.as_deref()).await?;
            output::notice(
                ack.message.as_deref().unwrap_or("Consent request sent"),
                global.quiet,
            );
            Ok(())
        }

        ConsentCommand::Pending => {
            let requests = client.list_company_pending_requests().await?;
            print_requests(&requests, global)
        }
    }
}

async fn answer(
    client: &ApiClient,
    id: i64,
    status: ConsentStatus,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let updated = client.update_consent_request(id, status).await?;
    output::notice(
        &format!("✓ Request {id} for '{}' {}", updated.context_label, updated.status),
        global.quiet,
    );
    Ok(())
}
