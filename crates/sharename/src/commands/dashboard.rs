//! Role-aware dashboard: loads every list in parallel and prints a summary.
//! Lists that fail are reported but do not hide the rest.

use sharename_api::{ApiClient, Role, SessionKey};
use sharename_core::dashboard::{self, CompanyDashboard, IndividualDashboard};
use sharename_core::MultiState;

use crate::cli::{DashboardArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(client: &ApiClient, args: DashboardArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_session(client)?;

    let role = client
        .session()
        .get(SessionKey::Role)
        .and_then(|r| r.parse::<Role>().ok())
        .unwrap_or_default();

    let resource = match role {
        Role::Individual => dashboard::individual_dashboard(client),
        Role::Company => dashboard::company_dashboard(client),
    };
    let state = if args.check_expired {
        dashboard::refresh_with_expiry_check(client, &resource).await
    } else {
        resource.fetch_all().await
    };

    // A 401 on any list has already cleared the stored session.
    if let Some(err) = state.errors.values().find(|e| e.is_session_expired()) {
        return Err(CliError::SessionExpired {
            message: err.user_message(),
        });
    }
    report_errors(&state, global);

    let out = match role {
        Role::Individual => {
            let view = IndividualDashboard::from_state(&state);
            output::render_single(&global.output, &view, individual_summary, individual_summary)?
        }
        Role::Company => {
            let view = CompanyDashboard::from_state(&state);
            output::render_single(&global.output, &view, company_summary, company_summary)?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

fn report_errors(state: &MultiState, global: &GlobalOpts) {
    for (key, err) in &state.errors {
        output::notice(&format!("! {key}: {}", err.user_message()), global.quiet);
    }
}

fn individual_summary(d: &IndividualDashboard) -> String {
    let name = d.profile.as_ref().map(sharename_api::models::Profile::display_name);
    output::detail_lines(&[
        ("Signed in", name),
        ("Contexts", Some(d.contexts.len().to_string())),
        ("Archived", Some(d.archived.len().to_string())),
        ("Redemptions", Some(d.redemptions.len().to_string())),
        ("Pending consent", Some(d.pending_consent().to_string())),
        (
            "Unread",
            Some(dashboard::unread_count(&d.notifications).to_string()),
        ),
    ])
}

fn company_summary(d: &CompanyDashboard) -> String {
    let name = d.profile.as_ref().map(sharename_api::models::Profile::display_name);
    output::detail_lines(&[
        ("Signed in", name),
        ("Redeemed contexts", Some(d.redemptions.len().to_string())),
        ("Awaiting consent", Some(d.pending_requests.len().to_string())),
        (
            "Unread",
            Some(dashboard::unread_count(&d.notifications).to_string()),
        ),
    ])
}
