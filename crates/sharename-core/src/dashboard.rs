// ── Dashboard loaders ──
//
// Keyed endpoint sets for the individual and company dashboards, built on
// `MultiResource` so one failing list never blanks the rest.

use serde::Serialize;
use sharename_api::ApiClient;
use sharename_api::models::{
    CompanyRedemption, ConsentRequest, Context, Notification, Profile, Redemption,
};
use tracing::{debug, warn};

use crate::fetch::{MultiResource, MultiState};

pub const CONTEXTS: &str = "contexts";
pub const ARCHIVED: &str = "archived";
pub const REDEMPTIONS: &str = "redemptions";
pub const CONSENT_REQUESTS: &str = "consent_requests";
pub const COMPANY_REDEMPTIONS: &str = "company_redemptions";
pub const PENDING_REQUESTS: &str = "pending_requests";
pub const NOTIFICATIONS: &str = "notifications";
pub const PROFILE: &str = "profile";

pub fn individual_dashboard(client: &ApiClient) -> MultiResource {
    MultiResource::new(
        client.clone(),
        [
            (CONTEXTS, "contexts/"),
            (REDEMPTIONS, "redemptions/"),
            (CONSENT_REQUESTS, "consent-requests/"),
            (ARCHIVED, "contexts/archived/"),
            (NOTIFICATIONS, "notifications/"),
            (PROFILE, "profile/"),
        ],
    )
}

pub fn company_dashboard(client: &ApiClient) -> MultiResource {
    MultiResource::new(
        client.clone(),
        [
            (COMPANY_REDEMPTIONS, "company-redemptions/"),
            (PENDING_REQUESTS, "company-pending-requests/"),
            (NOTIFICATIONS, "notifications/"),
            (PROFILE, "profile/"),
        ],
    )
}

/// Ask the backend to archive expired contexts, then reload everything.
/// The expiry pass is best-effort; its failure does not stop the reload.
pub async fn refresh_with_expiry_check(client: &ApiClient, dashboard: &MultiResource) -> MultiState {
    match client.check_expired_contexts().await {
        Ok(ack) => debug!(message = ?ack.message, "expiry check done"),
        Err(e) => warn!(error = %e, "expiry check failed, refreshing anyway"),
    }
    dashboard.fetch_all().await
}

// ── Typed views ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct IndividualDashboard {
    pub profile: Option<Profile>,
    pub contexts: Vec<Context>,
    pub archived: Vec<Context>,
    pub redemptions: Vec<Redemption>,
    pub consent_requests: Vec<ConsentRequest>,
    pub notifications: Vec<Notification>,
}

impl IndividualDashboard {
    pub fn from_state(state: &MultiState) -> Self {
        Self {
            profile: state.item(PROFILE),
            contexts: state.list(CONTEXTS),
            archived: state.list(ARCHIVED),
            redemptions: state.list(REDEMPTIONS),
            consent_requests: state.list(CONSENT_REQUESTS),
            notifications: state.list(NOTIFICATIONS),
        }
    }

    pub fn pending_consent(&self) -> usize {
        self.consent_requests
            .iter()
            .filter(|r| r.status == sharename_api::models::ConsentStatus::Pending)
            .count()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CompanyDashboard {
    pub profile: Option<Profile>,
    pub redemptions: Vec<CompanyRedemption>,
    pub pending_requests: Vec<ConsentRequest>,
    pub notifications: Vec<Notification>,
}

impl CompanyDashboard {
    pub fn from_state(state: &MultiState) -> Self {
        Self {
            profile: state.item(PROFILE),
            redemptions: state.list(COMPANY_REDEMPTIONS),
            pending_requests: state.list(PENDING_REQUESTS),
            notifications: state.list(NOTIFICATIONS),
        }
    }
}

/// Unread count across a notification list.
pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}
