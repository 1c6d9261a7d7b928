// Wire models for the sharename backend
//
// Field names follow the backend's JSON. Everything the backend may omit is
// defaulted so one missing column never fails a whole list.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::Role;

// ── Auth ─────────────────────────────────────────────────────────────

/// Access/refresh pair from `token/`, `token/refresh/`, and `register/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    /// Absent from `token/refresh/` unless rotation is enabled.
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

// ── Profile ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_completed: bool,
    pub is_public_profile: bool,
}

impl Profile {
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() { self.email.clone() } else { name }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicContext {
    pub id: i64,
    pub label: String,
    pub given: Option<String>,
    pub family: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicProfile {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub role: Role,
    pub public_contexts: Vec<PublicContext>,
}

/// Personal details. Updates are partial: `None` fields are not sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public_profile: Option<bool>,
    #[serde(skip_serializing)]
    pub profile_completed: bool,
}

/// An image sent as `profile_picture` with a personal details update.
#[derive(Debug, Clone)]
pub struct ProfilePicture {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ProfilePicture {
    /// Content type guessed from the file extension.
    pub fn mime_type(&self) -> &'static str {
        let ext = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "application/octet-stream",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_founded: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_description: Option<String>,
    #[serde(skip_serializing)]
    pub profile_completed: bool,
}

// ── Contexts ─────────────────────────────────────────────────────────

/// Who may read a context's data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Code,
    /// Redemption requires the owner's approval.
    Consent,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Code => "code",
            Self::Consent => "consent",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareCodeSummary {
    pub id: i64,
    pub code: String,
    pub expires_at: Option<String>,
    /// Epoch seconds.
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    pub id: i64,
    pub label: String,
    pub visibility: Visibility,
    pub given: Option<String>,
    pub family: Option<String>,
    pub created_at: Option<String>,
    pub notify_on_redeem: bool,
    pub auto_archive_expired: bool,
    pub archived: bool,
    pub archived_at: Option<String>,
    pub share_codes: Vec<ShareCodeSummary>,
}

/// Body for `POST contexts/` and `PATCH contexts/{id}/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContextInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_on_redeem: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_archive_expired: Option<bool>,
}

// ── Share codes ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareCode {
    pub code: String,
    pub expires_at: Option<String>,
    pub revoked: bool,
    pub context_id: Option<i64>,
}

/// Contact data released by a successful redemption.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedeemedContext {
    pub given: Option<String>,
    pub family: Option<String>,
    pub label: String,
    pub visibility: Visibility,
    pub expires_at: Option<String>,
}

// ── Redemptions ──────────────────────────────────────────────────────

/// A redemption of one of the caller's contexts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Redemption {
    pub id: i64,
    pub context_label: String,
    pub context_given: Option<String>,
    pub context_family: Option<String>,
    pub company_name: Option<String>,
    pub redeemed_at: Option<String>,
    pub expires_at: Option<String>,
    pub visibility: Visibility,
}

/// A context a company has redeemed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyRedemption {
    pub id: i64,
    pub name: String,
    /// Context label.
    pub context: String,
    pub redeemed_at: Option<String>,
    pub code: Option<String>,
    pub expires_at: Option<String>,
    pub visibility: Visibility,
}

// ── Consent ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentStatus {
    #[default]
    Pending,
    Approved,
    Denied,
}

impl ConsentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for ConsentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsentRequest {
    pub id: i64,
    pub context: Option<i64>,
    pub context_label: String,
    pub context_owner: Option<String>,
    pub requester: Option<i64>,
    pub requester_name: Option<String>,
    pub status: ConsentStatus,
    pub message: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

// ── Notifications ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Redemption,
    ConsentRequest,
    ConsentApproved,
    ConsentDenied,
    AccessRevoked,
    ContextExpired,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Notification {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub context: Option<i64>,
    pub context_label: Option<String>,
    pub read: bool,
    pub created_at: Option<String>,
}

// ── Search ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSearchResult {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub profile_picture: Option<String>,
}

// ── Misc ─────────────────────────────────────────────────────────────

/// Bodies that are only a `{message}` acknowledgement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ack {
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn context_tolerates_missing_fields() {
        let ctx: Context = serde_json::from_value(json!({
            "id": 7,
            "label": "Work",
            "visibility": "consent",
            "share_codes": [{"id": 1, "code": "ABC123", "created_at": 1_700_000_000}]
        }))
        .expect("context");
        assert_eq!(ctx.visibility, Visibility::Consent);
        assert_eq!(ctx.share_codes[0].code, "ABC123");
        assert!(!ctx.archived);
        assert_eq!(ctx.given, None);
    }

    #[test]
    fn unknown_notification_type_maps_to_other() {
        let n: Notification = serde_json::from_value(json!({
            "id": 3,
            "type": "something_new",
            "title": "t",
            "message": "m"
        }))
        .expect("notification");
        assert_eq!(n.kind, NotificationKind::Other);

        let n: Notification =
            serde_json::from_value(json!({"id": 4, "type": "consent_request"})).expect("n");
        assert_eq!(n.kind, NotificationKind::ConsentRequest);
    }

    #[test]
    fn partial_updates_skip_unset_fields() {
        let body = serde_json::to_value(ContextInput {
            label: Some("Home".into()),
            ..ContextInput::default()
        })
        .expect("serialize");
        assert_eq!(body, json!({"label": "Home"}));

        let body = serde_json::to_value(PersonalDetails {
            phone: Some("555".into()),
            profile_completed: true,
            ..PersonalDetails::default()
        })
        .expect("serialize");
        assert_eq!(body, json!({"phone": "555"}));
    }

    #[test]
    fn profile_display_name_falls_back_to_email() {
        let mut profile = Profile {
            email: "a@b.test".into(),
            ..Profile::default()
        };
        assert_eq!(profile.display_name(), "a@b.test");
        profile.first_name = Some("Ada".into());
        profile.last_name = Some("Lovelace".into());
        assert_eq!(profile.display_name(), "Ada Lovelace");
    }
}
