//! Context command handlers.

use sharename_api::ApiClient;
use sharename_api::models::{Context, ContextInput, Visibility};
use tabled::Tabled;

use crate::cli::{ContextFields, ContextsArgs, ContextsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ContextRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Visibility")]
    visibility: Visibility,
    #[tabled(rename = "Codes")]
    codes: usize,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Context> for ContextRow {
    fn from(c: &Context) -> Self {
        Self {
            id: c.id,
            label: c.label.clone(),
            name: util::full_name(c.given.as_deref(), c.family.as_deref()),
            visibility: c.visibility,
            codes: c.share_codes.len(),
            created: util::or_dash(c.created_at.as_deref()),
        }
    }
}

fn detail(c: &Context) -> String {
    let mut out = output::detail_lines(&[
        ("ID", Some(c.id.to_string())),
        ("Label", Some(c.label.clone())),
        ("Given", c.given.clone()),
        ("Family", c.family.clone()),
        ("Visibility", Some(c.visibility.to_string())),
        ("Notify", Some(c.notify_on_redeem.to_string())),
        ("Auto-archive", Some(c.auto_archive_expired.to_string())),
        ("Created", c.created_at.clone()),
        ("Archived", c.archived_at.clone()),
    ]);
    for code in &c.share_codes {
        out.push_str(&format!(
            "\n  code {}  expires {}",
            code.code,
            util::or_dash(code.expires_at.as_deref())
        ));
    }
    out
}

fn input(label: Option<String>, fields: ContextFields) -> ContextInput {
    ContextInput {
        label,
        visibility: fields.visibility.map(Visibility::from),
        given: fields.given,
        family: fields.family,
        notify_on_redeem: fields.notify_on_redeem,
        auto_archive_expired: fields.auto_archive,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &ApiClient,
    args: ContextsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::require_session(client)?;

    match args.command {
        ContextsCommand::List { archived } => {
            let contexts = if archived {
                client.list_archived_contexts().await?
            } else {
                client.list_contexts().await?
            };
            let out = output::render_list(
                &global.output,
                &contexts,
                |c| ContextRow::from(c),
                |c| c.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ContextsCommand::Get { id } => {
            let context = client.get_context(id).await?;
            let out = output::render_single(&global.output, &context, detail, |c| c.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ContextsCommand::Create { label, fields } => {
            if label.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "label".into(),
                    reason: "label cannot be empty".into(),
                });
            }
            let created = client.create_context(&input(Some(label), fields)).await?;
            output::notice(&format!("✓ Context '{}' created (id {})", created.label, created.id), global.quiet);
            Ok(())
        }

        ContextsCommand::Update { id, label, fields } => {
            let updated = client.update_context(id, &input(label, fields)).await?;
            output::notice(&format!("✓ Context '{}' updated", updated.label), global.quiet);
            Ok(())
        }

        ContextsCommand::Delete { id, archived } => {
            if !util::confirm(&format!("Delete context {id}? Codes issued for it stop working."), global.yes)? {
                return Ok(());
            }
            if archived {
                client.delete_archived_context(id).await?;
            } else {
                client.delete_context(id).await?;
            }
            output::notice(&format!("✓ Context {id} deleted"), global.quiet);
            Ok(())
        }

        ContextsCommand::CheckExpired => {
            let ack = client.check_expired_contexts().await?;
            output::notice(
                ack.message.as_deref().unwrap_or("Expired contexts archived"),
                global.quiet,
            );
            Ok(())
        }
    }
}
