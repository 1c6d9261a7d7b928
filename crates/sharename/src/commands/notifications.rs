//! Notification command handlers.

use sharename_api::ApiClient;
use sharename_api::models::Notification;
use tabled::Tabled;

use crate::cli::{GlobalOpts, NotificationsArgs, NotificationsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct NotificationRow {
    #[tabled(rename = "")]
    unread: String,
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "At")]
    created_at: String,
}

impl NotificationRow {
    fn new(n: &Notification, color: bool) -> Self {
        Self {
            unread: output::unread_marker(n.read, color),
            id: n.id,
            title: n.title.clone(),
            message: n.message.clone(),
            created_at: util::or_dash(n.created_at.as_deref()),
        }
    }
}

pub async fn handle(
    client: &ApiClient,
    args: NotificationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::require_session(client)?;

    match args.command {
        NotificationsCommand::List { unread } => {
            let mut list = client.list_notifications().await?;
            if unread {
                list.retain(|n| !n.read);
            }
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &list,
                |n| NotificationRow::new(n, color),
                |n| n.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NotificationsCommand::Read { id } => {
            client.mark_notification_read(id).await?;
            output::notice(&format!("✓ Notification {id} marked read"), global.quiet);
            Ok(())
        }

        NotificationsCommand::ReadAll => {
            let count = client.mark_all_notifications_read().await?;
            output::notice(&format!("✓ {count} notification(s) marked read"), global.quiet);
            Ok(())
        }
    }
}
