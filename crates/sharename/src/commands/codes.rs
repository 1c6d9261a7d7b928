//! Share code command handlers.

use std::path::Path;

use image::{ImageFormat, Luma};
use qrcode::QrCode;
use qrcode::render::{svg, unicode};
use sharename_api::ApiClient;
use sharename_api::models::RedeemedContext;

use crate::cli::{CodesArgs, CodesCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

fn redeemed_detail(r: &RedeemedContext) -> String {
    output::detail_lines(&[
        ("Label", Some(r.label.clone())),
        ("Name", Some(util::full_name(r.given.as_deref(), r.family.as_deref()))),
        ("Visibility", Some(r.visibility.to_string())),
        ("Expires", r.expires_at.clone()),
    ])
}

// ── QR codes ────────────────────────────────────────────────────────

const QR_SIZE: u32 = 256;

fn qr_code(code: &str) -> Result<QrCode, CliError> {
    QrCode::new(code.as_bytes()).map_err(|e| CliError::QrCode {
        reason: e.to_string(),
    })
}

/// Block-character QR code for a terminal with a dark background.
fn qr_for_terminal(code: &str) -> Result<String, CliError> {
    Ok(qr_code(code)?
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}

/// Write the QR code to `path`: SVG for a `.svg` extension, PNG otherwise.
fn save_qr(code: &str, path: &Path) -> Result<(), CliError> {
    let qr = qr_code(code)?;
    let is_svg = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    if is_svg {
        let svg = qr
            .render::<svg::Color<'_>>()
            .min_dimensions(QR_SIZE, QR_SIZE)
            .build();
        std::fs::write(path, svg)?;
        return Ok(());
    }

    qr.render::<Luma<u8>>()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .build()
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| CliError::QrCode {
            reason: format!("{}: {e}", path.display()),
        })
}

pub async fn handle(client: &ApiClient, args: CodesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_session(client)?;

    match args.command {
        CodesCommand::Create {
            context_id,
            qr,
            save_qr: save_to,
        } => {
            let code = client.create_share_code(context_id).await?;
            let out = output::render_single(
                &global.output,
                &code,
                |c| {
                    output::detail_lines(&[
                        ("Code", Some(c.code.clone())),
                        ("Expires", c.expires_at.clone()),
                    ])
                },
                |c| c.code.clone(),
            )?;
            output::print_output(&out, global.quiet);

            if qr && matches!(global.output, OutputFormat::Table) {
                output::print_output(&qr_for_terminal(&code.code)?, global.quiet);
            }
            if let Some(path) = save_to {
                save_qr(&code.code, &path)?;
                output::notice(&format!("✓ QR code saved to {}", path.display()), global.quiet);
            }
            Ok(())
        }

        CodesCommand::Redeem { code } => {
            if code.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "code".into(),
                    reason: "share code cannot be empty".into(),
                });
            }
            let redeemed = client.redeem_code(&code).await?;
            let out = output::render_single(&global.output, &redeemed, redeemed_detail, |r| {
                r.label.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CodesCommand::RedeemId { context_id } => {
            let redeemed = client.redeem_by_id(context_id).await?;
            let out = output::render_single(&global.output, &redeemed, redeemed_detail, |r| {
                r.label.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
