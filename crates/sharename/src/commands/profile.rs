//! Profile command handlers.

use std::path::Path;

use sharename_api::ApiClient;
use sharename_api::models::{CompanyDetails, PersonalDetails, ProfilePicture, PublicProfile};

use crate::cli::{CompanyFields, GlobalOpts, PersonalFields, ProfileArgs, ProfileCommand};
use crate::error::CliError;
use crate::output;

use super::{auth, util};

// ── Detail views ────────────────────────────────────────────────────

fn personal_detail(p: &PersonalDetails) -> String {
    output::detail_lines(&[
        ("First name", p.first_name.clone()),
        ("Last name", p.last_name.clone()),
        ("Born", p.date_of_birth.clone()),
        ("Phone", p.phone.clone()),
        ("Address", p.address.clone()),
        ("Country", p.country.clone()),
        ("Bio", p.bio.clone()),
        ("Public", p.is_public_profile.map(|v| v.to_string())),
        ("Complete", Some(p.profile_completed.to_string())),
    ])
}

fn company_detail(c: &CompanyDetails) -> String {
    output::detail_lines(&[
        ("Name", c.company_name.clone()),
        ("Industry", c.company_industry.clone()),
        ("Size", c.company_size.clone()),
        ("Founded", c.company_founded.map(|y| y.to_string())),
        ("Phone", c.company_phone.clone()),
        ("Address", c.company_address.clone()),
        ("Country", c.company_country.clone()),
        ("Website", c.company_website.clone()),
        ("About", c.company_description.clone()),
        ("Complete", Some(c.profile_completed.to_string())),
    ])
}

fn public_detail(p: &PublicProfile) -> String {
    let mut out = output::detail_lines(&[
        ("Name", Some(p.display_name.clone())),
        ("Email", Some(p.email.clone())),
        ("Role", Some(p.role.to_string())),
        ("Bio", p.bio.clone()),
    ]);
    for ctx in &p.public_contexts {
        out.push_str(&format!(
            "\n  [{}] {}  {}",
            ctx.id,
            ctx.label,
            util::full_name(ctx.given.as_deref(), ctx.family.as_deref())
        ));
    }
    out
}

// ── Field mapping ───────────────────────────────────────────────────

impl From<PersonalFields> for PersonalDetails {
    fn from(f: PersonalFields) -> Self {
        Self {
            first_name: f.first_name,
            last_name: f.last_name,
            date_of_birth: f.date_of_birth,
            phone: f.phone,
            address: f.address,
            country: f.country,
            bio: f.bio,
            is_public_profile: f.public,
            ..Self::default()
        }
    }
}

impl From<CompanyFields> for CompanyDetails {
    fn from(f: CompanyFields) -> Self {
        Self {
            company_name: f.name,
            company_industry: f.industry,
            company_size: f.size,
            company_founded: f.founded,
            company_phone: f.phone,
            company_address: f.address,
            company_country: f.country,
            company_website: f.website,
            company_description: f.description,
            profile_completed: false,
        }
    }
}

async fn read_picture(path: &Path) -> Result<ProfilePicture, CliError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::Validation {
            field: "picture".into(),
            reason: format!("{} is not a file", path.display()),
        })?;
    let bytes = tokio::fs::read(path).await?;
    Ok(ProfilePicture { file_name, bytes })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(client: &ApiClient, args: ProfileArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ProfileCommand::Show => auth::whoami(client, global).await,

        ProfileCommand::Public { user_id } => {
            let profile = client.public_profile(user_id).await?;
            let out = output::render_single(&global.output, &profile, public_detail, |p| {
                p.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfileCommand::Personal => {
            util::require_session(client)?;
            let details = client.personal_details().await?;
            let out = output::render_single(&global.output, &details, personal_detail, |p| {
                util::full_name(p.first_name.as_deref(), p.last_name.as_deref())
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfileCommand::SetPersonal(mut fields) => {
            util::require_session(client)?;
            let picture = match fields.picture.take() {
                Some(path) => Some(read_picture(&path).await?),
                None => None,
            };
            let details = PersonalDetails::from(fields);
            let updated = match picture {
                Some(picture) => {
                    client
                        .update_personal_details_with_picture(&details, picture)
                        .await?
                }
                None => client.update_personal_details(&details).await?,
            };
            output::notice("✓ Personal details saved", global.quiet);
            if !updated.profile_completed {
                output::notice("  Profile is still incomplete", global.quiet);
            }
            Ok(())
        }

        ProfileCommand::Company => {
            util::require_session(client)?;
            let details = client.company_details().await?;
            let out = output::render_single(&global.output, &details, company_detail, |c| {
                util::or_dash(c.company_name.as_deref())
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfileCommand::SetCompany(fields) => {
            util::require_session(client)?;
            let updated = client.update_company_details(&fields.into()).await?;
            output::notice("✓ Company details saved", global.quiet);
            if !updated.profile_completed {
                output::notice("  Profile is still incomplete", global.quiet);
            }
            Ok(())
        }
    }
}
