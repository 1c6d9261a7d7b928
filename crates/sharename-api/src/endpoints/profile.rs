// Profile endpoints

use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{CompanyDetails, PersonalDetails, Profile, ProfilePicture, PublicProfile};

impl ApiClient {
    /// The signed-in account.
    ///
    /// `GET profile/`
    pub async fn my_profile(&self) -> Result<Profile, Error> {
        self.get_data("profile/").await
    }

    /// `GET profile/public/{user_id}/`
    pub async fn public_profile(&self, user_id: i64) -> Result<PublicProfile, Error> {
        self.get_data(&format!("profile/public/{user_id}/")).await
    }

    /// `GET personal-details/`
    pub async fn personal_details(&self) -> Result<PersonalDetails, Error> {
        self.get_data("personal-details/").await
    }

    /// Partial update; unset fields are left alone server-side.
    ///
    /// `PATCH personal-details/`
    pub async fn update_personal_details(
        &self,
        details: &PersonalDetails,
    ) -> Result<PersonalDetails, Error> {
        self.patch_data("personal-details/", details).await
    }

    /// Partial update with a new profile picture, sent as a multipart form.
    /// Unset and empty text fields are left out.
    ///
    /// `PATCH personal-details/`
    pub async fn update_personal_details_with_picture(
        &self,
        details: &PersonalDetails,
        picture: ProfilePicture,
    ) -> Result<PersonalDetails, Error> {
        debug!(
            file_name = %picture.file_name,
            size = picture.bytes.len(),
            "uploading profile picture"
        );
        let form = personal_details_form(details, picture)?;
        self.patch_multipart("personal-details/", form)
            .await?
            .deserialize()
    }

    /// `GET company-details/`
    pub async fn company_details(&self) -> Result<CompanyDetails, Error> {
        self.get_data("company-details/").await
    }

    /// `PATCH company-details/`
    pub async fn update_company_details(
        &self,
        details: &CompanyDetails,
    ) -> Result<CompanyDetails, Error> {
        self.patch_data("company-details/", details).await
    }
}

fn personal_details_form(details: &PersonalDetails, picture: ProfilePicture) -> Result<Form, Error> {
    let text_fields = [
        ("first_name", &details.first_name),
        ("last_name", &details.last_name),
        ("date_of_birth", &details.date_of_birth),
        ("phone", &details.phone),
        ("address", &details.address),
        ("country", &details.country),
        ("bio", &details.bio),
    ];

    let mut form = Form::new();
    for (name, value) in text_fields {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            form = form.text(name, value.to_owned());
        }
    }
    if let Some(public) = details.is_public_profile {
        form = form.text("is_public_profile", public.to_string());
    }

    let mime = picture.mime_type();
    let part = Part::bytes(picture.bytes)
        .file_name(picture.file_name)
        .mime_str(mime)
        .map_err(Error::Transport)?;
    Ok(form.part("profile_picture", part))
}
