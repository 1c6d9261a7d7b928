// Authentication endpoints
//
// Token issuance, registration, refresh, and logout. These are the only
// writers of session credentials apart from the pipeline's 401 teardown.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{RegisterRequest, TokenPair};
use crate::session::{Role, SessionEvent, SessionKey};

impl ApiClient {
    /// Sign in with email and password.
    ///
    /// `POST token/`, then `GET profile/` to learn the role. Any stale
    /// session is cleared first. When the profile lookup fails for a reason
    /// other than an expired session the role defaults to individual.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Role, Error> {
        self.session().clear()?;
        debug!(email, "requesting token pair");

        let tokens: TokenPair = self
            .post_data(
                "token/",
                &json!({ "email": email, "password": password.expose_secret() }),
            )
            .await?;
        self.store_tokens(&tokens)?;

        let role = match self.my_profile().await {
            Ok(profile) => profile.role,
            Err(e) if e.is_session_expired() => return Err(e),
            Err(e) => {
                warn!(error = %e, "profile lookup failed after login, assuming individual");
                Role::Individual
            }
        };
        self.session().set(SessionKey::Role, role.as_str())?;

        info!(email, %role, "signed in");
        self.emit(SessionEvent::SignedIn { role });
        Ok(role)
    }

    /// Create an account. The backend signs the new account in, so the
    /// returned token pair is stored along with the chosen role.
    ///
    /// `POST register/`
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
        role: Role,
    ) -> Result<(), Error> {
        self.session().clear()?;
        let body = RegisterRequest {
            email: email.to_owned(),
            password: password.expose_secret().to_owned(),
            role,
        };
        let tokens: TokenPair = self.post_data("register/", &body).await?;
        self.store_tokens(&tokens)?;
        self.session().set(SessionKey::Role, role.as_str())?;

        info!(email, %role, "registered");
        self.emit(SessionEvent::SignedIn { role });
        Ok(())
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// `POST token/refresh/`
    pub async fn refresh_token(&self) -> Result<(), Error> {
        let refresh = self
            .session()
            .get(SessionKey::Refresh)
            .filter(|t| !t.is_empty())
            .ok_or(Error::MissingToken("refresh"))?;

        let tokens: TokenPair = self
            .post_data("token/refresh/", &json!({ "refresh": refresh }))
            .await?;
        self.store_tokens(&tokens)?;
        debug!(rotated = tokens.refresh.is_some(), "access token refreshed");
        Ok(())
    }

    /// Forget the stored session. No request is made.
    pub fn logout(&self) -> Result<(), Error> {
        self.session().clear()?;
        info!("signed out");
        self.emit(SessionEvent::SignedOut);
        Ok(())
    }

    fn store_tokens(&self, tokens: &TokenPair) -> Result<(), Error> {
        self.session().set(SessionKey::Access, &tokens.access)?;
        if let Some(refresh) = &tokens.refresh {
            self.session().set(SessionKey::Refresh, refresh)?;
        }
        Ok(())
    }
}
