use async_trait::async_trait;
use rest_client::{ApiClient, ApiError, Redirect};
use tracing::{debug, info, instrument, warn};

use crate::contract::client::UsersApi;
use crate::contract::model::{
    AuthResponse, ChangePasswordRequest, LoginRequest, ProfileUpdate, RegisterRequest, Role, User,
    UserRequest,
};
use crate::gateways::resource::RestResource;
use crate::session::SessionContext;

/// Authentication adapter for `/users`; the only gateway that writes the session.
#[derive(Clone)]
pub struct UsersRestClient {
    client: ApiClient,
    accounts: RestResource<UserRequest, User>,
    session: SessionContext,
}

impl UsersRestClient {
    pub fn new(client: ApiClient, session: SessionContext) -> Self {
        Self {
            accounts: RestResource::new(client.clone(), "users"),
            client,
            session,
        }
    }

    fn remember(&self, auth: &AuthResponse) -> Result<(), ApiError> {
        if auth.token.is_empty() {
            warn!("server returned an empty token, session left untouched");
            return Ok(());
        }
        self.session.persist(&auth.token, &auth.user)
    }
}

#[async_trait]
impl UsersApi for UsersRestClient {
    #[instrument(
        name = "clinic_api.users.register",
        skip_all,
        fields(username = %req.username, role = %req.role)
    )]
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let auth: AuthResponse = self.client.post("/users/register", req).await?;
        self.remember(&auth)?;
        info!(user_id = auth.user.id, "registered");
        Ok(auth)
    }

    #[instrument(name = "clinic_api.users.login", skip_all, fields(username = %req.username))]
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let auth: AuthResponse = self.client.post("/users/login", req).await?;
        self.remember(&auth)?;
        info!(user_id = auth.user.id, role = %auth.user.role, "logged in");
        Ok(auth)
    }

    fn logout(&self) -> Result<Redirect, ApiError> {
        self.session.clear()?;
        info!("logged out");
        Ok(Redirect::Login)
    }

    fn current_user(&self) -> Result<Option<User>, ApiError> {
        self.session.current_user()
    }

    fn is_authenticated(&self) -> Result<bool, ApiError> {
        self.session.is_authenticated()
    }

    #[instrument(name = "clinic_api.users.update_profile", skip_all)]
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let user: User = self.client.put("/users/profile", update).await?;
        // a user without a token would break the session pairing
        if self.session.is_authenticated()? {
            self.session.replace_user(&user)?;
        } else {
            debug!("no active session, updated profile not stored");
        }
        Ok(user)
    }

    #[instrument(name = "clinic_api.users.change_password", skip_all)]
    async fn change_password(&self, req: &ChangePasswordRequest) -> Result<(), ApiError> {
        self.client.post_empty("/users/change-password", req).await
    }

    #[instrument(
        name = "clinic_api.users.create_user",
        skip_all,
        fields(username = %req.username, role = %req.role)
    )]
    async fn create_user(&self, req: &UserRequest) -> Result<User, ApiError> {
        let user = self.accounts.create(req).await?;
        info!(user_id = user.id, "user created");
        Ok(user)
    }

    #[instrument(name = "clinic_api.users.get_all", skip_all)]
    async fn get_all(&self) -> Result<Vec<User>, ApiError> {
        self.accounts.get_all().await
    }

    #[instrument(name = "clinic_api.users.get_by_id", skip_all, fields(user_id = id))]
    async fn get_by_id(&self, id: i64) -> Result<User, ApiError> {
        self.accounts.get_by_id(id).await
    }

    #[instrument(name = "clinic_api.users.update", skip_all, fields(user_id = id))]
    async fn update(&self, id: i64, req: &UserRequest) -> Result<User, ApiError> {
        let user = self.accounts.update(id, req).await?;
        // an unreadable session is left for the next login to repair
        let is_self = matches!(self.session.current_user(), Ok(Some(current)) if current.id == user.id);
        if is_self && self.session.is_authenticated().unwrap_or(false) {
            self.session.replace_user(&user)?;
            debug!("stored user refreshed");
        }
        Ok(user)
    }

    #[instrument(name = "clinic_api.users.delete", skip_all, fields(user_id = id))]
    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.accounts.delete(id).await?;
        info!("user deleted");
        Ok(())
    }

    #[instrument(
        name = "clinic_api.users.upgrade_role",
        skip_all,
        fields(user_id = user_id, role = %role)
    )]
    async fn upgrade_role(&self, user_id: i64, role: Role) -> Result<String, ApiError> {
        let user_id = user_id.to_string();
        let text = self
            .client
            .put_for_text(
                "/users/upgrade-role",
                &[("userId", user_id.as_str()), ("roleName", role.as_str())],
            )
            .await?;
        info!("role granted");
        Ok(text)
    }
}
