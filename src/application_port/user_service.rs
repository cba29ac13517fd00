use super::AuthError;
use crate::domain_model::*;
use crate::domain_port::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("user does not exist")]
    NotFound,
    #[error("username already registered")]
    UsernameTaken,
    #[error("email already registered")]
    EmailTaken,
    #[error("password is empty")]
    EmptyPassword,
    #[error("incorrect old password")]
    IncorrectPassword,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("invalid operation")]
    InvalidOperation,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct AddUserInput {
    pub username: String,
    pub password: String,
    pub email: String,
    pub is_superuser: bool,
    pub is_multi_login: bool,
}

impl AddUserInput {
    pub fn regular(username: String, password: String, email: String) -> Self {
        AddUserInput {
            username,
            password,
            email,
            is_superuser: false,
            is_multi_login: false,
        }
    }

    pub fn super_admin(username: String, password: String, email: String) -> Self {
        AddUserInput {
            username,
            password,
            email,
            is_superuser: true,
            is_multi_login: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileInput {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct ResetPasswordInput {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn add(&self, actor: Actor<'_>, input: AddUserInput) -> Result<CurrentUser, UserError>;

    async fn get_userinfo(&self, username: &str) -> Result<CurrentUser, UserError>;

    async fn update_profile(
        &self,
        context: &RequestContext,
        username: &str,
        input: ProfileInput,
    ) -> Result<u64, UserError>;

    async fn update_avatar(
        &self,
        context: &RequestContext,
        username: &str,
        avatar: &str,
    ) -> Result<u64, UserError>;

    async fn reset_password(
        &self,
        context: &RequestContext,
        input: ResetPasswordInput,
    ) -> Result<u64, UserError>;

    async fn toggle_superuser(
        &self,
        context: &RequestContext,
        target: UserId,
    ) -> Result<u64, UserError>;

    async fn toggle_status(&self, context: &RequestContext, target: UserId)
    -> Result<u64, UserError>;

    async fn toggle_multi_login(
        &self,
        context: &RequestContext,
        target: UserId,
    ) -> Result<u64, UserError>;

    async fn delete(&self, context: &RequestContext, username: &str) -> Result<u64, UserError>;
}
