use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

pub struct RealAuthService {
    directory: Arc<dyn UserDirectory>,
    user_repo: Arc<dyn UserRepo>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenService>,
    identity: Arc<dyn IdentityResolver>,
    login_log: Arc<dyn LoginLogRepo>,
    clock: Arc<dyn Clock>,
}

impl RealAuthService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        user_repo: Arc<dyn UserRepo>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenService>,
        identity: Arc<dyn IdentityResolver>,
        login_log: Arc<dyn LoginLogRepo>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            user_repo,
            hasher,
            tokens,
            identity,
            login_log,
            clock,
        }
    }

    /// Best effort: a failed write never changes the login outcome.
    async fn record_attempt(
        &self,
        record: &UserRecord,
        request: &LoginInput,
        status: LoginStatus,
        msg: &str,
    ) {
        let entry = NewLoginLog {
            user_uuid: record.uuid,
            username: record.username.clone(),
            status,
            ip: request.ip.clone(),
            user_agent: request.user_agent.clone(),
            msg: msg.to_string(),
            login_time: self.clock.now(),
        };
        if let Err(e) = self.login_log.create(entry).await {
            warn!(subject = %record.id, error = %e, "failed to write login log");
        }
    }

    async fn enabled_user(&self, subject: UserId) -> Result<UserRecord, AuthError> {
        let record = self
            .directory
            .find_by_id(subject)
            .await?
            .ok_or(AuthError::AccountNotFound)?;
        if !record.status.is_enabled() {
            return Err(AuthError::AccountLocked);
        }
        Ok(record)
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let Some(mut record) = self.directory.find_by_username(&request.username).await? else {
            debug!(username = %request.username, "login for unknown username");
            return Err(AuthError::InvalidCredentials);
        };
        if !self
            .hasher
            .verify_password(&request.password, &record.password_hash)
            .await?
        {
            debug!(subject = %record.id, "login with wrong password");
            self.record_attempt(&record, &request, LoginStatus::Failure, "wrong password")
                .await;
            return Err(AuthError::InvalidCredentials);
        }
        if !record.status.is_enabled() {
            self.record_attempt(&record, &request, LoginStatus::Failure, "account locked")
                .await;
            return Err(AuthError::AccountLocked);
        }

        let access = self
            .tokens
            .issue_access_token(record.id, record.is_multi_login)
            .await?;
        let refresh = self
            .tokens
            .issue_refresh_token(record.id, record.is_multi_login)
            .await?;

        let now = self.clock.now();
        match self.user_repo.touch_last_login(record.id, now).await {
            Ok(_) => record.last_login_time = Some(now),
            Err(e) => warn!(subject = %record.id, error = %e, "failed to record last login"),
        }
        if let Err(e) = self.identity.invalidate(record.id).await {
            warn!(subject = %record.id, error = %e, "failed to drop cached identity on login");
        }

        self.record_attempt(&record, &request, LoginStatus::Success, "login success")
            .await;
        info!(subject = %record.id, multi_login = record.is_multi_login, "user logged in");
        Ok(LoginResult {
            user: record.to_identity(),
            access,
            refresh,
        })
    }

    async fn refresh(
        &self,
        context: &RequestContext,
        refresh_token: Option<&str>,
    ) -> Result<TokenPair, AuthError> {
        let refresh_token = refresh_token.ok_or(AuthError::TokenInvalid)?;
        let record = self.enabled_user(context.user.id).await?;
        self.tokens
            .refresh(
                record.id,
                &context.access_token,
                refresh_token,
                record.is_multi_login,
            )
            .await
    }

    async fn logout(&self, context: &RequestContext) -> Result<(), AuthError> {
        self.tokens
            .revoke(
                context.user.id,
                &context.access_token,
                context.refresh_token.as_deref(),
                context.user.is_multi_login,
            )
            .await?;
        info!(subject = %context.user.id, request_id = %context.request_id, "user logged out");
        Ok(())
    }
}
