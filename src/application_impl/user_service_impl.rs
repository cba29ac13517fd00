use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

pub struct RealUserService {
    directory: Arc<dyn UserDirectory>,
    user_repo: Arc<dyn UserRepo>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenService>,
    identity: Arc<dyn IdentityResolver>,
    clock: Arc<dyn Clock>,
}

impl RealUserService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        user_repo: Arc<dyn UserRepo>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenService>,
        identity: Arc<dyn IdentityResolver>,
        clock: Arc<dyn Clock>,
    ) -> RealUserService {
        RealUserService {
            directory,
            user_repo,
            hasher,
            tokens,
            identity,
            clock,
        }
    }

    async fn by_username(&self, username: &str) -> Result<UserRecord, UserError> {
        self.directory
            .find_by_username(username)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn by_id(&self, id: UserId) -> Result<UserRecord, UserError> {
        self.directory
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn ensure_username_free(&self, username: &str) -> Result<(), UserError> {
        match self.directory.find_by_username(username).await? {
            Some(_) => Err(UserError::UsernameTaken),
            None => Ok(()),
        }
    }

    async fn ensure_email_free(&self, email: &str) -> Result<(), UserError> {
        match self.directory.find_by_email(email).await? {
            Some(_) => Err(UserError::EmailTaken),
            None => Ok(()),
        }
    }

    /// Superusers may act on anyone, everyone else only on themselves.
    fn ensure_self_or_superuser(actor: &CurrentUser, target: &UserRecord) -> Result<(), UserError> {
        if actor.is_superuser || actor.id == target.id {
            Ok(())
        } else {
            Err(UserError::Forbidden(
                "you can only modify your own account".to_string(),
            ))
        }
    }

    fn ensure_superuser(actor: &CurrentUser) -> Result<(), UserError> {
        if actor.is_superuser {
            Ok(())
        } else {
            Err(UserError::Forbidden("superuser required".to_string()))
        }
    }

    /// Load a target for a superuser-only flag flip. Acting on oneself is refused.
    async fn flag_target(
        &self,
        context: &RequestContext,
        target: UserId,
    ) -> Result<UserRecord, UserError> {
        Self::ensure_superuser(&context.user)?;
        let record = self.by_id(target).await?;
        if record.id == context.user.id {
            return Err(UserError::InvalidOperation);
        }
        Ok(record)
    }
}

#[async_trait::async_trait]
impl UserService for RealUserService {
    async fn add(&self, actor: Actor<'_>, input: AddUserInput) -> Result<CurrentUser, UserError> {
        if !actor.is_superuser() {
            return Err(UserError::Forbidden("superuser required".to_string()));
        }
        self.ensure_username_free(&input.username).await?;
        if input.password.is_empty() {
            return Err(UserError::EmptyPassword);
        }
        self.ensure_email_free(&input.email).await?;

        let salt = self.hasher.generate_salt();
        let password_hash = self.hasher.hash_password(&input.password, &salt).await?;
        let id = self
            .user_repo
            .create(NewUser {
                uuid: uuid::Uuid::new_v4(),
                username: input.username,
                password_hash,
                salt,
                email: input.email,
                is_superuser: input.is_superuser,
                is_multi_login: input.is_multi_login,
                status: AccountStatus::Enabled,
                join_time: self.clock.now(),
            })
            .await?;

        info!(subject = %id, actor = %actor.label(), "user created");
        Ok(self.by_id(id).await?.to_identity())
    }

    async fn get_userinfo(&self, username: &str) -> Result<CurrentUser, UserError> {
        Ok(self.by_username(username).await?.to_identity())
    }

    async fn update_profile(
        &self,
        context: &RequestContext,
        username: &str,
        input: ProfileInput,
    ) -> Result<u64, UserError> {
        let target = self.by_username(username).await?;
        Self::ensure_self_or_superuser(&context.user, &target)?;
        if target.username != input.username {
            self.ensure_username_free(&input.username).await?;
        }
        if target.email != input.email {
            self.ensure_email_free(&input.email).await?;
        }

        let count = self
            .user_repo
            .update_profile(target.id, &input.username, &input.email)
            .await?;
        self.identity.invalidate(target.id).await?;
        Ok(count)
    }

    async fn update_avatar(
        &self,
        context: &RequestContext,
        username: &str,
        avatar: &str,
    ) -> Result<u64, UserError> {
        let target = self.by_username(username).await?;
        Self::ensure_self_or_superuser(&context.user, &target)?;
        let count = self.user_repo.update_avatar(target.id, avatar).await?;
        self.identity.invalidate(target.id).await?;
        Ok(count)
    }

    async fn reset_password(
        &self,
        context: &RequestContext,
        input: ResetPasswordInput,
    ) -> Result<u64, UserError> {
        let record = self.by_id(context.user.id).await?;
        if !self
            .hasher
            .verify_password(&input.old_password, &record.password_hash)
            .await?
        {
            return Err(UserError::IncorrectPassword);
        }
        if input.new_password != input.confirm_password {
            return Err(UserError::PasswordMismatch);
        }
        if input.new_password.is_empty() {
            return Err(UserError::EmptyPassword);
        }

        let password_hash = self
            .hasher
            .hash_password(&input.new_password, &record.salt)
            .await?;
        let count = self.user_repo.set_password(record.id, &password_hash).await?;
        self.tokens.revoke_all(record.id).await?;
        self.identity.invalidate(record.id).await?;
        info!(subject = %record.id, "password reset, all sessions revoked");
        Ok(count)
    }

    async fn toggle_superuser(
        &self,
        context: &RequestContext,
        target: UserId,
    ) -> Result<u64, UserError> {
        let record = self.flag_target(context, target).await?;
        let count = self
            .user_repo
            .set_superuser(record.id, !record.is_superuser)
            .await?;
        self.identity.invalidate(record.id).await?;
        Ok(count)
    }

    async fn toggle_status(
        &self,
        context: &RequestContext,
        target: UserId,
    ) -> Result<u64, UserError> {
        let record = self.flag_target(context, target).await?;
        let status = record.status.toggled();
        let count = self.user_repo.set_status(record.id, status).await?;
        self.identity.invalidate(record.id).await?;
        info!(subject = %record.id, status = ?status, "account status changed");
        Ok(count)
    }

    async fn toggle_multi_login(
        &self,
        context: &RequestContext,
        target: UserId,
    ) -> Result<u64, UserError> {
        Self::ensure_superuser(&context.user)?;
        let record = self.by_id(target).await?;
        let acting_on_self = record.id == context.user.id;
        let current = if acting_on_self {
            context.user.is_multi_login
        } else {
            record.is_multi_login
        };

        let count = self.user_repo.set_multi_login(record.id, !current).await?;
        self.identity.invalidate(record.id).await?;

        let latest = self.by_id(record.id).await?;
        if latest.is_multi_login {
            return Ok(count);
        }
        if acting_on_self {
            // the caller keeps the session it is using right now
            self.tokens
                .revoke_all_except(record.id, TokenKind::Access, Some(&context.access_token))
                .await?;
            self.tokens
                .revoke_all_except(
                    record.id,
                    TokenKind::Refresh,
                    context.refresh_token.as_deref(),
                )
                .await?;
        } else {
            self.tokens.revoke_all(record.id).await?;
        }
        info!(subject = %record.id, actor = %context.user.id, "multi-login disabled");
        Ok(count)
    }

    async fn delete(&self, context: &RequestContext, username: &str) -> Result<u64, UserError> {
        let target = self.by_username(username).await?;
        Self::ensure_self_or_superuser(&context.user, &target)?;
        let count = self.user_repo.delete(target.id).await?;
        self.tokens.revoke_all(target.id).await?;
        self.identity.invalidate(target.id).await?;
        info!(subject = %target.id, actor = %context.user.id, "user deleted");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::*;
    use crate::infra_memory::*;
    use chrono::Utc;
    use std::time::Duration;

    struct Fixture {
        store: Arc<MemoryKvStore>,
        directory: Arc<MemoryUserDirectory>,
        tokens: Arc<RealTokenService>,
        resolver: Arc<RealIdentityResolver>,
        users: RealUserService,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = Arc::new(MemoryKvStore::new(clock.clone()));
        let directory = Arc::new(MemoryUserDirectory::new());
        let codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: "hintdesk.test".to_string(),
            audience: "hintdesk-client".to_string(),
            signing_key: b"k".to_vec(),
            leeway_secs: 0,
        }));
        let tokens = Arc::new(RealTokenService::new(
            store.clone(),
            codec.clone(),
            clock.clone(),
            TokenSettings {
                access_ttl: Duration::from_secs(60),
                refresh_ttl: Duration::from_secs(600),
                keys: KeyLayout::default(),
            },
        ));
        let resolver = Arc::new(RealIdentityResolver::new(
            store.clone(),
            directory.clone(),
            codec,
            clock.clone(),
            KeyLayout::default(),
            Duration::from_secs(300),
        ));
        let users = RealUserService::new(
            directory.clone(),
            directory.clone(),
            Arc::new(Argon2PasswordHasher),
            tokens.clone(),
            resolver.clone(),
            clock,
        );
        Fixture {
            store,
            directory,
            tokens,
            resolver,
            users,
        }
    }

    async fn seed_admin(f: &Fixture) -> CurrentUser {
        f.users
            .add(
                Actor::System(&SystemActor::seeder()),
                AddUserInput::super_admin(
                    "admin".to_string(),
                    "admin-pass".to_string(),
                    "admin@example.com".to_string(),
                ),
            )
            .await
            .unwrap()
    }

    async fn seed_user(f: &Fixture, admin: &CurrentUser, name: &str) -> CurrentUser {
        f.users
            .add(
                Actor::User(admin),
                AddUserInput::regular(
                    name.to_string(),
                    format!("{name}-pass"),
                    format!("{name}@example.com"),
                ),
            )
            .await
            .unwrap()
    }

    async fn session(f: &Fixture, user: &CurrentUser) -> RequestContext {
        let access = f
            .tokens
            .issue_access_token(user.id, user.is_multi_login)
            .await
            .unwrap();
        let refresh = f
            .tokens
            .issue_refresh_token(user.id, user.is_multi_login)
            .await
            .unwrap();
        RequestContext {
            request_id: "req".to_string(),
            user: f.resolver.resolve(&access.token).await.unwrap(),
            access_token: access.token,
            refresh_token: Some(refresh.token),
        }
    }

    #[tokio::test]
    async fn only_superusers_add_and_duplicates_are_refused() {
        let f = fixture();
        let admin = seed_admin(&f).await;
        let bob = seed_user(&f, &admin, "bob").await;

        let by_bob = f
            .users
            .add(
                Actor::User(&bob),
                AddUserInput::regular("eve".into(), "pw".into(), "eve@example.com".into()),
            )
            .await;
        assert!(matches!(by_bob, Err(UserError::Forbidden(_))));

        let dup_name = f
            .users
            .add(
                Actor::User(&admin),
                AddUserInput::regular("bob".into(), "pw".into(), "x@example.com".into()),
            )
            .await;
        assert!(matches!(dup_name, Err(UserError::UsernameTaken)));

        let dup_email = f
            .users
            .add(
                Actor::User(&admin),
                AddUserInput::regular("carol".into(), "pw".into(), "bob@example.com".into()),
            )
            .await;
        assert!(matches!(dup_email, Err(UserError::EmailTaken)));

        let empty = f
            .users
            .add(
                Actor::User(&admin),
                AddUserInput::regular("carol".into(), String::new(), "c@example.com".into()),
            )
            .await;
        assert!(matches!(empty, Err(UserError::EmptyPassword)));
    }

    #[tokio::test]
    async fn salts_are_per_user() {
        let f = fixture();
        let admin = seed_admin(&f).await;
        seed_user(&f, &admin, "bob").await;

        let a = f.directory.find_by_username("admin").await.unwrap().unwrap();
        let b = f.directory.find_by_username("bob").await.unwrap().unwrap();
        assert_ne!(a.salt, b.salt);
    }

    #[tokio::test]
    async fn profile_updates_are_self_or_superuser_and_drop_the_target_cache() {
        let f = fixture();
        let admin = seed_admin(&f).await;
        let bob = seed_user(&f, &admin, "bob").await;
        seed_user(&f, &admin, "carol").await;
        let bob_ctx = session(&f, &bob).await;
        let admin_ctx = session(&f, &admin).await;

        let foreign = f
            .users
            .update_profile(
                &bob_ctx,
                "carol",
                ProfileInput {
                    username: "carol".into(),
                    email: "c2@example.com".into(),
                },
            )
            .await;
        assert!(matches!(foreign, Err(UserError::Forbidden(_))));

        let taken = f
            .users
            .update_profile(
                &bob_ctx,
                "bob",
                ProfileInput {
                    username: "carol".into(),
                    email: "bob@example.com".into(),
                },
            )
            .await;
        assert!(matches!(taken, Err(UserError::UsernameTaken)));

        assert!(!f.store.keys_with_prefix("identity:").is_empty());
        let count = f
            .users
            .update_profile(
                &admin_ctx,
                "bob",
                ProfileInput {
                    username: "robert".into(),
                    email: "robert@example.com".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert!(f.store.keys_with_prefix(&format!("identity:{}", bob.id)).is_empty());

        let fresh = f.resolver.resolve(&bob_ctx.access_token).await.unwrap();
        assert_eq!(fresh.username, "robert");
    }

    #[tokio::test]
    async fn password_reset_checks_inputs_and_revokes_every_session() {
        let f = fixture();
        let admin = seed_admin(&f).await;
        let bob = seed_user(&f, &admin, "bob").await;
        let ctx = session(&f, &bob).await;

        let wrong_old = f
            .users
            .reset_password(
                &ctx,
                ResetPasswordInput {
                    old_password: "nope".into(),
                    new_password: "n".into(),
                    confirm_password: "n".into(),
                },
            )
            .await;
        assert!(matches!(wrong_old, Err(UserError::IncorrectPassword)));

        let mismatch = f
            .users
            .reset_password(
                &ctx,
                ResetPasswordInput {
                    old_password: "bob-pass".into(),
                    new_password: "a".into(),
                    confirm_password: "b".into(),
                },
            )
            .await;
        assert!(matches!(mismatch, Err(UserError::PasswordMismatch)));

        let before = f.directory.find_by_id(bob.id).await.unwrap().unwrap();
        f.users
            .reset_password(
                &ctx,
                ResetPasswordInput {
                    old_password: "bob-pass".into(),
                    new_password: "new-pass".into(),
                    confirm_password: "new-pass".into(),
                },
            )
            .await
            .unwrap();
        let after = f.directory.find_by_id(bob.id).await.unwrap().unwrap();

        assert_eq!(before.salt, after.salt);
        assert_ne!(before.password_hash, after.password_hash);
        assert!(matches!(
            f.resolver.resolve(&ctx.access_token).await,
            Err(AuthError::TokenRevoked)
        ));
        assert!(f.store.keys_with_prefix(&format!("refresh:{}:", bob.id)).is_empty());
    }

    #[tokio::test]
    async fn flag_toggles_need_a_superuser_and_another_target() {
        let f = fixture();
        let admin = seed_admin(&f).await;
        let bob = seed_user(&f, &admin, "bob").await;
        let admin_ctx = session(&f, &admin).await;
        let bob_ctx = session(&f, &bob).await;

        assert!(matches!(
            f.users.toggle_superuser(&admin_ctx, admin.id).await,
            Err(UserError::InvalidOperation)
        ));
        assert!(matches!(
            f.users.toggle_status(&bob_ctx, admin.id).await,
            Err(UserError::Forbidden(_))
        ));
        assert!(matches!(
            f.users.toggle_status(&admin_ctx, UserId(999)).await,
            Err(UserError::NotFound)
        ));

        f.users.toggle_status(&admin_ctx, bob.id).await.unwrap();
        assert!(matches!(
            f.resolver.resolve(&bob_ctx.access_token).await,
            Err(AuthError::AccountLocked)
        ));

        f.users.toggle_superuser(&admin_ctx, bob.id).await.unwrap();
        let bob_now = f.directory.find_by_id(bob.id).await.unwrap().unwrap();
        assert!(bob_now.is_superuser);
    }

    #[tokio::test]
    async fn disabling_multi_login_on_self_keeps_the_current_session() {
        let f = fixture();
        let admin = seed_admin(&f).await;
        let other = session(&f, &admin).await;
        let current = session(&f, &admin).await;

        f.users.toggle_multi_login(&current, admin.id).await.unwrap();

        let refreshes = f.store.keys_with_prefix(&format!("refresh:{}:", admin.id));
        assert_eq!(refreshes.len(), 1);
        assert!(refreshes[0].ends_with(current.refresh_token.as_deref().unwrap()));
        assert!(f.resolver.resolve(&current.access_token).await.is_ok());
        assert!(matches!(
            f.resolver.resolve(&other.access_token).await,
            Err(AuthError::TokenRevoked)
        ));
    }

    #[tokio::test]
    async fn disabling_multi_login_on_another_user_revokes_everything() {
        let f = fixture();
        let admin = seed_admin(&f).await;
        let bob = seed_user(&f, &admin, "bob").await;
        f.users
            .toggle_multi_login(&session(&f, &admin).await, bob.id)
            .await
            .unwrap();
        let bob = f.users.get_userinfo("bob").await.unwrap();
        assert!(bob.is_multi_login);
        let bob_ctx = session(&f, &bob).await;
        session(&f, &bob).await;
        assert_eq!(f.store.keys_with_prefix(&format!("access:{}:", bob.id)).len(), 2);

        f.users
            .toggle_multi_login(&session(&f, &admin).await, bob.id)
            .await
            .unwrap();

        assert!(f.store.keys_with_prefix(&format!("access:{}:", bob.id)).is_empty());
        assert!(f.store.keys_with_prefix(&format!("refresh:{}:", bob.id)).is_empty());
        assert!(f.resolver.resolve(&bob_ctx.access_token).await.is_err());
    }

    #[tokio::test]
    async fn delete_removes_the_row_and_its_sessions() {
        let f = fixture();
        let admin = seed_admin(&f).await;
        let bob = seed_user(&f, &admin, "bob").await;
        let bob_ctx = session(&f, &bob).await;
        seed_user(&f, &admin, "carol").await;

        assert!(matches!(
            f.users.delete(&bob_ctx, "carol").await,
            Err(UserError::Forbidden(_))
        ));

        let count = f
            .users
            .delete(&session(&f, &admin).await, "bob")
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert!(f.directory.find_by_username("bob").await.unwrap().is_none());
        assert!(f.store.keys_with_prefix(&format!("access:{}:", bob.id)).is_empty());
        assert!(f.resolver.resolve(&bob_ctx.access_token).await.is_err());
    }
}
