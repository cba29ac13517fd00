use chrono::Utc;
use hintdesk::application_impl::*;
use hintdesk::application_port::*;
use hintdesk::domain_model::*;
use hintdesk::domain_port::*;
use hintdesk::infra_memory::*;
use std::sync::Arc;
use std::time::Duration;

const ACCESS_TTL: Duration = Duration::from_secs(15 * 60);
const REFRESH_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const IDENTITY_TTL: Duration = Duration::from_secs(60 * 60);

struct Harness {
    clock: Arc<ManualClock>,
    store: Arc<MemoryKvStore>,
    directory: Arc<MemoryUserDirectory>,
    tokens: Arc<RealTokenService>,
    resolver: Arc<RealIdentityResolver>,
}

fn user(id: i64, multi_login: bool) -> UserRecord {
    UserRecord {
        id: UserId(id),
        uuid: uuid::Uuid::new_v4(),
        username: format!("player{id}"),
        password_hash: String::new(),
        salt: String::new(),
        email: format!("player{id}@example.com"),
        is_superuser: false,
        status: AccountStatus::Enabled,
        is_multi_login: multi_login,
        avatar: None,
        join_time: Utc::now(),
        last_login_time: None,
    }
}

fn harness(users: Vec<UserRecord>) -> Harness {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let store = Arc::new(MemoryKvStore::new(clock.clone()));
    let directory = Arc::new(MemoryUserDirectory::with_users(users));
    let codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
        issuer: "hintdesk".to_string(),
        audience: "hintdesk-client".to_string(),
        signing_key: b"integration-secret".to_vec(),
        leeway_secs: 0,
    }));
    let tokens = Arc::new(RealTokenService::new(
        store.clone(),
        codec.clone(),
        clock.clone(),
        TokenSettings {
            access_ttl: ACCESS_TTL,
            refresh_ttl: REFRESH_TTL,
            keys: KeyLayout::default(),
        },
    ));
    let resolver = Arc::new(RealIdentityResolver::new(
        store.clone(),
        directory.clone(),
        codec,
        clock.clone(),
        KeyLayout::default(),
        IDENTITY_TTL,
    ));
    Harness {
        clock,
        store,
        directory,
        tokens,
        resolver,
    }
}

#[tokio::test]
async fn single_login_second_issue_displaces_the_first() {
    let h = harness(vec![user(42, false)]);

    let a1 = h.tokens.issue_access_token(UserId(42), false).await.unwrap();
    let a2 = h.tokens.issue_access_token(UserId(42), false).await.unwrap();

    assert_eq!(
        h.store.keys_with_prefix("access:42:"),
        vec![format!("access:42:{}", a2.token)]
    );
    assert!(matches!(
        h.resolver.resolve(&a1.token).await,
        Err(AuthError::TokenRevoked)
    ));
    assert_eq!(h.resolver.resolve(&a2.token).await.unwrap().id, UserId(42));
}

#[tokio::test]
async fn single_login_does_not_touch_a_subject_sharing_the_digit_prefix() {
    let h = harness(vec![user(4, false), user(42, false)]);

    let other = h.tokens.issue_access_token(UserId(42), false).await.unwrap();
    h.tokens.issue_access_token(UserId(4), false).await.unwrap();
    h.tokens.issue_access_token(UserId(4), false).await.unwrap();

    assert!(h.resolver.resolve(&other.token).await.is_ok());
    assert_eq!(h.store.keys_with_prefix("access:4:").len(), 1);
}

#[tokio::test]
async fn revoke_all_except_keeps_only_the_named_token() {
    let h = harness(vec![user(7, true)]);
    let a1 = h.tokens.issue_access_token(UserId(7), true).await.unwrap();
    let a2 = h.tokens.issue_access_token(UserId(7), true).await.unwrap();
    let a3 = h.tokens.issue_access_token(UserId(7), true).await.unwrap();

    h.tokens
        .revoke_all_except(UserId(7), TokenKind::Access, Some(&a2.token))
        .await
        .unwrap();

    assert!(h.resolver.resolve(&a1.token).await.is_err());
    assert!(h.resolver.resolve(&a2.token).await.is_ok());
    assert!(h.resolver.resolve(&a3.token).await.is_err());
}

#[tokio::test]
async fn refresh_succeeds_once_per_refresh_token() {
    let h = harness(vec![user(9, true)]);
    let access = h.tokens.issue_access_token(UserId(9), true).await.unwrap();
    let refresh = h.tokens.issue_refresh_token(UserId(9), true).await.unwrap();

    let pair = h
        .tokens
        .refresh(UserId(9), &access.token, &refresh.token, true)
        .await
        .unwrap();
    let replay = h
        .tokens
        .refresh(UserId(9), &pair.access.token, &refresh.token, true)
        .await;

    assert!(matches!(replay, Err(AuthError::TokenInvalid)));
    assert!(h.resolver.resolve(&access.token).await.is_err());
    assert!(h.resolver.resolve(&pair.access.token).await.is_ok());
}

#[tokio::test]
async fn tokens_and_markers_expire_with_the_clock() {
    let h = harness(vec![user(3, true)]);
    let access = h.tokens.issue_access_token(UserId(3), true).await.unwrap();
    let refresh = h.tokens.issue_refresh_token(UserId(3), true).await.unwrap();

    h.clock.advance(ACCESS_TTL + Duration::from_secs(1));

    assert!(matches!(
        h.resolver.resolve(&access.token).await,
        Err(AuthError::TokenExpired)
    ));
    assert!(h.store.keys_with_prefix("access:3:").is_empty());
    // the refresh token outlives the access token and can still rotate
    let pair = h
        .tokens
        .refresh(UserId(3), &access.token, &refresh.token, true)
        .await
        .unwrap();
    assert!(h.resolver.resolve(&pair.access.token).await.is_ok());
}

#[tokio::test]
async fn cached_identity_is_served_until_invalidated_or_expired() {
    let h = harness(vec![user(5, true)]);
    let access = h.tokens.issue_access_token(UserId(5), true).await.unwrap();
    h.resolver.resolve(&access.token).await.unwrap();

    // a write that skips invalidation is not visible while the snapshot lives
    h.directory
        .update_avatar(UserId(5), "https://cdn.example.com/5.png")
        .await
        .unwrap();
    assert_eq!(h.resolver.resolve(&access.token).await.unwrap().avatar, None);

    h.resolver.invalidate(UserId(5)).await.unwrap();
    assert_eq!(
        h.resolver.resolve(&access.token).await.unwrap().avatar.as_deref(),
        Some("https://cdn.example.com/5.png")
    );

    h.directory
        .update_avatar(UserId(5), "https://cdn.example.com/5b.png")
        .await
        .unwrap();
    h.clock.advance(IDENTITY_TTL + Duration::from_secs(1));
    let fresh = h.tokens.issue_access_token(UserId(5), true).await.unwrap();
    assert_eq!(
        h.resolver.resolve(&fresh.token).await.unwrap().avatar.as_deref(),
        Some("https://cdn.example.com/5b.png")
    );
}

#[tokio::test]
async fn logout_under_each_policy() {
    let h = harness(vec![user(11, true), user(12, false)]);

    let m1 = h.tokens.issue_access_token(UserId(11), true).await.unwrap();
    let m2 = h.tokens.issue_access_token(UserId(11), true).await.unwrap();
    h.tokens.revoke(UserId(11), &m1.token, None, true).await.unwrap();
    assert!(h.resolver.resolve(&m1.token).await.is_err());
    assert!(h.resolver.resolve(&m2.token).await.is_ok());

    let s = h.tokens.issue_access_token(UserId(12), false).await.unwrap();
    let r = h.tokens.issue_refresh_token(UserId(12), false).await.unwrap();
    h.tokens
        .revoke(UserId(12), &s.token, Some(&r.token), false)
        .await
        .unwrap();
    assert!(h.store.keys_with_prefix("access:12:").is_empty());
    assert!(h.store.keys_with_prefix("refresh:12:").is_empty());
}
