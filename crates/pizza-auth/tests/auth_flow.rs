use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use pizza_auth::{
    AuthConfig, AuthError, AuthResult, AuthService, AuthenticationGate, AuthorizationGate,
    BcryptHasher, CredentialHasher, InMemoryAuthStore, LoginRequest, PasswordHasher,
    RefreshTokenRequest, RegisterRequest, RoleSet, RoleType, TokenKind, UserRepository,
    UserStatus, UserUpdate,
};

/// bcrypt hasher that counts verifications
#[derive(Default)]
struct CountingHasher {
    bcrypt: BcryptHasher,
    verifications: AtomicUsize,
}

impl PasswordHasher for CountingHasher {
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        BcryptHasher::development().hash_password(password)
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        self.bcrypt.verify_password(password, hash)
    }

    fn hasher_name(&self) -> &str {
        self.bcrypt.hasher_name()
    }
}

fn create_test_service() -> (AuthService, Arc<InMemoryAuthStore>) {
    let store = Arc::new(InMemoryAuthStore::new());
    let service = AuthService::new(store.clone(), store.clone(), &AuthConfig::testing()).unwrap();
    (service, store)
}

async fn register_ana(service: &AuthService) -> i64 {
    service
        .register(RegisterRequest::new("Ana", "Gomez", "ana@test.com", "secret1"))
        .await
        .unwrap()
        .user
        .id
}

#[tokio::test]
async fn test_register_then_login() {
    let (service, _) = create_test_service();

    let registered = service
        .register(RegisterRequest::new("Ana", "Gomez", "ana@test.com", "secret1"))
        .await
        .unwrap();
    assert_eq!(registered.user.full_name, "Ana Gomez");
    assert_eq!(registered.user.status, "ACTIVE");
    assert_eq!(registered.user.role.as_ref().map(|r| r.name), Some(RoleType::Customer));

    let logged_in = service
        .login(LoginRequest::new("ana@test.com", "secret1"))
        .await
        .unwrap();
    assert_eq!(logged_in.user.id, registered.user.id);

    let err = service
        .login(LoginRequest::new("ana@test.com", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
}

#[tokio::test]
async fn test_login_tokens_carry_user_claims() {
    let (service, _) = create_test_service();
    let id = register_ana(&service).await;

    let response = service
        .login(LoginRequest::new("ana@test.com", "secret1"))
        .await
        .unwrap();

    let tokens = service.tokens();
    let access = tokens.verify_access_token(&response.access_token).unwrap();
    assert_eq!(access.user_id, id);
    assert_eq!(access.email, "ana@test.com");
    assert_eq!(access.role, RoleType::Customer);

    let refresh = tokens.verify_refresh_token(&response.refresh_token).unwrap();
    assert_eq!(refresh.user_id, id);
    assert!(refresh.exp > access.exp);
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_are_indistinguishable() {
    let (service, _) = create_test_service();
    register_ana(&service).await;

    let unknown = service
        .login(LoginRequest::new("nobody@test.com", "secret1"))
        .await
        .unwrap_err();
    let wrong = service
        .login(LoginRequest::new("ana@test.com", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(unknown, wrong);
    assert_eq!(unknown.public_message(), wrong.public_message());
}

#[tokio::test]
async fn test_duplicate_registration_does_not_write() {
    let (service, store) = create_test_service();
    register_ana(&service).await;

    let err = service
        .register(RegisterRequest::new("Otra", "Persona", "ana@test.com", "secret2"))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::EmailTaken);
    assert_eq!(store.user_writes(), 1);
}

#[tokio::test]
async fn test_inactive_and_suspended_users_cannot_login() {
    for status in [UserStatus::Inactive, UserStatus::Suspended] {
        let (service, store) = create_test_service();
        let id = register_ana(&service).await;
        store
            .update(
                id,
                UserUpdate {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // Status is checked before the password
        for password in ["secret1", "wrong"] {
            let err = service
                .login(LoginRequest::new("ana@test.com", password))
                .await
                .unwrap_err();
            assert_eq!(err, AuthError::InactiveUser, "status {} password {}", status, password);
        }
    }
}

#[tokio::test]
async fn test_soft_deleted_user_cannot_login() {
    let (service, store) = create_test_service();
    let id = register_ana(&service).await;
    store.delete(id).await.unwrap();

    let err = service
        .login(LoginRequest::new("ana@test.com", "secret1"))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InactiveUser);
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let (service, _) = create_test_service();
    let id = register_ana(&service).await;
    let login = service
        .login(LoginRequest::new("ana@test.com", "secret1"))
        .await
        .unwrap();

    let refreshed = service
        .refresh_token(RefreshTokenRequest {
            refresh_token: login.refresh_token,
        })
        .await
        .unwrap();

    assert_eq!(refreshed.user.id, id);
    let claims = service.tokens().verify_access_token(&refreshed.access_token).unwrap();
    assert_eq!(claims.user_id, id);
    assert!(service.tokens().verify_refresh_token(&refreshed.refresh_token).is_ok());
}

#[tokio::test]
async fn test_refresh_with_access_token_fails() {
    let (service, _) = create_test_service();
    register_ana(&service).await;
    let login = service
        .login(LoginRequest::new("ana@test.com", "secret1"))
        .await
        .unwrap();

    let err = service
        .refresh_token(RefreshTokenRequest {
            refresh_token: login.access_token,
        })
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidToken);
}

#[tokio::test]
async fn test_refresh_for_deactivated_user_fails() {
    let (service, store) = create_test_service();
    let id = register_ana(&service).await;
    let login = service
        .login(LoginRequest::new("ana@test.com", "secret1"))
        .await
        .unwrap();

    store
        .update(
            id,
            UserUpdate {
                status: Some(UserStatus::Suspended),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = service
        .refresh_token(RefreshTokenRequest {
            refresh_token: login.refresh_token,
        })
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::UserNotFound);
}

#[tokio::test]
async fn test_expired_refresh_token_fails() {
    let (service, store) = create_test_service();
    let id = register_ana(&service).await;
    let user = UserRepository::find_by_id(store.as_ref(), id).await.unwrap().unwrap();

    let stale = service
        .tokens()
        .issue_at(&user, TokenKind::Refresh, Utc::now() - chrono::Duration::days(8))
        .unwrap();

    let err = service
        .refresh_token(RefreshTokenRequest { refresh_token: stale })
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidToken);
}

#[tokio::test]
async fn test_gates_on_issued_tokens() {
    let (service, _) = create_test_service();
    register_ana(&service).await;
    let login = service
        .login(LoginRequest::new("ana@test.com", "secret1"))
        .await
        .unwrap();

    let gate = AuthenticationGate::new(service.tokens());
    let identity = gate
        .authenticate(Some(&format!("Bearer {}", login.access_token)))
        .unwrap();
    assert_eq!(identity.email, "ana@test.com");

    assert!(AuthorizationGate::customer_or_admin().authorize(Some(&identity)).is_ok());
    assert!(matches!(
        AuthorizationGate::admin_only().authorize(Some(&identity)),
        Err(AuthError::Forbidden { .. })
    ));
    assert!(matches!(
        AuthorizationGate::new(RoleSet::empty()).authorize(Some(&identity)),
        Err(AuthError::Forbidden { .. })
    ));

    let user = service.current_user(identity.user_id).await.unwrap();
    assert_eq!(user.full_name, "Ana Gomez");
    assert!(service.logout(&identity).await.is_ok());
}

#[tokio::test]
async fn test_register_with_admin_role() {
    let (service, _) = create_test_service();
    let response = service
        .register(
            RegisterRequest::new("Administrador", "Sistema", "admin@pizzaapp.com", "admin123")
                .with_phone("+1234567890")
                .with_role_id(2),
        )
        .await
        .unwrap();

    assert_eq!(response.user.phone.as_deref(), Some("+1234567890"));
    let claims = service.tokens().verify_access_token(&response.access_token).unwrap();
    assert_eq!(claims.role, RoleType::Admin);
}

#[tokio::test]
async fn test_concurrent_registrations_single_account() {
    let (service, store) = create_test_service();

    let mut handles = Vec::new();
    for i in 0..4 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .register(RegisterRequest::new("Ana", format!("Gomez{}", i), "ana@test.com", "secret1"))
                .await
        }));
    }

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(err) => assert_eq!(err, AuthError::EmailTaken),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(store.user_writes(), 1);
}

#[tokio::test]
async fn test_unknown_email_pays_for_a_password_check() {
    let (service, _) = create_test_service();
    let counter = Arc::new(CountingHasher::default());
    let service = service.with_hasher(CredentialHasher::new(counter.clone()));
    register_ana(&service).await;

    let err = service
        .login(LoginRequest::new("nobody@test.com", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
    assert_eq!(counter.verifications.load(Ordering::SeqCst), 1);

    let err = service
        .login(LoginRequest::new("ana@test.com", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
    assert_eq!(counter.verifications.load(Ordering::SeqCst), 2);

    // The decoy hash is reused, not recomputed
    service
        .login(LoginRequest::new("other@test.com", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(counter.verifications.load(Ordering::SeqCst), 3);
}
