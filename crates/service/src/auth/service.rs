use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use jsonwebtoken::{encode, EncodingKey, Header as JwtHeader};
use rand::rngs::OsRng;
use tracing::{info, instrument};

use models::account::{self, StoredCredential};

use super::domain::{AuthSession, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AccountRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 secret for session tokens; `None` disables token issuance.
    pub jwt_secret: Option<String>,
}

/// Account business service independent of web framework
pub struct AuthService<R: AccountRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AccountRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        Self { repo, cfg }
    }

    /// Register a new account with a hashed password. The plaintext never
    /// reaches the repository or the logs.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAccountRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAccountRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: None });
    /// let input = RegisterInput { username: "alice".into(), password: "Secret123".into() };
    /// tokio_test::block_on(svc.register(input)).unwrap();
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<(), AuthError> {
        account::validate_username(&input.username)
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        account::validate_password(&input.password)
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        self.repo
            .create(&input.username, StoredCredential { password_hash: hash })
            .await?;
        info!(username = %input.username, "account_registered");
        Ok(())
    }

    /// Check a password against the stored hash. Unknown usernames and
    /// wrong passwords both come back `false`.
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        let Some(cred) = self.repo.find(username).await? else {
            return Ok(false);
        };
        let parsed = PasswordHash::new(&cred.password_hash)
            .map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Authenticate and open a session, issuing a token when a secret is
    /// configured.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAccountRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAccountRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: Some("secret".into()) });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { username: "bob".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "bob".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.username, "bob");
    /// assert!(session.token.is_some());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        if !self.verify(&input.username, &input.password).await? {
            return Err(AuthError::Unauthorized);
        }

        let mut token = None;
        if let Some(secret) = &self.cfg.jwt_secret {
            #[derive(serde::Serialize)]
            struct Claims {
                sub: String,
                exp: usize,
            }
            let exp = (chrono::Utc::now() + chrono::Duration::hours(12)).timestamp() as usize;
            let claims = Claims { sub: input.username.clone(), exp };
            token = Some(
                encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
                    .map_err(|e| AuthError::TokenError(e.to_string()))?,
            );
        }

        info!(username = %input.username, "login_succeeded");
        Ok(AuthSession { username: input.username, token })
    }
}
