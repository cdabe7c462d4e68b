//! Registration, login and token lifecycle

use crate::crypto::{generate_verification_code, hash_password, verify_password};
use crate::domain::{
    AuthResponse, LoginInput, MembershipStatus, NewMembership, NewUser, PublicUser,
    RegisterInput, StringUuid, User, UserStatus,
};
use crate::email::{send_verification_email, send_welcome_email, EmailSender};
use crate::error::{AppError, Result};
use crate::events::{DomainEvent, EventPublisher};
use crate::jwt::{JwtManager, TokenPair, TokenSubject};
use crate::repository::{
    JoinCodeRepository, MembershipRepository, TenantRepository, TenantScope, UserRepository,
};
use crate::service::TenantService;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

pub struct AuthService<U, M, R, J>
where
    U: UserRepository,
    M: MembershipRepository,
    R: TenantRepository,
    J: JoinCodeRepository,
{
    user_repo: Arc<U>,
    membership_repo: Arc<M>,
    tenant_service: Arc<TenantService<R, J>>,
    jwt: JwtManager,
    email: Arc<dyn EmailSender>,
    events: Arc<dyn EventPublisher>,
}

fn record_login(result: &'static str) {
    metrics::counter!("ecclesia_auth_login_total", "result" => result).increment(1);
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

fn invalid_refresh_token() -> AppError {
    AppError::Unauthorized("Invalid refresh token".to_string())
}

fn subject_of(user: &User) -> TokenSubject {
    TokenSubject {
        user_id: user.id,
        email: user.email.clone(),
        tenant_id: user.tenant_id,
        role: user.role,
    }
}

impl<U, M, R, J> AuthService<U, M, R, J>
where
    U: UserRepository,
    M: MembershipRepository,
    R: TenantRepository,
    J: JoinCodeRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        membership_repo: Arc<M>,
        tenant_service: Arc<TenantService<R, J>>,
        jwt: JwtManager,
        email: Arc<dyn EmailSender>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            user_repo,
            membership_repo,
            tenant_service,
            jwt,
            email,
            events,
        }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<AuthResponse> {
        let input = input.normalized();
        input.validate()?;

        let resolved = self.tenant_service.resolve_join_code(&input.join_code).await?;
        let tenant_id = resolved.tenant.id;
        let scope = TenantScope::bind(tenant_id);
        let email = input.email;

        if self
            .user_repo
            .find_by_email_in_tenant(tenant_id, &email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "User already exists in this church".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;
        let verification_code = generate_verification_code();

        let user = self
            .user_repo
            .create(&NewUser {
                tenant_id: Some(tenant_id),
                email,
                password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
                phone: input.phone,
                role: resolved.role,
                status: UserStatus::PendingVerification,
                email_verification_code: Some(verification_code.clone()),
            })
            .await?;

        self.membership_repo
            .create(
                &scope,
                &NewMembership {
                    user_id: user.id,
                    role: resolved.role,
                    status: MembershipStatus::Active,
                    join_code_used: Some(resolved.code.clone()),
                },
            )
            .await?;

        self.tenant_service
            .record_join_code_use(&scope, &resolved.code)
            .await?;
        self.tenant_service.increment_member_count(tenant_id).await?;

        if let Err(e) =
            send_verification_email(self.email.as_ref(), &user.email, &verification_code).await
        {
            warn!(user_id = %user.id, tenant_id = %tenant_id, error = %e, "Failed to send verification email");
        }

        self.events
            .publish(DomainEvent::MemberJoinedTenant {
                tenant_id,
                user_id: user.id,
                timestamp: Utc::now(),
                member_name: user.full_name(),
                role: resolved.role,
            })
            .await;

        let tokens = self.jwt.issue_token_pair(&subject_of(&user))?;
        self.user_repo
            .set_refresh_token(user.id, Some(tokens.refresh_token.clone()))
            .await?;

        info!(user_id = %user.id, tenant_id = %tenant_id, "Member registered");
        Ok(AuthResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user: user.into(),
        })
    }

    /// Global lookup by email. Nothing is written unless the credentials check out.
    pub async fn login(&self, input: LoginInput) -> Result<AuthResponse> {
        let input = input.normalized();
        input.validate()?;

        let Some(user) = self.user_repo.find_by_email(&input.email).await? else {
            record_login("invalid_credentials");
            return Err(invalid_credentials());
        };

        if !verify_password(&input.password, &user.password_hash)? {
            record_login("invalid_credentials");
            return Err(invalid_credentials());
        }

        if user.status == UserStatus::Suspended {
            record_login("suspended");
            return Err(AppError::Unauthorized("Account suspended".to_string()));
        }

        let tokens = self.jwt.issue_token_pair(&subject_of(&user))?;
        self.user_repo
            .record_login(user.id, &tokens.refresh_token)
            .await?;

        record_login("success");
        info!(user_id = %user.id, "User logged in");

        let mut user = user;
        user.last_login_at = Some(Utc::now());
        Ok(AuthResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user: user.into(),
        })
    }

    /// Rotate the pair. Only the most recently issued refresh token is valid.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self
            .jwt
            .verify_refresh_token(refresh_token)
            .map_err(|_| invalid_refresh_token())?;
        let user_id =
            StringUuid::parse_str(&claims.sub).map_err(|_| invalid_refresh_token())?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(invalid_refresh_token)?;

        if user.refresh_token.as_deref() != Some(refresh_token) {
            return Err(invalid_refresh_token());
        }

        let tokens = self.jwt.issue_token_pair(&subject_of(&user))?;
        self.user_repo
            .set_refresh_token(user.id, Some(tokens.refresh_token.clone()))
            .await?;
        Ok(tokens)
    }

    pub async fn logout(&self, user_id: StringUuid) -> Result<()> {
        self.user_repo.set_refresh_token(user_id, None).await
    }

    pub async fn verify_email(&self, user_id: StringUuid, code: &str) -> Result<PublicUser> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if user.email_verified {
            return Err(AppError::BadRequest("Email already verified".to_string()));
        }
        if user.email_verification_code.as_deref() != Some(code) {
            return Err(AppError::BadRequest(
                "Invalid verification code".to_string(),
            ));
        }

        let user = self.user_repo.mark_email_verified(user_id).await?;

        let church_name = match user.tenant_id {
            Some(tenant_id) => self
                .tenant_service
                .get(tenant_id)
                .await
                .map(|t| t.name)
                .unwrap_or_else(|_| "Ecclesia".to_string()),
            None => "Ecclesia".to_string(),
        };
        if let Err(e) =
            send_welcome_email(self.email.as_ref(), &user.email, &user.full_name(), &church_name)
                .await
        {
            warn!(user_id = %user_id, error = %e, "Failed to send welcome email");
        }
        Ok(user.into())
    }

    pub async fn resend_verification(&self, user_id: StringUuid) -> Result<()> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if user.email_verified {
            return Err(AppError::BadRequest("Email already verified".to_string()));
        }

        let code = generate_verification_code();
        self.user_repo.set_verification_code(user_id, &code).await?;

        if let Err(e) = send_verification_email(self.email.as_ref(), &user.email, &code).await {
            warn!(user_id = %user_id, error = %e, "Failed to send verification email");
        }
        Ok(())
    }

    pub async fn me(&self, user_id: StringUuid) -> Result<PublicUser> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .map(PublicUser::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
