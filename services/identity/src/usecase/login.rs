use chrono::Duration;
use tracing::{info, warn};

use clubhouse_auth_types::session;
use clubhouse_domain::phone::PhoneIdentity;

use crate::domain::repository::{AttemptLimiter, ChallengeStore, MemberDirectory, Notifier};
use crate::error::IdentityError;

/// Limits and presentation for the login-code request.
#[derive(Debug, Clone)]
pub struct LoginPolicy {
    pub max_attempts: u32,
    pub window: Duration,
    pub site_name: String,
    /// Return the code in the response. Never set in production.
    pub echo_code: bool,
}

fn login_code_message(site_name: &str, code: &str) -> String {
    format!("{site_name} login code: {code}\n\nThis code expires in 10 minutes.")
}

// ── RequestLoginCode ─────────────────────────────────────────────────────────

pub struct RequestLoginCodeInput {
    pub phone: String,
}

#[derive(Debug)]
pub struct RequestLoginCodeOutput {
    pub phone: PhoneIdentity,
    pub delivered: bool,
    pub code: Option<String>,
}

pub struct RequestLoginCodeUseCase<M, L, C, N>
where
    M: MemberDirectory,
    L: AttemptLimiter,
    C: ChallengeStore,
    N: Notifier,
{
    pub members: M,
    pub limiter: L,
    pub challenges: C,
    pub notifier: N,
    pub policy: LoginPolicy,
}

impl<M, L, C, N> RequestLoginCodeUseCase<M, L, C, N>
where
    M: MemberDirectory,
    L: AttemptLimiter,
    C: ChallengeStore,
    N: Notifier,
{
    pub async fn execute(
        &self,
        input: RequestLoginCodeInput,
    ) -> Result<RequestLoginCodeOutput, IdentityError> {
        let phone = PhoneIdentity::normalize(&input.phone);
        if phone.is_empty() {
            return Err(IdentityError::InvalidInput);
        }

        // 1. Count the attempt before the lookup so unknown numbers are limited too
        let admitted = self
            .limiter
            .admit(&phone, self.policy.max_attempts, self.policy.window)
            .await?;
        if !admitted {
            warn!(phone = %phone.masked(), "login code request rate limited");
            return Err(IdentityError::RateLimited);
        }

        // 2. Only members can sign in
        self.members
            .find_by_identity(&phone)
            .await?
            .ok_or(IdentityError::MemberNotFound)?;

        // 3. Issue, then deliver best effort
        let code = self.challenges.issue(&phone).await?;
        let delivered = self
            .notifier
            .send(&phone, &login_code_message(&self.policy.site_name, &code))
            .await;
        if !delivered {
            info!(phone = %phone.masked(), "login code issued but not delivered");
        }

        Ok(RequestLoginCodeOutput {
            phone,
            delivered,
            code: self.policy.echo_code.then_some(code),
        })
    }
}

// ── VerifyLoginCode ──────────────────────────────────────────────────────────

pub struct VerifyLoginCodeInput {
    pub phone: String,
    pub code: String,
}

#[derive(Debug)]
pub struct VerifyLoginCodeOutput {
    pub phone: PhoneIdentity,
    pub session_token: String,
}

pub struct VerifyLoginCodeUseCase<C>
where
    C: ChallengeStore,
{
    pub challenges: C,
    pub secret: String,
}

impl<C> VerifyLoginCodeUseCase<C>
where
    C: ChallengeStore,
{
    pub async fn execute(
        &self,
        input: VerifyLoginCodeInput,
    ) -> Result<VerifyLoginCodeOutput, IdentityError> {
        let phone = PhoneIdentity::normalize(&input.phone);
        let code = input.code.trim();
        if phone.is_empty() || code.is_empty() {
            return Err(IdentityError::InvalidLoginCode);
        }
        if !self.challenges.verify(&phone, code).await? {
            return Err(IdentityError::InvalidLoginCode);
        }
        let session_token = session::mint(&phone, &self.secret);
        info!(phone = %phone.masked(), "member signed in");
        Ok(VerifyLoginCodeOutput {
            phone,
            session_token,
        })
    }
}
