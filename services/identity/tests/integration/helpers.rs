use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use clubhouse_domain::member::{handle_base, handle_candidate};
use clubhouse_domain::phone::PhoneIdentity;
use clubhouse_identity::domain::repository::{InviteLedger, MemberDirectory, Notifier};
use clubhouse_identity::domain::types::{InviteCode, MAX_HANDLE_ATTEMPTS, Member};
use clubhouse_identity::error::IdentityError;
use clubhouse_identity::infra::memory::MemoryStores;
use clubhouse_identity::usecase::login::LoginPolicy;
use clubhouse_testing::clock::ManualClock;

pub const TEST_SECRET: &str = "test-secret-salt";
pub const ADMIN_PHONE: &str = "5550000001";

pub fn phone(raw: &str) -> PhoneIdentity {
    PhoneIdentity::normalize(raw)
}

pub fn test_member(raw_phone: &str, name: &str) -> Member {
    Member {
        phone: phone(raw_phone),
        name: name.to_owned(),
        handle: Some(name.to_lowercase()),
        is_admin: false,
        is_moderator: false,
        is_active: true,
        joined_at: Utc::now(),
    }
}

pub fn test_admin(raw_phone: &str, name: &str) -> Member {
    Member {
        is_admin: true,
        ..test_member(raw_phone, name)
    }
}

pub fn login_policy() -> LoginPolicy {
    LoginPolicy {
        max_attempts: 10,
        window: Duration::hours(1),
        site_name: "The Clubhouse".to_owned(),
        echo_code: true,
    }
}

/// In-memory stores on a clock the test controls.
pub fn memory_stores() -> (ManualClock, MemoryStores) {
    let clock = ManualClock::default();
    let stores = MemoryStores::new(TEST_SECRET, Arc::new(clock.clone()));
    (clock, stores)
}

// ── MockCommunity ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct Community {
    pub members: HashMap<PhoneIdentity, Member>,
    pub invites: HashMap<String, InviteCode>,
}

/// Directory and ledger over one lock, so redemption and bootstrap are atomic
/// like their database transactions.
#[derive(Clone, Default)]
pub struct MockCommunity {
    pub state: Arc<Mutex<Community>>,
}

impl MockCommunity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(self, member: Member) -> Self {
        self.state
            .lock()
            .unwrap()
            .members
            .insert(member.phone.clone(), member);
        self
    }

    pub fn with_invite(self, code: &str, created_by: &str) -> Self {
        let invite = InviteCode::new(code.to_owned(), phone(created_by), Utc::now());
        self.state
            .lock()
            .unwrap()
            .invites
            .insert(code.to_owned(), invite);
        self
    }

    pub fn member(&self, raw_phone: &str) -> Option<Member> {
        self.state
            .lock()
            .unwrap()
            .members
            .get(&phone(raw_phone))
            .cloned()
    }

    pub fn invite(&self, code: &str) -> Option<InviteCode> {
        self.state.lock().unwrap().invites.get(code).cloned()
    }

    pub fn member_count(&self) -> usize {
        self.state.lock().unwrap().members.len()
    }

    pub fn invite_count(&self) -> usize {
        self.state.lock().unwrap().invites.len()
    }
}

impl MemberDirectory for MockCommunity {
    async fn find_by_identity(
        &self,
        phone: &PhoneIdentity,
    ) -> Result<Option<Member>, IdentityError> {
        Ok(self.state.lock().unwrap().members.get(phone).cloned())
    }

    async fn count(&self) -> Result<u64, IdentityError> {
        Ok(self.state.lock().unwrap().members.len() as u64)
    }

    async fn update_role(
        &self,
        phone: &PhoneIdentity,
        is_admin: Option<bool>,
        is_moderator: Option<bool>,
    ) -> Result<(), IdentityError> {
        let mut state = self.state.lock().unwrap();
        if let Some(member) = state.members.get_mut(phone) {
            if let Some(value) = is_admin {
                member.is_admin = value;
            }
            if let Some(value) = is_moderator {
                member.is_moderator = value;
            }
        }
        Ok(())
    }

    async fn insert_first_admin(
        &self,
        admin: &Member,
        invites: &[InviteCode],
    ) -> Result<(), IdentityError> {
        let mut state = self.state.lock().unwrap();
        if !state.members.is_empty() {
            return Err(IdentityError::AlreadyInitialized);
        }
        state.members.insert(admin.phone.clone(), admin.clone());
        for invite in invites {
            state
                .invites
                .entry(invite.code.clone())
                .or_insert_with(|| invite.clone());
        }
        Ok(())
    }
}

impl InviteLedger for MockCommunity {
    async fn exists(&self, code: &str) -> Result<bool, IdentityError> {
        Ok(self.state.lock().unwrap().invites.contains_key(code))
    }

    async fn find_unused(&self, code: &str) -> Result<Option<InviteCode>, IdentityError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .invites
            .get(code)
            .filter(|i| !i.is_redeemed())
            .cloned())
    }

    async fn insert(&self, invite: &InviteCode) -> Result<bool, IdentityError> {
        let mut state = self.state.lock().unwrap();
        if state.invites.contains_key(&invite.code) {
            return Ok(false);
        }
        state.invites.insert(invite.code.clone(), invite.clone());
        Ok(true)
    }

    async fn redeem(
        &self,
        code: &str,
        member: &Member,
        max_members: u64,
    ) -> Result<Member, IdentityError> {
        let mut state = self.state.lock().unwrap();
        match state.invites.get(code) {
            Some(invite) if !invite.is_redeemed() => {}
            _ => return Err(IdentityError::InvalidInviteCode),
        }
        if state.members.len() as u64 >= max_members {
            return Err(IdentityError::CommunityFull);
        }
        if state.members.contains_key(&member.phone) {
            return Err(IdentityError::AlreadyMember);
        }
        let base = handle_base(&member.name);
        let handle = (1..=MAX_HANDLE_ATTEMPTS)
            .map(|attempt| handle_candidate(&base, attempt))
            .find(|candidate| {
                !state
                    .members
                    .values()
                    .any(|m| m.handle.as_deref() == Some(candidate.as_str()))
            })
            .expect("free handle");
        if let Some(invite) = state.invites.get_mut(code) {
            invite.used_by = Some(member.phone.clone());
            invite.used_at = Some(Utc::now());
        }
        let stored = Member {
            handle: Some(handle),
            ..member.clone()
        };
        state.members.insert(stored.phone.clone(), stored.clone());
        Ok(stored)
    }
}

// ── RecordingNotifier ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<(PhoneIdentity, String)>>>,
    pub deliver: bool,
}

impl RecordingNotifier {
    pub fn delivering() -> Self {
        Self {
            sent: Arc::default(),
            deliver: true,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            deliver: false,
        }
    }

    pub fn messages(&self) -> Vec<(PhoneIdentity, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn send(&self, phone: &PhoneIdentity, message: &str) -> bool {
        self.sent
            .lock()
            .unwrap()
            .push((phone.clone(), message.to_owned()));
        self.deliver
    }
}
