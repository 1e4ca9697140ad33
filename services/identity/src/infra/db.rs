use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, SqlErr,
    TransactionError, TransactionTrait,
    sea_query::{Expr, OnConflict},
};

use clubhouse_domain::member::{handle_base, handle_candidate};
use clubhouse_domain::phone::PhoneIdentity;
use clubhouse_identity_schema::{invite_codes, members};

use crate::domain::repository::{InviteLedger, MemberDirectory};
use crate::domain::types::{InviteCode, MAX_HANDLE_ATTEMPTS, Member};
use crate::error::IdentityError;

/// Serializes every transaction that grows the directory. Counts and handle
/// checks taken after this lock stay true until commit.
const LOCK_MEMBERS: &str = "LOCK TABLE members IN SHARE ROW EXCLUSIVE MODE";

fn is_unique_violation(err: &TransactionError<DbErr>) -> bool {
    match err {
        TransactionError::Connection(e) | TransactionError::Transaction(e) => {
            matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        }
    }
}

// ── Member directory ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMemberDirectory {
    pub db: DatabaseConnection,
}

impl MemberDirectory for DbMemberDirectory {
    async fn find_by_identity(
        &self,
        phone: &PhoneIdentity,
    ) -> Result<Option<Member>, IdentityError> {
        let model = members::Entity::find_by_id(phone.as_str().to_owned())
            .one(&self.db)
            .await
            .context("find member by phone")?;
        Ok(model.map(member_from_model))
    }

    async fn count(&self) -> Result<u64, IdentityError> {
        let count = members::Entity::find()
            .count(&self.db)
            .await
            .context("count members")?;
        Ok(count)
    }

    async fn update_role(
        &self,
        phone: &PhoneIdentity,
        is_admin: Option<bool>,
        is_moderator: Option<bool>,
    ) -> Result<(), IdentityError> {
        if is_admin.is_none() && is_moderator.is_none() {
            return Ok(());
        }
        let mut update = members::Entity::update_many()
            .filter(members::Column::Phone.eq(phone.as_str()));
        if let Some(value) = is_admin {
            update = update.col_expr(members::Column::IsAdmin, Expr::value(value));
        }
        if let Some(value) = is_moderator {
            update = update.col_expr(members::Column::IsModerator, Expr::value(value));
        }
        update.exec(&self.db).await.context("update member role")?;
        Ok(())
    }

    async fn insert_first_admin(
        &self,
        admin: &Member,
        invites: &[InviteCode],
    ) -> Result<(), IdentityError> {
        let result = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                let admin = admin.clone();
                let invites = invites.to_vec();
                Box::pin(async move {
                    txn.execute_unprepared(LOCK_MEMBERS).await?;
                    if members::Entity::find().count(txn).await? > 0 {
                        return Ok(false);
                    }
                    insert_member(txn, &admin).await?;
                    for invite in &invites {
                        invite_codes::Entity::insert(invite_model(invite))
                            .on_conflict(
                                OnConflict::column(invite_codes::Column::Code)
                                    .do_nothing()
                                    .to_owned(),
                            )
                            .exec_without_returning(txn)
                            .await?;
                    }
                    Ok(true)
                })
            })
            .await;
        match result {
            Ok(true) => Ok(()),
            Ok(false) => Err(IdentityError::AlreadyInitialized),
            Err(e) if is_unique_violation(&e) => Err(IdentityError::AlreadyInitialized),
            Err(e) => Err(anyhow::Error::new(e).context("bootstrap first admin").into()),
        }
    }
}

async fn insert_member(txn: &DatabaseTransaction, member: &Member) -> Result<(), DbErr> {
    members::ActiveModel {
        phone: Set(member.phone.as_str().to_owned()),
        name: Set(member.name.clone()),
        handle: Set(member.handle.clone()),
        is_admin: Set(member.is_admin),
        is_moderator: Set(member.is_moderator),
        is_active: Set(member.is_active),
        joined_at: Set(member.joined_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

/// First free handle derived from `name`. Call with the members lock held.
async fn free_handle(txn: &DatabaseTransaction, name: &str) -> Result<Option<String>, DbErr> {
    let base = handle_base(name);
    for attempt in 1..=MAX_HANDLE_ATTEMPTS {
        let candidate = handle_candidate(&base, attempt);
        let taken = members::Entity::find()
            .filter(members::Column::Handle.eq(candidate.as_str()))
            .count(txn)
            .await?;
        if taken == 0 {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

fn member_from_model(model: members::Model) -> Member {
    Member {
        phone: PhoneIdentity::normalize(&model.phone),
        name: model.name,
        handle: model.handle,
        is_admin: model.is_admin,
        is_moderator: model.is_moderator,
        is_active: model.is_active,
        joined_at: model.joined_at,
    }
}

// ── Invite ledger ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbInviteLedger {
    pub db: DatabaseConnection,
}

/// Result of the redemption transaction. Only `Redeemed` writes anything.
enum Redemption {
    Redeemed(Member),
    InvalidCode,
    Full,
    AlreadyMember,
    NoFreeHandle,
}

impl InviteLedger for DbInviteLedger {
    async fn exists(&self, code: &str) -> Result<bool, IdentityError> {
        let count = invite_codes::Entity::find_by_id(code.to_owned())
            .count(&self.db)
            .await
            .context("check invite code")?;
        Ok(count > 0)
    }

    async fn find_unused(&self, code: &str) -> Result<Option<InviteCode>, IdentityError> {
        let model = invite_codes::Entity::find_by_id(code.to_owned())
            .filter(invite_codes::Column::UsedByPhone.is_null())
            .one(&self.db)
            .await
            .context("find unused invite code")?;
        Ok(model.map(invite_from_model))
    }

    async fn insert(&self, invite: &InviteCode) -> Result<bool, IdentityError> {
        let inserted = invite_codes::Entity::insert(invite_model(invite))
            .on_conflict(
                OnConflict::column(invite_codes::Column::Code)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("insert invite code")?;
        Ok(inserted == 1)
    }

    async fn redeem(
        &self,
        code: &str,
        member: &Member,
        max_members: u64,
    ) -> Result<Member, IdentityError> {
        let result = self
            .db
            .transaction::<_, Redemption, DbErr>(move |txn| {
                let code = code.to_owned();
                let mut member = member.clone();
                Box::pin(async move {
                    txn.execute_unprepared(LOCK_MEMBERS).await?;
                    let invite = invite_codes::Entity::find_by_id(code.clone())
                        .lock_exclusive()
                        .one(txn)
                        .await?;
                    match invite {
                        Some(invite) if invite.used_by_phone.is_none() => {}
                        _ => return Ok(Redemption::InvalidCode),
                    }
                    if members::Entity::find().count(txn).await? >= max_members {
                        return Ok(Redemption::Full);
                    }
                    let existing = members::Entity::find_by_id(member.phone.as_str().to_owned())
                        .one(txn)
                        .await?;
                    if existing.is_some() {
                        return Ok(Redemption::AlreadyMember);
                    }
                    let Some(handle) = free_handle(txn, &member.name).await? else {
                        return Ok(Redemption::NoFreeHandle);
                    };
                    member.handle = Some(handle);
                    let marked = invite_codes::Entity::update_many()
                        .col_expr(
                            invite_codes::Column::UsedByPhone,
                            Expr::value(member.phone.as_str()),
                        )
                        .col_expr(invite_codes::Column::UsedAt, Expr::value(Utc::now()))
                        .filter(invite_codes::Column::Code.eq(code.as_str()))
                        .filter(invite_codes::Column::UsedByPhone.is_null())
                        .exec(txn)
                        .await?;
                    if marked.rows_affected != 1 {
                        return Ok(Redemption::InvalidCode);
                    }
                    insert_member(txn, &member).await?;
                    Ok(Redemption::Redeemed(member))
                })
            })
            .await;
        match result {
            Ok(Redemption::Redeemed(member)) => Ok(member),
            Ok(Redemption::InvalidCode) => Err(IdentityError::InvalidInviteCode),
            Ok(Redemption::Full) => Err(IdentityError::CommunityFull),
            Ok(Redemption::AlreadyMember) => Err(IdentityError::AlreadyMember),
            Ok(Redemption::NoFreeHandle) => {
                Err(anyhow::anyhow!("no free handle for {}", member.name).into())
            }
            Err(e) if is_unique_violation(&e) => {
                // Only reachable if a writer bypassed the members lock.
                let directory = DbMemberDirectory {
                    db: self.db.clone(),
                };
                if directory.find_by_identity(&member.phone).await?.is_some() {
                    Err(IdentityError::AlreadyMember)
                } else {
                    Err(anyhow::Error::new(e).context("redeem invite code").into())
                }
            }
            Err(e) => Err(anyhow::Error::new(e).context("redeem invite code").into()),
        }
    }
}

fn invite_model(invite: &InviteCode) -> invite_codes::ActiveModel {
    invite_codes::ActiveModel {
        code: Set(invite.code.clone()),
        created_by_phone: Set(invite.created_by.as_str().to_owned()),
        used_by_phone: Set(invite.used_by.as_ref().map(|p| p.as_str().to_owned())),
        created_at: Set(invite.created_at),
        used_at: Set(invite.used_at),
    }
}

fn invite_from_model(model: invite_codes::Model) -> InviteCode {
    InviteCode {
        code: model.code,
        created_by: PhoneIdentity::normalize(&model.created_by_phone),
        used_by: model.used_by_phone.as_deref().map(PhoneIdentity::normalize),
        created_at: model.created_at,
        used_at: model.used_at,
    }
}
