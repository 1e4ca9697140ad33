use sea_orm::entity::prelude::*;

/// Membership directory row. The canonical phone number is the primary key.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub phone: String,
    pub name: String,
    #[sea_orm(unique)]
    pub handle: Option<String>,
    pub is_admin: bool,
    pub is_moderator: bool,
    pub is_active: bool,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invite_codes::Entity")]
    InviteCodes,
}

impl Related<super::invite_codes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InviteCodes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
