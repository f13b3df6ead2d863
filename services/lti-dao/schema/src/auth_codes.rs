use sea_orm::entity::prelude::*;

/// Authorization code granting a user access to the Kaltura REST endpoints.
/// `auth_code` is unique; expiry is stored but enforced by callers.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "kaltura_lti_auth_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub auth_code: String,
    pub user_id: String,
    pub sakai_role: Option<String>,
    pub lti_role: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
