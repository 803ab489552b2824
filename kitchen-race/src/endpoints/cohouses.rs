use chrono::Utc;
use entity::kitchen_race_cohouse_members;
use lib::auth::{AdminAuth, VerifiedUserAuth};
use poem::web::Data;
use poem_ext::{db::DbTxn, response};
use poem_openapi::{param::Path, OpenApi};
use schemas::kitchen_race::cohouses::CohouseMember;
use sea_orm::{ActiveModelTrait, ModelTrait, Set};
use uuid::Uuid;

use super::Tags;
use crate::services::cohouses::{can_access_cohouse, get_member, get_members};

pub struct Cohouses;

#[OpenApi(tag = "Tags::Cohouses")]
impl Cohouses {
    /// List all members of a cohouse.
    #[oai(path = "/cohouses/:cohouse_id/members", method = "get")]
    async fn list_members(
        &self,
        cohouse_id: Path<Uuid>,
        db: Data<&DbTxn>,
        auth: VerifiedUserAuth,
    ) -> ListMembers::Response<VerifiedUserAuth> {
        if !can_access_cohouse(&***db, &auth.0, cohouse_id.0).await? {
            return ListMembers::forbidden();
        }
        ListMembers::ok(
            get_members(&***db, cohouse_id.0)
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        )
    }

    /// Add a user to a cohouse. Adding an existing member has no effect.
    #[oai(path = "/cohouses/:cohouse_id/members/:user_id", method = "put")]
    async fn add_member(
        &self,
        cohouse_id: Path<Uuid>,
        user_id: Path<Uuid>,
        db: Data<&DbTxn>,
        _auth: AdminAuth,
    ) -> AddMember::Response<AdminAuth> {
        if let Some(member) = get_member(&***db, cohouse_id.0, user_id.0).await? {
            return AddMember::ok(member.into());
        }
        AddMember::ok(
            kitchen_race_cohouse_members::ActiveModel {
                cohouse_id: Set(cohouse_id.0),
                user_id: Set(user_id.0),
                joined_timestamp: Set(Utc::now().naive_utc()),
            }
            .insert(&***db)
            .await?
            .into(),
        )
    }

    /// Remove a user from a cohouse.
    #[oai(path = "/cohouses/:cohouse_id/members/:user_id", method = "delete")]
    async fn remove_member(
        &self,
        cohouse_id: Path<Uuid>,
        user_id: Path<Uuid>,
        db: Data<&DbTxn>,
        _auth: AdminAuth,
    ) -> RemoveMember::Response<AdminAuth> {
        match get_member(&***db, cohouse_id.0, user_id.0).await? {
            Some(member) => {
                member.delete(&***db).await?;
                RemoveMember::ok()
            }
            None => RemoveMember::member_not_found(),
        }
    }
}

response!(ListMembers = {
    Ok(200) => Vec<CohouseMember>,
    /// The user is not a member of this cohouse.
    Forbidden(403, error),
});

response!(AddMember = {
    Ok(200) => CohouseMember,
});

response!(RemoveMember = {
    Ok(200),
    /// The user is not a member of this cohouse.
    MemberNotFound(404, error),
});
