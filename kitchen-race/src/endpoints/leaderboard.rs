use std::{sync::Arc, time::Duration};

use fnct::key;
use lib::{auth::VerifiedUserAuth, SharedState};
use poem::web::Data;
use poem_ext::{db::DbTxn, response};
use poem_openapi::{param::Query, OpenApi};
use schemas::kitchen_race::leaderboard::Leaderboard;

use super::Tags;
use crate::services::leaderboard::get_leaderboard;

pub struct LeaderboardEndpoints {
    pub state: Arc<SharedState>,
}

#[OpenApi(tag = "Tags::Leaderboard")]
impl LeaderboardEndpoints {
    /// Return the cohouse leaderboard over all validated responses.
    #[oai(path = "/leaderboard", method = "get")]
    async fn get_leaderboard(
        &self,
        #[oai(validator(maximum(value = "100")))] limit: Query<u64>,
        offset: Query<u64>,
        db: Data<&DbTxn>,
        _auth: VerifiedUserAuth,
    ) -> GetLeaderboard::Response<VerifiedUserAuth> {
        let leaderboard = self
            .state
            .cache
            .cached_result(
                key!(limit.0, offset.0),
                &[],
                Some(Duration::from_secs(10)),
                || get_leaderboard(&***db, limit.0, offset.0),
            )
            .await??;
        GetLeaderboard::ok(leaderboard)
    }
}

response!(GetLeaderboard = {
    Ok(200) => Leaderboard,
});
