use std::sync::Arc;

use lib::{config::Config, SharedState};
use poem_openapi::OpenApi;

use self::{
    challenges::Challenges, cohouses::Cohouses, leaderboard::LeaderboardEndpoints,
    responses::Responses,
};
use crate::services::watch::WatchHub;

mod challenges;
mod cohouses;
mod leaderboard;
mod responses;

#[derive(poem_openapi::Tags)]
pub enum Tags {
    /// Endpoints for challenges and their derived list views
    Challenges,
    /// Endpoints for challenge responses and the review workflow
    Responses,
    /// Endpoints for cohouse memberships
    Cohouses,
    /// Endpoints for the cohouse leaderboard
    Leaderboard,
}

pub fn get_api(
    state: Arc<SharedState>,
    config: Arc<Config>,
    watch_hub: Arc<WatchHub>,
) -> impl OpenApi {
    (
        Challenges {
            config: config.clone(),
        },
        Responses {
            state: state.clone(),
            config,
            watch_hub,
            submit_lock: Default::default(),
        },
        Cohouses,
        LeaderboardEndpoints { state },
    )
}
