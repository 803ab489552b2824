use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Object, Serialize, Deserialize)]
pub struct Leaderboard {
    /// The requested page of ranked cohouses.
    pub leaderboard: Vec<CohouseRank>,
    /// The total number of cohouses with at least one validated response.
    pub total: u64,
}

#[derive(Debug, Clone, Object, Serialize, Deserialize)]
pub struct CohouseRank {
    /// The cohouse.
    pub cohouse_id: Uuid,
    /// The summed points of the cohouse's validated responses.
    pub points: u64,
    /// The rank of the cohouse. Cohouses with equal points share a rank.
    pub rank: u64,
}
