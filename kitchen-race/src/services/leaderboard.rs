use std::collections::HashMap;

use entity::{
    kitchen_race_challenge_responses, kitchen_race_challenges,
    sea_orm_active_enums::KitchenRaceResponseStatus,
};
use itertools::Itertools;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use schemas::kitchen_race::leaderboard::{CohouseRank, Leaderboard};
use uuid::Uuid;

/// Rank cohouses by the summed points of their validated responses.
/// Cohouses with equal points share a rank; ties are broken by id for a
/// stable order.
pub async fn get_leaderboard(
    db: &impl ConnectionTrait,
    limit: u64,
    offset: u64,
) -> Result<Leaderboard, DbErr> {
    let responses = kitchen_race_challenge_responses::Entity::find()
        .find_also_related(kitchen_race_challenges::Entity)
        .filter(
            kitchen_race_challenge_responses::Column::Status
                .eq(KitchenRaceResponseStatus::Validated),
        )
        .all(db)
        .await?;

    let mut points_by_cohouse = HashMap::new();
    for (response, challenge) in responses {
        let points = challenge.and_then(|challenge| challenge.points).unwrap_or(0) as u64;
        *points_by_cohouse.entry(response.cohouse_id).or_insert(0) += points;
    }

    Ok(rank_cohouses(points_by_cohouse, limit, offset))
}

fn rank_cohouses(points_by_cohouse: HashMap<Uuid, u64>, limit: u64, offset: u64) -> Leaderboard {
    let total = points_by_cohouse.len() as u64;
    let mut rank = 0;
    let mut previous_points = None;
    let leaderboard = points_by_cohouse
        .into_iter()
        .sorted_by_key(|&(cohouse_id, points)| (std::cmp::Reverse(points), cohouse_id))
        .enumerate()
        .map(|(i, (cohouse_id, points))| {
            if previous_points != Some(points) {
                rank = i as u64 + 1;
                previous_points = Some(points);
            }
            CohouseRank {
                cohouse_id,
                points,
                rank,
            }
        })
        .skip(offset as usize)
        .take(limit as usize)
        .collect();
    Leaderboard { leaderboard, total }
}
