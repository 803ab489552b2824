use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use entity::kitchen_race_challenges;
use lib::{
    auth::{AdminAuth, VerifiedUserAuth},
    config::Config,
};
use poem::web::Data;
use poem_ext::{db::DbTxn, response};
use poem_openapi::{
    param::{Path, Query},
    payload::Json,
    OpenApi,
};
use schemas::kitchen_race::challenges::{
    encode_choice_set, Challenge, ChallengeContent, ChallengeFilter, CreateChallengeRequest,
};
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use super::Tags;
use crate::services::{
    challenges::{get_challenge, list_challenges},
    cohouses::can_access_cohouse,
    filter::{filter_challenges, latest_responses},
    responses::get_responses_for_cohouse,
};

pub struct Challenges {
    pub config: Arc<Config>,
}

#[OpenApi(tag = "Tags::Challenges")]
impl Challenges {
    /// List all challenges, optionally narrowed to one of the derived views.
    ///
    /// All views except `ALL` are derived from the responses of one cohouse,
    /// so they require `cohouse_id` and membership in that cohouse.
    #[oai(path = "/challenges", method = "get")]
    async fn list_challenges(
        &self,
        /// The view to derive. Defaults to `ALL`.
        filter: Query<Option<ChallengeFilter>>,
        /// The cohouse whose responses the view is derived from.
        cohouse_id: Query<Option<Uuid>>,
        db: Data<&DbTxn>,
        auth: VerifiedUserAuth,
    ) -> ListChallenges::Response<VerifiedUserAuth> {
        let filter = filter.0.unwrap_or(ChallengeFilter::All);
        let responses = match (filter, cohouse_id.0) {
            (ChallengeFilter::All, None) => HashMap::new(),
            (_, Some(cohouse_id)) => {
                if !can_access_cohouse(&***db, &auth.0, cohouse_id).await? {
                    return ListChallenges::forbidden();
                }
                latest_responses(get_responses_for_cohouse(&***db, cohouse_id).await?)
            }
            (_, None) => return ListChallenges::cohouse_required(),
        };

        let now = Utc::now();
        ListChallenges::ok(
            filter_challenges(filter, list_challenges(&***db).await?, &responses, now)
                .into_iter()
                .map(|challenge| Challenge::from(challenge, now))
                .collect(),
        )
    }

    /// Get a challenge by id.
    #[oai(path = "/challenges/:challenge_id", method = "get")]
    async fn get_challenge(
        &self,
        challenge_id: Path<Uuid>,
        db: Data<&DbTxn>,
        _auth: VerifiedUserAuth,
    ) -> GetChallenge::Response<VerifiedUserAuth> {
        match get_challenge(&***db, challenge_id.0).await? {
            Some(challenge) => GetChallenge::ok(Challenge::from(challenge, Utc::now())),
            None => GetChallenge::challenge_not_found(),
        }
    }

    /// Create a new challenge.
    #[oai(path = "/challenges", method = "post")]
    async fn create_challenge(
        &self,
        data: Json<CreateChallengeRequest>,
        db: Data<&DbTxn>,
        auth: AdminAuth,
    ) -> CreateChallenge::Response<AdminAuth> {
        if data.0.end < data.0.start {
            return CreateChallenge::invalid_window();
        }
        if let Some(points) = data.0.points {
            if points > self.config.kitchen_race.challenges.max_points {
                return CreateChallenge::points_limit_exceeded(
                    self.config.kitchen_race.challenges.max_points,
                );
            }
        }

        let (choices, correct_choices, shuffle_choices) = match &data.0.content {
            ChallengeContent::MultipleChoice(content) => {
                if content.choices.len() > self.config.kitchen_race.challenges.max_choices {
                    return CreateChallenge::choice_limit_exceeded(
                        self.config.kitchen_race.challenges.max_choices as u64,
                    );
                }
                if let Some(correct) = &content.correct_choices {
                    if correct
                        .iter()
                        .any(|&index| index >= content.choices.len() as u64)
                    {
                        return CreateChallenge::invalid_correct_choice();
                    }
                }
                (
                    Some(content.choices.clone()),
                    content.correct_choices.as_deref().map(encode_choice_set),
                    content.shuffle_choices,
                )
            }
            _ => (None, None, false),
        };

        let now = Utc::now();
        let challenge = kitchen_race_challenges::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(data.0.title),
            body: Set(data.0.body),
            start_timestamp: Set(data.0.start.naive_utc()),
            end_timestamp: Set(data.0.end.naive_utc()),
            content_type: Set(data.0.content.content_type()),
            choices: Set(choices),
            correct_choices: Set(correct_choices),
            shuffle_choices: Set(shuffle_choices),
            points: Set(data.0.points.map(|x| x as _)),
            creator: Set(auth.0.id),
            creation_timestamp: Set(now.naive_utc()),
        }
        .insert(&***db)
        .await?;

        CreateChallenge::ok(Challenge::from(challenge, now))
    }
}

response!(ListChallenges = {
    Ok(200) => Vec<Challenge>,
    /// The requested view requires a `cohouse_id`.
    CohouseRequired(400, error),
    /// The user is not a member of this cohouse.
    Forbidden(403, error),
});

response!(GetChallenge = {
    Ok(200) => Challenge,
    /// Challenge does not exist.
    ChallengeNotFound(404, error),
});

response!(CreateChallenge = {
    Ok(201) => Challenge,
    /// The active window ends before it starts.
    InvalidWindow(400, error),
    /// A correct choice index does not refer to a choice.
    InvalidCorrectChoice(400, error),
    /// The max choices limit has been exceeded. `details` contains the limit.
    ChoiceLimitExceeded(403, error) => u64,
    /// The max points limit has been exceeded. `details` contains the limit.
    PointsLimitExceeded(403, error) => u64,
});
