use std::collections::{hash_map::Entry, HashMap};

use chrono::{DateTime, Utc};
use entity::{
    kitchen_race_challenge_responses, kitchen_race_challenges,
    sea_orm_active_enums::KitchenRaceResponseStatus,
};
use schemas::kitchen_race::challenges::{ChallengeFilter, ChallengeState};
use uuid::Uuid;

/// Index a cohouse's responses by challenge. Duplicates cannot be created
/// through the api, but if any exist the most recent submission wins.
pub fn latest_responses(
    responses: Vec<kitchen_race_challenge_responses::Model>,
) -> HashMap<Uuid, kitchen_race_challenge_responses::Model> {
    let mut latest = HashMap::new();
    for response in responses {
        match latest.entry(response.challenge_id) {
            Entry::Vacant(entry) => {
                entry.insert(response);
            }
            Entry::Occupied(mut entry) => {
                if entry.get().submission_timestamp <= response.submission_timestamp {
                    entry.insert(response);
                }
            }
        }
    }
    latest
}

/// Whether a challenge belongs to the given view, based on its derived
/// state and the status of the cohouse's response (if any).
pub fn matches_filter(
    filter: ChallengeFilter,
    state: ChallengeState,
    status: Option<KitchenRaceResponseStatus>,
) -> bool {
    match filter {
        ChallengeFilter::All => true,
        ChallengeFilter::Todo => status.is_none() && state == ChallengeState::Ongoing,
        ChallengeFilter::Waiting => matches!(status, Some(KitchenRaceResponseStatus::Waiting)),
        ChallengeFilter::Reviewed => matches!(
            status,
            Some(KitchenRaceResponseStatus::Validated | KitchenRaceResponseStatus::Invalidated)
        ),
    }
}

pub fn filter_challenges(
    filter: ChallengeFilter,
    challenges: Vec<kitchen_race_challenges::Model>,
    responses: &HashMap<Uuid, kitchen_race_challenge_responses::Model>,
    now: DateTime<Utc>,
) -> Vec<kitchen_race_challenges::Model> {
    challenges
        .into_iter()
        .filter(|challenge| {
            let state = ChallengeState::of(
                challenge.start_timestamp.and_utc(),
                challenge.end_timestamp.and_utc(),
                now,
            );
            let status = responses.get(&challenge.id).map(|response| response.status);
            matches_filter(filter, state, status)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use entity::sea_orm_active_enums::KitchenRaceContentType;

    use super::*;

    #[test]
    fn test_matches_filter_all() {
        for state in [
            ChallengeState::NotStarted,
            ChallengeState::Ongoing,
            ChallengeState::Done,
        ] {
            for status in [
                None,
                Some(KitchenRaceResponseStatus::Waiting),
                Some(KitchenRaceResponseStatus::Validated),
                Some(KitchenRaceResponseStatus::Invalidated),
            ] {
                assert!(matches_filter(ChallengeFilter::All, state, status));
            }
        }
    }

    #[test]
    fn test_matches_filter_todo() {
        // only ongoing challenges without a response are todo
        assert!(matches_filter(
            ChallengeFilter::Todo,
            ChallengeState::Ongoing,
            None
        ));
        assert!(!matches_filter(
            ChallengeFilter::Todo,
            ChallengeState::NotStarted,
            None
        ));
        assert!(!matches_filter(
            ChallengeFilter::Todo,
            ChallengeState::Done,
            None
        ));
        assert!(!matches_filter(
            ChallengeFilter::Todo,
            ChallengeState::Ongoing,
            Some(KitchenRaceResponseStatus::Waiting)
        ));
        assert!(!matches_filter(
            ChallengeFilter::Todo,
            ChallengeState::Ongoing,
            Some(KitchenRaceResponseStatus::Invalidated)
        ));
    }

    #[test]
    fn test_matches_filter_waiting() {
        assert!(matches_filter(
            ChallengeFilter::Waiting,
            ChallengeState::Ongoing,
            Some(KitchenRaceResponseStatus::Waiting)
        ));
        // the challenge state is irrelevant once a response exists
        assert!(matches_filter(
            ChallengeFilter::Waiting,
            ChallengeState::Done,
            Some(KitchenRaceResponseStatus::Waiting)
        ));
        assert!(!matches_filter(
            ChallengeFilter::Waiting,
            ChallengeState::Ongoing,
            None
        ));
        assert!(!matches_filter(
            ChallengeFilter::Waiting,
            ChallengeState::Ongoing,
            Some(KitchenRaceResponseStatus::Validated)
        ));
    }

    #[test]
    fn test_matches_filter_reviewed() {
        assert!(matches_filter(
            ChallengeFilter::Reviewed,
            ChallengeState::Done,
            Some(KitchenRaceResponseStatus::Validated)
        ));
        assert!(matches_filter(
            ChallengeFilter::Reviewed,
            ChallengeState::Ongoing,
            Some(KitchenRaceResponseStatus::Invalidated)
        ));
        assert!(!matches_filter(
            ChallengeFilter::Reviewed,
            ChallengeState::Done,
            Some(KitchenRaceResponseStatus::Waiting)
        ));
        assert!(!matches_filter(
            ChallengeFilter::Reviewed,
            ChallengeState::Done,
            None
        ));
    }

    fn challenge(id: Uuid, start_offset: Duration, end_offset: Duration) -> kitchen_race_challenges::Model {
        let now = Utc::now().naive_utc();
        kitchen_race_challenges::Model {
            id,
            title: "Cook a three course dinner".into(),
            body: "Starter, main and dessert. Bonus points for plating.".into(),
            start_timestamp: now + start_offset,
            end_timestamp: now + end_offset,
            content_type: KitchenRaceContentType::NoChoice,
            choices: None,
            correct_choices: None,
            shuffle_choices: false,
            points: Some(10),
            creator: Uuid::new_v4(),
            creation_timestamp: now,
        }
    }

    fn response(
        challenge_id: Uuid,
        status: KitchenRaceResponseStatus,
        submission_offset: Duration,
    ) -> kitchen_race_challenge_responses::Model {
        kitchen_race_challenge_responses::Model {
            id: Uuid::new_v4(),
            challenge_id,
            cohouse_id: Uuid::new_v4(),
            content_type: KitchenRaceContentType::NoChoice,
            picture_url: None,
            selected_choices: None,
            answer_text: None,
            status,
            submission_timestamp: Utc::now().naive_utc() + submission_offset,
            review_timestamp: None,
            reviewer: None,
        }
    }

    #[test]
    fn test_latest_responses_picks_most_recent() {
        let challenge_id = Uuid::new_v4();
        let hour = Duration::hours(1);
        let stale = response(challenge_id, KitchenRaceResponseStatus::Validated, -hour);
        let fresh = response(challenge_id, KitchenRaceResponseStatus::Waiting, hour);

        let latest = latest_responses(vec![stale.clone(), fresh.clone()]);
        assert_eq!(latest[&challenge_id].id, fresh.id);

        // insertion order must not matter
        let latest = latest_responses(vec![fresh.clone(), stale]);
        assert_eq!(latest[&challenge_id].id, fresh.id);
    }

    #[test]
    fn test_filter_challenges_views() {
        let now = Utc::now();
        let hour = Duration::hours(1);

        let todo = challenge(Uuid::new_v4(), -hour, hour);
        let upcoming = challenge(Uuid::new_v4(), hour, hour * 2);
        let expired = challenge(Uuid::new_v4(), -hour * 2, -hour);
        let waiting = challenge(Uuid::new_v4(), -hour, hour);
        let reviewed = challenge(Uuid::new_v4(), -hour, hour);

        let responses = latest_responses(vec![
            response(waiting.id, KitchenRaceResponseStatus::Waiting, -hour),
            response(reviewed.id, KitchenRaceResponseStatus::Validated, -hour),
        ]);
        let challenges = vec![
            todo.clone(),
            upcoming.clone(),
            expired.clone(),
            waiting.clone(),
            reviewed.clone(),
        ];

        let ids = |challenges: Vec<kitchen_race_challenges::Model>| {
            challenges.into_iter().map(|c| c.id).collect::<Vec<_>>()
        };

        assert_eq!(
            ids(filter_challenges(
                ChallengeFilter::All,
                challenges.clone(),
                &responses,
                now
            ))
            .len(),
            5
        );
        assert_eq!(
            ids(filter_challenges(
                ChallengeFilter::Todo,
                challenges.clone(),
                &responses,
                now
            )),
            [todo.id]
        );
        assert_eq!(
            ids(filter_challenges(
                ChallengeFilter::Waiting,
                challenges.clone(),
                &responses,
                now
            )),
            [waiting.id]
        );
        assert_eq!(
            ids(filter_challenges(
                ChallengeFilter::Reviewed,
                challenges,
                &responses,
                now
            )),
            [reviewed.id]
        );
    }
}
