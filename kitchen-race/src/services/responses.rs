use chrono::{NaiveDateTime, Utc};
use entity::{
    kitchen_race_challenge_responses, kitchen_race_challenges,
    sea_orm_active_enums::{KitchenRaceContentType, KitchenRaceResponseStatus},
};
use lib::config::ResponseLimits;
use schemas::kitchen_race::{challenges::encode_choice_set, responses::SubmittedContent};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, Unchanged,
};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

pub async fn get_response(
    db: &impl ConnectionTrait,
    challenge_id: Uuid,
    cohouse_id: Uuid,
) -> Result<Option<kitchen_race_challenge_responses::Model>, DbErr> {
    kitchen_race_challenge_responses::Entity::find()
        .filter(kitchen_race_challenge_responses::Column::ChallengeId.eq(challenge_id))
        .filter(kitchen_race_challenge_responses::Column::CohouseId.eq(cohouse_id))
        .one(db)
        .await
}

pub async fn get_responses_for_cohouse(
    db: &impl ConnectionTrait,
    cohouse_id: Uuid,
) -> Result<Vec<kitchen_race_challenge_responses::Model>, DbErr> {
    kitchen_race_challenge_responses::Entity::find()
        .filter(kitchen_race_challenge_responses::Column::CohouseId.eq(cohouse_id))
        .order_by_asc(kitchen_race_challenge_responses::Column::SubmissionTimestamp)
        .all(db)
        .await
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("response content does not match the challenge content variant")]
    ContentMismatch {
        expected: KitchenRaceContentType,
    },
    #[error("a selected choice index is out of range")]
    ChoiceOutOfRange,
    #[error("answer text exceeds the maximum length")]
    AnswerTooLong,
}

/// The column values a submitted content maps to.
#[derive(Debug, PartialEq, Eq)]
pub struct EncodedContent {
    pub content_type: KitchenRaceContentType,
    pub selected_choices: Option<i64>,
    pub answer_text: Option<String>,
}

/// Check a submitted content against the challenge and encode it for
/// storage. Rejects content whose variant differs from the challenge's.
pub fn encode_content(
    challenge: &kitchen_race_challenges::Model,
    content: SubmittedContent,
    limits: &ResponseLimits,
) -> Result<EncodedContent, SubmitError> {
    let content_type = content.content_type();
    if content_type != challenge.content_type {
        return Err(SubmitError::ContentMismatch {
            expected: challenge.content_type,
        });
    }
    match content {
        SubmittedContent::MultipleChoice(content) => {
            let choices = challenge.choices.as_ref().map(Vec::len).unwrap_or(0) as u64;
            if content.selected.iter().any(|&index| index >= choices) {
                return Err(SubmitError::ChoiceOutOfRange);
            }
            Ok(EncodedContent {
                content_type,
                selected_choices: Some(encode_choice_set(&content.selected)),
                answer_text: None,
            })
        }
        SubmittedContent::SingleAnswer(content) => {
            if content.answer.len() > limits.max_answer_length {
                return Err(SubmitError::AnswerTooLong);
            }
            Ok(EncodedContent {
                content_type,
                selected_choices: None,
                answer_text: Some(content.answer),
            })
        }
        SubmittedContent::NoChoice(_) => Ok(EncodedContent {
            content_type,
            selected_choices: None,
            answer_text: None,
        }),
    }
}

/// Create or overwrite the cohouse's response to a challenge. Resubmitting
/// resets the status to `Waiting` and clears any previous review. Returns
/// the stored row together with the status it replaced.
pub async fn upsert_response(
    db: &impl ConnectionTrait,
    challenge: &kitchen_race_challenges::Model,
    cohouse_id: Uuid,
    content: EncodedContent,
) -> Result<
    (
        kitchen_race_challenge_responses::Model,
        Option<KitchenRaceResponseStatus>,
    ),
    DbErr,
> {
    let now = Utc::now().naive_utc();
    match get_response(db, challenge.id, cohouse_id).await? {
        Some(existing) => {
            let previous = existing.status;
            let response = overwrite_response(&existing, content, now).update(db).await?;
            Ok((response, Some(previous)))
        }
        None => {
            let response = new_response(challenge.id, cohouse_id, content, now)
                .insert(db)
                .await?;
            Ok((response, None))
        }
    }
}

/// Overwrite an existing response in place: same row, new content, status
/// back to `Waiting`, review metadata and picture url cleared.
fn overwrite_response(
    existing: &kitchen_race_challenge_responses::Model,
    content: EncodedContent,
    now: NaiveDateTime,
) -> kitchen_race_challenge_responses::ActiveModel {
    kitchen_race_challenge_responses::ActiveModel {
        id: Unchanged(existing.id),
        challenge_id: Unchanged(existing.challenge_id),
        cohouse_id: Unchanged(existing.cohouse_id),
        content_type: Set(content.content_type),
        picture_url: Set(None),
        selected_choices: Set(content.selected_choices),
        answer_text: Set(content.answer_text),
        status: Set(KitchenRaceResponseStatus::Waiting),
        submission_timestamp: Set(now),
        review_timestamp: Set(None),
        reviewer: Set(None),
    }
}

fn new_response(
    challenge_id: Uuid,
    cohouse_id: Uuid,
    content: EncodedContent,
    now: NaiveDateTime,
) -> kitchen_race_challenge_responses::ActiveModel {
    kitchen_race_challenge_responses::ActiveModel {
        id: Set(Uuid::new_v4()),
        challenge_id: Set(challenge_id),
        cohouse_id: Set(cohouse_id),
        content_type: Set(content.content_type),
        picture_url: Set(None),
        selected_choices: Set(content.selected_choices),
        answer_text: Set(content.answer_text),
        status: Set(KitchenRaceResponseStatus::Waiting),
        submission_timestamp: Set(now),
        review_timestamp: Set(None),
        reviewer: Set(None),
    }
}

/// Record the url of an uploaded picture on an existing response.
pub async fn set_picture_url(
    db: &impl ConnectionTrait,
    response: kitchen_race_challenge_responses::Model,
    url: &Url,
) -> Result<kitchen_race_challenge_responses::Model, DbErr> {
    kitchen_race_challenge_responses::ActiveModel {
        id: Unchanged(response.id),
        picture_url: Set(Some(url.to_string())),
        ..Default::default()
    }
    .update(db)
    .await
}

/// Apply an administrator's review verdict.
pub async fn review_response(
    db: &impl ConnectionTrait,
    response: kitchen_race_challenge_responses::Model,
    status: KitchenRaceResponseStatus,
    reviewer: Uuid,
) -> Result<kitchen_race_challenge_responses::Model, DbErr> {
    kitchen_race_challenge_responses::ActiveModel {
        id: Unchanged(response.id),
        status: Set(status),
        review_timestamp: Set(Some(Utc::now().naive_utc())),
        reviewer: Set(Some(reviewer)),
        ..Default::default()
    }
    .update(db)
    .await
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use schemas::kitchen_race::responses::{
        MultipleChoiceResponse, NoChoiceResponse, SingleAnswerResponse,
    };
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;

    fn limits() -> ResponseLimits {
        ResponseLimits {
            max_answer_length: 16,
            max_picture_bytes: 1024,
        }
    }

    fn challenge(content_type: KitchenRaceContentType) -> kitchen_race_challenges::Model {
        let now = Utc::now().naive_utc();
        kitchen_race_challenges::Model {
            id: Uuid::new_v4(),
            title: "Guess the spice".into(),
            body: "Which spices are in the jar on the counter?".into(),
            start_timestamp: now,
            end_timestamp: now,
            content_type,
            choices: matches!(content_type, KitchenRaceContentType::MultipleChoice)
                .then(|| vec!["Cumin".into(), "Paprika".into(), "Sumac".into()]),
            correct_choices: None,
            shuffle_choices: false,
            points: None,
            creator: Uuid::new_v4(),
            creation_timestamp: now,
        }
    }

    fn reviewed_response(
        challenge_id: Uuid,
        cohouse_id: Uuid,
    ) -> kitchen_race_challenge_responses::Model {
        let now = Utc::now().naive_utc();
        kitchen_race_challenge_responses::Model {
            id: Uuid::new_v4(),
            challenge_id,
            cohouse_id,
            content_type: KitchenRaceContentType::SingleAnswer,
            picture_url: Some("https://pictures.test/old".into()),
            selected_choices: None,
            answer_text: Some("risotto".into()),
            status: KitchenRaceResponseStatus::Validated,
            submission_timestamp: now - Duration::hours(2),
            review_timestamp: Some(now - Duration::hours(1)),
            reviewer: Some(Uuid::new_v4()),
        }
    }

    fn no_choice_content() -> EncodedContent {
        EncodedContent {
            content_type: KitchenRaceContentType::NoChoice,
            selected_choices: None,
            answer_text: None,
        }
    }

    #[test]
    fn test_overwrite_keeps_the_row_and_resets_the_review() {
        let existing = reviewed_response(Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now().naive_utc();

        let overwritten = overwrite_response(&existing, no_choice_content(), now);
        // same row, so the natural key keeps exactly one response
        assert_eq!(overwritten.id, Unchanged(existing.id));
        assert_eq!(overwritten.challenge_id, Unchanged(existing.challenge_id));
        assert_eq!(overwritten.cohouse_id, Unchanged(existing.cohouse_id));
        // status resets and the previous review and picture are cleared
        assert_eq!(
            overwritten.status,
            Set(KitchenRaceResponseStatus::Waiting)
        );
        assert_eq!(overwritten.review_timestamp, Set(None));
        assert_eq!(overwritten.reviewer, Set(None));
        assert_eq!(overwritten.picture_url, Set(None));
        assert_eq!(overwritten.answer_text, Set(None));
        assert_eq!(overwritten.submission_timestamp, Set(now));
    }

    #[tokio::test]
    async fn test_upsert_overwrites_the_existing_row() {
        let challenge = challenge(KitchenRaceContentType::SingleAnswer);
        let cohouse_id = Uuid::new_v4();
        let existing = reviewed_response(challenge.id, cohouse_id);
        let overwritten = kitchen_race_challenge_responses::Model {
            picture_url: None,
            answer_text: Some("tarte tatin".into()),
            status: KitchenRaceResponseStatus::Waiting,
            submission_timestamp: Utc::now().naive_utc(),
            review_timestamp: None,
            reviewer: None,
            ..existing.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()], vec![overwritten.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let content = EncodedContent {
            content_type: KitchenRaceContentType::SingleAnswer,
            selected_choices: None,
            answer_text: Some("tarte tatin".into()),
        };
        let (response, previous) = upsert_response(&db, &challenge, cohouse_id, content)
            .await
            .unwrap();

        assert_eq!(previous, Some(KitchenRaceResponseStatus::Validated));
        assert_eq!(response.id, existing.id);
        assert_eq!(response.status, KitchenRaceResponseStatus::Waiting);
        assert_eq!(response.review_timestamp, None);
    }

    #[tokio::test]
    async fn test_upsert_creates_a_row_for_the_first_submission() {
        let challenge = challenge(KitchenRaceContentType::NoChoice);
        let cohouse_id = Uuid::new_v4();
        let created = kitchen_race_challenge_responses::Model {
            id: Uuid::new_v4(),
            challenge_id: challenge.id,
            cohouse_id,
            content_type: KitchenRaceContentType::NoChoice,
            picture_url: None,
            selected_choices: None,
            answer_text: None,
            status: KitchenRaceResponseStatus::Waiting,
            submission_timestamp: Utc::now().naive_utc(),
            review_timestamp: None,
            reviewer: None,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                Vec::<kitchen_race_challenge_responses::Model>::new(),
                vec![created.clone()],
            ])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let (response, previous) = upsert_response(&db, &challenge, cohouse_id, no_choice_content())
            .await
            .unwrap();

        assert_eq!(previous, None);
        assert_eq!(response.id, created.id);
        assert_eq!(response.status, KitchenRaceResponseStatus::Waiting);
    }

    #[test]
    fn test_encode_content_multiple_choice() {
        let challenge = challenge(KitchenRaceContentType::MultipleChoice);
        let encoded = encode_content(
            &challenge,
            SubmittedContent::MultipleChoice(MultipleChoiceResponse { selected: vec![0, 2] }),
            &limits(),
        );
        assert_eq!(
            encoded,
            Ok(EncodedContent {
                content_type: KitchenRaceContentType::MultipleChoice,
                selected_choices: Some(0b101),
                answer_text: None,
            })
        );
    }

    #[test]
    fn test_encode_content_rejects_out_of_range_choice() {
        let challenge = challenge(KitchenRaceContentType::MultipleChoice);
        let encoded = encode_content(
            &challenge,
            SubmittedContent::MultipleChoice(MultipleChoiceResponse { selected: vec![3] }),
            &limits(),
        );
        assert_eq!(encoded, Err(SubmitError::ChoiceOutOfRange));
    }

    #[test]
    fn test_encode_content_single_answer() {
        let challenge = challenge(KitchenRaceContentType::SingleAnswer);
        let encoded = encode_content(
            &challenge,
            SubmittedContent::SingleAnswer(SingleAnswerResponse {
                answer: "za'atar".into(),
            }),
            &limits(),
        );
        assert_eq!(
            encoded,
            Ok(EncodedContent {
                content_type: KitchenRaceContentType::SingleAnswer,
                selected_choices: None,
                answer_text: Some("za'atar".into()),
            })
        );
    }

    #[test]
    fn test_encode_content_rejects_too_long_answer() {
        let challenge = challenge(KitchenRaceContentType::SingleAnswer);
        let encoded = encode_content(
            &challenge,
            SubmittedContent::SingleAnswer(SingleAnswerResponse {
                answer: "a".repeat(17),
            }),
            &limits(),
        );
        assert_eq!(encoded, Err(SubmitError::AnswerTooLong));
    }

    #[test]
    fn test_encode_content_rejects_variant_mismatch() {
        let challenge = challenge(KitchenRaceContentType::MultipleChoice);
        let encoded = encode_content(
            &challenge,
            SubmittedContent::NoChoice(NoChoiceResponse {}),
            &limits(),
        );
        assert_eq!(
            encoded,
            Err(SubmitError::ContentMismatch {
                expected: KitchenRaceContentType::MultipleChoice
            })
        );
    }

    #[test]
    fn test_encode_content_rejects_text_for_picture_challenge() {
        // picture responses go through the upload endpoint, so any directly
        // submitted content is a mismatch
        let challenge = challenge(KitchenRaceContentType::Picture);
        let encoded = encode_content(
            &challenge,
            SubmittedContent::SingleAnswer(SingleAnswerResponse {
                answer: "cake".into(),
            }),
            &limits(),
        );
        assert_eq!(
            encoded,
            Err(SubmitError::ContentMismatch {
                expected: KitchenRaceContentType::Picture
            })
        );
    }
}
