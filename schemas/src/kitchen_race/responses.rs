use chrono::{DateTime, Utc};
use entity::{
    kitchen_race_challenge_responses,
    sea_orm_active_enums::{KitchenRaceContentType, KitchenRaceResponseStatus},
};
use poem_openapi::{Enum, Object, Union};
use url::Url;
use uuid::Uuid;

use super::challenges::decode_choice_set;

#[derive(Debug, Clone, Object)]
pub struct ChallengeResponse {
    /// The unique identifier of the response.
    pub id: Uuid,
    /// The challenge this response answers.
    pub challenge_id: Uuid,
    /// The cohouse that submitted this response.
    pub cohouse_id: Uuid,
    /// The content of the response. Always matches the content variant of
    /// the challenge.
    pub content: ResponseContent,
    /// The review status of the response.
    pub status: KitchenRaceResponseStatus,
    /// The timestamp of the last submission.
    pub submission_timestamp: DateTime<Utc>,
    /// The timestamp of the last administrator review.
    pub review_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Union)]
#[oai(discriminator_name = "type", rename_all = "snake_case")]
pub enum ResponseContent {
    Picture(PictureResponse),
    MultipleChoice(MultipleChoiceResponse),
    SingleAnswer(SingleAnswerResponse),
    NoChoice(NoChoiceResponse),
}

#[derive(Debug, Clone, Object)]
pub struct PictureResponse {
    /// The url of the uploaded picture. Unset while the upload is still
    /// pending or has failed.
    pub url: Option<Url>,
}

#[derive(Debug, Clone, Object)]
pub struct MultipleChoiceResponse {
    /// The indices of the selected choices.
    #[oai(validator(max_items = 32))]
    pub selected: Vec<u64>,
}

#[derive(Debug, Clone, Object)]
pub struct SingleAnswerResponse {
    /// The submitted answer text.
    #[oai(validator(max_length = 4096))]
    pub answer: String,
}

#[derive(Debug, Clone, Object)]
pub struct NoChoiceResponse {}

/// Content variants a cohouse can submit directly. Picture responses are
/// created through the picture upload endpoint instead.
#[derive(Debug, Clone, Union)]
#[oai(discriminator_name = "type", rename_all = "snake_case")]
pub enum SubmittedContent {
    MultipleChoice(MultipleChoiceResponse),
    SingleAnswer(SingleAnswerResponse),
    NoChoice(NoChoiceResponse),
}

#[derive(Debug, Clone, Object)]
pub struct SubmitResponseRequest {
    /// The content of the response. Must match the content variant of the
    /// challenge.
    pub content: SubmittedContent,
}

#[derive(Debug, Clone, Object)]
pub struct ReviewResponseRequest {
    /// The verdict of the administrator review.
    pub verdict: ReviewVerdict,
}

/// The two states an administrator can move a response to. Responses
/// never return to `WAITING` except through resubmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewVerdict {
    Validated,
    Invalidated,
}

impl From<ReviewVerdict> for KitchenRaceResponseStatus {
    fn from(verdict: ReviewVerdict) -> Self {
        match verdict {
            ReviewVerdict::Validated => Self::Validated,
            ReviewVerdict::Invalidated => Self::Invalidated,
        }
    }
}

impl From<kitchen_race_challenge_responses::Model> for ChallengeResponse {
    fn from(response: kitchen_race_challenge_responses::Model) -> Self {
        Self {
            id: response.id,
            challenge_id: response.challenge_id,
            cohouse_id: response.cohouse_id,
            content: match response.content_type {
                KitchenRaceContentType::Picture => ResponseContent::Picture(PictureResponse {
                    url: response.picture_url.and_then(|url| url.parse().ok()),
                }),
                KitchenRaceContentType::MultipleChoice => {
                    ResponseContent::MultipleChoice(MultipleChoiceResponse {
                        selected: decode_choice_set(response.selected_choices.unwrap_or(0), 32),
                    })
                }
                KitchenRaceContentType::SingleAnswer => {
                    ResponseContent::SingleAnswer(SingleAnswerResponse {
                        answer: response.answer_text.unwrap_or_default(),
                    })
                }
                KitchenRaceContentType::NoChoice => ResponseContent::NoChoice(NoChoiceResponse {}),
            },
            status: response.status,
            submission_timestamp: response.submission_timestamp.and_utc(),
            review_timestamp: response.review_timestamp.map(|x| x.and_utc()),
        }
    }
}

impl SubmittedContent {
    pub fn content_type(&self) -> KitchenRaceContentType {
        match self {
            Self::MultipleChoice(_) => KitchenRaceContentType::MultipleChoice,
            Self::SingleAnswer(_) => KitchenRaceContentType::SingleAnswer,
            Self::NoChoice(_) => KitchenRaceContentType::NoChoice,
        }
    }
}
