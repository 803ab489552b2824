use std::sync::Arc;

use entity::sea_orm_active_enums::{KitchenRaceContentType, KitchenRaceResponseStatus};
use futures::{stream, stream::BoxStream, StreamExt};
use key_rwlock::KeyRwLock;
use lib::{
    auth::{AdminAuth, VerifiedUserAuth},
    config::Config,
    SharedState,
};
use poem::{error::InternalServerError, http::StatusCode, web::Data, Error};
use poem_ext::{db::DbTxn, response};
use poem_openapi::{
    param::Path,
    payload::{Binary, EventStream, Json},
    OpenApi,
};
use schemas::kitchen_race::responses::{
    ChallengeResponse, ReviewResponseRequest, SubmitResponseRequest,
};
use tracing::warn;
use uuid::Uuid;

use super::Tags;
use crate::services::{
    challenges::get_challenge,
    cohouses::can_access_cohouse,
    responses::{
        encode_content, get_response, get_responses_for_cohouse, review_response, set_picture_url,
        upsert_response, EncodedContent, SubmitError,
    },
    watch::{status_stream_with_initial, validated_snapshot, validated_snapshot_stream, WatchHub},
};

pub struct Responses {
    pub state: Arc<SharedState>,
    pub config: Arc<Config>,
    pub watch_hub: Arc<WatchHub>,
    pub submit_lock: Arc<KeyRwLock<(Uuid, Uuid)>>,
}

#[OpenApi(tag = "Tags::Responses")]
impl Responses {
    /// List all responses of a cohouse, ordered by submission time.
    #[oai(path = "/cohouses/:cohouse_id/responses", method = "get")]
    async fn list_responses(
        &self,
        cohouse_id: Path<Uuid>,
        db: Data<&DbTxn>,
        auth: VerifiedUserAuth,
    ) -> ListResponses::Response<VerifiedUserAuth> {
        if !can_access_cohouse(&***db, &auth.0, cohouse_id.0).await? {
            return ListResponses::forbidden();
        }
        ListResponses::ok(
            get_responses_for_cohouse(&***db, cohouse_id.0)
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        )
    }

    /// Get a cohouse's response to a challenge.
    #[oai(
        path = "/challenges/:challenge_id/responses/:cohouse_id",
        method = "get"
    )]
    async fn get_response(
        &self,
        challenge_id: Path<Uuid>,
        cohouse_id: Path<Uuid>,
        db: Data<&DbTxn>,
        auth: VerifiedUserAuth,
    ) -> GetResponse::Response<VerifiedUserAuth> {
        if !can_access_cohouse(&***db, &auth.0, cohouse_id.0).await? {
            return GetResponse::forbidden();
        }
        match get_response(&***db, challenge_id.0, cohouse_id.0).await? {
            Some(response) => GetResponse::ok(response.into()),
            None => GetResponse::response_not_found(),
        }
    }

    /// Submit a cohouse's response to a challenge.
    ///
    /// A cohouse has at most one response per challenge. Submitting again
    /// overwrites the previous response and resets its status to `WAITING`.
    /// Picture responses are submitted through the picture upload endpoint
    /// instead.
    #[oai(
        path = "/challenges/:challenge_id/responses/:cohouse_id",
        method = "put"
    )]
    async fn submit_response(
        &self,
        challenge_id: Path<Uuid>,
        cohouse_id: Path<Uuid>,
        data: Json<SubmitResponseRequest>,
        db: Data<&DbTxn>,
        auth: VerifiedUserAuth,
    ) -> SubmitResponse::Response<VerifiedUserAuth> {
        let Some(challenge) = get_challenge(&***db, challenge_id.0).await? else {
            return SubmitResponse::challenge_not_found();
        };
        if !can_access_cohouse(&***db, &auth.0, cohouse_id.0).await? {
            return SubmitResponse::forbidden();
        }

        let content = match encode_content(
            &challenge,
            data.0.content,
            &self.config.kitchen_race.responses,
        ) {
            Ok(content) => content,
            Err(SubmitError::ContentMismatch { expected }) => {
                return SubmitResponse::content_mismatch(expected)
            }
            Err(SubmitError::ChoiceOutOfRange) => return SubmitResponse::choice_out_of_range(),
            Err(SubmitError::AnswerTooLong) => return SubmitResponse::answer_too_long(
                self.config.kitchen_race.responses.max_answer_length as u64,
            ),
        };

        let _guard = self.submit_lock.write((challenge_id.0, cohouse_id.0)).await;
        // written through the shared connection so the row is committed and
        // visible before watchers are signalled below
        let (response, previous) =
            upsert_response(&self.state.db, &challenge, cohouse_id.0, content).await?;

        self.watch_hub
            .publish_status(challenge_id.0, cohouse_id.0, response.status)
            .await;
        if previous == Some(KitchenRaceResponseStatus::Validated) {
            self.watch_hub.publish_validated();
        }

        SubmitResponse::ok(response.into())
    }

    /// Submit a picture response to a challenge.
    ///
    /// The submission is recorded before the picture is uploaded to the
    /// storage service. If the upload fails, the response is kept without a
    /// picture url; retrying the upload overwrites it.
    #[oai(
        path = "/challenges/:challenge_id/responses/:cohouse_id/picture",
        method = "post"
    )]
    async fn submit_picture(
        &self,
        challenge_id: Path<Uuid>,
        cohouse_id: Path<Uuid>,
        data: Binary<Vec<u8>>,
        auth: VerifiedUserAuth,
    ) -> SubmitPicture::Response<VerifiedUserAuth> {
        // writes go directly to the database so the submission survives a
        // failed upload
        let db = &self.state.db;
        let Some(challenge) = get_challenge(db, challenge_id.0).await? else {
            return SubmitPicture::challenge_not_found();
        };
        if !can_access_cohouse(db, &auth.0, cohouse_id.0).await? {
            return SubmitPicture::forbidden();
        }
        if challenge.content_type != KitchenRaceContentType::Picture {
            return SubmitPicture::content_mismatch(challenge.content_type);
        }
        if data.0.len() > self.config.kitchen_race.responses.max_picture_bytes {
            return SubmitPicture::picture_too_large(
                self.config.kitchen_race.responses.max_picture_bytes as u64,
            );
        }

        let _guard = self.submit_lock.write((challenge_id.0, cohouse_id.0)).await;
        let content = EncodedContent {
            content_type: KitchenRaceContentType::Picture,
            selected_choices: None,
            answer_text: None,
        };
        let (response, previous) = upsert_response(db, &challenge, cohouse_id.0, content).await?;

        self.watch_hub
            .publish_status(challenge_id.0, cohouse_id.0, response.status)
            .await;
        if previous == Some(KitchenRaceResponseStatus::Validated) {
            self.watch_hub.publish_validated();
        }

        match self
            .state
            .services
            .storage
            .upload_picture(response.id, "application/octet-stream", data.0)
            .await
        {
            Ok(url) => SubmitPicture::ok(set_picture_url(db, response, &url).await?.into()),
            Err(err) => {
                warn!(
                    "picture upload for response {} failed: {err}",
                    response.id
                );
                SubmitPicture::upload_failed()
            }
        }
    }

    /// Review a cohouse's response to a challenge.
    #[oai(
        path = "/challenges/:challenge_id/responses/:cohouse_id/status",
        method = "patch"
    )]
    async fn review_response(
        &self,
        challenge_id: Path<Uuid>,
        cohouse_id: Path<Uuid>,
        data: Json<ReviewResponseRequest>,
        db: Data<&DbTxn>,
        auth: AdminAuth,
    ) -> ReviewResponse::Response<AdminAuth> {
        let Some(response) = get_response(&***db, challenge_id.0, cohouse_id.0).await? else {
            return ReviewResponse::response_not_found();
        };

        let previous = response.status;
        let status = data.0.verdict.into();
        // written through the shared connection so the row is committed and
        // visible before watchers are signalled below
        let response = review_response(&self.state.db, response, status, auth.0.id).await?;

        self.watch_hub
            .publish_status(challenge_id.0, cohouse_id.0, status)
            .await;
        if status == KitchenRaceResponseStatus::Validated
            || previous == KitchenRaceResponseStatus::Validated
        {
            self.watch_hub.publish_validated();
        }

        ReviewResponse::ok(response.into())
    }

    /// Watch the status of a cohouse's response to a challenge.
    ///
    /// Emits the current status immediately, then every status change as it
    /// happens, as a server-sent event stream.
    #[oai(
        path = "/challenges/:challenge_id/responses/:cohouse_id/status/watch",
        method = "get"
    )]
    async fn watch_status(
        &self,
        challenge_id: Path<Uuid>,
        cohouse_id: Path<Uuid>,
        db: Data<&DbTxn>,
        auth: VerifiedUserAuth,
    ) -> poem::Result<EventStream<BoxStream<'static, KitchenRaceResponseStatus>>> {
        if !can_access_cohouse(&***db, &auth.0, cohouse_id.0)
            .await
            .map_err(InternalServerError)?
        {
            return Err(Error::from_status(StatusCode::FORBIDDEN));
        }
        // subscribe before reading the current status so a change in
        // between is delivered instead of lost
        let receiver = self
            .watch_hub
            .subscribe_status(challenge_id.0, cohouse_id.0)
            .await;
        let Some(response) = get_response(&***db, challenge_id.0, cohouse_id.0)
            .await
            .map_err(InternalServerError)?
        else {
            return Err(Error::from_status(StatusCode::NOT_FOUND));
        };

        Ok(EventStream::new(
            status_stream_with_initial(response.status, receiver).boxed(),
        ))
    }

    /// Watch the set of validated responses across all cohouses.
    ///
    /// Emits the full set immediately, then a fresh snapshot whenever a
    /// review or resubmission changes it, as a server-sent event stream.
    #[oai(path = "/responses/validated/watch", method = "get")]
    async fn watch_validated_responses(
        &self,
        _auth: VerifiedUserAuth,
    ) -> poem::Result<EventStream<BoxStream<'static, Vec<ChallengeResponse>>>> {
        let receiver = self.watch_hub.subscribe_validated();
        let initial = validated_snapshot(&self.state.db)
            .await
            .map_err(InternalServerError)?;
        let db = self.state.db.clone();
        Ok(EventStream::new(
            stream::once(async move { initial })
                .chain(validated_snapshot_stream(db, receiver))
                .boxed(),
        ))
    }
}

response!(ListResponses = {
    Ok(200) => Vec<ChallengeResponse>,
    /// The user is not a member of this cohouse.
    Forbidden(403, error),
});

response!(GetResponse = {
    Ok(200) => ChallengeResponse,
    /// The cohouse has not responded to this challenge.
    ResponseNotFound(404, error),
    /// The user is not a member of this cohouse.
    Forbidden(403, error),
});

response!(SubmitResponse = {
    Ok(201) => ChallengeResponse,
    /// Challenge does not exist.
    ChallengeNotFound(404, error),
    /// The user is not a member of this cohouse.
    Forbidden(403, error),
    /// The content variant does not match the challenge. `details` contains
    /// the expected variant.
    ContentMismatch(400, error) => KitchenRaceContentType,
    /// A selected choice index does not refer to a choice.
    ChoiceOutOfRange(400, error),
    /// The answer text is too long. `details` contains the maximum length.
    AnswerTooLong(400, error) => u64,
});

response!(SubmitPicture = {
    Ok(201) => ChallengeResponse,
    /// Challenge does not exist.
    ChallengeNotFound(404, error),
    /// The user is not a member of this cohouse.
    Forbidden(403, error),
    /// The challenge does not take picture responses. `details` contains
    /// the expected variant.
    ContentMismatch(400, error) => KitchenRaceContentType,
    /// The picture is too large. `details` contains the maximum size in
    /// bytes.
    PictureTooLarge(413, error) => u64,
    /// The picture could not be stored. The submission is kept and the
    /// upload can be retried.
    UploadFailed(502, error),
});

response!(ReviewResponse = {
    Ok(200) => ChallengeResponse,
    /// The cohouse has not responded to this challenge.
    ResponseNotFound(404, error),
});
