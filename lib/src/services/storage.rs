use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use super::{Service, ServiceError, ServiceResult};

/// Client for the object storage service. Uploads are keyed by the owning
/// document's id so that re-uploads replace the previous object.
#[derive(Debug, Clone)]
pub struct StorageService(Service);

impl StorageService {
    pub(super) fn new(service: Service) -> Self {
        Self(service)
    }

    /// Upload a picture and return the stable url under which it is served.
    pub async fn upload_picture(
        &self,
        response_id: Uuid,
        content_type: &str,
        data: Vec<u8>,
    ) -> ServiceResult<Url> {
        let response = self
            .0
            .put(&format!("/pictures/{response_id}"))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                Ok(response.json::<UploadedPicture>().await?.url)
            }
            code => Err(ServiceError::UnexpectedStatusCode(code)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadedPicture {
    url: Url,
}
