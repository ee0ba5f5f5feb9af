//! Multipart extraction for photo-carrying payloads.
//!
//! Create/edit requests arrive as multipart forms with a JSON `payload`
//! part and a binary `photo` part (required on create, optional on edit).

use axum::extract::Multipart;
use quitanda_db::blob::PhotoUpload;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Content type assumed when the client does not declare one.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extracted `payload` + `photo` parts of a create/edit request.
pub struct PayloadWithPhoto<T> {
    pub payload: T,
    pub photo: Option<PhotoUpload>,
}

/// Read a multipart body with a JSON `payload` part and an optional binary
/// `photo` part. Unknown parts are ignored.
pub async fn read_payload_with_photo<T: DeserializeOwned>(
    mut multipart: Multipart,
) -> Result<PayloadWithPhoto<T>, AppError> {
    let mut payload: Option<T> = None;
    let mut photo: Option<PhotoUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(err.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("payload") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::BadRequest(err.to_string()))?;
                payload = Some(
                    serde_json::from_slice(&bytes)
                        .map_err(|err| AppError::BadRequest(format!("invalid payload: {err}")))?,
                );
            }
            Some("photo") => {
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::BadRequest(err.to_string()))?;
                photo = Some(PhotoUpload {
                    bytes: bytes.to_vec(),
                    content_type,
                });
            }
            _ => {}
        }
    }

    let payload =
        payload.ok_or_else(|| AppError::BadRequest("missing 'payload' part".to_string()))?;
    Ok(PayloadWithPhoto { payload, photo })
}
