//! Filesystem endpoint handlers.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Extension, Multipart, Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::AppState;
use super::negotiation::{Representation, negotiate};
use crate::error::{ApiError, status_response};
use crate::middleware::CurrentUser;
use crate::storage::{Attachment, ListOptions, UploadFile, normalize};

/// Multipart field carrying uploaded files.
const FILES_FIELD: &str = "files";

/// Listing flags accepted as query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub all: bool,
    pub long: bool,
}

impl From<ListQuery> for ListOptions {
    fn from(query: ListQuery) -> Self {
        ListOptions {
            all: query.all,
            long: query.long,
        }
    }
}

/// GET /filesystem/supported-paths
pub async fn supported_paths(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.filesystem.supported_paths().to_vec())
}

/// GET /filesystem/{path}
///
/// Lists the directory as JSON or downloads the path, depending on `Accept`.
pub async fn get_path(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let path = request_path(path)?;
    let representation = negotiate(&headers)?;
    let filesystem = state.filesystem.as_user(&user);

    match representation {
        Representation::Listing => {
            let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
            let entries = filesystem.ls(&path, query.into()).await?;
            Ok(Json(entries).into_response())
        }
        Representation::Attachment => {
            let attachment = filesystem.attachment(&path).await?;
            Ok(attachment_response(attachment))
        }
    }
}

/// POST /filesystem/{path}
pub async fn upload(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    path: Result<Path<String>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let path = request_path(path)?;
    let files = read_files(multipart).await?;
    let written = state
        .filesystem
        .as_user(&user)
        .upload_files(&path, files, false)
        .await?;
    Ok(status_response(
        StatusCode::CREATED,
        format!("uploaded: {}", written.join(", ")),
    ))
}

/// PUT /filesystem/{path}
pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    path: Result<Path<String>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let path = request_path(path)?;
    let files = read_files(multipart).await?;
    let written = state
        .filesystem
        .as_user(&user)
        .upload_files(&path, files, true)
        .await?;
    Ok(status_response(
        StatusCode::OK,
        format!("updated: {}", written.join(", ")),
    ))
}

/// DELETE /filesystem/{path}
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let path = request_path(path)?;
    state.filesystem.as_user(&user).delete_file(&path).await?;
    Ok(status_response(
        StatusCode::OK,
        format!("deleted: {}", normalize(&path)),
    ))
}

fn request_path(path: Result<Path<String>, PathRejection>) -> Result<String, ApiError> {
    path.map(|Path(path)| path)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// Collects every file sent in the `files` field.
async fn read_files(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Vec<UploadFile>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let name = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| ApiError::BadRequest("uploaded file is missing a file name".into()))?;
        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        files.push(UploadFile { name, content });
    }
    Ok(files)
}

fn attachment_response(attachment: Attachment) -> Response {
    let filename: String = attachment
        .filename
        .chars()
        .map(|c| if c.is_control() || c == '"' { '_' } else { c })
        .collect();
    let disposition = HeaderValue::try_from(format!("attachment; filename=\"{filename}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        attachment.content,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn attachment_headers() {
        let response = attachment_response(Attachment {
            filename: "dir.tar.gz".into(),
            content: Bytes::from_static(b"data"),
        });
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"dir.tar.gz\""
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
    }

    #[test]
    fn attachment_filename_is_sanitised() {
        let response = attachment_response(Attachment {
            filename: "a\"b\nc".into(),
            content: Bytes::new(),
        });
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"a_b_c\""
        );
    }
}
