//! Request extractors whose failures render as [`ApiError`] JSON bodies.

use axum::{
    extract::{rejection::FormRejection, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Form,
};

use super::ApiError;

/// Submitted form fields, in submission order.
///
/// A body that is not form-encoded reads as an empty form, so missing
/// required fields are reported by the validators instead of as a content
/// type error. Repeated keys are kept; lookups see the first value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(pub Vec<(String, String)>);

impl FormFields {
    /// First value submitted for `key`.
    pub fn first(&self, key: &str) -> Option<String> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// One pair per distinct key, holding its first value, in the order
    /// the keys first appeared.
    pub fn into_distinct(self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = Vec::with_capacity(self.0.len());
        for (key, value) in self.0 {
            if !pairs.iter().any(|(k, _)| *k == key) {
                pairs.push((key, value));
            }
        }
        pairs
    }
}

impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<Vec<(String, String)>>::from_request(req, state).await {
            Ok(Form(pairs)) => Ok(Self(pairs)),
            Err(FormRejection::InvalidFormContentType(_)) => Ok(Self::default()),
            Err(rejection) => {
                tracing::warn!("Rejected form body: {}", rejection.body_text());
                Err(ApiError::Unprocessable(rejection.body_text()))
            }
        }
    }
}

/// Scientist id from the path. Anything that is not an integer cannot name a
/// scientist, so it is reported as not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScientistId(pub i64);

impl<S> FromRequestParts<S> for ScientistId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<i64>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| Self(id))
            .map_err(|_| ApiError::SCIENTIST_NOT_FOUND)
    }
}
