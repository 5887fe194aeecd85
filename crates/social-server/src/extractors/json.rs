//! JSON body extractor with boundary validation

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::ApiError;

/// Like [`axum::Json`], but every rejection becomes a 400 with a JSON body
/// and the payload must pass its [`Validate`] rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| ApiError::Validation(describe(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

/// One sentence per failed rule, sorted so responses are stable.
fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(move |err| describe_one(&field.to_string(), err))
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

fn describe_one(field: &str, err: &ValidationError) -> String {
    match &*err.code {
        "length" => match (err.params.get("min"), err.params.get("max")) {
            (Some(min), Some(max)) => {
                format!("{field} must be between {min} and {max} characters")
            }
            (Some(_), None) => format!("{field} must not be empty"),
            _ => format!("{field} has an invalid length"),
        },
        "blank" => format!("{field} must not be blank"),
        code => format!("{field} is invalid ({code})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use social_types::{NewPost, NewUser};

    #[test]
    fn test_describe_length_errors() {
        let errors = NewUser::new("x".repeat(60)).validate().unwrap_err();
        assert_eq!(
            describe(&errors),
            "username must be between 1 and 50 characters"
        );
    }

    #[test]
    fn test_describe_sorts_fields() {
        let errors = NewPost::new(" ", "", 1).validate().unwrap_err();
        assert_eq!(
            describe(&errors),
            "body must not be empty; title must not be blank"
        );
    }
}
