use thiserror::Error;

/// Message shown when the backend cannot be reached at all.
pub const UNREACHABLE_MESSAGE: &str = "Impossibile contattare il server";
/// Message shown when the backend answered but the grades could not be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Errore nel caricamento dei voti";
/// Message shown when a create or update could not be delivered.
pub const COMMUNICATION_FAILED_MESSAGE: &str = "Errore nella comunicazione con il server";
/// Fallback when a rejection carries neither `error` nor `errors`.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Errore sconosciuto";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    #[error("`{0}` is not a recognised date")]
    InvalidDateFormat(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to the grades backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend answered {status} with a body that is not an envelope")]
    Status { status: u16 },

    #[error("could not decode the backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("backend rejected the request: {}", .error.as_deref().unwrap_or(UNKNOWN_ERROR_MESSAGE))]
    Rejected {
        error: Option<String>,
        errors: Vec<String>,
    },

    #[error("backend reported success but sent no data")]
    MissingData,

    #[error("invalid backend url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// What the user was doing when a request failed; the wording differs between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Reading grades to display them.
    Load,
    /// Sending a create or update form.
    Submit,
}

impl ApiError {
    /// Messages to show the user, in the order they should appear.
    pub fn user_messages(&self, operation: Operation) -> Vec<String> {
        match (operation, self) {
            (Operation::Load, ApiError::Transport(_)) => vec![UNREACHABLE_MESSAGE.to_string()],
            (Operation::Load, _) => vec![LOAD_FAILED_MESSAGE.to_string()],
            (Operation::Submit, ApiError::Rejected { error, errors }) => {
                if !errors.is_empty() {
                    errors.clone()
                } else {
                    vec![error.clone().unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string())]
                }
            }
            (Operation::Submit, ApiError::MissingData) => vec![UNKNOWN_ERROR_MESSAGE.to_string()],
            (Operation::Submit, _) => vec![COMMUNICATION_FAILED_MESSAGE.to_string()],
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("form is invalid: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl FormError {
    pub fn messages(&self) -> &[String] {
        match self {
            FormError::Invalid(messages) => messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(error: Option<&str>, errors: &[&str]) -> ApiError {
        ApiError::Rejected {
            error: error.map(str::to_string),
            errors: errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn loading_failures_use_the_list_wording() {
        assert_eq!(
            rejected(Some("Errore SQL"), &[]).user_messages(Operation::Load),
            vec![LOAD_FAILED_MESSAGE.to_string()]
        );
        assert_eq!(
            ApiError::Status { status: 500 }.user_messages(Operation::Load),
            vec![LOAD_FAILED_MESSAGE.to_string()]
        );
    }

    #[test]
    fn submit_failures_prefer_field_errors() {
        assert_eq!(
            rejected(Some("Dati non validi"), &["voto mancante"]).user_messages(Operation::Submit),
            vec!["voto mancante".to_string()]
        );
        assert_eq!(
            rejected(Some("Dati non validi"), &[]).user_messages(Operation::Submit),
            vec!["Dati non validi".to_string()]
        );
        assert_eq!(
            rejected(None, &[]).user_messages(Operation::Submit),
            vec![UNKNOWN_ERROR_MESSAGE.to_string()]
        );
        assert_eq!(
            ApiError::Status { status: 502 }.user_messages(Operation::Submit),
            vec![COMMUNICATION_FAILED_MESSAGE.to_string()]
        );
    }
}
