use serde::Deserialize;

/// Error body of both the REST (`message`) and the auth (`msg`, `error_description`) endpoints.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
    pub msg: Option<String>,
    pub error_description: Option<String>,
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}
