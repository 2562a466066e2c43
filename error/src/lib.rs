use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    BadRequest(String),
    NotFound(String),
    InternalServerError(String),
}

impl Error {
    pub fn bad_request<T: fmt::Display>(msg: T) -> Self {
        Self::BadRequest(msg.to_string())
    }

    pub fn not_found<T: fmt::Display>(msg: T) -> Self {
        Self::NotFound(msg.to_string())
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::InternalServerError(_) => 500,
        }
    }

    /// Message sent back to clients. The detail stays in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "Validation Failed",
            Self::NotFound(_) => "Item not found",
            Self::InternalServerError(_) => "Internal Server Error",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::BadRequest(msg) | Self::NotFound(msg) | Self::InternalServerError(msg) => msg,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.public_message(), self.detail())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_http_status() {
        assert_eq!(Error::bad_request("x").code(), 400);
        assert_eq!(Error::not_found("x").code(), 404);
        assert_eq!(Error::InternalServerError("x".to_owned()).code(), 500);
    }

    #[test]
    fn display_carries_detail() {
        let err = Error::not_found("Shop unit 42 does not exist");
        assert_eq!(err.public_message(), "Item not found");
        assert_eq!(
            err.to_string(),
            "Item not found: Shop unit 42 does not exist"
        );
    }
}
