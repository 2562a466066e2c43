use actix_web::{http::StatusCode, HttpResponse, HttpResponseBuilder};
use gs_error::Error;
use serde::Serialize;

pub mod sales;
pub mod shop_unit;
pub mod statistic;

pub struct Response;

impl Response {
    pub fn data<T: Serialize>(status_code: &StatusCode, data: T) -> HttpResponse {
        match serde_json::to_value(data) {
            Ok(data) => HttpResponseBuilder::new(*status_code).json(data),
            Err(err) => Self::error(&Error::InternalServerError(err.to_string())),
        }
    }

    pub fn empty(status_code: &StatusCode) -> HttpResponse {
        HttpResponseBuilder::new(*status_code).finish()
    }

    pub fn error(err: &Error) -> HttpResponse {
        let status_code = match err {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self::error_raw(&status_code, err.detail())
    }

    /// Domain errors keep their class; anything else is a 500.
    pub fn error_anyhow(err: &anyhow::Error) -> HttpResponse {
        match err.downcast_ref::<Error>() {
            Some(err) => Self::error(err),
            None => Self::error(&Error::InternalServerError(format!("{err:#}"))),
        }
    }

    pub fn error_raw(status_code: &StatusCode, detail: &str) -> HttpResponse {
        if status_code.is_server_error() {
            gs_log::error(None, detail);
        } else {
            gs_log::warn(None, detail);
        }

        HttpResponseBuilder::new(*status_code).json(ErrorRes {
            code: status_code.as_u16(),
            message: public_message(status_code),
        })
    }
}

fn public_message(status_code: &StatusCode) -> &'static str {
    match *status_code {
        StatusCode::BAD_REQUEST => "Validation Failed",
        StatusCode::NOT_FOUND => "Item not found",
        status_code if status_code.is_server_error() => "Internal Server Error",
        status_code => status_code.canonical_reason().unwrap_or("Unknown"),
    }
}

#[derive(Serialize)]
pub struct ErrorRes {
    code: u16,
    message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_messages_hide_details() {
        assert_eq!(public_message(&StatusCode::BAD_REQUEST), "Validation Failed");
        assert_eq!(public_message(&StatusCode::NOT_FOUND), "Item not found");
        assert_eq!(
            public_message(&StatusCode::BAD_GATEWAY),
            "Internal Server Error"
        );
        assert_eq!(
            public_message(&StatusCode::METHOD_NOT_ALLOWED),
            "Method Not Allowed"
        );
    }
}
