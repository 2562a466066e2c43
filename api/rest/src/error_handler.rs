use actix_web::{
    body::{to_bytes, MessageBody},
    dev::ServiceResponse,
    error::{InternalError, JsonPayloadError, PathError, QueryPayloadError},
    http::header,
    middleware::ErrorHandlerResponse,
    HttpRequest, Result,
};
use futures::executor;
use gs_error::Error;

use crate::model::Response;

/// Rewrites any error response that is not already JSON into the
/// `{code, message}` body every handler produces.
pub fn default_error_handler<B: MessageBody>(
    svc_res: ServiceResponse<B>,
) -> Result<ErrorHandlerResponse<B>> {
    if let Some(content_type) = svc_res.response().headers().get(header::CONTENT_TYPE) {
        if let Ok(content_type) = content_type.to_str() {
            if content_type.to_lowercase().starts_with("application/json") {
                return Ok(ErrorHandlerResponse::Response(svc_res.map_into_left_body()));
            }
        }
    }

    let (req, res) = svc_res.into_parts();

    let status_code = res.status();
    let body = executor::block_on(async {
        match to_bytes(res.into_body()).await {
            Ok(bytes) => match String::from_utf8(bytes.to_vec()) {
                Ok(str) => str,
                Err(err) => err.to_string(),
            },
            Err(err) => err.into().to_string(),
        }
    });

    let detail = if body.is_empty() {
        format!("{} {}", req.method(), req.path())
    } else {
        body
    };
    let res = Response::error_raw(&status_code, &detail);

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, res).map_into_right_body(),
    ))
}

pub fn json_error_handler(err: JsonPayloadError, _: &HttpRequest) -> actix_web::Error {
    let res = Response::error(&Error::bad_request(format!("Invalid request body: {err}")));
    InternalError::from_response(err, res).into()
}

pub fn path_error_handler(err: PathError, _: &HttpRequest) -> actix_web::Error {
    let res = Response::error(&Error::bad_request(format!("Invalid path: {err}")));
    InternalError::from_response(err, res).into()
}

pub fn query_error_handler(err: QueryPayloadError, _: &HttpRequest) -> actix_web::Error {
    let res = Response::error(&Error::bad_request(format!("Invalid query: {err}")));
    InternalError::from_response(err, res).into()
}
