//! Request routing.
//!
//! | Path           | Method   | Handler              |
//! |----------------|----------|----------------------|
//! | `/`            | GET/HEAD | embedded index.html  |
//! | `/health`      | GET/HEAD | `OK`                 |
//! | `/playwithutf` | POST     | JSON encode/decode   |

use crate::codec::Codec;

use super::api;
use super::http::{Method, Request, Response, StatusCode};

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Debug, Clone, Copy, Default)]
pub struct Router {
    codec: Codec,
}

impl Router {
    pub fn new(codec: Codec) -> Self {
        Self { codec }
    }

    pub fn handle(&self, req: &Request) -> Response {
        match req.path.as_str() {
            "/" => match req.method {
                Method::Get | Method::Head => Response::html(INDEX_HTML),
                _ => method_not_allowed("GET, HEAD"),
            },
            "/health" => match req.method {
                Method::Get | Method::Head => Response::text(StatusCode::OK, "OK"),
                _ => method_not_allowed("GET, HEAD"),
            },
            "/playwithutf" => match req.method {
                Method::Post => api::play(&self.codec, &req.body).into_response(),
                _ => method_not_allowed("POST"),
            },
            _ => Response::text(StatusCode::NOT_FOUND, "404 page not found\n"),
        }
    }
}

fn method_not_allowed(allow: &'static str) -> Response {
    Response::text(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed\n").with_header("Allow", allow)
}
