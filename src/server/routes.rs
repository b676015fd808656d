use crate::data::PresetError;
use crate::server::api::{self, ApiContext, ApiError};
use crate::session::SessionError;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }

    fn json_ok(body: String) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }
}

pub fn route_request(ctx: &ApiContext, method: &str, path: &str, body: &str) -> HttpResponse {
    let route = path.split('?').next().unwrap_or(path);
    let result = match (method, route) {
        ("GET", "/api/health") => api::health_payload().map_err(ApiError::Serialize),
        ("POST", "/api/heatmap") => api::heatmap_payload(body),
        ("POST", "/api/compare") => api::compare_payload(body),
        ("GET", "/api/presets") => api::presets_list_payload(&ctx.presets),
        ("POST", "/api/presets") => api::preset_post_payload(&ctx.presets, body),
        ("GET", "/api/presets/rank") => api::rank_payload(ctx, path),
        _ => return error_response(404, "Not Found", "Route not found"),
    };

    match result {
        Ok(payload) => HttpResponse::json_ok(payload),
        Err(err) => api_error_response(&err),
    }
}

fn api_error_response(err: &ApiError) -> HttpResponse {
    let message = err.to_string();
    match err {
        ApiError::Parse(_)
        | ApiError::Query(_)
        | ApiError::Param(_)
        | ApiError::Session(SessionError::Param(_))
        | ApiError::Session(SessionError::Compare(_))
        | ApiError::Preset(PresetError::EmptyName)
        | ApiError::Preset(PresetError::Param(_)) => {
            error_response(400, "Bad Request", &message)
        }
        ApiError::Session(SessionError::MissingGrid(_)) => {
            error_response(409, "Conflict", &message)
        }
        ApiError::Preset(PresetError::DuplicateName(_)) => {
            error_response(409, "Conflict", &message)
        }
        ApiError::Preset(PresetError::NotFound) => error_response(404, "Not Found", &message),
        ApiError::Preset(PresetError::Io(_))
        | ApiError::Preset(PresetError::Serialize(_))
        | ApiError::Preset(PresetError::Poisoned)
        | ApiError::Serialize(_) => error_response(500, "Internal Server Error", &message),
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
