//! anonboard/crates/ab-api/src/middleware.rs Middleware
//!
//! Request logging, cross-origin access for the JSON API, and the security
//! headers every page and API answer carries.

use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};

/// Access log line per request: peer, request line, status, size, latency.
pub fn standard_middleware() -> Logger {
    Logger::new(r#"%a "%r" %s %b %Dms"#)
}

/// Any origin may call the API, with the four verbs the routes use.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allow_any_header()
        .max_age(3600)
}

/// No framing from other sites, no DNS prefetch, referrer kept on-site,
/// no MIME sniffing.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Frame-Options", "SAMEORIGIN"))
        .add(("X-DNS-Prefetch-Control", "off"))
        .add(("Referrer-Policy", "same-origin"))
        .add(("X-Content-Type-Options", "nosniff"))
}
