//! # ab-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the core
//! services. Handlers only parse, delegate and serialize.

use std::sync::Arc;

use ab_core::{AppError, BoardListing, BoardRepo, DeleteKeyHasher, ThreadLifecycle};
use ab_ui::{BoardTemplate, IndexTemplate, ThreadTemplate};
use actix_web::http::header::{self, ContentType};
use actix_web::{web, Either, HttpResponse};
use askama::Template;

use crate::error::ApiError;
use crate::forms::{
    parse_id, DeleteReplyForm, DeleteThreadForm, NewReplyForm, NewThreadForm, ReplyTarget,
    ThreadQuery, ThreadTarget,
};

/// Literal answers of the report and delete routes.
pub const REPORTED: &str = "reported";
pub const SUCCESS: &str = "success";
pub const INCORRECT_PASSWORD: &str = "incorrect password";

/// A request body sent either as JSON or as a url-encoded form.
pub type Body<T> = Either<web::Json<T>, web::Form<T>>;

/// State shared across all actix-web workers.
pub struct AppState {
    pub lifecycle: ThreadLifecycle,
    pub listing: BoardListing,
}

impl AppState {
    pub fn new(repo: Arc<dyn BoardRepo>, keys: Arc<dyn DeleteKeyHasher>) -> Self {
        Self {
            lifecycle: ThreadLifecycle::new(repo.clone(), keys),
            listing: BoardListing::new(repo),
        }
    }
}

/// Unwraps a body, remembering whether it came from an HTML form.
fn unwrap_body<T>(body: Body<T>) -> (T, bool) {
    match body {
        Either::Left(json) => (json.into_inner(), false),
        Either::Right(form) => (form.into_inner(), true),
    }
}

fn plain(text: &'static str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(text)
}

fn see_other(location: String) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Delete routes answer with one of two strings, whatever the cause.
fn delete_outcome(result: ab_core::Result<()>) -> Result<HttpResponse, ApiError> {
    match result {
        Ok(()) => Ok(plain(SUCCESS)),
        Err(err) if err.is_refused_delete() => Ok(plain(INCORRECT_PASSWORD)),
        Err(err) => Err(err.into()),
    }
}

fn render(template: &impl Template) -> Result<HttpResponse, ApiError> {
    let html = template
        .render()
        .map_err(|e| AppError::Internal(format!("template rendering failed: {e}")))?;
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(html))
}

// ── Threads ──────────────────────────────────────────────────────────────────

/// `POST /api/threads/{board}`
pub async fn create_thread(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: Body<NewThreadForm>,
) -> Result<HttpResponse, ApiError> {
    let board = path.into_inner();
    let (form, from_html) = unwrap_body(body);

    let thread = data
        .lifecycle
        .post_thread(&board, &form.text, &form.delete_password)
        .await?;

    if from_html {
        return Ok(see_other(format!("/b/{board}/")));
    }
    Ok(HttpResponse::Ok().json(thread))
}

/// `GET /api/threads/{board}`
pub async fn list_threads(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let threads = data.listing.recent_threads(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(threads))
}

/// `PUT /api/threads/{board}`
pub async fn report_thread(
    data: web::Data<AppState>,
    body: Body<ThreadTarget>,
) -> Result<HttpResponse, ApiError> {
    let (target, _) = unwrap_body(body);
    let thread_id = parse_id("thread", &target.thread_id)?;

    data.lifecycle.report_thread(thread_id).await?;
    Ok(plain(REPORTED))
}

/// `DELETE /api/threads/{board}`
pub async fn delete_thread(
    data: web::Data<AppState>,
    body: Body<DeleteThreadForm>,
) -> Result<HttpResponse, ApiError> {
    let (form, _) = unwrap_body(body);
    let result = match parse_id("thread", &form.thread_id) {
        Ok(thread_id) => data.lifecycle.delete_thread(thread_id, &form.delete_password).await,
        Err(err) => Err(err),
    };
    delete_outcome(result)
}

// ── Replies ──────────────────────────────────────────────────────────────────

/// `POST /api/replies/{board}`
///
/// Answers with the whole thread so the caller sees the bump and the new reply.
pub async fn create_reply(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: Body<NewReplyForm>,
) -> Result<HttpResponse, ApiError> {
    let board = path.into_inner();
    let (form, from_html) = unwrap_body(body);
    let thread_id = parse_id("thread", &form.thread_id)?;

    data.lifecycle
        .post_reply(thread_id, &form.text, &form.delete_password)
        .await?;

    if from_html {
        return Ok(see_other(format!("/b/{board}/{thread_id}")));
    }
    let thread = data.listing.get_thread(thread_id).await?;
    Ok(HttpResponse::Ok().json(thread))
}

/// `GET /api/replies/{board}?thread_id=`
///
/// Scoped to the board in the path, like the thread page.
pub async fn get_thread(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ThreadQuery>,
) -> Result<HttpResponse, ApiError> {
    let thread_id = parse_id("thread", &query.thread_id)?;
    let thread = data
        .listing
        .get_board_thread(&path.into_inner(), thread_id)
        .await?;
    Ok(HttpResponse::Ok().json(thread))
}

/// `PUT /api/replies/{board}`
pub async fn report_reply(
    data: web::Data<AppState>,
    body: Body<ReplyTarget>,
) -> Result<HttpResponse, ApiError> {
    let (target, _) = unwrap_body(body);
    let thread_id = parse_id("thread", &target.thread_id)?;
    let reply_id = parse_id("reply", &target.reply_id)?;

    data.lifecycle.report_reply(thread_id, reply_id).await?;
    Ok(plain(REPORTED))
}

/// `DELETE /api/replies/{board}`
pub async fn delete_reply(
    data: web::Data<AppState>,
    body: Body<DeleteReplyForm>,
) -> Result<HttpResponse, ApiError> {
    let (form, _) = unwrap_body(body);
    delete_outcome(try_delete_reply(&data, &form).await)
}

async fn try_delete_reply(state: &AppState, form: &DeleteReplyForm) -> ab_core::Result<()> {
    let thread_id = parse_id("thread", &form.thread_id)?;
    let reply_id = parse_id("reply", &form.reply_id)?;
    state
        .lifecycle
        .delete_reply(thread_id, reply_id, &form.delete_password)
        .await
}

// ── Pages ────────────────────────────────────────────────────────────────────

/// Renders the board index at `/`.
pub async fn index(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let boards = data.listing.list_boards().await?;
    render(&IndexTemplate {
        boards: &boards,
        title: "anonboard",
    })
}

/// Renders a board (e.g., /b/general/)
pub async fn board_page(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let board = path.into_inner();
    let threads = data.listing.recent_threads(&board).await?;

    let title = format!("/{board}/");
    render(&BoardTemplate {
        board: &board,
        threads: &threads,
        title: &title,
    })
}

/// Renders a specific thread (e.g., /b/general/<uuid>)
pub async fn thread_page(
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (board, raw_id) = path.into_inner();
    let thread_id = parse_id("thread", &raw_id)?;

    let thread = data.listing.get_board_thread(&board, thread_id).await?;

    let title = format!("/{board}/ - {}", thread.id);
    render(&ThreadTemplate {
        board: &board,
        thread: &thread,
        title: &title,
    })
}

/// Fallback for every unmatched route.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type(ContentType::plaintext())
        .body("Not Found")
}
