//! # ab-ui
//!
//! Server-rendered pages. Templates live in `templates/` and only ever see
//! the redacted views from `ab-core`.

use ab_core::models::{Board, ThreadView};
use askama::Template;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub boards: &'a [Board],
    pub title: &'a str,
}

#[derive(Template)]
#[template(path = "board.html")]
pub struct BoardTemplate<'a> {
    pub board: &'a str,
    pub threads: &'a [ThreadView],
    pub title: &'a str,
}

#[derive(Template)]
#[template(path = "thread.html")]
pub struct ThreadTemplate<'a> {
    pub board: &'a str,
    pub thread: &'a ThreadView,
    pub title: &'a str,
}
