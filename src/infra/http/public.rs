use std::{path::Path as FsPath, sync::Arc};

use axum::{
    Form, Router,
    extract::{Path, State, rejection::FormRejection},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tower_http::services::ServeDir;

use crate::{
    application::{
        blog::{BlogError, BlogService},
        error::ErrorReport,
    },
    domain::error::DomainError,
    presentation::views::{
        ComposeTemplate, ErrorPageView, HomeTemplate, LayoutChrome, LayoutContext, PostTemplate,
        StaticPageTemplate, render_error_response, render_template_response,
    },
};

use super::{
    db_health_response,
    middleware::{log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub blog: Arc<BlogService>,
    pub chrome: LayoutChrome,
}

/// Build the public router; unmatched paths fall through to files under `public_dir`.
pub fn build_router(state: HttpState, public_dir: &FsPath) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/compose", get(compose_form).post(compose_submit))
        .route("/posts/{post_id}", get(post_detail))
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/_health/db", get(public_health))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

/// Raw compose form; fields stay optional so missing ones surface as validation errors.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ComposeForm {
    #[serde(rename = "postTitle")]
    post_title: Option<String>,
    #[serde(rename = "postBody")]
    post_body: Option<String>,
}

async fn index(State(state): State<HttpState>) -> Response {
    match state.blog.list_posts().await {
        Ok(content) => {
            let view = LayoutContext::new(state.chrome.clone(), content);
            render_template_response(HomeTemplate { view }, StatusCode::OK)
        }
        Err(err) => blog_error_to_response(err, state.chrome),
    }
}

async fn compose_form(State(state): State<HttpState>) -> Response {
    let view = LayoutContext::new(state.chrome, ()).with_page_title("Compose");
    render_template_response(ComposeTemplate { view }, StatusCode::OK)
}

async fn compose_submit(
    State(state): State<HttpState>,
    form: Result<Form<ComposeForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            let err = BlogError::from(DomainError::validation(rejection.body_text()));
            return blog_error_to_response(err, state.chrome);
        }
    };

    let created = state.blog.create_post(form.post_title, form.post_body).await;
    match created {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => blog_error_to_response(err, state.chrome),
    }
}

async fn post_detail(State(state): State<HttpState>, Path(post_id): Path<String>) -> Response {
    match state.blog.post_detail(&post_id).await {
        Ok(content) => {
            let heading = content.title.clone();
            let view =
                LayoutContext::new(state.chrome.clone(), content).with_page_title(&heading);
            render_template_response(PostTemplate { view }, StatusCode::OK)
        }
        Err(err) => blog_error_to_response(err, state.chrome),
    }
}

async fn about(State(state): State<HttpState>) -> Response {
    static_page(&state, "about")
}

async fn contact(State(state): State<HttpState>) -> Response {
    static_page(&state, "contact")
}

fn static_page(state: &HttpState, name: &str) -> Response {
    match state.blog.static_page(name) {
        Ok(content) => {
            let heading = content.heading;
            let view = LayoutContext::new(state.chrome.clone(), content).with_page_title(heading);
            render_template_response(StaticPageTemplate { view }, StatusCode::OK)
        }
        Err(err) => blog_error_to_response(err, state.chrome.clone()),
    }
}

fn blog_error_to_response(err: BlogError, chrome: LayoutChrome) -> Response {
    const SOURCE: &str = "infra::http::public::blog_error_to_response";

    let status = err.status_code();
    let content = match &err {
        BlogError::NotFound(_) => ErrorPageView::not_found(),
        BlogError::Validation(inner) => ErrorPageView::invalid_submission(inner.to_string()),
        BlogError::StoreUnavailable { .. } => ErrorPageView::unavailable(),
    };
    let report = ErrorReport::from_error(SOURCE, status, &err);
    render_error_response(chrome, status, content, report)
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.blog.health_check().await)
}
