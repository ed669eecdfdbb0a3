use crate::application::error::{ErrorReport, HttpError};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Render the shared error page and attach the diagnostic report for logging.
pub fn render_error_response(
    chrome: LayoutChrome,
    status: StatusCode,
    content: ErrorPageView,
    report: ErrorReport,
) -> Response {
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, status);
    report.attach(&mut response);
    response
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: Vec<NavigationLinkView>,
    pub footer: String,
}

impl LayoutChrome {
    pub fn new(site_title: impl Into<String>) -> Self {
        let title = site_title.into();
        let link = |label: &str, href: &str| NavigationLinkView {
            label: label.to_string(),
            href: href.to_string(),
        };

        Self {
            footer: format!("Made with care for {title}."),
            brand: BrandView {
                title,
                href: "/".to_string(),
            },
            navigation: vec![
                link("Home", "/"),
                link("About Us", "/about"),
                link("Contact Us", "/contact"),
                link("Compose", "/compose"),
            ],
        }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: Vec<NavigationLinkView>,
    pub footer: String,
    pub page_title: String,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            page_title: chrome.brand.title.clone(),
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            content,
        }
    }

    pub fn with_page_title(self, heading: &str) -> Self {
        let page_title = format!("{heading} | {}", self.brand.title);
        Self { page_title, ..self }
    }
}

#[derive(Clone)]
pub struct PostCard {
    pub id: Uuid,
    pub href: String,
    pub title: String,
    pub excerpt: String,
}

pub struct HomeContext {
    pub starting_content: &'static str,
    pub posts: Vec<PostCard>,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub view: LayoutContext<HomeContext>,
}

#[derive(Template)]
#[template(path = "compose.html")]
pub struct ComposeTemplate {
    pub view: LayoutContext<()>,
}

pub struct PostDetailContext {
    pub title: String,
    pub content: String,
    pub published: String,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostDetailContext>,
}

pub struct StaticPageContext {
    pub name: &'static str,
    pub heading: &'static str,
    pub content: &'static str,
}

#[derive(Template)]
#[template(path = "static_page.html")]
pub struct StaticPageTemplate {
    pub view: LayoutContext<StaticPageContext>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Post Not Found".to_string(),
            message: "The post you asked for does not exist. It may never have been written."
                .to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }

    pub fn invalid_submission(detail: impl Into<String>) -> Self {
        Self {
            title: "Could Not Publish".to_string(),
            message: detail.into(),
            primary_action: Some(ErrorAction::compose()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            title: "Temporarily Unavailable".to_string(),
            message: "The journal could not reach its content store. Please try again shortly."
                .to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }

    pub fn compose() -> Self {
        Self {
            href: "/compose".to_string(),
            label: "Back to compose".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
