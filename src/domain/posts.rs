use time::{format_description::FormatItem, macros::format_description};

use super::error::DomainError;

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

/// Number of characters of post content shown on the home page.
pub const EXCERPT_CHARS: usize = 100;

const EXCERPT_ELLIPSIS: &str = " ...";

/// A post as submitted through the compose form, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

impl NewPost {
    /// Build a post from raw form fields.
    ///
    /// The title must be present and not blank. The body must be present but may be
    /// empty. Both values are kept verbatim.
    pub fn from_form(title: Option<String>, content: Option<String>) -> Result<Self, DomainError> {
        let title = match title {
            Some(title) if !title.trim().is_empty() => title,
            Some(_) => return Err(DomainError::validation("postTitle must not be blank")),
            None => return Err(DomainError::validation("postTitle is required")),
        };
        let content = content.ok_or_else(|| DomainError::validation("postBody is required"))?;

        Ok(Self { title, content })
    }
}

/// Shorten post content for list views, cutting on character boundaries.
pub fn excerpt(content: &str) -> String {
    match content.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}{EXCERPT_ELLIPSIS}", &content[..cut]),
        None => content.to_string(),
    }
}
