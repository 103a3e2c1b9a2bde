mod article;
pub use article::{Article, PostId};

mod auth;
pub use auth::{AuthToken, Credentials, TokenPair};

mod backend;
pub use backend::CommentApi;

mod comment;
pub use comment::{Comment, CommentEdit, CommentId, LikeStatus, NewComment};

mod error;
pub use error::{Error, RequestError};

mod user;
pub use user::{User, UserId};

pub use http::StatusCode;

pub type Time = chrono::DateTime<chrono::Utc>;

/// Display name used when an author has neither a full name nor an email
pub const ANONYMOUS: &str = "Anonymous";

// Checks a user-submitted comment body before it is sent or stored.
pub fn validate_content(content: &str) -> Result<(), Error> {
    if content.contains('\0') {
        return Err(Error::NullByteInString(String::from(content)));
    }
    if content.trim().is_empty() {
        return Err(Error::InvalidField {
            field: String::from("content"),
            message: String::from("This field may not be blank."),
        });
    }
    Ok(())
}
