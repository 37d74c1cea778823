//! View models for each screen of the console.
//!
//! A view owns disposable copies of remote data, performs at most one request
//! per action, and renders itself as text. Navigation is expressed by
//! returning a [`Route`].

pub mod create;
pub mod detail;
pub mod list;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;

use crate::error::AppError;

pub use create::CreateView;
pub use detail::DetailView;
pub use list::ListView;
pub use token::TokenView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Token entry.
    Auth,
    List,
    Create,
    /// Detail for a key; `None` when the path carried no usable key.
    Detail(Option<String>),
}

impl Route {
    /// Parse a console path such as `/settings/timeout_ms`.
    ///
    /// `/` lands on the list. Key segments are percent-decoded.
    pub fn parse(path: &str) -> Result<Self, AppError> {
        let trimmed = path.trim();
        let path = trimmed.trim_end_matches('/');
        match path {
            "" | "/settings" => Ok(Route::List),
            "/auth" => Ok(Route::Auth),
            "/settings/create" => Ok(Route::Create),
            _ => match path.strip_prefix("/settings/") {
                Some(segment) => {
                    let key = urlencoding::decode(segment)
                        .map(|k| k.into_owned())
                        .unwrap_or_default();
                    let key = key.trim();
                    Ok(Route::Detail((!key.is_empty()).then(|| key.to_string())))
                }
                None => Err(AppError::Validation(format!("Unknown route '{trimmed}'"))),
            },
        }
    }

    /// Everything but the token page sits behind the auth gate.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Auth)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Auth => f.write_str("/auth"),
            Route::List => f.write_str("/settings"),
            Route::Create => f.write_str("/settings/create"),
            Route::Detail(Some(key)) => write!(f, "/settings/{}", urlencoding::encode(key)),
            Route::Detail(None) => f.write_str("/settings/"),
        }
    }
}
