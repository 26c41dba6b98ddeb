//! Dispatch failures and their 500 rendering.

use std::any::Any;
use std::error::Error;

use axum::http::StatusCode;

use crate::component::{BindError, DynError, InvokeError};
use crate::http::ResponseParts;

/// First line of a detailed 500 body.
pub const DETAILS_HEADER: &str = "500 Exception, details:";

/// Body of a 500 when details are disabled.
pub const GENERIC_BODY: &str = "500 Internal Server Error";

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no bean named `{owner}` for {handler}")]
    MissingTarget { owner: String, handler: String },

    #[error("cannot bind arguments for {handler}: {source}")]
    Bind {
        handler: String,
        #[source]
        source: BindError,
    },

    #[error("{handler} failed: {error}")]
    Handler { handler: String, error: DynError },

    #[error("{handler} panicked: {message}")]
    Panic { handler: String, message: String },
}

impl DispatchError {
    pub(crate) fn from_invoke(handler: String, error: InvokeError) -> Self {
        match error {
            InvokeError::Bind(source) => DispatchError::Bind { handler, source },
            InvokeError::Handler(error) => DispatchError::Handler { handler, error },
        }
    }

    /// Metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::MissingTarget { .. } => "missing_target",
            DispatchError::Bind { .. } => "bind_error",
            DispatchError::Handler { .. } => "handler_error",
            DispatchError::Panic { .. } => "panic",
        }
    }

    /// Stack-trace-like lines: the error, then one line per cause.
    pub fn frames(&self) -> Vec<String> {
        let mut frames = vec![self.to_string()];

        let mut cause: Option<&(dyn Error + 'static)> = match self {
            DispatchError::Handler { error, .. } => error.source(),
            DispatchError::Bind { source, .. } => source.source(),
            _ => None,
        };
        while let Some(error) = cause {
            frames.push(format!("Caused by: {error}"));
            cause = error.source();
        }

        frames
    }

    /// The 500 response for this failure.
    pub fn render(&self, detailed: bool) -> ResponseParts {
        if detailed {
            let body = format!("{DETAILS_HEADER}\r\n{}", self.frames().join("\r\n"));
            ResponseParts::text(StatusCode::INTERNAL_SERVER_ERROR, body)
        } else {
            ResponseParts::text(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_BODY)
        }
    }
}

/// Text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
