//! Typed handler methods and argument binding.
//!
//! Handler methods take `&self` followed by up to six parameters, each one of
//! `HttpRequest`, `HttpResponse`, `String` or `Option<String>`. The parameter
//! kinds are read once when the route is declared; at dispatch time the
//! prepared arguments are converted back positionally.

use std::fmt;

use serde::Serialize;

use crate::component::DynError;
use crate::http::{HttpRequest, HttpResponse};

/// A prepared argument for one handler parameter.
#[derive(Debug, Clone)]
pub enum Argument {
    Request(HttpRequest),
    Response(HttpResponse),
    Text { name: String, value: Option<String> },
}

impl Argument {
    pub fn kind(&self) -> ArgumentKind {
        match self {
            Argument::Request(_) => ArgumentKind::Request,
            Argument::Response(_) => ArgumentKind::Response,
            Argument::Text { .. } => ArgumentKind::Text,
        }
    }
}

/// Parameter kinds a handler may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentKind {
    Request,
    Response,
    Text,
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentKind::Request => f.write_str("request"),
            ArgumentKind::Response => f.write_str("response"),
            ArgumentKind::Text => f.write_str("text"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("no argument supplied for {expected} parameter")]
    MissingArgument { expected: ArgumentKind },

    #[error("expected {expected} argument, found {found}")]
    KindMismatch {
        expected: ArgumentKind,
        found: ArgumentKind,
    },

    #[error("required request parameter `{name}` is not present")]
    MissingParameter { name: String },

    #[error("handler target is not a `{expected}`")]
    TargetMismatch { expected: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("{0}")]
    Handler(DynError),
}

/// Conversion from a prepared argument into a handler parameter.
pub trait FromArgument: Sized + 'static {
    const KIND: ArgumentKind;

    fn from_argument(argument: Option<Argument>) -> Result<Self, BindError>;
}

fn mismatch(expected: ArgumentKind, argument: Option<Argument>) -> BindError {
    match argument {
        Some(found) => BindError::KindMismatch {
            expected,
            found: found.kind(),
        },
        None => BindError::MissingArgument { expected },
    }
}

impl FromArgument for HttpRequest {
    const KIND: ArgumentKind = ArgumentKind::Request;

    fn from_argument(argument: Option<Argument>) -> Result<Self, BindError> {
        match argument {
            Some(Argument::Request(request)) => Ok(request),
            other => Err(mismatch(Self::KIND, other)),
        }
    }
}

impl FromArgument for HttpResponse {
    const KIND: ArgumentKind = ArgumentKind::Response;

    fn from_argument(argument: Option<Argument>) -> Result<Self, BindError> {
        match argument {
            Some(Argument::Response(response)) => Ok(response),
            other => Err(mismatch(Self::KIND, other)),
        }
    }
}

impl FromArgument for Option<String> {
    const KIND: ArgumentKind = ArgumentKind::Text;

    fn from_argument(argument: Option<Argument>) -> Result<Self, BindError> {
        match argument {
            Some(Argument::Text { value, .. }) => Ok(value),
            other => Err(mismatch(Self::KIND, other)),
        }
    }
}

impl FromArgument for String {
    const KIND: ArgumentKind = ArgumentKind::Text;

    fn from_argument(argument: Option<Argument>) -> Result<Self, BindError> {
        match argument {
            Some(Argument::Text { value: Some(value), .. }) => Ok(value),
            Some(Argument::Text { name, value: None }) => Err(BindError::MissingParameter { name }),
            other => Err(mismatch(Self::KIND, other)),
        }
    }
}

/// Return types accepted from handler methods.
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> Result<(), DynError>;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> Result<(), DynError> {
        Ok(())
    }
}

impl<E> IntoHandlerResult for Result<(), E>
where
    E: Into<DynError>,
{
    fn into_handler_result(self) -> Result<(), DynError> {
        self.map_err(Into::into)
    }
}

/// A method of `T` callable with prepared arguments.
///
/// Implemented for `Fn(&T, A1, .., An) -> R` up to six parameters.
pub trait HandlerFn<T, Args>: Send + Sync + 'static {
    fn argument_kinds() -> Vec<ArgumentKind>;

    fn call(&self, target: &T, arguments: Vec<Argument>) -> Result<(), InvokeError>;
}

macro_rules! impl_handler_fn {
    ($($ty:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<T, F, R, $($ty,)*> HandlerFn<T, ($($ty,)*)> for F
        where
            F: Fn(&T, $($ty,)*) -> R + Send + Sync + 'static,
            R: IntoHandlerResult,
            $($ty: FromArgument,)*
        {
            fn argument_kinds() -> Vec<ArgumentKind> {
                vec![$($ty::KIND),*]
            }

            fn call(&self, target: &T, arguments: Vec<Argument>) -> Result<(), InvokeError> {
                let mut arguments = arguments.into_iter();
                $(
                    let $ty = <$ty as FromArgument>::from_argument(arguments.next())?;
                )*
                (self)(target, $($ty,)*)
                    .into_handler_result()
                    .map_err(InvokeError::Handler)
            }
        }
    };
}

impl_handler_fn!();
impl_handler_fn!(A1);
impl_handler_fn!(A1, A2);
impl_handler_fn!(A1, A2, A3);
impl_handler_fn!(A1, A2, A3, A4);
impl_handler_fn!(A1, A2, A3, A4, A5);
impl_handler_fn!(A1, A2, A3, A4, A5, A6);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        calls: AtomicUsize,
    }

    impl Counter {
        fn greet(&self, response: HttpResponse, name: String) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            response.write(&format!("hi {name}"));
        }

        fn fail(&self) -> Result<(), DynError> {
            Err("boom".into())
        }
    }

    fn kinds_of<T, Args, H: HandlerFn<T, Args>>(_handler: &H) -> Vec<ArgumentKind> {
        H::argument_kinds()
    }

    fn text(name: &str, value: Option<&str>) -> Argument {
        Argument::Text {
            name: name.to_string(),
            value: value.map(str::to_string),
        }
    }

    #[test]
    fn test_argument_kinds_follow_declaration_order() {
        assert_eq!(
            kinds_of::<Counter, _, _>(&Counter::greet),
            vec![ArgumentKind::Response, ArgumentKind::Text]
        );
        assert!(kinds_of::<Counter, _, _>(&Counter::fail).is_empty());
    }

    #[test]
    fn test_call_binds_positionally() {
        let counter = Counter::default();
        let response = HttpResponse::new();
        let args = vec![Argument::Response(response.clone()), text("name", Some("Ann"))];

        HandlerFn::call(&Counter::greet, &counter, args).unwrap();

        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.take_parts().body_text(), "hi Ann");
    }

    #[test]
    fn test_required_text_rejects_missing_value() {
        let counter = Counter::default();
        let args = vec![Argument::Response(HttpResponse::new()), text("name", None)];

        let err = HandlerFn::call(&Counter::greet, &counter, args).unwrap_err();
        assert!(matches!(
            err,
            InvokeError::Bind(BindError::MissingParameter { ref name }) if name == "name"
        ));
        assert_eq!(counter.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_kind_mismatch_is_reported() {
        let counter = Counter::default();
        let args = vec![text("name", Some("x")), text("name", Some("y"))];

        let err = HandlerFn::call(&Counter::greet, &counter, args).unwrap_err();
        assert!(matches!(
            err,
            InvokeError::Bind(BindError::KindMismatch {
                expected: ArgumentKind::Response,
                found: ArgumentKind::Text
            })
        ));
    }

    #[test]
    fn test_handler_errors_are_wrapped() {
        let err = HandlerFn::call(&Counter::fail, &Counter::default(), Vec::new()).unwrap_err();
        assert!(matches!(err, InvokeError::Handler(ref e) if e.to_string() == "boom"));
    }
}
