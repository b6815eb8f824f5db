//! Validator capability and validation failure types.
//!
//! Rule evaluation lives in validators supplied by the application. The
//! dispatch core only defines what a validator returns and how failures are
//! grouped for the caller.

use std::collections::BTreeMap;
use std::future::{ready, Future};
use std::marker::PhantomData;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::pipeline::BoxFuture;
use crate::request::Request;

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// Name of the offending field.
    pub field: String,
    /// Human readable message.
    pub message: String,
}

impl ValidationFailure {
    /// Create a new failure.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation failures grouped by field.
///
/// Fields are ordered by name; messages keep first-seen order with
/// duplicates removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Group failures by field.
    pub fn from_failures<I>(failures: I) -> Self
    where
        I: IntoIterator<Item = ValidationFailure>,
    {
        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for failure in failures {
            let messages = errors.entry(failure.field).or_default();
            if !messages.contains(&failure.message) {
                messages.push(failure.message);
            }
        }
        Self { errors }
    }

    /// Messages for a field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// Iterate over `(field, messages)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Number of fields with failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Evaluates rules for request type `R`.
pub trait Validator<R: Request>: Send + Sync + 'static {
    /// Return every failed rule; an empty list means the request is valid.
    ///
    /// An `Err` is an infrastructure failure (e.g. a lookup that could not
    /// run), not a rule violation.
    fn validate<'a>(
        &'a self,
        request: &'a R,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Vec<ValidationFailure>>>;
}

/// Adapts a synchronous closure into a [`Validator`].
pub struct FnValidator<F, R> {
    rules: F,
    _phantom: PhantomData<fn(&R)>,
}

impl<F, R> Validator<R> for FnValidator<F, R>
where
    F: Fn(&R) -> Vec<ValidationFailure> + Send + Sync + 'static,
    R: Request,
{
    fn validate<'a>(
        &'a self,
        request: &'a R,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Vec<ValidationFailure>>> {
        Box::pin(ready(Ok((self.rules)(request))))
    }
}

/// Build a validator from a synchronous rule closure.
///
/// # Example
///
/// ```
/// use mediator_core::validation::{validator_fn, ValidationFailure};
/// use mediator_core::Request;
///
/// #[derive(Debug)]
/// struct CreateItem {
///     title: String,
/// }
///
/// impl Request for CreateItem {
///     type Response = u64;
/// }
///
/// let _validator = validator_fn(|req: &CreateItem| {
///     let mut failures = Vec::new();
///     if req.title.is_empty() {
///         failures.push(ValidationFailure::new("title", "Title is required."));
///     }
///     failures
/// });
/// ```
pub fn validator_fn<F, R>(rules: F) -> FnValidator<F, R>
where
    F: Fn(&R) -> Vec<ValidationFailure> + Send + Sync + 'static,
    R: Request,
{
    FnValidator {
        rules,
        _phantom: PhantomData,
    }
}

/// Adapts an async closure into a [`Validator`].
pub struct AsyncFnValidator<F, R, Fut> {
    rules: F,
    _phantom: PhantomData<fn(&R) -> Fut>,
}

impl<F, R, Fut> Validator<R> for AsyncFnValidator<F, R, Fut>
where
    F: Fn(&R, CancellationToken) -> Fut + Send + Sync + 'static,
    R: Request,
    Fut: Future<Output = Result<Vec<ValidationFailure>>> + Send + 'static,
{
    fn validate<'a>(
        &'a self,
        request: &'a R,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Vec<ValidationFailure>>> {
        Box::pin((self.rules)(request, cancel.clone()))
    }
}

/// Build a validator from an async rule closure, e.g. one that checks a
/// store for uniqueness.
pub fn async_validator_fn<F, R, Fut>(rules: F) -> AsyncFnValidator<F, R, Fut>
where
    F: Fn(&R, CancellationToken) -> Fut + Send + Sync + 'static,
    R: Request,
    Fut: Future<Output = Result<Vec<ValidationFailure>>> + Send + 'static,
{
    AsyncFnValidator {
        rules,
        _phantom: PhantomData,
    }
}
