//! Runs the validators registered for a request type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::ready;
use std::marker::PhantomData;

use futures::future::try_join_all;
use tokio_util::sync::CancellationToken;

use crate::error::{MediatorError, Result};
use crate::pipeline::{Behavior, BoxFuture, Next, Outcome};
use crate::request::{short_type_name, Request, RequestView};
use crate::validation::{validator_fn, ValidationErrors, ValidationFailure, Validator};

/// Object-safe form of [`Validator<R>`] keyed by the request's `TypeId`.
trait ErasedValidator: Send + Sync {
    fn validate<'a>(
        &'a self,
        request: &'a dyn Any,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Vec<ValidationFailure>>>;
}

struct TypedValidator<R, V> {
    validator: V,
    _phantom: PhantomData<fn(&R)>,
}

impl<R, V> ErasedValidator for TypedValidator<R, V>
where
    R: Request,
    V: Validator<R>,
{
    fn validate<'a>(
        &'a self,
        request: &'a dyn Any,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Vec<ValidationFailure>>> {
        match request.downcast_ref::<R>() {
            Some(request) => self.validator.validate(request, cancel),
            None => Box::pin(ready(Ok(Vec::new()))),
        }
    }
}

/// Rejects requests that fail any of their validators.
///
/// All validators of the request type run concurrently on the calling task.
/// Their failures are grouped by field into a single
/// [`MediatorError::ValidationFailed`]; the handler is not reached. Request
/// types without validators pass straight through.
#[derive(Default)]
pub struct ValidationBehavior {
    validators: HashMap<TypeId, Vec<Box<dyn ErasedValidator>>>,
}

impl ValidationBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator for request type `R`.
    pub fn validator<R, V>(mut self, validator: V) -> Self
    where
        R: Request,
        V: Validator<R>,
    {
        tracing::trace!("Registered validator for {}", short_type_name::<R>());
        self.validators
            .entry(TypeId::of::<R>())
            .or_default()
            .push(Box::new(TypedValidator {
                validator,
                _phantom: PhantomData,
            }));
        self
    }

    /// Add a synchronous rule closure for request type `R`.
    pub fn rules<R, F>(self, rules: F) -> Self
    where
        R: Request,
        F: Fn(&R) -> Vec<ValidationFailure> + Send + Sync + 'static,
    {
        self.validator::<R, _>(validator_fn(rules))
    }

    /// Number of validators registered for request type `R`.
    pub fn validator_count<R: Request>(&self) -> usize {
        self.validators
            .get(&TypeId::of::<R>())
            .map_or(0, Vec::len)
    }
}

impl Behavior for ValidationBehavior {
    fn handle<'a>(
        &'a self,
        request: &'a dyn RequestView,
        cancel: &'a CancellationToken,
        next: Next<'a, Outcome>,
    ) -> BoxFuture<'a, Result<Outcome>> {
        let Some(validators) = self.validators.get(&request.request_type()) else {
            return next.run();
        };

        Box::pin(async move {
            let results = try_join_all(
                validators
                    .iter()
                    .map(|validator| validator.validate(request.as_any(), cancel)),
            )
            .await?;

            let errors = ValidationErrors::from_failures(results.into_iter().flatten());
            if !errors.is_empty() {
                tracing::debug!(
                    "Validation of {} failed on {} field(s)",
                    request.name(),
                    errors.len()
                );
                return Err(MediatorError::ValidationFailed(errors));
            }

            next.run().await
        })
    }
}
