//! Todo list demo.
//!
//! Wires the standard behavior chain around a few in-memory handlers and
//! sends requests through it. Run with:
//!
//! ```text
//! RUST_LOG=debug cargo run --example todo
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing_subscriber::prelude::*;

use mediator_core::behaviors::{
    AuthorizationBehavior, LoggingBehavior, PerformanceBehavior, UnhandledErrorBehavior,
    ValidationBehavior,
};
use mediator_core::services::{CurrentUser, StaticUser, SystemClock};
use mediator_core::validation::ValidationFailure;
use mediator_core::{
    Access, BindingRegistry, CancellationToken, Mediator, MediatorError, Notification, Request,
};

#[derive(Debug, Clone)]
struct TodoItem {
    id: u64,
    title: String,
}

#[derive(Default)]
struct TodoStore {
    items: Mutex<BTreeMap<u64, TodoItem>>,
    next_id: AtomicU64,
}

#[derive(Debug)]
struct CreateTodoItem {
    title: String,
}

impl Request for CreateTodoItem {
    type Response = u64;

    fn access(&self) -> Access {
        Access::Authenticated
    }
}

#[derive(Debug)]
struct DeleteTodoItem {
    id: u64,
}

impl Request for DeleteTodoItem {
    type Response = ();

    fn access(&self) -> Access {
        Access::AnyRole(&["Administrator"])
    }
}

#[derive(Debug)]
struct ListTodoItems;

impl Request for ListTodoItems {
    type Response = Vec<String>;
}

#[derive(Debug)]
struct TodoItemCreated {
    id: u64,
}

impl Notification for TodoItemCreated {}

fn todo_module(store: Arc<TodoStore>) -> impl Fn(&mut BindingRegistry) -> mediator_core::Result<()> {
    move |registry: &mut BindingRegistry| {
        let create = store.clone();
        registry.register_handler_fn(move |req: &CreateTodoItem, _cancel| {
            let store = create.clone();
            let title = req.title.clone();
            async move {
                let id = store.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                store.items.lock().await.insert(id, TodoItem { id, title });
                Ok(id)
            }
        })?;

        let delete = store.clone();
        registry.register_handler_fn(move |req: &DeleteTodoItem, _cancel| {
            let store = delete.clone();
            let id = req.id;
            async move {
                match store.items.lock().await.remove(&id) {
                    Some(_) => Ok(()),
                    None => Err(MediatorError::entity_not_found("TodoItem", id)),
                }
            }
        })?;

        let list = store.clone();
        registry.register_handler_fn(move |_: &ListTodoItems, _cancel| {
            let store = list.clone();
            async move {
                Ok(store
                    .items
                    .lock()
                    .await
                    .values()
                    .map(|item| format!("#{} {}", item.id, item.title))
                    .collect())
            }
        })?;

        registry.register_notification_fn(|event: &TodoItemCreated, _cancel| {
            tracing::info!("todo item {} created", event.id);
            async { Ok(()) }
        });
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let store = Arc::new(TodoStore::default());
    let user: Arc<dyn CurrentUser> = Arc::new(StaticUser::new("demo"));
    let clock = Arc::new(SystemClock);

    let validation = ValidationBehavior::new().rules(|req: &CreateTodoItem| {
        let mut failures = Vec::new();
        if req.title.trim().is_empty() {
            failures.push(ValidationFailure::new("title", "Title is required."));
        }
        if req.title.len() > 200 {
            failures.push(ValidationFailure::new(
                "title",
                "Title cannot exceed 200 characters",
            ));
        }
        failures
    });

    let mediator = Mediator::builder()
        .behavior(LoggingBehavior::new(user.clone(), clock.clone()))
        .behavior(UnhandledErrorBehavior)
        .behavior(AuthorizationBehavior::new(user.clone()))
        .behavior(validation)
        .behavior(
            PerformanceBehavior::new(user, clock).slow_request_threshold(Duration::from_millis(100)),
        )
        .module(todo_module(store))
        .build()?;

    println!("{}", mediator.schema().to_json()?);

    let cancel = CancellationToken::new();

    for title in ["Buy milk", "Walk the dog"] {
        let id = mediator
            .send(CreateTodoItem { title: title.into() }, &cancel)
            .await?;
        mediator.publish(TodoItemCreated { id }, &cancel).await?;
    }

    if let Err(e) = mediator
        .send(CreateTodoItem { title: " ".into() }, &cancel)
        .await
    {
        println!("rejected: {e}");
        if let Some(errors) = e.validation_errors() {
            println!("{}", serde_json::to_string(errors)?);
        }
    }

    match mediator.send(DeleteTodoItem { id: 1 }, &cancel).await {
        Err(MediatorError::Forbidden) => println!("delete needs the Administrator role"),
        other => println!("unexpected delete result: {other:?}"),
    }

    for line in mediator.send(ListTodoItems, &cancel).await? {
        println!("{line}");
    }

    Ok(())
}
