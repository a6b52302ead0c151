//! Deferred, rule-guarded units of work.

use std::future::Future;
use std::time::Instant;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::error::ServiceError;
use crate::rule::{RuleEngine, RuleSet};

type Executor<'a, T> = Box<dyn FnOnce() -> BoxFuture<'a, Result<T, ServiceError>> + Send + 'a>;
type RuleProvider<'a> = Box<dyn FnOnce() -> BoxFuture<'a, Result<RuleSet, ServiceError>> + Send + 'a>;

/// A deferred unit of work with an optional rule guard.
///
/// Building a command does nothing. [`execute`](Command::execute) first asks
/// the rule provider (if any) for its rules, runs them through the
/// [`RuleEngine`], and only then runs the executor. A violation is returned as
/// [`ServiceError::Validation`] without the executor ever starting.
///
/// There is a single asynchronous executor. [`execute_blocking`](Command::execute_blocking)
/// drives that same executor to completion on the caller's thread, so both
/// forms share preconditions and outcomes.
#[must_use = "commands do nothing until executed"]
pub struct Command<'a, T> {
    name: &'static str,
    executor: Executor<'a, T>,
    rules: Option<RuleProvider<'a>>,
}

impl<'a, T: Send + 'a> Command<'a, T> {
    /// Creates an unguarded command.
    pub fn new<F, Fut>(name: &'static str, executor: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, ServiceError>> + Send + 'a,
    {
        Self {
            name,
            executor: Box::new(move || executor().boxed()),
            rules: None,
        }
    }

    /// Guards the command with rules built at execution time.
    ///
    /// The provider may read reference data; it runs once per execution,
    /// before any rule is evaluated.
    pub fn with_rules<F, Fut>(mut self, provider: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = Result<RuleSet, ServiceError>> + Send + 'a,
    {
        self.rules = Some(Box::new(move || provider().boxed()));
        self
    }

    /// Returns the command name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if the command has a rule provider.
    pub fn is_guarded(&self) -> bool {
        self.rules.is_some()
    }

    /// Validates, then executes the command.
    ///
    /// Suspends only inside the rule provider and the executor.
    pub async fn execute(self) -> Result<T, ServiceError> {
        let Command {
            name,
            executor,
            rules,
        } = self;
        let started = Instant::now();
        tracing::debug!(command = name, "executing command");

        let result = Self::run(executor, rules).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(ServiceError::Validation(violation)) => {
                tracing::debug!(command = name, kind = violation.kind(), "command rejected");
                "rejected"
            }
            Err(err) => {
                tracing::debug!(command = name, error = %err, "command failed");
                "error"
            }
        };
        metrics::counter!("commands_executed_total", "command" => name, "outcome" => outcome)
            .increment(1);
        metrics::histogram!("command_duration_seconds", "command" => name)
            .record(started.elapsed().as_secs_f64());

        result
    }

    /// Executes the command, blocking the current thread until it finishes.
    ///
    /// Runs the executor on a private current-thread runtime. Called from
    /// inside an async context it does nothing and returns
    /// [`ServiceError::BlockingInRuntime`].
    pub fn execute_blocking(self) -> Result<T, ServiceError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(ServiceError::BlockingInRuntime(self.name));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.execute())
    }

    async fn run(
        executor: Executor<'a, T>,
        rules: Option<RuleProvider<'a>>,
    ) -> Result<T, ServiceError> {
        if let Some(provider) = rules {
            let rules = provider().await?;
            RuleEngine::evaluate(&rules)?;
        }
        executor().await
    }
}
