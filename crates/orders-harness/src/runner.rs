//! Serial case runner with start/end markers around every case.

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic;
use std::pin::Pin;
use std::process::ExitCode;

use crate::fixtures::TestSession;

type CaseFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
type CaseFn = Box<dyn FnOnce(TestSession) -> CaseFuture + Send>;

/// `Failed` is a broken assertion; `Errored` is anything that stopped the
/// case before its assertions could decide, such as a transport failure or
/// a fixture that could not be set up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed(String),
    Errored(String),
}

/// Panic payload marking a case as errored rather than failed.
#[derive(Debug)]
pub struct CaseError(pub String);

/// Aborts the current case as errored.
pub fn raise_error(msg: impl Into<String>) -> ! {
    panic::panic_any(CaseError(msg.into()))
}

/// Unwraps a result, erroring the case on `Err`.
pub trait OrErrored<T> {
    fn or_errored(self) -> T;
}

impl<T, E: Display> OrErrored<T> for Result<T, E> {
    fn or_errored(self) -> T {
        self.unwrap_or_else(|e| raise_error(e.to_string()))
    }
}

fn marker(kind: &str, name: &str) -> String {
    let bar = "=".repeat(20);
    format!("{bar} TEST {kind}: {name} {bar}")
}

/// Logs the start marker on creation and the end marker on drop.
struct CaseScope<'a> {
    name: &'a str,
}

impl<'a> CaseScope<'a> {
    fn enter(name: &'a str) -> Self {
        tracing::info!("\n{}", marker("START", name));
        Self { name }
    }
}

impl Drop for CaseScope<'_> {
    fn drop(&mut self) {
        tracing::info!("{}", marker("END", self.name));
    }
}

// Prefix std uses when `unwrap` hits an `Err`: an unexpected error, not an
// assertion.
const UNWRAP_ERR_PREFIX: &str = "called `Result::unwrap()` on an `Err` value";

fn classify_panic(payload: Box<dyn Any + Send>) -> Outcome {
    if let Some(CaseError(msg)) = payload.downcast_ref::<CaseError>() {
        return Outcome::Errored(msg.clone());
    }
    let msg = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "test panicked".to_string()
    };
    if msg.starts_with(UNWRAP_ERR_PREFIX) {
        Outcome::Errored(msg)
    } else {
        Outcome::Failed(msg)
    }
}

/// Runs one case body on its own task, so a panic fails the case without
/// tearing down the runner.
pub async fn run_case<Fut>(name: &str, body: Fut) -> Outcome
where
    Fut: Future<Output = ()> + Send + 'static,
{
    let _scope = CaseScope::enter(name);
    match tokio::spawn(body).await {
        Ok(()) => Outcome::Passed,
        Err(err) if err.is_panic() => classify_panic(err.into_panic()),
        Err(err) => Outcome::Errored(err.to_string()),
    }
}

struct Case {
    name: String,
    tags: Vec<&'static str>,
    run: CaseFn,
}

impl Case {
    fn matches(&self, filter: &str) -> bool {
        self.name.contains(filter) || self.tags.iter().any(|t| *t == filter)
    }
}

/// Ordered list of named cases, run one at a time against a shared session.
#[derive(Default)]
pub struct Suite {
    cases: Vec<Case>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case<F, Fut>(mut self, name: impl Into<String>, tags: &[&'static str], f: F) -> Self
    where
        F: FnOnce(TestSession) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cases.push(Case {
            name: name.into(),
            tags: tags.to_vec(),
            run: Box::new(move |session| -> CaseFuture { Box::pin(f(session)) }),
        });
        self
    }

    /// One case per parameter, named `name[param]`.
    pub fn parametrized<P, I, F, Fut>(
        mut self,
        name: &str,
        tags: &[&'static str],
        params: I,
        f: F,
    ) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Display + Send + 'static,
        F: Fn(TestSession, P) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        for param in params {
            let case_name = format!("{name}[{param}]");
            let f = f.clone();
            self = self.case(case_name, tags, move |session| f(session, param));
        }
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.cases.iter().map(|c| c.name.as_str()).collect()
    }

    /// Runs every case matching `filter` (a name substring or a tag).
    pub async fn run(self, session: &TestSession, filter: Option<&str>) -> Report {
        let mut report = Report::default();
        for case in self.cases {
            if let Some(filter) = filter {
                if !case.matches(filter) {
                    report.skipped += 1;
                    continue;
                }
            }
            let outcome = run_case(&case.name, (case.run)(session.clone())).await;
            match outcome {
                Outcome::Passed => {
                    tracing::info!("{} ... ok", case.name);
                    report.passed.push(case.name);
                }
                Outcome::Failed(msg) => {
                    tracing::error!("{} ... FAILED: {msg}", case.name);
                    report.failed.push((case.name, msg));
                }
                Outcome::Errored(msg) => {
                    tracing::error!("{} ... ERROR: {msg}", case.name);
                    report.errored.push((case.name, msg));
                }
            }
        }
        report
    }
}

/// First positional CLI argument, libtest-style.
pub fn filter_from_args(args: impl IntoIterator<Item = String>) -> Option<String> {
    args.into_iter().skip(1).find(|a| !a.starts_with('-'))
}

#[derive(Debug, Default)]
pub struct Report {
    pub passed: Vec<String>,
    pub failed: Vec<(String, String)>,
    pub errored: Vec<(String, String)>,
    pub skipped: usize,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.errored.is_empty()
    }

    pub fn log_summary(&self) {
        for (name, msg) in &self.failed {
            tracing::error!("failed: {name}: {msg}");
        }
        for (name, msg) in &self.errored {
            tracing::error!("error: {name}: {msg}");
        }
        let result = if self.is_success() { "ok" } else { "FAILED" };
        tracing::info!(
            "test result: {result}. {} passed; {} failed; {} errors; {} filtered out",
            self.passed.len(),
            self.failed.len(),
            self.errored.len(),
            self.skipped
        );
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}
