//! Calculator demo: factory wiring plus field injection
//!
//! Each calculator gets its adder from its factory, and its `Log` through
//! `#[inject("Log")]`. `NotCalculator` asks for a service that is not an
//! adder and fails with a type mismatch instead of panicking.
//!
//! ```bash
//! cargo run --example calculator
//! RUST_LOG=service_manager=trace cargo run --example calculator --features logging-pretty
//! ```

use service_manager::{BoxError, Constructed, Factory, Inject, Result, ServiceManager};
use std::collections::HashMap;
use std::sync::Arc;

const LOG_SERVICE: &str = "Log";
const CONFIG_SERVICE: &str = "Config";

trait Adder: Send + Sync {
    fn add(&self, a: i64, b: i64) -> i64;
}

struct SimpleAdder;

impl Adder for SimpleAdder {
    fn add(&self, a: i64, b: i64) -> i64 {
        a + b
    }
}

struct HalfAdder;

impl Adder for HalfAdder {
    fn add(&self, a: i64, b: i64) -> i64 {
        (a + b) / 2
    }
}

struct NotAdder;

/// Prefixing line logger built from `Config`
struct Log {
    prefix: String,
}

impl Log {
    fn println(&self, line: impl std::fmt::Display) {
        println!("{}{}", self.prefix, line);
    }
}

#[derive(Inject)]
struct Calculator {
    adder: Arc<dyn Adder>,
    #[inject("Log")]
    log: Option<Arc<Log>>,
}

impl Calculator {
    fn new(adder: Arc<dyn Adder>) -> Self {
        Self { adder, log: None }
    }

    fn add(&self, a: i64, b: i64) -> i64 {
        let answer = self.adder.add(a, b);
        if let Some(log) = &self.log {
            log.println(format!("{a} + {b} = {answer}"));
        }
        answer
    }
}

fn publish(adder: impl Adder + 'static) -> Constructed {
    let adder: Arc<dyn Adder> = Arc::new(adder);
    Constructed::shared(adder)
}

fn calculator_over(name: &'static str) -> Factory {
    Factory::callback(move |locator| {
        let adder = locator.get_shared::<dyn Adder>(name)?;
        Ok(Constructed::injectable(Calculator::new(adder)))
    })
}

fn register(manager: &ServiceManager) -> Result<()> {
    manager.set("SimpleAdder", |_| Ok(publish(SimpleAdder)))?;
    manager.set("HalfAdder", |_| Ok(publish(HalfAdder)))?;
    manager.set("NotAdder", |_| Ok(Constructed::new(NotAdder)))?;

    manager.register("Calculator", calculator_over("SimpleAdder"))?;
    manager.register("HalfCalculator", calculator_over("HalfAdder"))?;
    manager.register("NotCalculator", calculator_over("NotAdder"))?;

    manager.set(CONFIG_SERVICE, |_| {
        let config: HashMap<&'static str, String> = HashMap::from([("log.prefix", "example: ".to_owned())]);
        Ok(Constructed::new(config))
    })?;

    manager.set(LOG_SERVICE, |locator| {
        let config = locator.get::<HashMap<&'static str, String>>(CONFIG_SERVICE)?;
        let prefix = config.get("log.prefix").cloned().unwrap_or_default();
        Ok(Constructed::new(Log { prefix }))
    })?;

    Ok(())
}

fn check(expected: i64, got: i64) -> std::result::Result<(), BoxError> {
    if expected == got {
        Ok(())
    } else {
        Err(format!("Expected: {expected}, Got: {got}").into())
    }
}

fn main() -> std::result::Result<(), BoxError> {
    #[cfg(feature = "logging")]
    service_manager::logging::init();

    let manager = ServiceManager::new();
    register(&manager)?;
    manager.lock();

    let log = manager.get::<Log>(LOG_SERVICE)?;

    // Should fail: NotAdder is not an Adder
    if let Err(err) = manager.get::<Calculator>("NotCalculator") {
        log.println(err);
    }

    let calc = manager.get::<Calculator>("Calculator")?;
    check(2, calc.add(1, 1))?;

    let halfy = manager.get::<Calculator>("HalfCalculator")?;
    check(1, halfy.add(1, 1))?;

    // Both calculators share the one Log instance
    let same_log = calc.log.as_ref().is_some_and(|l| Arc::ptr_eq(l, &log));
    log.println(format!("calculators share the log service: {same_log}"));
    log.println(format!("registered: {:?}", manager.registered_names()));

    Ok(())
}
