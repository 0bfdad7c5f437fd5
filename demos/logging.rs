//! Example demonstrating logging capabilities
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```

use service_manager::{Constructed, ServiceManager};

// Example services
#[allow(dead_code)]
struct Database {
    url: String,
}

#[allow(dead_code)]
struct UserService {
    db: std::sync::Arc<Database>,
}

fn main() {
    // Every lookup and construction, this crate only
    service_manager::logging::init_registry_only();

    println!("=== Service Manager Logging Demo ===\n");

    // Create manager (logs: "Creating new service manager")
    let manager = ServiceManager::new();

    // Register services (logs: "Registered service factory")
    manager
        .set("Database", |_| {
            println!("  [App] Database being created...");
            Ok(Constructed::new(Database {
                url: "postgres://localhost/mydb".into(),
            }))
        })
        .unwrap();

    manager
        .set("Users", |locator| {
            let db = locator.get::<Database>("Database")?;
            Ok(Constructed::new(UserService { db }))
        })
        .unwrap();

    // A service that depends on itself (logs: "Circular dependency detected")
    manager
        .set("Loop", |locator| {
            locator.resolve("Loop")?;
            Ok(Constructed::new(()))
        })
        .unwrap();

    // Duplicate registration (logs: "Service already registered")
    let _ = manager.set("Database", |_| Ok(Constructed::new(())));

    // First resolve constructs (logs: "Constructing service", "Service resolved and cached")
    let _users = manager.get::<UserService>("Users").unwrap();

    // Second resolve hits the cache (logs: "Returning cached instance")
    let _db = manager.get::<Database>("Database").unwrap();

    // Missing service (logs: "Service not found")
    assert!(manager.try_get::<i32>("Missing").is_none());

    // Cycle is reported, not hung on
    let err = manager.resolve("Loop").unwrap_err();
    println!("  [App] Loop failed as expected: {err}");

    // Lock the manager (logs: "Service manager locked")
    manager.lock();
    assert!(manager.set("Late", |_| Ok(Constructed::new(()))).is_err());

    println!("\n=== Demo Complete ===");
    println!("Check the log output above to see structured logging in action!");
    println!("\nTip: Use --features logging-json for production (JSON output)");
    println!("     Use --features logging-pretty for development (pretty output)");
}
