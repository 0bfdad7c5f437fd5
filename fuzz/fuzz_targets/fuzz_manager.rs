#![no_main]

//! Fuzz target for registration, resolution and cycle detection
//!
//! Builds arbitrary dependency graphs over a small set of names (cycles
//! included) and checks the manager's guarantees after every operation.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use service_manager::{Constructed, Inject, Instance, ServiceError, ServiceManager, Slot};
use std::collections::HashMap;
use std::sync::Arc;

const NAMES: [&str; 6] = ["S0", "S1", "S2", "S3", "S4", "S5"];

fn name(index: u8) -> &'static str {
    NAMES[index as usize % NAMES.len()]
}

/// Filled from "S0" after construction
#[allow(dead_code)]
#[derive(Default, Inject)]
struct Node {
    #[inject("S0")]
    first: Option<Arc<u32>>,
}

/// What a registered factory does
#[derive(Debug, Clone, Copy, Arbitrary)]
enum Kind {
    Value(u32),
    DependsOn(u8),
    Fails,
    Injectable,
}

#[derive(Debug, Arbitrary)]
enum ManagerOp {
    Register(u8, Kind),
    Resolve(u8),
    Has(u8),
    Slot(u8),
    Lock,
    Len,
}

fuzz_target!(|ops: Vec<ManagerOp>| {
    let manager = ServiceManager::new();

    // Model of what should be registered and what resolved
    let mut registered: HashMap<&'static str, Kind> = HashMap::new();
    let mut resolved: HashMap<&'static str, Instance> = HashMap::new();

    for op in ops {
        match op {
            ManagerOp::Register(index, kind) => {
                let target = name(index);
                let result = match kind {
                    Kind::Value(v) => manager.set(target, move |_| Ok(Constructed::new(v))),
                    Kind::DependsOn(dep) => manager.set(target, move |locator| {
                        let dep = locator.get::<u32>(name(dep))?;
                        Ok(Constructed::new(*dep))
                    }),
                    Kind::Fails => manager.set(target, |_| Err("refused".into())),
                    Kind::Injectable => manager.set(target, |_| Ok(Constructed::injectable(Node::default()))),
                };

                match result {
                    Ok(()) => {
                        assert!(!manager.is_locked());
                        assert!(registered.insert(target, kind).is_none());
                    }
                    Err(ServiceError::Locked { .. }) => assert!(manager.is_locked()),
                    Err(ServiceError::AlreadyRegistered { .. }) => assert!(registered.contains_key(target)),
                    Err(other) => panic!("unexpected registration error: {other}"),
                }
            }
            ManagerOp::Resolve(index) => {
                let target = name(index);
                match manager.resolve(target) {
                    Ok(instance) => {
                        assert!(registered.contains_key(target));
                        if let Some(previous) = resolved.get(target) {
                            assert!(Instance::ptr_eq(previous, &instance));
                        }
                        resolved.insert(target, instance);
                    }
                    Err(ServiceError::NotFound { name }) if name == target => {
                        assert!(!registered.contains_key(target));
                    }
                    Err(_) => {
                        assert!(registered.contains_key(target));
                        assert!(!resolved.contains_key(target));
                        assert!(!manager.is_resolved(target));
                    }
                }
                // Nothing is left marked in progress between calls
                assert!(!matches!(manager.slot(target), Slot::InProgress));
            }
            ManagerOp::Has(index) => {
                let target = name(index);
                assert_eq!(manager.has(target), registered.contains_key(target));
            }
            ManagerOp::Slot(index) => {
                let target = name(index);
                match manager.slot(target) {
                    Slot::Resolved(instance) => {
                        let previous = resolved.get(target);
                        assert!(previous.is_none_or(|p| Instance::ptr_eq(p, &instance)));
                    }
                    Slot::Absent => assert!(!resolved.contains_key(target)),
                    Slot::InProgress => panic!("{target} left in progress"),
                }
            }
            ManagerOp::Lock => manager.lock(),
            ManagerOp::Len => {
                assert_eq!(manager.len(), registered.len());
                assert_eq!(manager.registered_names().len(), registered.len());
            }
        }
    }
});
