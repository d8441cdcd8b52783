//! # tabfsm-core
//!
//! Transition table compiler and dispatch engine for tabfsm.
//!
//! This crate provides:
//! - Transition table parsing and validation
//! - Rule compilation (literal, pattern and wildcard matchers)
//! - Notification naming
//! - Dispatch and machine instances with synchronous listeners
//! - Debug rendering of the compiled dispatch logic
//!
//! ```
//! use tabfsm_core::{CompileOptions, CompiledTable, TransitionTable};
//!
//! let table = TransitionTable::new()
//!     .state("locked", [("coin", "unlocked"), ("push", "locked")])
//!     .state("unlocked", [("push", "locked"), ("coin", "unlocked")]);
//! let compiled = CompiledTable::compile(&table, CompileOptions::default()).unwrap();
//!
//! let mut turnstile = compiled.machine();
//! turnstile.on("enteringUnlocked", |n| println!("{} {:?}", n.name, n.args()));
//! assert_eq!(turnstile.transition("coin"), "unlocked");
//! ```

pub mod compiler;
pub mod dispatch;
pub mod error;
pub mod listeners;
pub mod machine;
pub mod matcher;
pub mod naming;
pub mod render;
pub mod table;

pub use compiler::{CompileOptions, CompiledState, CompiledTable, Rule};
pub use dispatch::{dispatch, Step};
pub use error::CoreError;
pub use listeners::{ListenerId, Listeners};
pub use machine::Machine;
pub use matcher::{Matcher, MatcherKind};
pub use naming::{Capitalization, Notification, Signal};
pub use render::TableDescription;
pub use table::{RuleEntry, StateEntry, TableFormat, TransitionTable};
