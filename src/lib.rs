//! Resolve live runtime values back to the identifiers that name them, and
//! retrieve the documentation comments attached to their declarations.
//!
//! The pipeline: capture the call stack, decode each frame into an
//! identifier path, resolve those paths into closures through an injected
//! environment lookup, statically extract every candidate identifier from
//! each closure's source, then re-resolve candidates until one is
//! *identical* to the target value. A hit hands its declaration line to the
//! comment locator.

pub mod codec;
pub mod comment;
pub mod config;
pub mod error;
pub mod logging;
pub mod parsing;
pub mod resolver;
pub mod scope;
pub mod stack;
pub mod symbol;
pub mod types;

pub use config::Settings;
pub use error::{ResolveError, Result};
pub use resolver::Mandox;
pub use scope::{ResolutionScope, TableScope, Value, ValueKind};
pub use stack::StackTraceProvider;
pub use symbol::{DocState, Identifier, SymbolTable};
pub use types::{SourceLocation, Span};
