//! Failure conditions of the resolution pipeline.
//!
//! Nothing here ever crosses the public query surface as a panic: the
//! resolver formats these into the descriptive parenthesized strings it
//! returns, so `Display` text below *is* the user-facing message.

use thiserror::Error;

use crate::codec::CodecError;
use crate::scope::ValueKind;

#[derive(Error, Debug)]
pub enum ResolveError {
    /// Symbol extraction was requested for something that is not a callable,
    /// or the callable's text did not parse.
    #[error("(closure must be a typeof function)")]
    NotAFunction,

    /// A decoded call frame did not resolve to a callable through the
    /// supplied environment lookup. Registration aborts on the first one.
    #[error("(mandox can only parse closures; `{path}` did not resolve to one)")]
    UnresolvableFrame { path: String },

    /// The target value aliases too freely to identify by reference.
    #[error("(mandox cannot resolve symbols for {kind})")]
    TooPrimitive { kind: ValueKind },

    /// Resolving a value from a textual hint is an explicit non-goal.
    #[error("(resolving symbols by name is not implemented)")]
    NotImplemented,

    /// Every candidate identifier in every known context failed to match.
    #[error("(cannot resolve symbol)")]
    NoSymbolFound,

    /// A match was found but no comment precedes its declaration.
    #[error("(no doc found for symbol)")]
    NoDocFound,

    /// An encoded frame token failed to decode. Unreachable for frames the
    /// decoder itself produced, but propagated rather than panicked on.
    #[error("(malformed frame token: {0})")]
    Codec(#[from] CodecError),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
