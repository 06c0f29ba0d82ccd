//! The context registry and the public entry points.
//!
//! A [`Mandox`] value owns everything the original kept at module scope:
//! the pool of closures discovered on the stack but not parsed yet, the
//! identity roster of closures already parsed, and the list of contexts
//! searched in registration order. Dropping the value is disposal.

mod matcher;

use std::sync::Arc;

use crate::codec;
use crate::comment;
use crate::config::Settings;
use crate::error::{ResolveError, Result};
use crate::scope::{ResolutionScope, Value, ValueKind};
use crate::stack::{self, StackTraceProvider};
use crate::symbol::SymbolTable;

/// A closure discovered via a frame decode, queued for parsing.
struct PendingClosure {
    closure: Value,
    scope: Arc<dyn ResolutionScope>,
    namespace: Option<String>,
    frame: String,
}

/// A parsed closure: its symbol table, the lookup that resolves paths in
/// its scope, and the label it was registered under.
struct Context {
    table: SymbolTable,
    scope: Arc<dyn ResolutionScope>,
    namespace: Option<String>,
    frame: Option<String>,
}

pub struct Mandox {
    settings: Settings,
    stack: Arc<dyn StackTraceProvider>,
    unevaluated: Vec<PendingClosure>,
    evaluated: Vec<Value>,
    contexts: Vec<Context>,
}

impl Mandox {
    pub fn new(stack: Arc<dyn StackTraceProvider>) -> Self {
        Self::with_settings(stack, Settings::default())
    }

    pub fn with_settings(stack: Arc<dyn StackTraceProvider>, settings: Settings) -> Self {
        Self {
            settings,
            stack,
            unevaluated: Vec::new(),
            evaluated: Vec::new(),
            contexts: Vec::new(),
        }
    }

    /// Analyze the closures on the current call stack.
    ///
    /// Must be invoked as the direct caller of the public entry so the
    /// sentinel frame correctly delimits the frames that belong to this
    /// registration. Every decoded frame must resolve to a callable through
    /// `scope`; the first that does not aborts with
    /// [`ResolveError::UnresolvableFrame`]. Re-registration of a closure
    /// already known by identity is a no-op.
    pub fn register(
        &mut self,
        namespace: Option<&str>,
        scope: Arc<dyn ResolutionScope>,
    ) -> Result<()> {
        let lines = self.stack.capture();
        let frames = stack::frames_after_sentinel(&lines);
        tracing::debug!(
            "[resolver] registering {} frame(s) under {namespace:?}",
            frames.len()
        );
        for frame in frames {
            let path = codec::decode_path(&frame)?;
            match scope.resolve(&path) {
                Some(closure) if closure.is_function() => {
                    if !self.is_known(&closure) {
                        self.unevaluated.push(PendingClosure {
                            closure,
                            scope: Arc::clone(&scope),
                            namespace: namespace.map(str::to_string),
                            frame,
                        });
                    }
                }
                _ => return Err(ResolveError::UnresolvableFrame { path }),
            }
        }
        Ok(())
    }

    /// Resolve a live value back to its documentation.
    ///
    /// Always returns a display string; every failure surfaces as
    /// descriptive text rather than an error or panic.
    pub fn resolve_value(&mut self, value: &Value) -> String {
        match self.try_resolve(value) {
            Ok(text) => text,
            Err(err) => err.to_string(),
        }
    }

    /// Resolving from a textual hint is unsupported by design.
    pub fn resolve_by_name(&self, _name: &str) -> String {
        ResolveError::NotImplemented.to_string()
    }

    fn try_resolve(&mut self, value: &Value) -> Result<String> {
        match value.kind() {
            kind @ (ValueKind::Undefined
            | ValueKind::Null
            | ValueKind::Boolean
            | ValueKind::Number) => return Err(ResolveError::TooPrimitive { kind }),
            ValueKind::String => return Err(ResolveError::NotImplemented),
            ValueKind::Object | ValueKind::Function => {}
        }

        let (context_index, identifier_index) = self
            .find_identifier(value)
            .ok_or(ResolveError::NoSymbolFound)?;
        let context = &self.contexts[context_index];
        let identifier = &context.table.identifiers()[identifier_index];
        comment::documentation(
            identifier,
            context.table.comments(),
            context.namespace.as_deref(),
        )
        .ok_or(ResolveError::NoDocFound)
    }

    /// Search already-evaluated contexts first, then drain the unevaluated
    /// pool one closure at a time until a match is found or the pool is
    /// exhausted. Each drained closure becomes a context exactly once.
    fn find_identifier(&mut self, value: &Value) -> Option<(usize, usize)> {
        for (index, context) in self.contexts.iter().enumerate() {
            if let Some(found) = search_context(context, value) {
                return Some((index, found));
            }
        }
        while let Some(pending) = self.unevaluated.pop() {
            let table = match SymbolTable::parse(&pending.closure, self.settings.parse_depth) {
                Ok(table) => table,
                Err(err) => {
                    tracing::warn!("[resolver] skipping unparseable closure: {err}");
                    self.evaluated.push(pending.closure);
                    continue;
                }
            };
            tracing::debug!(
                "[resolver] evaluated closure with {} candidate(s)",
                table.identifiers().len()
            );
            self.evaluated.push(pending.closure);
            self.contexts.push(Context {
                table,
                scope: pending.scope,
                namespace: pending.namespace,
                frame: Some(pending.frame),
            });
            let index = self.contexts.len() - 1;
            if let Some(found) = search_context(&self.contexts[index], value) {
                return Some((index, found));
            }
        }
        None
    }

    fn is_known(&self, closure: &Value) -> bool {
        self.evaluated.iter().any(|known| known.same(closure))
            || self
                .unevaluated
                .iter()
                .any(|pending| pending.closure.same(closure))
    }

    /// Number of closures parsed so far (the evaluated pool).
    pub fn evaluated_count(&self) -> usize {
        self.evaluated.len()
    }
}

fn search_context(context: &Context, value: &Value) -> Option<usize> {
    matcher::search_symbols(
        value,
        &context.table,
        context.scope.as_ref(),
        context.frame.as_deref(),
    )
}
