use crate::trace::TraceCollector;
use std::cell::RefCell;
use std::rc::Rc;

/// Runtime configuration carried through every parser invocation.
///
/// Stateless except for the optional trace collector. A fresh context may
/// be supplied per parse; [`crate::Parser::parse`] uses a default with
/// tracing disabled.
#[derive(Debug, Clone, Default)]
pub struct Context {
    trace: Option<Rc<RefCell<TraceCollector>>>,
}

impl Context {
    /// A context with tracing disabled.
    pub fn new() -> Context {
        Context { trace: None }
    }

    /// A context recording into `collector`. Keep a clone of the `Rc` to
    /// read the entries back after the parse.
    pub fn with_trace(collector: Rc<RefCell<TraceCollector>>) -> Context {
        Context {
            trace: Some(collector),
        }
    }

    pub fn trace(&self) -> Option<&Rc<RefCell<TraceCollector>>> {
        self.trace.as_ref()
    }
}
