//! Forward declaration for mutually recursive parsers.

use crate::context::Context;
use crate::result::ParseResult;
use crate::stream::Stream;
use crate::Parser;
use std::cell::OnceCell;
use std::rc::{Rc, Weak};

/*========================================*/
/*          Parser: Recursion             */
/*========================================*/

/// Used to define recursive parsers.
///
/// The key is that you can [`Recursive::refn`] it before you
/// [`Recursive::define`] it. For deferred construction without a shared
/// binding, see [`crate::lazy`].
pub struct Recursive<S: Stream, T>(Rc<RecurP<S, T>>);

impl<S: Stream + 'static, T: 'static> Recursive<S, T> {
    /// Declare a new recursive parser. **You must [`Recursive::define`] it
    /// later!**
    ///
    /// # Panics
    ///
    /// References to the recursive parser panic if run before it has been
    /// `define`d.
    pub fn new(name: &str) -> Recursive<S, T> {
        Recursive(Rc::new(RecurP {
            name: name.to_owned(),
            parser: OnceCell::new(),
        }))
    }

    /// Construct a reference to this recursive parser. Importantly, you may
    /// use this reference _before_ `define`ing the parser.
    pub fn refn(&self) -> impl Parser<S, T> + Clone {
        RecurPWeak {
            name: self.0.name.clone(),
            weak: Rc::downgrade(&self.0),
        }
    }

    /// Define this recursive parser to be equal to `parser`. `parser` may
    /// make use of [`Recursive::refn`]s inside of itself (and indeed it
    /// ought to; otherwise there was no need to use `Recursive`).
    pub fn define(self, parser: impl Parser<S, T> + Clone + 'static) -> impl Parser<S, T> + Clone {
        match self.0.parser.set(Box::new(parser)) {
            Ok(()) => (),
            Err(_) => panic!("Bug in Recursive: failed to set OnceCell"),
        }
        RecurPStrong(self.0)
    }
}

struct RecurP<S: Stream, T> {
    name: String,
    parser: OnceCell<Box<dyn Parser<S, T>>>,
}

impl<S: Stream, T> RecurP<S, T> {
    fn get(&self) -> &dyn Parser<S, T> {
        match self.parser.get() {
            Some(parser) => parser.as_ref(),
            None => panic!(
                "Recursive: you must call 'define()' before using recursive parser '{}'",
                self.name
            ),
        }
    }
}

impl<S: Stream, T> Parser<S, T> for RecurP<S, T> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        self.get().parse_with(stream, ctx)
    }
}

impl<S: Stream, T> Clone for RecurP<S, T> {
    fn clone(&self) -> RecurP<S, T> {
        RecurP {
            name: self.name.clone(),
            parser: self.parser.clone(),
        }
    }
}

/* ========== Recur: Weak ========== */

/// Private. The type returned by `Recursive.refn()`.
/// This is a _weak_ pointer so that if the outer `RecurPStrong` pointer is
/// dropped, the RecurP can be dropped. I.e., these are the self-references.
struct RecurPWeak<S: Stream, T> {
    name: String,
    weak: Weak<RecurP<S, T>>,
}

impl<S: Stream, T> Clone for RecurPWeak<S, T> {
    fn clone(&self) -> Self {
        RecurPWeak {
            name: self.name.clone(),
            weak: self.weak.clone(),
        }
    }
}

impl<S: Stream, T> RecurPWeak<S, T> {
    fn unwrap<R>(&self, cb: impl FnOnce(&RecurP<S, T>) -> R) -> R {
        match self.weak.upgrade() {
            None => panic!(
                "Recursive: you must call 'define()' before using recursive parser '{}'",
                self.name
            ),
            Some(rc) => cb(rc.as_ref()),
        }
    }
}

impl<S: Stream + 'static, T: 'static> Parser<S, T> for RecurPWeak<S, T> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        self.unwrap(|p| p.run(stream, ctx))
    }
}

/* ========== Recur: Strong ========== */

/// Private. The type returned by `Recursive.define()`.
/// Once the Recursive has been defined, this is the unique strong pointer
/// to its RecurP.
struct RecurPStrong<S: Stream, T>(Rc<RecurP<S, T>>);

impl<S: Stream, T> Clone for RecurPStrong<S, T> {
    fn clone(&self) -> Self {
        RecurPStrong(self.0.clone())
    }
}

impl<S: Stream + 'static, T: 'static> Parser<S, T> for RecurPStrong<S, T> {
    fn name(&self) -> String {
        self.0.as_ref().name()
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        self.0.as_ref().run(stream, ctx)
    }
}
