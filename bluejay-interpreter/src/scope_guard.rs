//! RAII block scopes for the interpreter.
//!
//! [`BlockScope`] opens a block on creation and closes it on drop, so the
//! names a block declared are released even when a statement inside it fails
//! with `?` or panics. The guard holds `&mut Interpreter` and implements
//! `Deref`/`DerefMut`, so statements run through it exactly as they would on
//! the interpreter itself.
//!
//! ```text
//! {
//!     let mut scope = interpreter.scoped();
//!     scope.execute(statement)?;
//! } // exit_block runs here, even on error or panic
//! ```

use std::ops::{Deref, DerefMut};

use crate::interpreter::Interpreter;
use crate::output::Output;

/// Guard that keeps one block open for as long as it lives
pub struct BlockScope<'a, O: Output> {
    interpreter: &'a mut Interpreter<O>,
}

impl<O: Output> Drop for BlockScope<'_, O> {
    fn drop(&mut self) {
        self.interpreter.environment_mut().exit_block();
    }
}

impl<O: Output> Deref for BlockScope<'_, O> {
    type Target = Interpreter<O>;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl<O: Output> DerefMut for BlockScope<'_, O> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl<O: Output> Interpreter<O> {
    /// Open a block that is closed when the returned guard is dropped
    pub fn scoped(&mut self) -> BlockScope<'_, O> {
        self.environment_mut().enter_block();
        BlockScope { interpreter: self }
    }

    /// Run `f` inside a new block; the block is closed however `f` finishes
    pub fn with_block_scope<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut BlockScope<'_, O>) -> T,
    {
        let mut scope = self.scoped();
        f(&mut scope)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::RuntimeError;
    use crate::interpreter::Interpreter;
    use crate::value::Value;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[test]
    fn test_scope_closes_on_drop() {
        let mut interpreter = Interpreter::new(Vec::<u8>::new());
        {
            let mut scope = interpreter.scoped();
            assert_eq!(scope.environment().depth(), 1);
            scope
                .environment_mut()
                .declare_or_assign("inner", Value::Integer(1));
        }

        assert_eq!(interpreter.environment().depth(), 0);
        assert!(!interpreter.environment().is_bound("inner"));
    }

    #[test]
    fn test_scope_closes_on_error() {
        let mut interpreter = Interpreter::new(Vec::<u8>::new());
        let result: Result<(), RuntimeError> = interpreter.with_block_scope(|scope| {
            scope
                .environment_mut()
                .declare_or_assign("inner", Value::Integer(1));
            scope.environment().lookup("missing")?;
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(interpreter.environment().depth(), 0);
        assert!(!interpreter.environment().is_bound("inner"));
    }

    #[test]
    fn test_scope_closes_on_panic() {
        let mut interpreter = Interpreter::new(Vec::<u8>::new());

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            interpreter.with_block_scope(|scope| {
                scope.with_block_scope(|nested| {
                    nested
                        .environment_mut()
                        .declare_or_assign("doomed", Value::Nil);
                    if nested.environment().is_bound("doomed") {
                        panic!("boom");
                    }
                    nested.environment().depth()
                })
            })
        }));

        assert!(outcome.is_err());
        assert_eq!(interpreter.environment().depth(), 0);
        assert!(!interpreter.environment().is_bound("doomed"));
    }
}
