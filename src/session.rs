//! Scoped "set up, run, always restore" sessions.

use core::fmt::Debug;

use crate::error::Result;

/// Runs the restore step if dropped while still armed, i.e. while unwinding out of a body.
struct RestoreOnDrop<C, E>
where
    C: FnOnce() -> Result<(), E>,
    E: Debug,
{
    restore: Option<C>,
    _error: core::marker::PhantomData<E>,
}

impl<C, E> Drop for RestoreOnDrop<C, E>
where
    C: FnOnce() -> Result<(), E>,
    E: Debug,
{
    fn drop(&mut self) {
        if let Some(restore) = self.restore.take() {
            if let Err(err) = restore() {
                log::warn!("restore after unwind failed: {err:?}");
            }
        }
    }
}

/// Run `body`, then run `restore` exactly once on every exit path.
///
/// An error from `body` is returned unmodified even if `restore` fails as well. A restore error is
/// only surfaced when `body` itself succeeded.
pub(crate) fn scoped<R, E, B, C>(body: B, restore: C) -> Result<R, E>
where
    B: FnOnce() -> Result<R, E>,
    C: FnOnce() -> Result<(), E>,
    E: Debug,
{
    let mut guard = RestoreOnDrop {
        restore: Some(restore),
        _error: core::marker::PhantomData,
    };
    let result = body();
    let restored = match guard.restore.take() {
        Some(restore) => restore(),
        None => Ok(()),
    };
    match (result, restored) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(restore_err)) => {
            log::warn!("restore failed while propagating {err:?}: {restore_err:?}");
            Err(err)
        }
    }
}
