//!
//! Access to the value behind a [`Secret`].
//!

use zeroize::Zeroize;

use crate::{Secret, Strategy};

/// Borrow the inner secret.
pub trait PeekInterface<S> {
    /// Only method providing access to the secret value by reference.
    fn peek(&self) -> &S;
}

impl<S, I> PeekInterface<S> for Secret<S, I>
where
    I: Strategy<S>,
    S: Zeroize,
{
    fn peek(&self) -> &S {
        &self.inner_secret
    }
}
