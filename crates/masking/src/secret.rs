//!
//! Structure describing secret.
//!

use std::{fmt, marker::PhantomData};

use zeroize::Zeroize;

use crate::{strategy::Strategy, PeekInterface};

///
/// Secret value, masked in `Debug` output according to the strategy `I`.
///
/// Read it with [`crate::PeekInterface::peek`]. The inner value is zeroized when the secret is
/// dropped.
///
/// ```
/// use masking::{PeekInterface, Secret};
///
/// let key: Secret<String> = Secret::new("merchant-key".to_string());
///
/// assert_eq!(key.peek(), "merchant-key");
/// assert_eq!(format!("{key:?}"), "*** alloc::string::String ***");
/// ```
pub struct Secret<S, I = crate::WithType>
where
    I: Strategy<S>,
    S: Zeroize,
{
    pub(crate) inner_secret: S,
    pub(crate) marker: PhantomData<I>,
}

impl<S, I> Secret<S, I>
where
    I: Strategy<S>,
    S: Zeroize,
{
    /// Take ownership of a secret value
    pub fn new(secret: S) -> Self {
        Self {
            inner_secret: secret,
            marker: PhantomData,
        }
    }
}

impl<S, I> From<S> for Secret<S, I>
where
    I: Strategy<S>,
    S: Zeroize,
{
    fn from(secret: S) -> Self {
        Self::new(secret)
    }
}

impl<S, I> Clone for Secret<S, I>
where
    S: Clone + Zeroize,
    I: Strategy<S>,
{
    fn clone(&self) -> Self {
        Self::new(self.inner_secret.clone())
    }
}

impl<S, I> PartialEq for Secret<S, I>
where
    S: PartialEq + Zeroize,
    I: Strategy<S>,
{
    fn eq(&self, other: &Self) -> bool {
        self.peek().eq(other.peek())
    }
}

impl<S, I> Eq for Secret<S, I>
where
    S: Eq + Zeroize,
    I: Strategy<S>,
{
}

impl<S, I> fmt::Debug for Secret<S, I>
where
    I: Strategy<S>,
    S: Zeroize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        I::fmt(&self.inner_secret, f)
    }
}

impl<S, I> Default for Secret<S, I>
where
    S: Default + Zeroize,
    I: Strategy<S>,
{
    fn default() -> Self {
        S::default().into()
    }
}

impl<S, I> Drop for Secret<S, I>
where
    I: Strategy<S>,
    S: Zeroize,
{
    fn drop(&mut self) {
        self.inner_secret.zeroize();
    }
}
