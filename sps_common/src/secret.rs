use std::fmt;

/// Holds a sensitive value, such as the payment provider access token, and redacts it everywhere it might be
/// formatted. Config structs derive `Debug` and get logged at startup; wrapping the credential here means a stray
/// `{:?}` can never leak it. The only way at the inner value is an explicit, greppable [`Secret::reveal`].
#[derive(Clone, Default)]
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Hands out the protected value. Call sites are the audit trail for where the credential is actually used.
    pub fn reveal(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> From<T> for Secret<T> {
    fn from(inner: T) -> Self {
        Self::new(inner)
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}
