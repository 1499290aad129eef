use std::borrow::Cow;
use std::path::{Path, PathBuf};

use url::Url;

/// A namespace identifier: anything with a stable, deterministic string
/// form. The registry digests this form to name the namespace's domain.
pub trait Unique {
    fn unique_id(&self) -> Cow<'_, str>;
}

impl Unique for str {
    fn unique_id(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Unique for String {
    fn unique_id(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Unique for Path {
    fn unique_id(&self) -> Cow<'_, str> {
        self.to_string_lossy()
    }
}

impl Unique for PathBuf {
    fn unique_id(&self) -> Cow<'_, str> {
        self.as_path().unique_id()
    }
}

impl Unique for Url {
    fn unique_id(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl<T: Unique + ?Sized> Unique for &T {
    fn unique_id(&self) -> Cow<'_, str> {
        (**self).unique_id()
    }
}
