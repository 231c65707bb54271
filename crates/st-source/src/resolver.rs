//! Display-name resolution.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use st_core::PackageId;

use crate::{NameResolver, SourceError};

/// Name resolver backed by a static package -> name table.
///
/// Unknown packages fall back to the package ID itself.
#[derive(Debug, Clone, Default)]
pub struct TableResolver {
    names: HashMap<String, String>,
}

impl TableResolver {
    /// Creates a resolver over an in-memory table.
    #[must_use]
    pub const fn new(names: HashMap<String, String>) -> Self {
        Self { names }
    }

    /// Loads the table from a JSON object file (`{"pkg": "Name", ...}`).
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let names = serde_json::from_str(&text).map_err(|source| SourceError::Json {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self { names })
    }
}

impl NameResolver for TableResolver {
    fn resolve(&self, package: &PackageId) -> String {
        self.names
            .get(package.as_str())
            .cloned()
            .unwrap_or_else(|| package.to_string())
    }
}

/// Memoizing wrapper: at most one inner lookup per package.
///
/// Resolution may be arbitrarily expensive on a real platform (a package
/// manager round trip per package), and the report builder asks once per
/// report line. The cache is interior so the wrapper still satisfies the
/// read-only [`NameResolver`] contract.
#[derive(Debug)]
pub struct MemoResolver<R> {
    inner: R,
    cache: RefCell<HashMap<PackageId, String>>,
}

impl<R: NameResolver> MemoResolver<R> {
    /// Wraps a resolver with a lookup cache.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }
}

impl<R: NameResolver> NameResolver for MemoResolver<R> {
    fn resolve(&self, package: &PackageId) -> String {
        if let Some(name) = self.cache.borrow().get(package) {
            return name.clone();
        }
        let name = self.inner.resolve(package);
        self.cache
            .borrow_mut()
            .insert(package.clone(), name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn pkg(id: &str) -> PackageId {
        PackageId::new(id).unwrap()
    }

    #[test]
    fn table_resolver_falls_back_to_package_id() {
        let mut names = HashMap::new();
        names.insert("com.example.mail".to_string(), "Mail".to_string());
        let resolver = TableResolver::new(names);

        assert_eq!(resolver.resolve(&pkg("com.example.mail")), "Mail");
        assert_eq!(
            resolver.resolve(&pkg("com.example.unknown")),
            "com.example.unknown"
        );
    }

    #[test]
    fn memo_resolver_looks_up_once_per_package() {
        struct CountingResolver {
            calls: Cell<usize>,
        }

        impl NameResolver for CountingResolver {
            fn resolve(&self, package: &PackageId) -> String {
                self.calls.set(self.calls.get() + 1);
                package.to_string().to_uppercase()
            }
        }

        let memo = MemoResolver::new(CountingResolver {
            calls: Cell::new(0),
        });

        assert_eq!(memo.resolve(&pkg("a")), "A");
        assert_eq!(memo.resolve(&pkg("a")), "A");
        assert_eq!(memo.resolve(&pkg("b")), "B");
        assert_eq!(memo.inner.calls.get(), 2);
    }

    #[test]
    fn closure_is_a_resolver() {
        let resolver = |p: &PackageId| format!("name of {p}");
        assert_eq!(resolver.resolve(&pkg("x")), "name of x");
    }
}
