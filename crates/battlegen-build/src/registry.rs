use crate::{
    Backend, BuildError,
    backend::{cpp::CppBackend, nil::NilBackend, rust::RustBackend},
};

///
/// BackendRegistry
///
/// Ordered set of backends. Lookup returns the first backend that claims a
/// tag, so registration order decides ties.
///

#[derive(Default)]
pub struct BackendRegistry {
    backends: Vec<Box<dyn Backend>>,
}

impl BackendRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in `cpp`, `rust` and `nil` backends.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        reg.register(Box::new(CppBackend));
        reg.register(Box::new(RustBackend));
        reg.register(Box::new(NilBackend));

        reg
    }

    pub fn register(&mut self, backend: Box<dyn Backend>) {
        self.backends.push(backend);
    }

    pub fn get(&self, lang: &str) -> Result<&dyn Backend, BuildError> {
        self.backends
            .iter()
            .find(|backend| backend.languages().contains(&lang))
            .map(|backend| &**backend)
            .ok_or_else(|| BuildError::UnknownBackend {
                lang: lang.to_string(),
                supported: self.tags(),
            })
    }

    /// Tag lists, one entry per registered backend.
    pub fn languages(&self) -> impl Iterator<Item = &'static [&'static str]> + '_ {
        self.backends.iter().map(|backend| backend.languages())
    }

    /// Every registered tag, flattened in registration order.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.languages()
            .flatten()
            .map(ToString::to_string)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

///
/// TESTS
///
