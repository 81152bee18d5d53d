//! Loading whole streams.

use std::iter::FusedIterator;
use std::str::FromStr;
use std::sync::Arc;

use yamlet_parse::Source;

use crate::{Composer, LoadError, Node, Resolver, TagRegistry, Yaml11Resolver};

/// Owns a decoded stream and the settings for composing it.
///
/// ```
/// use yamlet_tree::{Loader, Tag};
///
/// let loader = Loader::from_text("a: 1").unwrap();
/// let root = loader.load().unwrap();
/// assert_eq!(root.get("a").unwrap().tag(), Tag::INT);
/// ```
#[derive(Debug)]
pub struct Loader<R = Yaml11Resolver> {
    source: Source,
    resolver: R,
    registry: Arc<TagRegistry>,
}

impl Loader {
    /// Decode `bytes` (UTF-8, UTF-16 or UTF-32, detected from the byte
    /// order mark or the first characters).
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, LoadError> {
        Ok(Self::from_source(Source::decode(bytes)?))
    }

    /// Load from already decoded text.
    pub fn from_text(text: impl Into<String>) -> Result<Self, LoadError> {
        Ok(Self::from_source(Source::new(text)?))
    }

    /// Load a decoded source with the YAML 1.1 resolver and the
    /// process-wide registry.
    pub fn from_source(source: Source) -> Self {
        Self {
            source,
            resolver: Yaml11Resolver,
            registry: TagRegistry::global(),
        }
    }
}

impl FromStr for Loader {
    type Err = LoadError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::from_text(text)
    }
}

impl<R: Resolver> Loader<R> {
    /// Use `resolver` for untagged nodes.
    pub fn with_resolver<S: Resolver>(self, resolver: S) -> Loader<S> {
        Loader {
            source: self.source,
            resolver,
            registry: self.registry,
        }
    }

    /// Intern tags into `registry` instead of the process-wide one.
    pub fn with_registry(mut self, registry: Arc<TagRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// The decoded stream.
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// The registry node tags refer to.
    pub fn registry(&self) -> &Arc<TagRegistry> {
        &self.registry
    }

    /// Load a stream that holds exactly one document.
    pub fn load(&self) -> Result<Node, LoadError> {
        let mut documents = self.load_all();
        let Some(root) = documents.next().transpose()? else {
            return Err(LoadError::DocumentCount { found: 0 });
        };
        let mut found = 1;
        for document in documents {
            document?;
            found += 1;
        }
        if found == 1 {
            Ok(root)
        } else {
            Err(LoadError::DocumentCount { found })
        }
    }

    /// Iterate over the documents of the stream, composing each on demand.
    pub fn load_all(&self) -> Documents<'_, R> {
        Documents {
            composer: Composer::new(&self.source, &self.resolver, &self.registry),
            done: false,
        }
    }
}

/// Lazily composed documents. Yields nothing after the first error.
pub struct Documents<'a, R> {
    composer: Composer<'a, R>,
    done: bool,
}

impl<R: Resolver> Iterator for Documents<'_, R> {
    type Item = Result<Node, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.composer.compose_document() {
            Ok(Some(root)) => Some(Ok(root)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: Resolver> FusedIterator for Documents<'_, R> {}

/// Load a single document from `text`.
pub fn load(text: &str) -> Result<Node, LoadError> {
    Loader::from_text(text)?.load()
}

/// Load every document from `text`.
pub fn load_all(text: &str) -> Result<Vec<Node>, LoadError> {
    Loader::from_text(text)?.load_all().collect()
}
