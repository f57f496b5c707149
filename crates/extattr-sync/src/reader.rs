//! Container enumeration that reports failures instead of raising them.

use std::fmt;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use extattr_connector::model::LocalObject;
use extattr_connector::operation::SearchScope;
use extattr_connector::traits::LocalDirectory;

/// Objects read from one or more containers, plus any failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enumeration {
    pub objects: Vec<LocalObject>,
    pub diagnostics: Vec<String>,
}

impl Enumeration {
    /// First diagnostic, if any container failed.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostics.first().map(String::as_str)
    }

    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Reads computer objects from the local directory.
#[derive(Clone)]
pub struct DirectoryReader {
    directory: Arc<dyn LocalDirectory>,
}

impl DirectoryReader {
    pub fn new(directory: Arc<dyn LocalDirectory>) -> Self {
        Self { directory }
    }

    /// Read every computer under `container`.
    ///
    /// A failed search yields no objects and one diagnostic.
    #[instrument(skip(self))]
    pub async fn enumerate(&self, container: &str, recursive: bool) -> Enumeration {
        let scope = SearchScope::from_recursive(recursive);

        match self.directory.search_computers(container, scope).await {
            Ok(objects) => {
                info!(count = objects.len(), "Enumerated container");
                Enumeration {
                    objects,
                    diagnostics: Vec::new(),
                }
            }
            Err(e) => {
                warn!(error = %e, error_code = e.error_code(), "Container enumeration failed");
                Enumeration {
                    objects: Vec::new(),
                    diagnostics: vec![format!("{container}: {e}")],
                }
            }
        }
    }

    /// Enumerate each container in order, continuing past failures.
    pub async fn enumerate_all<S: AsRef<str>>(
        &self,
        containers: &[S],
        recursive: bool,
    ) -> Enumeration {
        let mut combined = Enumeration::default();

        for container in containers {
            let part = self.enumerate(container.as_ref(), recursive).await;
            combined.objects.extend(part.objects);
            combined.diagnostics.extend(part.diagnostics);
        }

        combined
    }
}

impl fmt::Debug for DirectoryReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryReader")
            .field("directory", &self.directory.display_name())
            .finish()
    }
}
