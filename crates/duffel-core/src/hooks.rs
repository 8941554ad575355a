//! Post-save hooks.
//!
//! Hooks run after a successful save with the saved model and its on-disk
//! location. A hook failure never fails the save; it is logged and dropped.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use duffel_types::Model;

use crate::error::ContentsResult;

#[async_trait]
pub trait PostSaveHook: Send + Sync {
    /// Stable name, used in logs.
    fn name(&self) -> &str;

    async fn post_save(&self, model: &Model, os_path: &Path) -> ContentsResult<()>;
}

/// Fire every hook in order. Failures are logged, never propagated.
pub async fn fire_post_save(hooks: &[Arc<dyn PostSaveHook>], model: &Model, os_path: &Path) {
    for hook in hooks {
        if let Err(e) = hook.post_save(model, os_path).await {
            tracing::warn!(
                hook = hook.name(),
                path = %os_path.display(),
                error = %e,
                "post-save hook failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use duffel_types::{DirectoryModel, Model};

    use crate::error::ContentsError;

    struct Counter(AtomicUsize);

    #[async_trait]
    impl PostSaveHook for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        async fn post_save(&self, _model: &Model, _os_path: &Path) -> ContentsResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl PostSaveHook for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn post_save(&self, _model: &Model, _os_path: &Path) -> ContentsResult<()> {
            Err(ContentsError::NotImplemented("failing hook"))
        }
    }

    #[tokio::test]
    async fn test_hooks_run_in_order_and_failures_do_not_stop_the_chain() {
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let hooks: Vec<Arc<dyn PostSaveHook>> =
            vec![Arc::new(Failing), counter.clone(), Arc::new(Failing)];

        let model = Model::Directory(DirectoryModel::transient("x", None));
        fire_post_save(&hooks, &model, Path::new("/tmp/x")).await;

        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }
}
