use crate::config::EngineConfig;
use crate::context::InferenceContext;
use crate::knowledge::KnowledgeBase;
use error_common::Result;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Shared, swappable access to the current [`InferenceContext`].
///
/// Readers clone the inner `Arc` and keep using that snapshot for the whole
/// request. Writers build a complete replacement without holding the read
/// lock and swap it in, so a request sees either the old context or the new
/// one and never a mix.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    inner: Arc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    current: RwLock<Arc<InferenceContext>>,
    /// Serialises writers so concurrent edits are not lost
    edit_lock: Mutex<()>,
}

impl EngineHandle {
    pub fn new(context: InferenceContext) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                current: RwLock::new(Arc::new(context)),
                edit_lock: Mutex::new(()),
            }),
        }
    }

    pub fn load(config: &EngineConfig) -> Result<Self> {
        Ok(Self::new(InferenceContext::load(config)?))
    }

    /// Snapshot of the context serving requests right now
    pub fn current(&self) -> Arc<InferenceContext> {
        Arc::clone(&self.inner.current.read())
    }

    /// Replace the context, returning the previous one.
    pub fn swap(&self, context: InferenceContext) -> Arc<InferenceContext> {
        let _writer = self.inner.edit_lock.lock();
        self.replace(Arc::new(context))
    }

    /// Reload both artifacts from disk and swap them in.
    pub fn reload(&self, config: &EngineConfig) -> Result<Arc<InferenceContext>> {
        let context = InferenceContext::load(config)?;
        let _writer = self.inner.edit_lock.lock();
        self.replace(Arc::new(context));
        tracing::info!("🔄 Engine reloaded from disk");
        Ok(self.current())
    }

    /// Apply `edit` to a copy of the current knowledge base and serve the result.
    ///
    /// When `edit` fails nothing changes.
    pub fn apply_knowledge_edit<F>(&self, edit: F) -> Result<Arc<InferenceContext>>
    where
        F: FnOnce(&mut KnowledgeBase) -> Result<()>,
    {
        let _writer = self.inner.edit_lock.lock();
        let base = self.current();

        let mut knowledge_base = base.knowledge_base().clone();
        edit(&mut knowledge_base)?;
        knowledge_base.refresh_totals();

        let next = Arc::new(base.with_knowledge_base(knowledge_base)?);
        self.replace(Arc::clone(&next));
        tracing::info!(
            symptoms = next.knowledge_base().total_symptoms,
            diseases = next.knowledge_base().total_diseases,
            "✏️ Knowledge base edit applied"
        );
        Ok(next)
    }

    fn replace(&self, next: Arc<InferenceContext>) -> Arc<InferenceContext> {
        std::mem::replace(&mut *self.inner.current.write(), next)
    }
}
