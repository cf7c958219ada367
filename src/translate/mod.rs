pub mod deepl;

pub use deepl::DeepLTranslator;

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a batch of lines in order. The returned list is ideally the
    /// same length as the input, but a provider may legitimately merge or
    /// drop lines; callers reconcile length mismatches themselves.
    async fn translate_batch(&self, texts: &[&str], target_lang: &str) -> Result<Vec<String>>;

    fn name(&self) -> &'static str;
}
