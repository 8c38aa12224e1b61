//! Per-run configuration. Everything a generation run can be tuned with is
//! injected here; the engine keeps no global state.
use std::sync::Arc;

use crate::cleanup::{Cleaner, DefaultPromotionPolicy, NoPromotion, PromotionPolicy};
use crate::error::Result;
use crate::scalar::{
    BigNumberRecognizer, IntegerRecognizer, Recognizer, ScalarRegistry, ScalarToken,
    TimestampRecognizer, UriRecognizer,
};

#[derive(Clone, Debug)]
pub struct GeneratorOptions {
    pub scalars: ScalarRegistry,
    pub cleaner: Cleaner,
    /// Run the map-promotion pass after inference.
    pub cleanup: bool,
    /// Share identical shapes through a registry. Off means `EmptyUniverse`.
    pub dedupe: bool,
    /// Run uniqueness analysis when the root is an array of records.
    pub unique_lookup: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            scalars: ScalarRegistry::new(),
            cleaner: Cleaner::new(Arc::new(DefaultPromotionPolicy)),
            cleanup: true,
            dedupe: true,
            unique_lookup: true,
        }
    }
}

impl GeneratorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recognizer<R>(mut self, target: ScalarToken, recognizer: R) -> Result<Self>
    where
        R: Recognizer + 'static,
    {
        self.scalars.register(target, recognizer)?;
        Ok(self)
    }

    /// RFC 3339 strings become `Timestamp`.
    #[must_use]
    pub fn with_timestamps(mut self) -> Self {
        self.push_builtin(ScalarToken::String, TimestampRecognizer);
        self
    }

    #[must_use]
    pub fn with_uris(mut self) -> Self {
        self.push_builtin(ScalarToken::String, UriRecognizer);
        self
    }

    /// Integral numbers become `Int64`, or `BigNumber` past the `i64` range.
    #[must_use]
    pub fn with_integers(mut self) -> Self {
        self.push_builtin(ScalarToken::Float64, IntegerRecognizer);
        self.push_builtin(ScalarToken::Float64, BigNumberRecognizer);
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn PromotionPolicy>) -> Self {
        self.cleaner = Cleaner::new(policy);
        self
    }

    #[must_use]
    pub fn without_maps(self) -> Self {
        self.with_policy(Arc::new(NoPromotion))
    }

    #[must_use]
    pub fn with_cleanup(mut self, enabled: bool) -> Self {
        self.cleanup = enabled;
        self
    }

    #[must_use]
    pub fn with_dedupe(mut self, enabled: bool) -> Self {
        self.dedupe = enabled;
        self
    }

    #[must_use]
    pub fn with_unique_lookup(mut self, enabled: bool) -> Self {
        self.unique_lookup = enabled;
        self
    }

    fn push_builtin<R: Recognizer + 'static>(&mut self, target: ScalarToken, recognizer: R) {
        // string and float64 are always accepted
        if let Err(error) = self.scalars.register(target, recognizer) {
            tracing::warn!(%error, "built-in recognizer rejected");
        }
    }
}
