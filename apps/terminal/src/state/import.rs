//! # Import State
//!
//! Staged CSV rows and OCR results waiting for review, plus the column
//! classifier used to read them.

use std::sync::{Arc, Mutex};

use kasir_core::{FieldClassifier, ImportStaging};

use super::lock;

#[derive(Debug, Clone, Default)]
pub struct ImportState {
    staging: Arc<Mutex<ImportStaging>>,
    classifier: Arc<FieldClassifier>,
}

impl ImportState {
    pub fn new(classifier: FieldClassifier) -> Self {
        ImportState {
            staging: Arc::new(Mutex::new(ImportStaging::new())),
            classifier: Arc::new(classifier),
        }
    }

    pub fn classifier(&self) -> &FieldClassifier {
        &self.classifier
    }

    pub fn with_staging<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ImportStaging) -> R,
    {
        f(&lock(&self.staging))
    }

    pub fn with_staging_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ImportStaging) -> R,
    {
        f(&mut lock(&self.staging))
    }
}
