use std::sync::Arc;

/// Settings for one extraction run.
#[derive(Clone, Default)]
pub struct ExtractOptions {
    /// Compressed size of the archive, used as the progress denominator.
    pub expected_total_bytes: Option<u64>,
    pub on_progress: Option<Arc<dyn Fn(Progress) + Send + Sync>>,
}

/// Progress through the compressed input.
///
/// Measured against compressed bytes consumed, so it only approximates the
/// amount of work done; gzip ratios vary from entry to entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub bytes_read: u64,
    pub total_bytes: Option<u64>,
}

impl ExtractOptions {
    pub fn expected_total_bytes(mut self, bytes: u64) -> Self {
        self.expected_total_bytes = Some(bytes);
        self
    }

    pub fn on_progress(mut self, callback: Arc<dyn Fn(Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub(crate) fn report(&self, bytes_read: u64) {
        if let Some(ref callback) = self.on_progress {
            callback(Progress {
                bytes_read,
                total_bytes: self.expected_total_bytes,
            });
        }
    }
}

impl std::fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("expected_total_bytes", &self.expected_total_bytes)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl Progress {
    /// Completed fraction in `[0, 1]`, if the total is known.
    pub fn fraction(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                1.0
            } else {
                (self.bytes_read as f64 / total as f64).min(1.0)
            }
        })
    }
}
