use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, instrument};

use crate::image_pipeline::analysis::pipeline::CoatingAnalyzer;
use crate::image_pipeline::common::error::{AnalysisError, Result};
use crate::image_pipeline::loader::{ImageFetcher, ImageSource, RasterReader};
use crate::image_pipeline::overlay::OverlayWriter;
use crate::image_pipeline::report::AnalysisRecord;

/// Analyzes independent images concurrently on a dedicated CPU pool.
///
/// The pool has `config.workers` threads, or one per available core when unset.
/// Each image is analyzed in isolation; results come back in input order.
pub struct BatchAnalyzer<R: RasterReader, F: ImageFetcher, W: OverlayWriter> {
    analyzer: CoatingAnalyzer<R, F, W>,
    pool: ThreadPool,
}

impl<R, F, W> BatchAnalyzer<R, F, W>
where
    R: RasterReader + Sync,
    F: ImageFetcher + Sync,
    W: OverlayWriter + Sync,
{
    pub fn new(analyzer: CoatingAnalyzer<R, F, W>) -> Result<Self> {
        let workers = analyzer.config().workers;
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.unwrap_or(0))
            .thread_name(|i| format!("coatvision-worker-{i}"))
            .build()
            .map_err(|e| {
                AnalysisError::ValidationError(format!(
                    "cannot start a worker pool with {workers:?} workers: {e}"
                ))
            })?;
        debug!("Batch pool started with {} workers", pool.current_num_threads());
        Ok(Self { analyzer, pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn analyzer(&self) -> &CoatingAnalyzer<R, F, W> {
        &self.analyzer
    }

    #[instrument(skip_all, fields(count = sources.len()))]
    pub fn analyze_all(&self, sources: &[ImageSource]) -> Vec<Result<AnalysisRecord>> {
        self.pool
            .install(|| sources.par_iter().map(|source| self.analyzer.analyze(source)).collect())
    }
}
