use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use image::{GrayImage, RgbImage};
use tracing::{info, instrument, warn};

use crate::image_pipeline::{
    common::{AnalysisError, PipelineTimings, Result, Timer},
    config::AnalysisConfig,
    loader::{
        HttpFetcher, ImageFetcher, ImageLoader, ImageSource, RasterReader, RawImage,
        StandardRasterReader,
    },
    metrics::{MetricExtractor, MetricSet},
    overlay::{OverlayRenderer, OverlayWriter, StandardOverlayWriter, encode_png_base64},
    report::{AnalysisRecord, ReportedMetrics, ResultAssembler},
    scoring::{CompositeScore, IndexComposer},
};

/// Everything computed for one image before assembly.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub metrics: MetricSet,
    pub scores: CompositeScore,
    pub reported: ReportedMetrics,
    /// Edge mask from extraction, reused by the overlay renderer
    pub edges: GrayImage,
}

pub struct CoatingAnalyzer<R: RasterReader, F: ImageFetcher, W: OverlayWriter> {
    loader: ImageLoader<R, F>,
    extractor: MetricExtractor,
    composer: IndexComposer,
    renderer: OverlayRenderer,
    assembler: ResultAssembler,
    writer: W,
    config: AnalysisConfig,
}

impl CoatingAnalyzer<StandardRasterReader, HttpFetcher, StandardOverlayWriter> {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let loader = ImageLoader::new(&config)?;
        Ok(Self::from_parts(loader, StandardOverlayWriter, config))
    }
}

impl<R: RasterReader, F: ImageFetcher, W: OverlayWriter> CoatingAnalyzer<R, F, W> {
    pub fn with_custom(reader: R, fetcher: F, writer: W, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let loader = ImageLoader::with_custom(reader, fetcher, config.max_side);
        Ok(Self::from_parts(loader, writer, config))
    }

    fn from_parts(loader: ImageLoader<R, F>, writer: W, config: AnalysisConfig) -> Self {
        let renderer = OverlayRenderer::new(&config);
        if let Some(reason) = renderer.font_error() {
            warn!("Overlay rendering unavailable: {}", reason);
        }
        Self {
            loader,
            extractor: MetricExtractor::new(&config),
            composer: IndexComposer::from_config(&config),
            renderer,
            assembler: ResultAssembler::from_config(&config),
            writer,
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Whether rendered overlays will carry score annotations.
    pub fn can_annotate(&self) -> bool {
        self.renderer.can_annotate()
    }

    pub fn load(&self, source: &ImageSource) -> Result<RawImage> {
        self.loader.load(source)
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn analyze_image(&self, image: &RawImage) -> Result<Analysis> {
        let extraction = {
            let _span = tracing::info_span!("extract_metrics").entered();
            self.extractor.extract(image)?
        };

        let scores = {
            let _span = tracing::info_span!("compose_indices").entered();
            self.composer.compose(&extraction.metrics)
        };

        Ok(Analysis {
            metrics: extraction.metrics,
            scores,
            reported: self.assembler.report(&extraction.metrics, &scores),
            edges: extraction.edges,
        })
    }

    /// Analyzes one image without rendering an overlay.
    #[instrument(skip_all, fields(source = source.kind()))]
    pub fn analyze(&self, source: &ImageSource) -> Result<AnalysisRecord> {
        let image = {
            let _span = tracing::info_span!("load_image").entered();
            self.load(source)?
        };
        let analysis = self.analyze_image(&image)?;

        info!(
            width = image.width(),
            height = image.height(),
            cvi = analysis.reported.cvi,
            cqi = analysis.reported.cqi,
            "Analysis complete"
        );
        Ok(self.assembler.assemble(analysis.reported, None))
    }

    /// Parses a JSON request body (see [`ImageSource::from_json_str`]) and analyzes it.
    pub fn analyze_payload(&self, payload: &str) -> Result<AnalysisRecord> {
        let source = ImageSource::from_json_str(payload)?;
        self.analyze(&source)
    }

    pub fn analyze_with_timings(
        &self,
        source: &ImageSource,
    ) -> Result<(AnalysisRecord, PipelineTimings)> {
        let mut timings = PipelineTimings::new();

        let timer = Timer::start("load_image");
        let image = self.load(source)?;
        timings.record(timer);

        let timer = Timer::start("extract_metrics");
        let extraction = self.extractor.extract(&image)?;
        timings.record(timer);

        let timer = Timer::start("compose_indices");
        let scores = self.composer.compose(&extraction.metrics);
        timings.record(timer);

        let timer = Timer::start("assemble_record");
        let reported = self.assembler.report(&extraction.metrics, &scores);
        let record = self.assembler.assemble(reported, None);
        timings.record(timer);

        info!(width = image.width(), height = image.height(), "Analysis complete");
        timings.log_summary();
        Ok((record, timings))
    }

    pub fn render_overlay(&self, image: &RawImage, analysis: &Analysis) -> Result<RgbImage> {
        let _span = tracing::info_span!("render_overlay").entered();
        self.renderer.render(image, &analysis.edges, &analysis.reported)
    }

    pub fn write_overlay(&self, overlay: &RgbImage, output: &mut dyn Write) -> Result<()> {
        let _span = tracing::info_span!("write_overlay").entered();
        self.writer.write_overlay(overlay, output, &self.config)
    }

    /// Analyzes one image and returns the overlay inline as base64 PNG.
    ///
    /// A render failure still carries the metrics record.
    pub fn analyze_with_inline_overlay(
        &self,
        source: &ImageSource,
    ) -> Result<(AnalysisRecord, String)> {
        let image = self.load(source)?;
        let analysis = self.analyze_image(&image)?;
        let record = self.assembler.assemble(analysis.reported, None);

        let encoded = self
            .render_overlay(&image, &analysis)
            .and_then(|overlay| encode_png_base64(&overlay));
        match encoded {
            Ok(encoded) => Ok((record, encoded)),
            Err(e) => Err(e.with_record(record)),
        }
    }

    /// Analyzes a file, optionally writing the overlay to
    /// `output_dir/analyzed_<stem>.<ext>` and recording that path.
    #[instrument(skip(self, input_path, output_dir))]
    pub fn process_file<P: AsRef<Path>>(
        &self,
        input_path: P,
        output_dir: Option<&Path>,
    ) -> Result<AnalysisRecord> {
        let input_path = input_path.as_ref();
        info!(input = %input_path.display(), "Processing file");

        let image = {
            let _span = tracing::info_span!("read_input_file").entered();
            self.load(&ImageSource::File(input_path.to_path_buf()))?
        };
        let analysis = self.analyze_image(&image)?;

        let Some(output_dir) = output_dir else {
            return Ok(self.assembler.assemble(analysis.reported, None));
        };

        let output_path = output_dir.join(overlay_file_name(input_path, &self.config));
        match self.write_overlay_file(&image, &analysis, &output_path) {
            Ok(()) => {
                info!(output = %output_path.display(), "Overlay written");
                Ok(self.assembler.assemble(analysis.reported, Some(&output_path)))
            }
            Err(e) => Err(e.with_record(self.assembler.assemble(analysis.reported, None))),
        }
    }

    /// The file is created only once the overlay is fully encoded, and is
    /// removed again if writing it fails.
    fn write_overlay_file(
        &self,
        image: &RawImage,
        analysis: &Analysis,
        output_path: &Path,
    ) -> Result<()> {
        let overlay = self.render_overlay(image, analysis)?;
        let mut encoded = Vec::new();
        self.write_overlay(&overlay, &mut encoded)?;

        fs::write(output_path, &encoded).map_err(|e| {
            if let Err(cleanup) = fs::remove_file(output_path) {
                warn!(
                    output = %output_path.display(),
                    "Could not remove partial overlay: {}",
                    cleanup
                );
            }
            AnalysisError::render(format!("{}: {}", output_path.display(), e))
        })
    }
}

/// `analyzed_<input stem>.<overlay extension>`
pub fn overlay_file_name(input_path: &Path, config: &AnalysisConfig) -> PathBuf {
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    PathBuf::from(format!("analyzed_{stem}.{}", config.overlay_format.extension()))
}
