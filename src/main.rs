use std::path::PathBuf;

use anyhow::{Context, bail};
use coatvision_rs::image_pipeline::{AnalysisConfig, CoatingAnalyzer};
use coatvision_rs::logger;

use tracing::{error, info, warn};

fn main() -> anyhow::Result<()> {
    logger::init();

    let mut args = std::env::args_os().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        bail!("usage: coatvision_rs <image> [output_dir]");
    };
    let output_dir = args.next().map(PathBuf::from);

    info!("Starting coatvision...");

    let analyzer = CoatingAnalyzer::new(AnalysisConfig::default())
        .context("failed to initialize analyzer")?;

    if output_dir.is_some() && !analyzer.can_annotate() {
        warn!("No annotation font found, overlay will carry no score text");
    }

    match analyzer.process_file(&input, output_dir.as_deref()) {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            if let Some(record) = e.partial_record() {
                println!("{}", serde_json::to_string_pretty(record)?);
            }
            Err(e).with_context(|| format!("could not analyze {}", input.display()))
        }
    }
}
