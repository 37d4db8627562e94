mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::info;
use tokio::fs::File as TokioFile;
use tokio::io::{AsyncWrite, BufWriter as TokioBufWriter};

use cursorpile::alignment::BamAlignments;
use cursorpile::pileup::ReadFilter;
use cursorpile::pipeline::{Pipeline, PipelineConfig};
use cursorpile::position::{PositionFormat, PositionReader};
use cursorpile::reference::FastaReference;

#[tokio::main]
async fn main() -> anyhow::Result<()>
{
	let args = cli::Args::parse();

	env_logger::Builder::from_env(
		env_logger::Env::default().default_filter_or(if args.quiet { "warn" } else { "info" }),
	)
	.init();

	let format = match args.format
	{
		Some(cli::Format::Tsv) => PositionFormat::Tsv,
		Some(cli::Format::Vcf) => PositionFormat::Vcf,
		None => PositionFormat::from_path(&args.positions),
	};

	let positions = PositionReader::from_path(&args.positions, format)
		.await
		.with_context(|| format!("opening positions {}", args.positions.display()))?;

	let mut filter = ReadFilter::default();
	filter
		.set_keep_duplicates(args.keep_duplicates)
		.set_min_base_quality(args.min_base_quality)
		.set_min_mapping_quality(args.min_mapping_quality);

	let mut config = PipelineConfig::default();
	config
		.set_workers(args.threads)
		.set_high_water_mark(args.high_water_mark)
		.set_poll_interval(Duration::from_millis(args.poll_interval_ms))
		.set_timeout(args.timeout())
		.set_filter(filter);

	let mut pipeline = Pipeline::new(config);
	for bam in &args.bams
	{
		pipeline.add_source(Arc::new(BamAlignments::from_path(bam)));
	}

	if let Some(path) = &args.reference
	{
		let reference = FastaReference::from_path(path)
			.await
			.with_context(|| format!("loading reference {}", path.display()))?;
		pipeline.set_reference(Arc::new(reference));
	}

	let sink: Box<dyn AsyncWrite + Send + Unpin> = match &args.output
	{
		Some(path) =>
		{
			let file = TokioFile::create(path)
				.await
				.with_context(|| format!("creating {}", path.display()))?;
			Box::new(TokioBufWriter::new(file))
		}
		None => Box::new(TokioBufWriter::new(tokio::io::stdout())),
	};

	let summary = pipeline.run(positions.into_stream(), sink).await?;

	info!(
		"cursorpile: {} positions, {} lines, {} workers",
		summary.positions, summary.results, summary.workers
	);

	Ok(())
}
