use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format
{
	/// reference, start, end and optional ref/alt alleles
	Tsv,
	/// VCF, first ALT allele only
	Vcf,
}

#[derive(Parser, Debug)]
#[command(
	name = "cursorpile",
	about = "Pile up sorted alignments at sorted query positions",
	version
)]
pub struct Args
{
	/// Query positions, sorted by start within each reference
	pub positions: PathBuf,

	/// Position file format; guessed from the extension when absent
	#[arg(long, value_enum)]
	pub format: Option<Format>,

	/// Coordinate-sorted BAM to pile up (repeat for several samples)
	#[arg(short = 'b', long = "bam", value_name = "BAM", required = true)]
	pub bams: Vec<PathBuf>,

	/// Reference FASTA, used when a read has no usable MD tag
	#[arg(short = 'r', long = "reference", value_name = "FASTA")]
	pub reference: Option<PathBuf>,

	/// Output path (stdout when absent)
	#[arg(short = 'o', long = "out", value_name = "TSV")]
	pub output: Option<PathBuf>,

	/// Number of pileup workers
	#[arg(short = 't', long = "threads", default_value_t = 1)]
	pub threads: usize,

	/// Queue length at which producers wait for consumers
	#[arg(long, default_value_t = 100_000)]
	pub high_water_mark: usize,

	/// Interval between progress log lines, in milliseconds
	#[arg(long, default_value_t = 20)]
	pub poll_interval_ms: u64,

	/// Give up after this many hours
	#[arg(long, default_value_t = 60)]
	pub timeout_hours: u64,

	/// Minimum base quality at substitution sites
	#[arg(long, default_value_t = 10)]
	pub min_base_quality: u8,

	/// Minimum mapping quality
	#[arg(long, default_value_t = 0)]
	pub min_mapping_quality: u8,

	/// Count reads flagged as duplicates
	#[arg(long)]
	pub keep_duplicates: bool,

	/// Set logging level to WARN
	#[arg(short = 'q', long)]
	pub quiet: bool,
}

impl Args
{
	pub fn timeout(&self) -> Duration
	{
		Duration::from_secs(self.timeout_hours.saturating_mul(60 * 60))
	}
}
