use std::time::Duration;

use thiserror::Error;

use crate::pipeline::Stage;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error
{
	#[error("Unable to open file {0}")]
	IOError(String),
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[error("Not in BAM format")]
	BamFormat,
	#[error("Truncated BAM record ({0} bytes)")]
	BamRecord(usize),
	#[error("BAM block of {0} bytes is larger than any record")]
	BamBlockSize(usize),
	#[error("Unsupported tag type '{0}' in BAM")]
	BamTagType(char),
	#[error("Unsupported array type '{0}' in BAM")]
	BamArrayType(char),
	#[error("Invalid CIGAR '{0}'")]
	Cigar(String),
	#[error("Invalid SAM line: {0}")]
	SamLine(String),
	#[error("Invalid mismatch descriptor '{0}'")]
	MismatchDescriptor(String),
	#[error("Invalid position on line {line}: {reason}")]
	PositionFormat
	{
		line: usize, reason: String
	},
	#[error("Invalid FASTA: {0}")]
	FastaFormat(String),
	#[error("Position {reference}:{current} is before {reference}:{previous}")]
	PositionOrder
	{
		reference: String,
		previous: u32,
		current: u32,
	},
	#[error("Alignment {name} at {reference}:{start} is out of order")]
	UnsortedAlignments
	{
		name: String,
		reference: String,
		start: u32,
	},
	#[error("Window for {window} cannot serve a position on {requested}")]
	WindowReference
	{
		window: String, requested: String
	},
	#[error("Worker {worker} failed on {alignments} at {position}: {error}")]
	Worker
	{
		worker: usize,
		alignments: String,
		position: String,
		#[source]
		error: Box<Error>,
	},
	#[error("Queue closed before {0} stage finished sending")]
	QueueClosed(Stage),
	#[error("Pipeline cancelled")]
	Cancelled,
	#[error("Pipeline owner went away")]
	OwnerGone,
	#[error("Stage task panicked: {0}")]
	StagePanic(String),
	#[error("Pipeline did not finish within {0:?}")]
	Timeout(Duration),
	#[error("Queues not empty after shutdown (positions: {positions}, results: {results})")]
	Undrained
	{
		positions: usize, results: usize
	},
}

impl Error
{
	/// Errors confined to a single alignment record. Callers skip the record
	/// and carry on.
	pub fn is_record_level(&self) -> bool
	{
		matches!(
			self,
			Error::BamRecord(_)
				| Error::BamTagType(_)
				| Error::BamArrayType(_)
				| Error::Cigar(_)
				| Error::SamLine(_)
				| Error::MismatchDescriptor(_)
		)
	}
}
