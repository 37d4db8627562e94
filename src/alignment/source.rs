use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use log::{debug, info};

use tokio::fs::File as TokioFile;

use crate::alignment::AlignmentRecord;
use crate::bam;
use crate::error;

/// Records on one reference in ascending start order. Record-level errors may
/// appear mid-stream without ending it.
pub type RecordStream = BoxStream<'static, error::Result<AlignmentRecord>>;

/// A collection of alignments that can be queried by reference range.
pub trait AlignmentSource: Send + Sync
{
	fn name(&self) -> &str;

	/// Streams records on `reference` whose alignment overlaps `start..=end`,
	/// sorted by alignment start.
	fn overlapping(&self, reference: &str, start: u32, end: u32) -> RecordStream;
}

pub struct InMemoryAlignments
{
	name: String,
	records: Arc<Vec<AlignmentRecord>>,
}

impl InMemoryAlignments
{
	pub fn new(name: impl Into<String>, mut records: Vec<AlignmentRecord>) -> Self
	{
		records.sort_by(|a, b| (&a.reference, a.start).cmp(&(&b.reference, b.start)));

		InMemoryAlignments {
			name: name.into(),
			records: Arc::new(records),
		}
	}

	pub fn from_sam_lines<'a, I>(name: impl Into<String>, lines: I) -> error::Result<Self>
	where
		I: IntoIterator<Item = &'a str>,
	{
		let records = lines
			.into_iter()
			.filter(|line| !line.is_empty() && !line.starts_with('@'))
			.map(AlignmentRecord::from_sam_line)
			.collect::<error::Result<Vec<_>>>()?;

		Ok(Self::new(name, records))
	}

	pub fn len(&self) -> usize
	{
		self.records.len()
	}

	pub fn is_empty(&self) -> bool
	{
		self.records.is_empty()
	}
}

impl AlignmentSource for InMemoryAlignments
{
	fn name(&self) -> &str
	{
		&self.name
	}

	fn overlapping(&self, reference: &str, start: u32, end: u32) -> RecordStream
	{
		let hits: Vec<_> = self
			.records
			.iter()
			.filter(|record| {
				&*record.reference == reference && record.end >= start && record.start <= end
			})
			.cloned()
			.map(Ok)
			.collect();

		stream::iter(hits).boxed()
	}
}

/// A coordinate-sorted BAM file, scanned from the top for every query.
pub struct BamAlignments
{
	name: String,
	path: PathBuf,
}

impl BamAlignments
{
	pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> Self
	{
		BamAlignments {
			name: name.into(),
			path: path.as_ref().to_path_buf(),
		}
	}

	/// Names the source after the file stem, e.g. `tumour.bam` -> `tumour`.
	pub fn from_path(path: impl AsRef<Path>) -> Self
	{
		let path = path.as_ref();
		let name = path
			.file_stem()
			.map(|stem| stem.to_string_lossy().to_string())
			.unwrap_or_else(|| path.to_string_lossy().to_string());

		Self::new(name, path)
	}
}

enum BamScan
{
	Pending
	{
		path: PathBuf,
		reference: String,
		start: u32,
		end: u32,
	},
	Reading
	{
		reader: bam::Reader<TokioFile>,
		tid: i32,
		start: u32,
		end: u32,
	},
	Done,
}

impl BamScan
{
	async fn next(self) -> Option<(error::Result<AlignmentRecord>, BamScan)>
	{
		let mut state = self;

		loop
		{
			match state
			{
				BamScan::Done => return None,
				BamScan::Pending {
					path,
					reference,
					start,
					end,
				} =>
				{
					let reader = match bam::Reader::from_path(&path).await
					{
						Ok(reader) => reader,
						Err(err) => return Some((Err(err), BamScan::Done)),
					};

					state = match reader.header().tid(&reference)
					{
						Some(tid) =>
						{
							info!("Scanning {} for {}:{}-{}", path.display(), reference, start, end);
							BamScan::Reading {
								reader,
								tid,
								start,
								end,
							}
						}
						None =>
						{
							debug!("{} has no reference named {}", path.display(), reference);
							BamScan::Done
						}
					};
				}
				BamScan::Reading {
					mut reader,
					tid,
					start,
					end,
				} =>
				{
					match reader.read_record().await
					{
						Ok(Some(field)) =>
						{
							if field.ref_id < tid || field.record.end < start
							{
								state = BamScan::Reading {
									reader,
									tid,
									start,
									end,
								};
								continue;
							}

							// sorted input: nothing further can overlap
							if field.ref_id > tid || field.record.start > end
							{
								return None;
							}

							return Some((
								Ok(field.record),
								BamScan::Reading {
									reader,
									tid,
									start,
									end,
								},
							));
						}
						Ok(None) => return None,
						Err(err) if err.is_record_level() =>
						{
							return Some((
								Err(err),
								BamScan::Reading {
									reader,
									tid,
									start,
									end,
								},
							));
						}
						Err(err) => return Some((Err(err), BamScan::Done)),
					}
				}
			}
		}
	}
}

impl AlignmentSource for BamAlignments
{
	fn name(&self) -> &str
	{
		&self.name
	}

	fn overlapping(&self, reference: &str, start: u32, end: u32) -> RecordStream
	{
		let state = BamScan::Pending {
			path: self.path.clone(),
			reference: reference.to_string(),
			start,
			end,
		};

		stream::unfold(state, BamScan::next).boxed()
	}
}
