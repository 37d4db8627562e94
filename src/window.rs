use futures::StreamExt;
use log::{debug, warn};

use crate::alignment::{AlignmentRecord, RecordStream};
use crate::error;
use crate::position::QueryPosition;

/// Re-partitions the two pools around the site `start..=end`.
///
/// Records ending before `start` are dropped from both pools. Records from
/// `next` that start at or before `end` join `current`. Records from `current`
/// that start after `end` return to `next`, ahead of the records already
/// there, so both pools stay sorted by start.
pub fn reset_pool(
	start: u32,
	end: u32,
	current: &mut Vec<AlignmentRecord>,
	next: &mut Vec<AlignmentRecord>,
)
{
	let mut behind = Vec::new();
	let mut kept = Vec::with_capacity(current.len());

	for record in current.drain(..)
	{
		if record.end < start
		{
			continue;
		}

		if record.start > end
		{
			behind.push(record);
		}
		else
		{
			kept.push(record);
		}
	}

	for record in next.drain(..)
	{
		if record.end < start
		{
			continue;
		}

		if record.start <= end
		{
			kept.push(record);
		}
		else
		{
			behind.push(record);
		}
	}

	*current = kept;
	*next = behind;
}

/// Keeps the records of one reference in step with an advancing cursor of
/// query positions.
pub struct WindowManager
{
	reference: String,
	records: RecordStream,
	current: Vec<AlignmentRecord>,
	next: Vec<AlignmentRecord>,
	exhausted: bool,
	position: Option<(u32, u32)>,
	last_read_start: u32,
	skipped: usize,
}

impl WindowManager
{
	pub fn new(reference: impl Into<String>, records: RecordStream) -> Self
	{
		WindowManager {
			reference: reference.into(),
			records,
			current: Vec::new(),
			next: Vec::new(),
			exhausted: false,
			position: None,
			last_read_start: 0,
			skipped: 0,
		}
	}

	pub fn reference(&self) -> &str
	{
		&self.reference
	}

	pub fn current(&self) -> &[AlignmentRecord]
	{
		&self.current
	}

	pub fn next(&self) -> &[AlignmentRecord]
	{
		&self.next
	}

	pub fn is_exhausted(&self) -> bool
	{
		self.exhausted
	}

	pub fn skipped(&self) -> usize
	{
		self.skipped
	}

	/// Moves the window to `position`.
	pub async fn advance(&mut self, position: &QueryPosition) -> error::Result<()>
	{
		if position.reference != self.reference
		{
			return Err(error::Error::WindowReference {
				window: self.reference.clone(),
				requested: position.reference.clone(),
			});
		}

		if let Some((previous, _)) = self.position
		{
			if position.start < previous
			{
				return Err(error::Error::PositionOrder {
					reference: self.reference.clone(),
					previous,
					current: position.start,
				});
			}
		}

		let (start, end) = (position.start, position.end);
		self.position = Some((start, end));

		reset_pool(start, end, &mut self.current, &mut self.next);
		self.fill(start, end).await?;

		debug!(
			"window {}:{}-{} current = {}, next = {}",
			self.reference,
			start,
			end,
			self.current.len(),
			self.next.len()
		);

		Ok(())
	}

	async fn fill(&mut self, start: u32, end: u32) -> error::Result<()>
	{
		while self.next.is_empty() && !self.exhausted
		{
			let record = match self.records.next().await
			{
				None =>
				{
					self.exhausted = true;
					break;
				}
				Some(Ok(record)) => record,
				Some(Err(err)) if err.is_record_level() =>
				{
					warn!("Skipping alignment on {}: {}", self.reference, err);
					self.skipped += 1;
					continue;
				}
				Some(Err(err)) => return Err(err),
			};

			if &*record.reference != self.reference
			{
				debug!("Ignoring {} on {} in window for {}", record.name, record.reference, self.reference);
				continue;
			}

			if record.start < self.last_read_start
			{
				return Err(error::Error::UnsortedAlignments {
					name: record.name.to_string(),
					reference: self.reference.clone(),
					start: record.start,
				});
			}
			self.last_read_start = record.start;

			if record.end < start
			{
				continue;
			}

			if record.start <= end
			{
				self.current.push(record);
			}
			else
			{
				self.next.push(record);
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	use futures::stream::{self, StreamExt};

	use crate::alignment::parse_cigar;

	fn synthetic(name: &str, start: u32, end: u32) -> AlignmentRecord
	{
		let length = end - start + 1;
		let cigar = parse_cigar(&format!("{}M", length)).unwrap();

		AlignmentRecord {
			name: Box::from(name),
			reference: Box::from("chr1"),
			start,
			end: AlignmentRecord::alignment_end(start, &cigar),
			flags: crate::alignment::Flags::empty(),
			mapping_quality: 60,
			cigar,
			sequence: vec![b'A'; length as usize].into_boxed_slice(),
			qualities: Box::default(),
			mismatches: None,
		}
	}

	fn window(records: Vec<error::Result<AlignmentRecord>>) -> WindowManager
	{
		WindowManager::new("chr1", stream::iter(records).boxed())
	}

	#[test]
	fn reset_pool_partitions_records()
	{
		let mut current = vec![synthetic("a", 1, 10), synthetic("b", 5, 20), synthetic("c", 30, 40)];
		let mut next = vec![synthetic("d", 12, 14), synthetic("e", 25, 30), synthetic("f", 40, 50)];

		reset_pool(13, 24, &mut current, &mut next);

		let names = |pool: &[AlignmentRecord]| pool.iter().map(|r| r.name.to_string()).collect::<Vec<_>>();
		assert_eq!(names(&current[..]), vec!["b", "d"]);
		assert_eq!(names(&next[..]), vec!["c", "e", "f"]);
	}

	#[tokio::test]
	async fn rejects_positions_going_backwards()
	{
		let mut window = window(vec![Ok(synthetic("a", 100, 150))]);

		window.advance(&QueryPosition::point("chr1", 120)).await.unwrap();
		let err = window.advance(&QueryPosition::point("chr1", 110)).await.unwrap_err();

		assert!(matches!(err, error::Error::PositionOrder { previous: 120, current: 110, .. }));
		assert_eq!(window.current().len(), 1);
	}

	#[tokio::test]
	async fn rejects_other_reference()
	{
		let mut window = window(Vec::new());
		let err = window.advance(&QueryPosition::point("chr2", 1)).await.unwrap_err();
		assert!(matches!(err, error::Error::WindowReference { .. }));
	}

	#[tokio::test]
	async fn rejects_unsorted_source()
	{
		let mut window = window(vec![Ok(synthetic("a", 100, 150)), Ok(synthetic("b", 90, 200))]);
		let err = window.advance(&QueryPosition::point("chr1", 120)).await.unwrap_err();
		assert!(matches!(err, error::Error::UnsortedAlignments { start: 90, .. }));
	}

	#[tokio::test]
	async fn skips_record_level_errors()
	{
		let mut window = window(vec![
			Ok(synthetic("a", 100, 150)),
			Err(error::Error::BamRecord(12)),
			Ok(synthetic("b", 110, 150)),
		]);

		window.advance(&QueryPosition::point("chr1", 120)).await.unwrap();
		assert_eq!(window.current().len(), 2);
		assert_eq!(window.skipped(), 1);
		assert!(window.is_exhausted());
	}

	#[tokio::test]
	async fn stops_on_stage_level_errors()
	{
		let mut window = window(vec![
			Ok(synthetic("a", 100, 150)),
			Err(error::Error::BamFormat),
		]);

		let err = window.advance(&QueryPosition::point("chr1", 120)).await.unwrap_err();
		assert!(matches!(err, error::Error::BamFormat));
	}

	#[tokio::test]
	async fn interval_positions_promote_everything_they_span()
	{
		let mut window = window(vec![
			Ok(synthetic("a", 100, 110)),
			Ok(synthetic("b", 105, 130)),
			Ok(synthetic("c", 125, 140)),
			Ok(synthetic("d", 141, 160)),
		]);

		window.advance(&QueryPosition::new("chr1", 108, 126)).await.unwrap();
		assert_eq!(window.current().len(), 3);
		assert_eq!(window.next().len(), 1);

		window.advance(&QueryPosition::new("chr1", 135, 145)).await.unwrap();
		let names: Vec<_> = window.current().iter().map(|r| &*r.name).collect();
		assert_eq!(names, vec!["c", "d"]);
		assert!(window.next().is_empty());
	}
}
