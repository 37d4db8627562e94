mod cigar;
mod md;
mod source;

pub use crate::alignment::cigar::*;
pub use crate::alignment::md::*;
pub use crate::alignment::source::*;

use crate::error;

use bitflags::bitflags;

bitflags! {
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct Flags: u16 {
		const PAIRED = 0x1;
		const PROPER_PAIR = 0x2;
		const UNMAPPED = 0x4;
		const MATE_UNMAPPED = 0x8;
		const REVERSE = 0x10;
		const MATE_REVERSE = 0x20;
		const FIRST_IN_PAIR = 0x40;
		const SECOND_IN_PAIR = 0x80;
		const SECONDARY = 0x100;
		const QC_FAIL = 0x200;
		const DUPLICATE = 0x400;
		const SUPPLEMENTARY = 0x800;
	}
}

/// One aligned read. Coordinates are 1-based and `end` is inclusive.
#[derive(Debug, Clone)]
pub struct AlignmentRecord
{
	pub name: Box<str>,
	pub reference: Box<str>,
	pub start: u32,
	pub end: u32,
	pub flags: Flags,
	pub mapping_quality: u8,
	pub cigar: Vec<Cigar>,
	pub sequence: Box<[u8]>,
	pub qualities: Box<[u8]>,
	pub mismatches: Option<Box<str>>,
}

impl AlignmentRecord
{
	pub fn alignment_end(start: u32, cigar: &[Cigar]) -> u32
	{
		let span: u32 = cigar
			.iter()
			.filter(|op| op.consumes_reference())
			.map(Cigar::len)
			.fold(0u32, u32::saturating_add);

		start.saturating_add(span.saturating_sub(1))
	}

	pub fn is_first_of_pair(&self) -> bool
	{
		self.flags.contains(Flags::FIRST_IN_PAIR)
	}

	pub fn query_len(&self) -> usize
	{
		self.cigar
			.iter()
			.filter(|op| op.consumes_read())
			.map(|op| op.len() as usize)
			.sum()
	}

	/// A record can only be piled up when it has bases and its CIGAR accounts
	/// for every one of them.
	pub fn is_well_formed(&self) -> bool
	{
		!self.cigar.is_empty()
			&& !self.sequence.is_empty()
			&& self.query_len() == self.sequence.len()
			&& (self.qualities.is_empty() || self.qualities.len() == self.sequence.len())
	}

	/// Maps a reference coordinate to a 0-based offset into `sequence`.
	/// Returns `None` when the coordinate is outside the alignment or falls in a
	/// deletion or skipped region.
	pub fn read_offset_at(&self, ref_pos: u32) -> Option<usize>
	{
		if ref_pos < self.start || ref_pos > self.end
		{
			return None;
		}

		let mut ref_index = self.start;
		let mut read_index = 0usize;

		for op in &self.cigar
		{
			let length = op.len();
			match op
			{
				Cigar::Match(_) =>
				{
					if ref_pos < ref_index + length
					{
						return Some(read_index + (ref_pos - ref_index) as usize);
					}
					ref_index += length;
					read_index += length as usize;
				}
				Cigar::Deletion(_) | Cigar::Skip(_) =>
				{
					if ref_pos < ref_index + length
					{
						return None;
					}
					ref_index += length;
				}
				Cigar::Insertion(_) | Cigar::Softclip(_) =>
				{
					read_index += length as usize;
				}
				Cigar::Hardclip(_) | Cigar::Padding(_) =>
				{}
			}
		}

		None
	}

	/// Resolves what the record's `MD:Z` descriptor says about `ref_pos`.
	pub fn reference_at(&self, ref_pos: u32) -> error::Result<Option<MdBase>>
	{
		let text = match &self.mismatches
		{
			Some(text) if !text.is_empty() => text,
			_ => return Ok(None),
		};

		let descriptor = MismatchDescriptor::parse(text)?;

		let mut ref_index = self.start;
		let mut md_index = 0u32;
		let mut target = None;

		for op in &self.cigar
		{
			let length = op.len();
			match op
			{
				Cigar::Match(_) | Cigar::Deletion(_) =>
				{
					if target.is_none() && ref_pos >= ref_index && ref_pos < ref_index + length
					{
						target = Some(md_index + (ref_pos - ref_index));
					}
					ref_index += length;
					md_index += length;
				}
				Cigar::Skip(_) =>
				{
					ref_index += length;
				}
				_ =>
				{}
			}
		}

		if md_index != descriptor.reference_len()
		{
			return Err(error::Error::MismatchDescriptor(text.to_string()));
		}

		Ok(target.and_then(|index| descriptor.base_at(index)))
	}

	/// Parses one SAM text line. Only the fields the pileup needs are kept.
	pub fn from_sam_line(line: &str) -> error::Result<Self>
	{
		let invalid = |reason: &str| error::Error::SamLine(format!("{} in '{}'", reason, line));

		let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
		if fields.len() < 11
		{
			return Err(invalid("fewer than 11 columns"));
		}

		let flags = fields[1]
			.parse::<u16>()
			.map(Flags::from_bits_retain)
			.map_err(|_| invalid("bad FLAG"))?;
		let start = fields[3].parse::<u32>().map_err(|_| invalid("bad POS"))?;
		let mapping_quality = fields[4].parse::<u8>().map_err(|_| invalid("bad MAPQ"))?;
		let cigar = parse_cigar(fields[5])?;

		let sequence: Box<[u8]> = match fields[9]
		{
			"*" => Box::default(),
			seq => seq.as_bytes().to_ascii_uppercase().into_boxed_slice(),
		};

		let qualities: Box<[u8]> = match fields[10]
		{
			"*" => Box::default(),
			qual => qual.bytes().map(|q| q.saturating_sub(33)).collect(),
		};

		let mismatches = fields[11..]
			.iter()
			.find_map(|tag| tag.strip_prefix("MD:Z:"))
			.map(Box::from);

		Ok(AlignmentRecord {
			name: Box::from(fields[0]),
			reference: Box::from(fields[2]),
			start,
			end: Self::alignment_end(start, &cigar),
			flags,
			mapping_quality,
			cigar,
			sequence,
			qualities,
			mismatches,
		})
	}
}
