use crate::alignment::{AlignmentRecord, Flags};
use crate::position::VariantType;

#[derive(Debug, Clone)]
pub struct ReadFilter
{
	pub keep_duplicates: bool,
	pub keep_secondary: bool,
	pub keep_supplementary: bool,
	pub min_mapping_quality: u8,
	pub min_base_quality: u8,
}

impl Default for ReadFilter
{
	fn default() -> Self
	{
		ReadFilter {
			keep_duplicates: false,
			keep_secondary: false,
			keep_supplementary: false,
			min_mapping_quality: 0,
			min_base_quality: 10,
		}
	}
}

impl ReadFilter
{
	pub fn set_keep_duplicates(&mut self, keep: bool) -> &mut Self
	{
		self.keep_duplicates = keep;
		self
	}

	pub fn set_keep_secondary(&mut self, keep: bool) -> &mut Self
	{
		self.keep_secondary = keep;
		self
	}

	pub fn set_keep_supplementary(&mut self, keep: bool) -> &mut Self
	{
		self.keep_supplementary = keep;
		self
	}

	pub fn set_min_mapping_quality(&mut self, quality: u8) -> &mut Self
	{
		self.min_mapping_quality = quality;
		self
	}

	pub fn set_min_base_quality(&mut self, quality: u8) -> &mut Self
	{
		self.min_base_quality = quality;
		self
	}

	pub fn accepts(&self, record: &AlignmentRecord) -> bool
	{
		let flags = record.flags;

		if flags.contains(Flags::UNMAPPED)
		{
			return false;
		}

		if (flags.contains(Flags::DUPLICATE) && !self.keep_duplicates)
			|| (flags.contains(Flags::SECONDARY) && !self.keep_secondary)
			|| (flags.contains(Flags::SUPPLEMENTARY) && !self.keep_supplementary)
		{
			return false;
		}

		record.mapping_quality >= self.min_mapping_quality
	}

	pub fn accepts_bases(
		&self,
		record: &AlignmentRecord,
		variant_type: VariantType,
		start: u32,
		end: u32,
	) -> bool
	{
		let (first, last) = match (record.read_offset_at(start), record.read_offset_at(end))
		{
			(Some(first), Some(last)) if first <= last => (first, last),
			_ => return true,
		};

		match variant_type
		{
			VariantType::Snv | VariantType::Mnv =>
			{
				record.qualities.is_empty()
					|| record.qualities[first..=last]
						.iter()
						.all(|&quality| quality >= self.min_base_quality)
			}
			VariantType::Insertion => !record.sequence[first + 1..=last].contains(&b'N'),
			VariantType::Deletion | VariantType::Complex => true,
		}
	}
}
