use log::warn;

use crate::alignment::{AlignmentRecord, MdBase};
use crate::position::{QueryPosition, VariantType};

/// What one record shows at a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation
{
	/// Read bases spanning the site. For indels this runs from the anchor base
	/// up to, not including, the first base after the reference allele.
	Bases(Vec<u8>),
	/// A site coordinate falls inside a read deletion.
	Gap,
}

impl Observation
{
	pub fn extract(record: &AlignmentRecord, position: &QueryPosition, variant_type: VariantType) -> Observation
	{
		let start = position.start;
		let ref_len = position.ref_len();

		let (first, last) = match variant_type
		{
			VariantType::Snv | VariantType::Mnv | VariantType::Complex =>
			{
				match (
					record.read_offset_at(start),
					record.read_offset_at(position.last()),
				)
				{
					(Some(first), Some(last)) => (first, last + 1),
					_ => return Observation::Gap,
				}
			}
			VariantType::Insertion | VariantType::Deletion =>
			{
				match (record.read_offset_at(start), record.read_offset_at(start.saturating_add(ref_len)))
				{
					(Some(first), Some(last)) => (first, last),
					_ => return Observation::Gap,
				}
			}
		};

		match record.sequence.get(first..last)
		{
			Some(bases) if !bases.is_empty() => Observation::Bases(bases.to_vec()),
			_ => Observation::Gap,
		}
	}

	/// What mates are compared on: the site bases followed by any bases the
	/// read inserts before the next reference base.
	pub fn extract_for_mates(
		record: &AlignmentRecord,
		position: &QueryPosition,
		variant_type: VariantType,
	) -> Observation
	{
		let observation = Observation::extract(record, position, variant_type);

		// indel runs already reach the base after the reference allele
		if variant_type.is_indel()
		{
			return observation;
		}

		let mut bases = match observation
		{
			Observation::Bases(bases) => bases,
			Observation::Gap => return Observation::Gap,
		};

		let following = record.read_offset_at(position.last().saturating_add(1));
		if let (Some(first), Some(following)) = (record.read_offset_at(position.start), following)
		{
			if let Some(inserted) = record.sequence.get(first + bases.len()..following)
			{
				bases.extend_from_slice(inserted);
			}
		}

		Observation::Bases(bases)
	}
}

/// Where a surviving observation is tallied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call
{
	Reference,
	Alternate,
	Base(u8),
	Other,
}

pub(crate) fn classify(
	observation: &Observation,
	record: &AlignmentRecord,
	position: &QueryPosition,
	variant_type: VariantType,
	reference: Option<&[u8]>,
) -> Call
{
	let alt = position.alt_allele.as_deref().map(str::as_bytes);

	match variant_type
	{
		VariantType::Deletion => match observation
		{
			Observation::Gap => Call::Other,
			Observation::Bases(bases) if bases.len() == 1 => Call::Alternate,
			Observation::Bases(bases) if bases.len() >= position.ref_len() as usize => Call::Reference,
			Observation::Bases(_) => Call::Other,
		},
		VariantType::Insertion => match observation
		{
			Observation::Gap => Call::Reference,
			Observation::Bases(bases) if bases.len() == 1 => Call::Reference,
			Observation::Bases(bases) if Some(bases.as_slice()) == alt => Call::Alternate,
			Observation::Bases(_) => Call::Other,
		},
		VariantType::Snv | VariantType::Mnv | VariantType::Complex =>
		{
			let bases = match observation
			{
				Observation::Gap => return Call::Other,
				Observation::Bases(bases) => bases.as_slice(),
			};

			let is_reference = match position.ref_allele.as_deref()
			{
				Some(allele) => bases == allele.as_bytes(),
				None => carries_reference(record, position, bases, reference),
			};

			if is_reference
			{
				Call::Reference
			}
			else if Some(bases) == alt
			{
				Call::Alternate
			}
			else
			{
				match bases
				{
					[base @ (b'A' | b'C' | b'G' | b'T')] => Call::Base(*base),
					_ => Call::Other,
				}
			}
		}
	}
}

// MD first, then the supplied reference bases
fn carries_reference(
	record: &AlignmentRecord,
	position: &QueryPosition,
	bases: &[u8],
	reference: Option<&[u8]>,
) -> bool
{
	let end = position.last();
	let mut described = true;

	for coordinate in position.start..=end
	{
		match record.reference_at(coordinate)
		{
			Ok(Some(MdBase::Match)) =>
			{}
			Ok(Some(_)) => return false,
			Ok(None) =>
			{
				described = false;
				break;
			}
			Err(err) =>
			{
				warn!("{} at {}: {}, comparing with reference bases", record.name, position, err);
				described = false;
				break;
			}
		}
	}

	if described
	{
		return true;
	}

	match reference
	{
		Some(reference) => reference.eq_ignore_ascii_case(bases),
		None => false,
	}
}
