mod filter;
mod observation;

pub use crate::pileup::filter::*;
pub use crate::pileup::observation::*;

use std::fmt;

use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::alignment::AlignmentRecord;
use crate::position::{QueryPosition, VariantType};

pub fn output_header() -> String
{
	format!(
		"##cursorpile version {}\n#reference\tstart\tend\tref\talt\tsource\tref_count\talt_count\tpileup\n",
		env!("CARGO_PKG_VERSION")
	)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BaseCounts
{
	pub a: u32,
	pub c: u32,
	pub g: u32,
	pub t: u32,
	pub other: u32,
}

impl BaseCounts
{
	fn add(&mut self, base: u8)
	{
		match base
		{
			b'A' => self.a += 1,
			b'C' => self.c += 1,
			b'G' => self.g += 1,
			b'T' => self.t += 1,
			_ => self.other += 1,
		}
	}
}

/// Tallies for one site in one alignment source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PileupResult
{
	pub position: QueryPosition,
	pub total: u32,
	pub concordant_pairs: u32,
	pub discordant_pairs: u32,
	pub reference: u32,
	pub alternate: u32,
	pub bases: BaseCounts,
}

impl PileupResult
{
	pub fn empty(position: QueryPosition) -> Self
	{
		PileupResult {
			position,
			total: 0,
			concordant_pairs: 0,
			discordant_pairs: 0,
			reference: 0,
			alternate: 0,
			bases: BaseCounts::default(),
		}
	}

	/// `total[concordant,discordant,A#,C#,G#,T#,O#]`
	pub fn annotation(&self) -> String
	{
		format!(
			"{}[{},{},A{},C{},G{},T{},O{}]",
			self.total,
			self.concordant_pairs,
			self.discordant_pairs,
			self.bases.a,
			self.bases.c,
			self.bases.g,
			self.bases.t,
			self.bases.other
		)
	}

	pub fn to_line(&self, source: &str) -> String
	{
		let position = &self.position;

		format!(
			"{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
			position.reference,
			position.start,
			position.end,
			position.ref_allele.as_deref().unwrap_or("."),
			position.alt_allele.as_deref().unwrap_or("."),
			source,
			self.reference,
			self.alternate,
			self.annotation()
		)
	}
}

impl fmt::Display for PileupResult
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		write!(f, "{}", self.annotation())
	}
}

/// Reference span a record must cover to be informative: the site itself
/// for substitutions, one base before through two bases after the reference
/// allele for indels.
pub fn informative_window(position: &QueryPosition, variant_type: VariantType) -> (u32, u32)
{
	let ref_len = position.ref_len();

	if variant_type.is_indel()
	{
		(
			position.start.saturating_sub(1).max(1),
			position.start.saturating_add(ref_len).saturating_add(1),
		)
	}
	else
	{
		(position.start, position.last())
	}
}

#[derive(Debug, Default, Clone)]
pub struct PileupComputer
{
	filter: ReadFilter,
}

impl PileupComputer
{
	pub fn new(filter: ReadFilter) -> Self
	{
		PileupComputer { filter }
	}

	pub fn filter(&self) -> &ReadFilter
	{
		&self.filter
	}

	/// Piles up `pool` at `position`.
	pub fn compute(
		&self,
		position: &QueryPosition,
		pool: &[AlignmentRecord],
		reference: Option<&[u8]>,
	) -> PileupResult
	{
		let variant_type = position.variant_type();
		let (window_start, window_end) = informative_window(position, variant_type);

		let mut result = PileupResult::empty(position.clone());

		let mut mates: FxHashMap<&str, usize> = FxHashMap::default();
		let mut groups: Vec<Vec<(&AlignmentRecord, Observation)>> = Vec::new();

		for record in pool
		{
			if !record.is_well_formed()
			{
				warn!("Skipping malformed alignment {} at {}", record.name, position);
				continue;
			}

			if !self.filter.accepts(record)
				|| record.start > window_start
				|| record.end < window_end
				|| !self
					.filter
					.accepts_bases(record, variant_type, window_start, window_end)
			{
				continue;
			}

			result.total += 1;

			let observation = Observation::extract(record, position, variant_type);
			match mates.get(&*record.name)
			{
				Some(&index) => groups[index].push((record, observation)),
				None =>
				{
					mates.insert(&*record.name, groups.len());
					groups.push(vec![(record, observation)]);
				}
			}
		}

		for mut group in groups
		{
			if group.len() > 1
			{
				let seen: Vec<_> = group
					.iter()
					.map(|(record, _)| Observation::extract_for_mates(record, position, variant_type))
					.collect();
				let agree = seen.windows(2).all(|pair| pair[0] == pair[1]);
				if !agree
				{
					debug!("{} disagrees with its mate at {}", group[0].0.name, position);
					result.discordant_pairs += 1;
					continue;
				}
				result.concordant_pairs += 1;
			}

			// first-of-pair speaks for an agreeing pair
			let keep = group
				.iter()
				.position(|(record, _)| record.is_first_of_pair())
				.unwrap_or(0);
			let (record, observation) = group.swap_remove(keep);
			match classify(&observation, record, position, variant_type, reference)
			{
				Call::Reference => result.reference += 1,
				Call::Alternate => result.alternate += 1,
				Call::Base(base) => result.bases.add(base),
				Call::Other => result.bases.other += 1,
			}
		}

		result
	}
}
