use std::fmt;
use std::path::Path;

use futures::stream::{self, BoxStream, Stream, StreamExt};
use log::debug;
use tokio::fs::File as TokioFile;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader as TokioBufReader};

use crate::error;

// largest position a BAM record can carry
const MAX_COORDINATE: u32 = i32::MAX as u32;

/// Shape of a query site, derived from its alleles or its span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantType
{
	Snv,
	Mnv,
	Insertion,
	Deletion,
	Complex,
}

impl VariantType
{
	pub fn is_indel(&self) -> bool
	{
		matches!(self, VariantType::Insertion | VariantType::Deletion)
	}
}

/// A site to pile up. Coordinates are 1-based and `end` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPosition
{
	pub reference: String,
	pub start: u32,
	pub end: u32,
	pub ref_allele: Option<String>,
	pub alt_allele: Option<String>,
}

impl QueryPosition
{
	pub fn new(reference: impl Into<String>, start: u32, end: u32) -> Self
	{
		QueryPosition {
			reference: reference.into(),
			start,
			end,
			ref_allele: None,
			alt_allele: None,
		}
	}

	pub fn point(reference: impl Into<String>, start: u32) -> Self
	{
		Self::new(reference, start, start)
	}

	pub fn with_alleles(mut self, ref_allele: Option<&str>, alt_allele: Option<&str>) -> Self
	{
		self.ref_allele = ref_allele.map(str::to_ascii_uppercase);
		self.alt_allele = alt_allele.map(str::to_ascii_uppercase);
		self
	}

	pub fn variant_type(&self) -> VariantType
	{
		match (&self.ref_allele, &self.alt_allele)
		{
			(Some(reference), Some(alternate)) =>
			{
				let (ref_len, alt_len) = (reference.len(), alternate.len());

				if ref_len == alt_len
				{
					if ref_len == 1
					{
						VariantType::Snv
					}
					else
					{
						VariantType::Mnv
					}
				}
				else if ref_len == 1 && alt_len > 1
				{
					VariantType::Insertion
				}
				else if alt_len == 1 && ref_len > 1
				{
					VariantType::Deletion
				}
				else
				{
					VariantType::Complex
				}
			}
			_ if self.ref_len() == 1 => VariantType::Snv,
			_ => VariantType::Mnv,
		}
	}

	pub fn ref_len(&self) -> u32
	{
		match &self.ref_allele
		{
			Some(allele) if !allele.is_empty() => allele.len() as u32,
			_ => self.end.saturating_sub(self.start).saturating_add(1),
		}
	}

	pub fn last(&self) -> u32
	{
		self.start.saturating_add(self.ref_len() - 1)
	}
}

impl fmt::Display for QueryPosition
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		write!(f, "{}:{}-{}", self.reference, self.start, self.end)
	}
}

pub trait PositionSource: Stream<Item = error::Result<QueryPosition>> + Send + Unpin {}

impl<T> PositionSource for T where T: Stream<Item = error::Result<QueryPosition>> + Send + Unpin {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionFormat
{
	/// `reference start end [ref [alt]]`
	Tsv,
	/// `CHROM POS ID REF ALT ...`
	Vcf,
}

impl PositionFormat
{
	pub fn from_path(path: &Path) -> PositionFormat
	{
		let name = path.to_string_lossy().to_ascii_lowercase();
		if name.ends_with(".vcf")
		{
			PositionFormat::Vcf
		}
		else
		{
			PositionFormat::Tsv
		}
	}
}

pub struct PositionReader<R>
where
	R: AsyncBufRead + Unpin,
{
	reader: R,
	format: PositionFormat,
	line: String,
	line_number: usize,
}

impl PositionReader<TokioBufReader<TokioFile>>
{
	pub async fn from_path(path: &Path, format: PositionFormat) -> error::Result<Self>
	{
		let file = TokioFile::open(path)
			.await
			.map_err(|_| error::Error::IOError(path.display().to_string()))?;

		Ok(PositionReader::from_reader(TokioBufReader::new(file), format))
	}
}

impl<R> PositionReader<R>
where
	R: AsyncBufRead + Send + Unpin + 'static,
{
	pub fn from_reader(reader: R, format: PositionFormat) -> Self
	{
		PositionReader {
			reader,
			format,
			line: String::new(),
			line_number: 0,
		}
	}

	pub async fn read_position(&mut self) -> error::Result<Option<QueryPosition>>
	{
		loop
		{
			self.line.clear();
			if self.reader.read_line(&mut self.line).await? == 0
			{
				debug!("read {} position lines", self.line_number);
				return Ok(None);
			}
			self.line_number += 1;

			let line = self.line.trim_end_matches(['\r', '\n']);
			if line.trim().is_empty() || line.starts_with('#')
			{
				continue;
			}

			let position = match self.format
			{
				PositionFormat::Tsv => parse_tsv(line),
				PositionFormat::Vcf => parse_vcf(line),
			};

			return position
				.map(Some)
				.map_err(|reason| error::Error::PositionFormat {
					line: self.line_number,
					reason,
				});
		}
	}

	pub fn into_stream(self) -> BoxStream<'static, error::Result<QueryPosition>>
	{
		stream::try_unfold(self, |mut reader| async move {
			Ok(reader.read_position().await?.map(|position| (position, reader)))
		})
		.boxed()
	}
}

fn allele(field: Option<&str>) -> Option<&str>
{
	field.filter(|value| !value.is_empty() && *value != ".")
}

fn coordinate(field: Option<&str>, name: &str) -> Result<u32, String>
{
	let value = field.ok_or_else(|| format!("missing {}", name))?;
	match value.parse::<u32>()
	{
		Ok(coordinate) if (1..=MAX_COORDINATE).contains(&coordinate) => Ok(coordinate),
		_ => Err(format!("bad {} '{}'", name, value)),
	}
}

fn parse_tsv(line: &str) -> Result<QueryPosition, String>
{
	let mut fields = line.split_whitespace();

	let reference = fields.next().ok_or("missing reference")?;
	let start = coordinate(fields.next(), "start")?;
	let end = coordinate(fields.next(), "end")?;
	if end < start
	{
		return Err(format!("end {} before start {}", end, start));
	}

	let ref_allele = allele(fields.next());
	let alt_allele = allele(fields.next());

	Ok(QueryPosition::new(reference, start, end).with_alleles(ref_allele, alt_allele))
}

fn parse_vcf(line: &str) -> Result<QueryPosition, String>
{
	let fields: Vec<&str> = line.split('\t').collect();
	if fields.len() < 5
	{
		return Err("fewer than 5 VCF columns".to_string());
	}

	let start = coordinate(Some(fields[1]), "POS")?;
	let ref_allele = allele(Some(fields[3])).ok_or("missing REF")?;
	let alt_allele = allele(fields[4].split(',').next());

	let end = start.saturating_add(ref_allele.len() as u32 - 1);

	Ok(QueryPosition::new(fields[0], start, end).with_alleles(Some(ref_allele), alt_allele))
}
