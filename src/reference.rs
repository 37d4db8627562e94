use std::path::Path;

use log::info;
use rustc_hash::FxHashMap;

use crate::error;

pub trait ReferenceSource: Send + Sync
{
	fn bases(&self, reference: &str, start: u32, end: u32) -> Option<&[u8]>;
}

#[derive(Debug, Default)]
pub struct FastaReference
{
	sequences: FxHashMap<String, Vec<u8>>,
}

impl FastaReference
{
	pub async fn from_path(path: &Path) -> error::Result<Self>
	{
		let text = tokio::fs::read_to_string(path)
			.await
			.map_err(|_| error::Error::IOError(path.display().to_string()))?;

		let reference = Self::parse(&text)?;
		info!("Loaded {} sequences from {}", reference.sequences.len(), path.display());

		Ok(reference)
	}

	pub fn parse(text: &str) -> error::Result<Self>
	{
		let mut sequences = FxHashMap::default();
		let mut current: Option<(String, Vec<u8>)> = None;

		for line in text.lines()
		{
			let line = line.trim_end();
			if let Some(header) = line.strip_prefix('>')
			{
				let name = header
					.split_whitespace()
					.next()
					.ok_or_else(|| error::Error::FastaFormat("unnamed sequence".to_string()))?;

				if let Some((name, bases)) = current.take()
				{
					sequences.insert(name, bases);
				}
				current = Some((name.to_string(), Vec::new()));
			}
			else if !line.is_empty()
			{
				let (_, bases) = current.as_mut().ok_or_else(|| {
					error::Error::FastaFormat("sequence before first '>' header".to_string())
				})?;
				bases.extend(line.bytes().map(|base| base.to_ascii_uppercase()));
			}
		}

		if let Some((name, bases)) = current
		{
			sequences.insert(name, bases);
		}

		Ok(FastaReference { sequences })
	}

	pub fn insert(&mut self, name: impl Into<String>, bases: &[u8])
	{
		self.sequences.insert(name.into(), bases.to_ascii_uppercase());
	}
}

impl ReferenceSource for FastaReference
{
	fn bases(&self, reference: &str, start: u32, end: u32) -> Option<&[u8]>
	{
		if start == 0 || end < start
		{
			return None;
		}

		self.sequences
			.get(reference)
			.and_then(|bases| bases.get(start as usize - 1..end as usize))
	}
}
