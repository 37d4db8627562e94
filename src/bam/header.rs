use tokio::io::{AsyncRead, AsyncReadExt};

use log::debug;

use crate::error;

#[derive(Debug)]
pub struct TID
{
	pub name: Box<str>,
	pub length: u32,
}

#[derive(Debug)]
pub struct Header
{
	pub header: Box<str>,
	pub references: Vec<TID>,
}

impl Header
{
	pub fn ref_name(&self, ref_id: i32) -> Option<&TID>
	{
		usize::try_from(ref_id)
			.ok()
			.and_then(|index| self.references.get(index))
	}

	pub fn tid(&self, name: &str) -> Option<i32>
	{
		self.references
			.iter()
			.position(|reference| &*reference.name == name)
			.map(|index| index as i32)
	}
}

async fn read_u32<R>(reader: &mut R) -> error::Result<u32>
where
	R: AsyncRead + std::marker::Unpin,
{
	let mut bytes = [0u8; 4];
	reader
		.read_exact(&mut bytes)
		.await
		.map_err(|_| error::Error::BamFormat)?;

	Ok(u32::from_le_bytes(bytes))
}

async fn read_bytes<R>(reader: &mut R, length: usize) -> error::Result<Vec<u8>>
where
	R: AsyncRead + std::marker::Unpin,
{
	let mut bytes = vec![0u8; length];
	reader
		.read_exact(&mut bytes)
		.await
		.map_err(|_| error::Error::BamFormat)?;

	Ok(bytes)
}

fn nul_trimmed(bytes: &[u8]) -> &[u8]
{
	match bytes.iter().position(|&byte| byte == 0)
	{
		Some(nul) => &bytes[..nul],
		None => bytes,
	}
}

pub(crate) async fn read_bam_header<R>(reader: &mut R) -> error::Result<Header>
where
	R: AsyncRead + std::marker::Unpin,
{
	let magic = read_bytes(reader, 4).await?;
	if !is_valid_bam(&magic)
	{
		return Err(error::Error::BamFormat);
	}

	// obtain header text length
	let l_text = read_u32(reader).await? as usize;
	let text = read_bytes(reader, l_text).await?;

	let n_ref = read_u32(reader).await?;
	debug!("n_ref: {}", n_ref);

	let mut references = Vec::<TID>::with_capacity(n_ref as usize);

	for _ in 0..n_ref
	{
		let l_name = read_u32(reader).await? as usize;
		let name = read_bytes(reader, l_name).await?;
		let l_ref = read_u32(reader).await?;

		let name = String::from_utf8_lossy(nul_trimmed(&name)).into_owned();
		debug!("l_name = {}, name = {}, l_ref = {}", l_name, name, l_ref);

		references.push(TID {
			name: name.into_boxed_str(),
			length: l_ref,
		});
	}

	Ok(Header {
		header: String::from_utf8_lossy(nul_trimmed(&text))
			.into_owned()
			.into_boxed_str(),
		references,
	})
}

pub(crate) fn is_valid_bam(bytes: &[u8]) -> bool
{
	// check for magic BAM string ('BAM\1')
	bytes.len() >= 4 && bytes[0] == b'B' && bytes[1] == b'A' && bytes[2] == b'M' && bytes[3] == 1
}
