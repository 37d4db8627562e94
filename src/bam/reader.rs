use tokio::fs::File as TokioFile;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader as TokioBufReader};

use std::path::Path;

use log::debug;

use async_compression::tokio::bufread::GzipDecoder;

use crate::bam::{self, Field, Header};
use crate::error;

// upper bound on one alignment block
const MAX_BLOCK_SIZE: usize = 256 * 1024 * 1024;

pub struct Reader<R>
where
	R: AsyncRead + std::marker::Unpin,
{
	decoder: GzipDecoder<TokioBufReader<R>>,
	header: Header,
	records: usize,
}

impl Reader<TokioFile>
{
	pub async fn from_path(path: &Path) -> error::Result<Reader<TokioFile>>
	{
		let file = TokioFile::open(path)
			.await
			.map_err(|_| error::Error::IOError(path.display().to_string()))?;

		Reader::from_reader(file).await
	}
}

impl<R> Reader<R>
where
	R: AsyncRead + std::marker::Unpin,
{
	pub async fn from_reader(reader: R) -> error::Result<Reader<R>>
	{
		let mut decoder = GzipDecoder::new(TokioBufReader::new(reader));
		decoder.multiple_members(true);

		let header = bam::header::read_bam_header(&mut decoder).await?;

		Ok(Reader {
			decoder,
			header,
			records: 0,
		})
	}

	pub fn header(&self) -> &Header
	{
		&self.header
	}

	pub async fn read_record(&mut self) -> error::Result<Option<Field>>
	{
		let mut size = [0u8; 4];
		if !fill_or_eof(&mut self.decoder, &mut size).await?
		{
			debug!("EOF after {} records", self.records);
			return Ok(None);
		}

		let block_size = u32::from_le_bytes(size) as usize;
		if block_size > MAX_BLOCK_SIZE
		{
			return Err(error::Error::BamBlockSize(block_size));
		}

		let mut bytes = vec![0u8; block_size];
		self.decoder.read_exact(&mut bytes).await?;
		self.records += 1;

		bam::decode_record(&bytes, &self.header).map(Some)
	}
}

async fn fill_or_eof<R>(reader: &mut R, buf: &mut [u8]) -> error::Result<bool>
where
	R: AsyncRead + std::marker::Unpin,
{
	let mut filled = 0;

	while filled < buf.len()
	{
		let n = reader.read(&mut buf[filled..]).await?;
		if n == 0
		{
			if filled == 0
			{
				return Ok(false);
			}

			return Err(std::io::Error::new(
				std::io::ErrorKind::UnexpectedEof,
				"BAM stream ends inside a block size",
			)
			.into());
		}
		filled += n;
	}

	Ok(true)
}
