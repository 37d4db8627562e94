use crate::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cigar
{
	Match(u32),
	Insertion(u32),
	Deletion(u32),
	Skip(u32),
	Softclip(u32),
	Hardclip(u32),
	Padding(u32),
}

const CIGAR_OPS: [u8; 9] = [b'M', b'I', b'D', b'N', b'S', b'H', b'P', b'=', b'X'];

impl Cigar
{
	fn from(opcode: u8, length: u32) -> Option<Self>
	{
		match opcode
		{
			b'M' | b'=' | b'X' => Some(Cigar::Match(length)),
			b'I' => Some(Cigar::Insertion(length)),
			b'D' => Some(Cigar::Deletion(length)),
			b'N' => Some(Cigar::Skip(length)),
			b'S' => Some(Cigar::Softclip(length)),
			b'H' => Some(Cigar::Hardclip(length)),
			b'P' => Some(Cigar::Padding(length)),
			_ => None,
		}
	}

	pub fn len(&self) -> u32
	{
		match *self
		{
			Cigar::Match(length)
			| Cigar::Insertion(length)
			| Cigar::Deletion(length)
			| Cigar::Skip(length)
			| Cigar::Softclip(length)
			| Cigar::Hardclip(length)
			| Cigar::Padding(length) => length,
		}
	}

	pub fn consumes_reference(&self) -> bool
	{
		matches!(self, Cigar::Match(_) | Cigar::Deletion(_) | Cigar::Skip(_))
	}

	pub fn consumes_read(&self) -> bool
	{
		matches!(self, Cigar::Match(_) | Cigar::Insertion(_) | Cigar::Softclip(_))
	}
}

pub(crate) fn decode_cigar(bytes: &[u8]) -> error::Result<Vec<Cigar>>
{
	let mut cigar = Vec::with_capacity(bytes.len() / 4);

	for chunk in bytes.chunks_exact(4)
	{
		let cigar_enc = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);

		let op = (cigar_enc & 0xF) as usize; // Extract operation code
		let length = cigar_enc >> 4; // Extract length

		let op = CIGAR_OPS
			.get(op)
			.and_then(|&opcode| Cigar::from(opcode, length))
			.ok_or_else(|| error::Error::Cigar(format!("opcode {}", op)))?;

		cigar.push(op);
	}

	Ok(cigar)
}

pub fn parse_cigar(text: &str) -> error::Result<Vec<Cigar>>
{
	if text == "*"
	{
		return Ok(Vec::new());
	}

	let mut cigar = Vec::new();
	let mut length: Option<u32> = None;

	for byte in text.bytes()
	{
		if byte.is_ascii_digit()
		{
			let digit = (byte - b'0') as u32;
			length = length
				.unwrap_or(0)
				.checked_mul(10)
				.and_then(|value| value.checked_add(digit))
				.map(Some)
				.ok_or_else(|| error::Error::Cigar(text.to_string()))?;
			continue;
		}

		let op = length
			.take()
			.and_then(|length| Cigar::from(byte, length))
			.ok_or_else(|| error::Error::Cigar(text.to_string()))?;

		cigar.push(op);
	}

	if length.is_some()
	{
		return Err(error::Error::Cigar(text.to_string()));
	}

	Ok(cigar)
}
