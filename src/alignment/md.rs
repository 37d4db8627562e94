use crate::error;

#[derive(Debug, Clone, PartialEq, Eq)]
enum MdOp
{
	Match(u32),
	Mismatch(u8),
	Deletion(Box<[u8]>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MdBase
{
	Match,
	Mismatch(u8),
	Deleted(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchDescriptor
{
	ops: Vec<MdOp>,
}

impl MismatchDescriptor
{
	pub fn parse(text: &str) -> error::Result<Self>
	{
		let malformed = || error::Error::MismatchDescriptor(text.to_string());

		let bytes = text.as_bytes();
		if bytes.is_empty() || !bytes[0].is_ascii_digit()
		{
			return Err(malformed());
		}

		let mut ops = Vec::new();
		let mut offset = 0;

		while offset < bytes.len()
		{
			match bytes[offset]
			{
				b'0'..=b'9' =>
				{
					let digits = bytes[offset..]
						.iter()
						.take_while(|byte| byte.is_ascii_digit())
						.count();
					let count = text[offset..offset + digits]
						.parse::<u32>()
						.map_err(|_| malformed())?;
					if count > 0
					{
						ops.push(MdOp::Match(count));
					}
					offset += digits;
				}
				b'^' =>
				{
					let bases = bytes[offset + 1..]
						.iter()
						.take_while(|byte| byte.is_ascii_alphabetic())
						.count();
					if bases == 0
					{
						return Err(malformed());
					}
					let deleted = bytes[offset + 1..offset + 1 + bases].to_ascii_uppercase();
					ops.push(MdOp::Deletion(deleted.into_boxed_slice()));
					offset += 1 + bases;
				}
				byte if byte.is_ascii_alphabetic() =>
				{
					ops.push(MdOp::Mismatch(byte.to_ascii_uppercase()));
					offset += 1;
				}
				_ => return Err(malformed()),
			}
		}

		Ok(MismatchDescriptor { ops })
	}

	pub fn reference_len(&self) -> u32
	{
		self.ops
			.iter()
			.map(|op| match op
			{
				MdOp::Match(count) => *count,
				MdOp::Mismatch(_) => 1,
				MdOp::Deletion(bases) => bases.len() as u32,
			})
			.sum()
	}

	pub fn base_at(&self, index: u32) -> Option<MdBase>
	{
		let mut seen = 0;

		for op in &self.ops
		{
			match op
			{
				MdOp::Match(count) =>
				{
					if index < seen + count
					{
						return Some(MdBase::Match);
					}
					seen += count;
				}
				MdOp::Mismatch(base) =>
				{
					if index == seen
					{
						return Some(MdBase::Mismatch(*base));
					}
					seen += 1;
				}
				MdOp::Deletion(bases) =>
				{
					let len = bases.len() as u32;
					if index < seen + len
					{
						return Some(MdBase::Deleted(bases[(index - seen) as usize]));
					}
					seen += len;
				}
			}
		}

		None
	}
}
