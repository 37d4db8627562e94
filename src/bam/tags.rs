use crate::error;

fn value_size(val_type: u8) -> Option<usize>
{
	match val_type
	{
		b'A' | b'c' | b'C' => Some(std::mem::size_of::<u8>()),
		b's' | b'S' => Some(std::mem::size_of::<u16>()),
		b'i' | b'I' | b'f' => Some(std::mem::size_of::<u32>()),
		_ => None,
	}
}

fn truncated(bytes: &[u8]) -> error::Error
{
	error::Error::BamRecord(bytes.len())
}

pub(crate) fn find_mismatch_descriptor(bytes: &[u8]) -> error::Result<Option<Box<str>>>
{
	let mut offset = 0;
	let mut found = None;

	while offset < bytes.len()
	{
		// tag (char[2]) + val_type (char)
		let header = bytes.get(offset..offset + 3).ok_or_else(|| truncated(bytes))?;
		let (tag, val_type) = (&header[..2], header[2]);
		offset += 3;

		match val_type
		{
			b'Z' | b'H' =>
			{
				let null_offset = bytes[offset..]
					.iter()
					.position(|&byte| byte == 0)
					.ok_or_else(|| truncated(bytes))?;

				if tag == b"MD" && val_type == b'Z'
				{
					let value = String::from_utf8_lossy(&bytes[offset..offset + null_offset]);
					found = Some(value.into_owned().into_boxed_str());
				}

				offset += null_offset + 1; // Skip null terminator
			}
			b'B' =>
			{
				// Byte array (Array of typed values)
				let array_header = bytes.get(offset..offset + 5).ok_or_else(|| truncated(bytes))?;
				let array_type = array_header[0];
				let array_len = u32::from_le_bytes([
					array_header[1],
					array_header[2],
					array_header[3],
					array_header[4],
				]) as usize;

				let size = value_size(array_type)
					.ok_or(error::Error::BamArrayType(array_type as char))?;

				offset += 5 + array_len * size;
			}
			_ =>
			{
				let size = value_size(val_type).ok_or(error::Error::BamTagType(val_type as char))?;
				offset += size;
			}
		}

		if offset > bytes.len()
		{
			return Err(truncated(bytes));
		}
	}

	Ok(found)
}
