mod header;
mod reader;
mod tags;

pub use crate::bam::header::*;
pub use crate::bam::reader::*;

use crate::alignment::{AlignmentRecord, Flags};
use crate::error;

const ALPHABET: [u8; 16] = [
	b'=', b'A', b'C', b'M', b'G', b'R', b'S', b'V', b'T', b'W', b'Y', b'H', b'K', b'D', b'B', b'N',
];

#[derive(Debug)]
pub struct Field
{
	pub ref_id: i32,
	pub record: AlignmentRecord,
}

fn le_u16(bytes: &[u8], offset: usize) -> u16
{
	u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn le_u32(bytes: &[u8], offset: usize) -> u32
{
	u32::from_le_bytes([
		bytes[offset],
		bytes[offset + 1],
		bytes[offset + 2],
		bytes[offset + 3],
	])
}

pub(crate) fn decode_record(bytes: &[u8], header: &Header) -> error::Result<Field>
{
	let truncated = || error::Error::BamRecord(bytes.len());

	if bytes.len() < 32
	{
		return Err(truncated());
	}

	// refID - int32_t
	let ref_id = le_u32(bytes, 0) as i32;
	// pos - int32_t, 0-based
	let pos = le_u32(bytes, 4) as i32;
	// l_read_name - uint8_t
	let l_read_name = bytes[8] as usize;
	// mapq - uint8_t
	let mapq = bytes[9];
	// n_cigar_op - uint16_t
	let n_cigar_op = le_u16(bytes, 12) as usize;
	// flag - uint16_t
	let flag = le_u16(bytes, 14);
	// l_seq - uint32_t
	let l_seq = le_u32(bytes, 16) as usize;

	let mut offset = 32;

	// read_name - char[l_read_name]
	let read_name = bytes
		.get(offset..offset + l_read_name)
		.ok_or_else(truncated)?;
	let read_name = match read_name.split_last()
	{
		Some((0, name)) => name,
		_ => read_name,
	};
	offset += l_read_name;

	// cigar - uint32_t[n_cigar_op]
	let cigar_bytes = bytes
		.get(offset..offset + n_cigar_op * 4)
		.ok_or_else(truncated)?;
	let cigar = crate::alignment::decode_cigar(cigar_bytes)?;
	offset += n_cigar_op * 4;

	// seq - uint8_t[(l_seq + 1) / 2]
	let packed = bytes
		.get(offset..offset + (l_seq + 1) / 2)
		.ok_or_else(truncated)?;
	let sequence = process_sequence(packed, l_seq);
	offset += (l_seq + 1) / 2;

	// qual - char[l_seq]
	let qual = bytes.get(offset..offset + l_seq).ok_or_else(truncated)?;
	let qualities: Box<[u8]> = if qual.first() == Some(&0xFF)
	{
		Box::default()
	}
	else
	{
		Box::from(qual)
	};
	offset += l_seq;

	let mismatches = tags::find_mismatch_descriptor(&bytes[offset..])?;

	let reference = header
		.ref_name(ref_id)
		.map(|tid| tid.name.clone())
		.unwrap_or_else(|| Box::from("*"));

	let start = (pos + 1).max(0) as u32;

	Ok(Field {
		ref_id,
		record: AlignmentRecord {
			name: String::from_utf8_lossy(read_name).into_owned().into_boxed_str(),
			reference,
			start,
			end: AlignmentRecord::alignment_end(start, &cigar),
			flags: Flags::from_bits_retain(flag),
			mapping_quality: mapq,
			cigar,
			sequence,
			qualities,
			mismatches,
		},
	})
}

fn process_sequence(bytes: &[u8], l_seq: usize) -> Box<[u8]>
{
	let mut seq = Vec::with_capacity(l_seq + 1);

	for byte in bytes
	{
		seq.push(ALPHABET[(byte >> 4) as usize]);
		seq.push(ALPHABET[(byte & 0x0F) as usize]);
	}

	// Trim the sequence to the exact length if necessary
	seq.truncate(l_seq);

	seq.into_boxed_slice()
}
