#![allow(dead_code)]

use std::path::Path;

use async_compression::tokio::write::GzipEncoder;
use tokio::io::AsyncWriteExt;

use cursorpile::alignment::{AlignmentRecord, Cigar};

/// Mates of one pair over chr11:282739-282786. The first carries A at
/// 282753 and 282768; the second C at 282753 and A at 282768.
pub const PAIR_FIRST: &str = "HVN7YBGXY:3:12503:8213:1979\t99\tchr11\t282739\t54\t30M2D13M3I3M25S\t=\t282739\t48\tCTTCTTCATCCACTATTTCAGGCAATGACAAACACTGTGCCATATGCTGTATCTTATACACATCACCCAGCCCA\tAAAAA//AE/EE/E//EEEA/E//EEE////A///EE/E/EEE/A/EEEEEE/EE/AAEEE/A/////A/</AE\tMD:Z:14C14T^GA0C0C14\tRG:Z:qtest::Test";
pub const PAIR_SECOND: &str = "HVN7YBGXY:3:12503:8213:1979\t147\tchr11\t282739\t60\t27S30M2D16M\t=\t282739\t-48\tGCAGCGTCAGAGGTTTATAAGTTACAGCTTCTTCATCCACTCTTTGAGGCAATGACAACCACTGTGCCATCTG\tAAAAA//AE/EE/E//EEEA/E//EEE////A///EE/E/EEE/A/EEEEEE/EE/AAEEE/A/////A/</A\tMD:Z:18C11^GA16\tRG:Z:20140717025441134";

/// Reads around an insertion at chr1:183014 and a deletion at chr1:197.
pub const INDEL_READS: [&str; 5] = [
	"1997_1173_1267\t113\tchr1\t64\t60\t125M1I9M2D16M\tchr1\t72846\t0\tGAAAATACTAAACCACACCAGGTGTGGTGTCACATGCCTGTGGTCTCAGGTACTTGGGAGGCTGAGGTGGGAGGATCGCTTGAACCCAGGAAGTTGAGGCTGCAGTGAGTTGTGATTACACCAGCCTGGGTGACAGTGTCACCCTGTCTCA\tJF7-<7--7-77-JJFFFJFJF<JJ<<JAFJAJJAAF<JJ<AFJ-JJAJJJAJAJJAAAJF-JFF7FFJFJAFAFAFJA<JF--FJA-F--JJAJJFJJ<FJJJJ<JJJJJJJJJJJJJJ<FAFJ<AA-JJJ<JJJJJJJJJFAFJAFFAA\tZC:i:5\tMD:Z:11G0T121^AG17\tPG:Z:MarkDuplicates.5\tRG:Z:20140717025441134",
	"1997_1173_1268\t177\tchr1\t67\t57\t131M2D20M\tchr1\t72680\t0\tAATACTAAAACACACCAGGTGTGGTGTCACATGCCTGTGGTCTCAGGNANTNGNGANGNTNAGGTGGGAGGATCGCTTGAACCCAGGAAGTTGAGGCTGCAGTGAGTTGTGATTACACCAGCCTGGGTGACAGTGTCACCCTGTCTCAAAA\tJJJJFJJFFFJJFJJJFFJJJJJJJJJJFJJJJJJJJJJJJJJJJJJ#J#J#J#JJ#J#F#JJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJJFJJJJJJJJFFFAA\tZC:i:4\tMD:Z:47A1G1A1C2C1G1C70^AG20\tPG:Z:MarkDuplicates.5\tRG:Z:20140717025441134",
	"1997_1173_1257\t163\tchr1\t182999\t60\t16M1I105M29S\t=\t183397\t540\tTACATTTAAAAATATGTTTTTTTAATAGAGACAGGGTCTCACTGTGTTGCCCAGGCTAGTCTCAAACTCCTGGGCTCAAATTATCCTCCCCACTTGGCCTCCCAAAAGGATTGGATTACAGGNANNNNNNNNNGNCNNNNNGCTAAAANTT\tAAFFFJJJJJJJJJJJAJJJFJJJJJJ<J7FFJF-JFAFJJ<AJAFAJFF-FJJ-FJJAAFFJAFA-FFAFF<FFAFJAFJ<JJA7F-<-AJ<<J<F<FFJ-J<A7J-F-FJA7-<F<7J<<#-#########A#A#####AAFFFJA#--\tZC:i:4\tMD:Z:23G38T0C57\tPG:Z:MarkDuplicates.5\tRG:Z:20140717025441134",
	"1997_1173_1258\t163\tchr1\t183001\t9\t14M2I106M29S\t=\t183287\t440\tCATTTAAAAATATGTTTTTTTTAATAGAGACAGGGTCTCACTGTGTTGCCCAGGCTAGTCTCAAACTCCTGGGCTCAAATTATCCTCCCCACTTGGCCTCCCAAAAGGATGGGATTACAGGCNTNNNNNNNNNCNCNNNNNCTAAAATNTT\tAFFFFJJJJJJJJJJJJJJJJJJJJJFJJJJJJJJJJJJJJJJJJJJJJFJJJJJJJJJAJJJJJJJJJJAFJJJFJJJJJJJJJJJJJJJJJJJFJFFFAJJJJJJJJJJJJJJJJJJJJJ#A#########J#A#####JFJJJJF#JF\tZC:i:4\tMD:Z:21G38T47T11\tPG:Z:MarkDuplicates.5\tRG:Z:20140717025441134",
	"1997_1173_1256\t99\tchr1\t183011\t60\t112M1D39M\t=\t183351\t491\tTATGTTTTTTAGTAGAGACAGGGTCTCACTGTGTTGCCCAGGCTAGTCTCTAACTCCTGGGCTCAAATTATCCTCCCCACTTGGCCTCCCAAAAGGATTGGATTACAGGCATAAGCCACTGCCCCAAGCCTAAAATTTTTTAAAGTACCAT\tFFFFFFJFJJJJFJJFJFJJFAJJJJJJJJJJFJJJJJJJFJJJJJJJFJFJJJJJJJJJFJAJJJJJJJJJJJJJJJJFJFJJJJFJJJFFFJJJJAFFJFJJJJJFJFJFJJJFJJJFFJJJAFFJJJJFAFJFFFJJAFFAJJJJFJ7\tZC:i:4\tMD:Z:112^A39\tPG:Z:MarkDuplicates.5\tRG:Z:20140717025441134",
];

pub fn records(lines: &[&str]) -> Vec<AlignmentRecord>
{
	lines
		.iter()
		.map(|line| AlignmentRecord::from_sam_line(line).unwrap())
		.collect()
}

/// An all-match read of `length` bases on `reference`.
pub fn synthetic(name: &str, reference: &str, start: u32, length: u32) -> AlignmentRecord
{
	let bases = "A".repeat(length as usize);
	let line = format!("{}\t0\t{}\t{}\t60\t{}M\t*\t0\t0\t{}\t*", name, reference, start, length, bases);
	AlignmentRecord::from_sam_line(&line).unwrap()
}

fn cigar_code(op: &Cigar) -> u32
{
	match op
	{
		Cigar::Match(_) => 0,
		Cigar::Insertion(_) => 1,
		Cigar::Deletion(_) => 2,
		Cigar::Skip(_) => 3,
		Cigar::Softclip(_) => 4,
		Cigar::Hardclip(_) => 5,
		Cigar::Padding(_) => 6,
	}
}

fn base_code(base: u8) -> u8
{
	b"=ACMGRSVTWYHKDBN"
		.iter()
		.position(|&b| b == base)
		.unwrap_or(15) as u8
}

fn encode(record: &AlignmentRecord, ref_id: i32) -> Vec<u8>
{
	let mut body = Vec::new();
	body.extend_from_slice(&ref_id.to_le_bytes());
	body.extend_from_slice(&(record.start as i32 - 1).to_le_bytes());
	body.push(record.name.len() as u8 + 1);
	body.push(record.mapping_quality);
	body.extend_from_slice(&0u16.to_le_bytes());
	body.extend_from_slice(&(record.cigar.len() as u16).to_le_bytes());
	body.extend_from_slice(&record.flags.bits().to_le_bytes());
	body.extend_from_slice(&(record.sequence.len() as u32).to_le_bytes());
	body.extend_from_slice(&(-1i32).to_le_bytes());
	body.extend_from_slice(&(-1i32).to_le_bytes());
	body.extend_from_slice(&0i32.to_le_bytes());
	body.extend_from_slice(record.name.as_bytes());
	body.push(0);
	for op in &record.cigar
	{
		body.extend_from_slice(&((op.len() << 4) | cigar_code(op)).to_le_bytes());
	}
	for pair in record.sequence.chunks(2)
	{
		body.push((base_code(pair[0]) << 4) | pair.get(1).map_or(0, |&b| base_code(b)));
	}
	if record.qualities.is_empty()
	{
		body.extend(std::iter::repeat(0xFFu8).take(record.sequence.len()));
	}
	else
	{
		body.extend_from_slice(&record.qualities);
	}
	if let Some(md) = &record.mismatches
	{
		body.extend_from_slice(b"MDZ");
		body.extend_from_slice(md.as_bytes());
		body.push(0);
	}

	let mut bytes = (body.len() as u32).to_le_bytes().to_vec();
	bytes.extend_from_slice(&body);
	bytes
}

/// Writes `lines` as a coordinate-sorted BAM, one gzip member per record.
pub async fn write_bam(path: &Path, references: &[(&str, u32)], lines: &[&str])
{
	let mut records = records(lines);
	let tid = |name: &str| references.iter().position(|(reference, _)| *reference == name).unwrap() as i32;
	records.sort_by_key(|record| (tid(&*record.reference), record.start));

	let mut header = b"BAM\x01".to_vec();
	header.extend_from_slice(&0u32.to_le_bytes());
	header.extend_from_slice(&(references.len() as u32).to_le_bytes());
	for (name, length) in references
	{
		header.extend_from_slice(&(name.len() as u32 + 1).to_le_bytes());
		header.extend_from_slice(name.as_bytes());
		header.push(0);
		header.extend_from_slice(&length.to_le_bytes());
	}

	let mut chunks = vec![header];
	chunks.extend(records.iter().map(|record| encode(record, tid(&*record.reference))));

	let mut out = Vec::new();
	for chunk in chunks
	{
		let mut encoder = GzipEncoder::new(Vec::new());
		encoder.write_all(&chunk).await.unwrap();
		encoder.shutdown().await.unwrap();
		out.extend_from_slice(&encoder.into_inner());
	}

	tokio::fs::write(path, out).await.unwrap();
}
