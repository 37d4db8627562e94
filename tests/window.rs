mod common;

use futures::stream::{self, StreamExt};

use cursorpile::alignment::AlignmentRecord;
use cursorpile::position::QueryPosition;
use cursorpile::window::WindowManager;

use common::synthetic;

fn window(records: Vec<AlignmentRecord>) -> WindowManager
{
	WindowManager::new("chr", stream::iter(records.into_iter().map(Ok)).boxed())
}

fn sizes(window: &WindowManager) -> (usize, usize)
{
	(window.current().len(), window.next().len())
}

fn assert_pools_consistent(window: &WindowManager, position: &QueryPosition)
{
	for record in window.current()
	{
		assert!(record.end >= position.start, "{} ends before {}", record.name, position);
		assert!(record.start <= position.end, "{} starts after {}", record.name, position);
	}
	for record in window.next()
	{
		assert!(record.start > position.end, "{} should be current at {}", record.name, position);
	}
	for pool in [window.current(), window.next()]
	{
		assert!(pool.windows(2).all(|pair| pair[0].start <= pair[1].start));
		assert!(pool.iter().all(|record| &*record.reference == "chr"));
	}
	for record in window.current()
	{
		assert!(!window.next().iter().any(|other| other.name == record.name));
	}
}

fn four_records() -> Vec<AlignmentRecord>
{
	vec![
		synthetic("r1", "chr", 282735, 21),
		synthetic("r2", "chr", 282740, 21),
		synthetic("r3", "chr", 282758, 21),
		synthetic("r4", "chr", 282765, 11),
	]
}

#[tokio::test]
async fn pools_follow_four_positions()
{
	let mut window = window(four_records());

	let expected = [(282753, (2, 1)), (282757, (1, 1)), (282768, (2, 0)), (282783, (0, 0))];

	for (start, pools) in expected
	{
		let position = QueryPosition::point("chr", start);
		window.advance(&position).await.unwrap();

		assert_eq!(sizes(&window), pools, "at {}", start);
		assert_pools_consistent(&window, &position);
	}

	assert!(window.is_exhausted());
}

#[tokio::test]
async fn advancing_twice_to_one_position_changes_nothing()
{
	let mut window = window(four_records());

	for start in [282753, 282757, 282768, 282783]
	{
		let position = QueryPosition::point("chr", start);
		window.advance(&position).await.unwrap();

		let names = |pool: &[AlignmentRecord]| pool.iter().map(|r| r.name.to_string()).collect::<Vec<_>>();
		let before = (names(window.current()), names(window.next()));

		window.advance(&position).await.unwrap();
		assert_eq!((names(window.current()), names(window.next())), before);
	}
}

#[tokio::test]
async fn pools_stay_consistent_over_dense_positions()
{
	// staggered reads of varying length, several starting at the same base
	let mut records = Vec::new();
	for index in 0..60u32
	{
		let start = 1000 + (index / 2) * 7;
		let length = 5 + (index * 13) % 40;
		records.push(synthetic(&format!("read{}", index), "chr", start, length));
	}

	let mut window = window(records.clone());
	let mut position_start = 990;

	while position_start < 1300
	{
		let span = position_start % 3;
		let position = QueryPosition::new("chr", position_start, position_start + span);
		window.advance(&position).await.unwrap();
		assert_pools_consistent(&window, &position);

		// nothing overlapping the position is missing from current
		let overlapping = records
			.iter()
			.filter(|record| record.end >= position.start && record.start <= position.end)
			.count();
		assert_eq!(window.current().len(), overlapping, "at {}", position);

		position_start += 1 + (position_start % 5);
	}
}

#[tokio::test]
async fn empty_source_gives_empty_pools()
{
	let mut window = window(Vec::new());
	let position = QueryPosition::point("chr", 10);

	window.advance(&position).await.unwrap();
	assert_eq!(sizes(&window), (0, 0));
	assert!(window.is_exhausted());
}

#[tokio::test]
async fn gap_between_reads_gives_empty_current()
{
	let mut window = window(vec![synthetic("a", "chr", 100, 10), synthetic("b", "chr", 200, 10)]);

	window.advance(&QueryPosition::point("chr", 150)).await.unwrap();
	assert_eq!(sizes(&window), (0, 1));

	window.advance(&QueryPosition::point("chr", 205)).await.unwrap();
	assert_eq!(sizes(&window), (1, 0));
}
