// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Reader/writer round-trip tests.

mod common;

use common::{temp_dir, write_fixture, write_standard_fixture, FixtureChannel};
use roboslice::{IndexedMcapReader, SliceError};

#[test]
fn test_reader_exposes_summary_tables() {
    let dir = temp_dir("io_tables");
    let input = dir.join("log.mcap");
    write_standard_fixture(&input);

    let reader = IndexedMcapReader::open(&input).unwrap();

    assert_eq!(reader.channels().len(), 2);
    assert_eq!(reader.schemas().len(), 2);
    assert_eq!(reader.message_count(), 3);

    let mut topics: Vec<String> = reader
        .channels()
        .values()
        .map(|channel| channel.topic.clone())
        .collect();
    topics.sort();
    assert_eq!(topics, vec!["/a".to_string(), "/b".to_string()]);

    for channel in reader.channels().values() {
        assert_ne!(channel.schema_id, 0);
        assert!(reader.schema(channel.schema_id).is_some());
    }
}

#[test]
fn test_reader_yields_messages_in_log_time_order() {
    let dir = temp_dir("io_order");
    let input = dir.join("log.mcap");
    write_fixture(
        &input,
        &[
            FixtureChannel::new("/a", vec![(1, b"1"), (4, b"4")]),
            FixtureChannel::new("/b", vec![(2, b"2"), (3, b"3")]),
        ],
    );

    let reader = IndexedMcapReader::open(&input).unwrap();
    let times: Vec<u64> = reader
        .messages()
        .unwrap()
        .map(|result| result.unwrap().log_time)
        .collect();
    assert_eq!(times, vec![1, 2, 3, 4]);
}

#[test]
fn test_reader_resolves_message_channels() {
    let dir = temp_dir("io_resolve");
    let input = dir.join("log.mcap");
    write_standard_fixture(&input);

    let reader = IndexedMcapReader::open(&input).unwrap();
    for result in reader.messages().unwrap() {
        let message = result.unwrap();
        assert!(reader.channel(message.channel_id).is_some());
    }
}

#[test]
fn test_open_missing_file_is_open_error() {
    let dir = temp_dir("io_missing");
    let result = IndexedMcapReader::open(dir.join("absent.mcap"));
    assert!(matches!(result, Err(SliceError::Open { .. })));
}

#[test]
fn test_open_non_mcap_file_fails() {
    let dir = temp_dir("io_garbage");
    let path = dir.join("garbage.mcap");
    std::fs::write(&path, b"this is not an mcap file at all").unwrap();

    let result = IndexedMcapReader::open(&path);
    assert!(result.is_err());
}
