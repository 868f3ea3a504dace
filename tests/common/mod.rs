// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.
//!
//! Fixtures are generated with the crate's own writer and read back
//! through the mcap crate, so every test exercises real container
//! round trips instead of checked-in binary files.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use roboslice::{McapWriter, WriterOptions};

/// A unique temporary directory for one test.
pub fn temp_dir(name: &str) -> PathBuf {
    let random = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    let dir = std::env::temp_dir().join(format!("roboslice_test_{random}_{name}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// A schema attached to a fixture channel.
#[derive(Debug, Clone)]
pub struct FixtureSchema {
    pub name: &'static str,
    pub encoding: &'static str,
    pub data: &'static [u8],
}

impl FixtureSchema {
    pub fn ros2(name: &'static str) -> Self {
        Self {
            name,
            encoding: "ros2msg",
            data: b"int32 value",
        }
    }
}

/// One channel of a generated fixture file.
#[derive(Debug, Clone)]
pub struct FixtureChannel {
    pub topic: &'static str,
    pub schema: Option<FixtureSchema>,
    /// (log_time, payload) pairs
    pub messages: Vec<(u64, &'static [u8])>,
}

impl FixtureChannel {
    pub fn new(topic: &'static str, messages: Vec<(u64, &'static [u8])>) -> Self {
        Self {
            topic,
            schema: Some(FixtureSchema::ros2("test_msgs/msg/Value")),
            messages,
        }
    }

    pub fn schema_less(topic: &'static str, messages: Vec<(u64, &'static [u8])>) -> Self {
        Self {
            topic,
            schema: None,
            messages,
        }
    }
}

/// Write an indexed fixture file with the given channels.
///
/// Messages are written in global log-time order, the order an indexed
/// reader yields them in.
pub fn write_fixture(path: &Path, channels: &[FixtureChannel]) {
    let mut writer = McapWriter::create(path, WriterOptions::default()).unwrap();

    let mut channel_ids = Vec::new();
    for channel in channels {
        let schema_id = match &channel.schema {
            Some(schema) => writer
                .add_schema(schema.name, schema.encoding, schema.data)
                .unwrap(),
            None => 0,
        };
        let metadata = BTreeMap::new();
        let id = writer
            .add_channel(schema_id, channel.topic, "cdr", &metadata)
            .unwrap();
        channel_ids.push(id);
    }

    let mut timeline: Vec<(u64, u16, &[u8])> = Vec::new();
    for (index, channel) in channels.iter().enumerate() {
        for &(log_time, payload) in &channel.messages {
            timeline.push((log_time, channel_ids[index], payload));
        }
    }
    timeline.sort_by_key(|(log_time, _, _)| *log_time);

    let mut sequences: BTreeMap<u16, u32> = BTreeMap::new();
    for (log_time, channel_id, payload) in timeline {
        let sequence = sequences.entry(channel_id).or_insert(0);
        writer
            .write_message(channel_id, *sequence, log_time, log_time, payload)
            .unwrap();
        *sequence += 1;
    }

    writer.finish().unwrap();
}

/// The standard two-channel scenario: `/a` with messages at t=1,2 and
/// `/b` with one message at t=3.
pub fn write_standard_fixture(path: &Path) {
    write_fixture(
        path,
        &[
            FixtureChannel::new("/a", vec![(1, b"a1"), (2, b"a2")]),
            FixtureChannel::new("/b", vec![(3, b"b1")]),
        ],
    );
}

/// Read a whole output file into memory.
pub fn read_bytes(path: &Path) -> Vec<u8> {
    std::fs::read(path).unwrap()
}

/// Read back all messages as (topic, log_time, payload) triples, in
/// stream order.
pub fn read_messages(bytes: &[u8]) -> Vec<(String, u64, Vec<u8>)> {
    mcap::MessageStream::new(bytes)
        .unwrap()
        .map(|result| {
            let message = result.unwrap();
            (
                message.channel.topic.clone(),
                message.log_time,
                message.data.to_vec(),
            )
        })
        .collect()
}

/// Read back the summary section; panics if it is missing.
pub fn read_summary(bytes: &[u8]) -> mcap::Summary {
    mcap::Summary::read(bytes).unwrap().expect("summary section")
}
