// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Identifier remapping between a source file and one output file.
//!
//! Each output writer session owns one [`RemapTable`]. Source-scoped
//! schema and channel identifiers never cross a writer boundary: the
//! table registers a copy of each record on first use and hands back the
//! output-scoped identifier the writer assigned, memoized per source ID.

use std::collections::HashMap;
use std::io::Write;

use crate::core::{Result, SliceError};
use crate::io::reader::{ChannelInfo, SchemaInfo};
use crate::io::writer::McapWriter;

/// Per-output translation of source identifiers to output identifiers.
#[derive(Debug, Default)]
pub struct RemapTable {
    /// source schema ID -> output schema ID
    schemas: HashMap<u16, u16>,
    /// source channel ID -> output channel ID
    channels: HashMap<u16, u16>,
}

impl RemapTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a copy of `schema` into `writer` on first use and
    /// return the output schema ID; later calls with the same source ID
    /// return the remembered ID without re-registering.
    pub fn ensure_schema<W: Write>(
        &mut self,
        writer: &mut McapWriter<W>,
        schema: &SchemaInfo,
    ) -> Result<u16> {
        if schema.id == 0 {
            return Err(SliceError::write(
                "RemapTable",
                format!("Schema '{}' carries reserved ID 0", schema.name),
            ));
        }

        if let Some(&id) = self.schemas.get(&schema.id) {
            return Ok(id);
        }

        let id = writer.add_schema(&schema.name, &schema.encoding, &schema.data)?;
        self.schemas.insert(schema.id, id);
        Ok(id)
    }

    /// Register a copy of `channel` into `writer` on first use, with its
    /// schema reference rewritten to `output_schema_id`, and return the
    /// output channel ID; later calls with the same source ID return the
    /// remembered ID without re-registering.
    pub fn ensure_channel<W: Write>(
        &mut self,
        writer: &mut McapWriter<W>,
        channel: &ChannelInfo,
        output_schema_id: u16,
    ) -> Result<u16> {
        if let Some(&id) = self.channels.get(&channel.id) {
            return Ok(id);
        }

        let id = writer.add_channel(
            output_schema_id,
            &channel.topic,
            &channel.message_encoding,
            &channel.metadata,
        )?;
        self.channels.insert(channel.id, id);
        Ok(id)
    }

    /// Output schema ID for an already-registered source schema ID.
    pub fn schema_id(&self, source_id: u16) -> Option<u16> {
        self.schemas.get(&source_id).copied()
    }

    /// Output channel ID for an already-registered source channel ID.
    pub fn channel_id(&self, source_id: u16) -> Option<u16> {
        self.channels.get(&source_id).copied()
    }

    /// Number of registered schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Number of registered channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::writer::WriterOptions;
    use std::collections::BTreeMap;
    use std::io::Cursor;

    fn memory_writer() -> McapWriter<Cursor<Vec<u8>>> {
        McapWriter::new(Cursor::new(Vec::new()), WriterOptions::default()).unwrap()
    }

    fn schema(id: u16, name: &str) -> SchemaInfo {
        SchemaInfo {
            id,
            name: name.to_string(),
            encoding: "ros2msg".to_string(),
            data: b"int32 x".to_vec(),
        }
    }

    fn channel(id: u16, schema_id: u16, topic: &str) -> ChannelInfo {
        ChannelInfo {
            id,
            schema_id,
            topic: topic.to_string(),
            message_encoding: "cdr".to_string(),
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn test_ensure_schema_registers_once() {
        let mut writer = memory_writer();
        let mut remap = RemapTable::new();
        let source = schema(42, "pkg/A");

        let first = remap.ensure_schema(&mut writer, &source).unwrap();
        let second = remap.ensure_schema(&mut writer, &source).unwrap();

        assert_eq!(first, second);
        assert_eq!(writer.schema_count(), 1);
        assert_eq!(remap.schema_id(42), Some(first));
    }

    #[test]
    fn test_ensure_channel_registers_once() {
        let mut writer = memory_writer();
        let mut remap = RemapTable::new();
        let source_schema = schema(7, "pkg/A");
        let source_channel = channel(3, 7, "/a");

        let out_schema = remap.ensure_schema(&mut writer, &source_schema).unwrap();
        let first = remap
            .ensure_channel(&mut writer, &source_channel, out_schema)
            .unwrap();
        let second = remap
            .ensure_channel(&mut writer, &source_channel, out_schema)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(writer.channel_count(), 1);
        assert_eq!(remap.channel_id(3), Some(first));
    }

    #[test]
    fn test_distinct_source_ids_get_distinct_output_ids() {
        let mut writer = memory_writer();
        let mut remap = RemapTable::new();

        let a = remap
            .ensure_channel(&mut writer, &channel(10, 0, "/a"), 0)
            .unwrap();
        let b = remap
            .ensure_channel(&mut writer, &channel(20, 0, "/b"), 0)
            .unwrap();

        assert_ne!(a, b);
        assert_eq!(remap.channel_count(), 2);
    }

    #[test]
    fn test_schema_less_channel_keeps_schema_zero() {
        let mut writer = memory_writer();
        let mut remap = RemapTable::new();

        let out = remap
            .ensure_channel(&mut writer, &channel(1, 0, "/raw"), 0)
            .unwrap();

        assert_eq!(out, 0);
        assert_eq!(remap.schema_count(), 0);
        assert_eq!(writer.schema_count(), 0);
    }

    #[test]
    fn test_reserved_schema_id_rejected() {
        let mut writer = memory_writer();
        let mut remap = RemapTable::new();
        let result = remap.ensure_schema(&mut writer, &schema(0, "pkg/Bad"));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_source_ids_resolve_to_none() {
        let remap = RemapTable::new();
        assert_eq!(remap.schema_id(1), None);
        assert_eq!(remap.channel_id(1), None);
    }
}
