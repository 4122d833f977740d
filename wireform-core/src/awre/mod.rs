//! Automatic wireless reverse engineering: protocol field induction.
//!
//! Given at least two demodulated messages, the finder runs its stages
//! in order (preamble, sync, length, address, sequence number, checksum,
//! payload) over the common-length prefix of each message type. A stage
//! that finds nothing is skipped; the finder never aborts the pipeline.
//! Message types are independent, so they are processed in parallel and
//! their field lists concatenated in type order.

pub mod address;
pub mod checksum;
pub mod fields;
pub mod length;
pub mod preamble;
pub mod sequence;

pub use fields::{FieldLabel, ProtocolField};

use rayon::prelude::*;

use crate::config::EstimatorConfig;
use crate::message::Message;

/// Identifier of the first (or only) message type.
pub const DEFAULT_TYPE: &str = "Default";

/// Shortest shared prefix that merges different message lengths into
/// one type.
const MERGE_PREFIX_BITS: usize = 8;

/// Induce a shared field layout from the demodulated messages.
///
/// With fewer than two messages no fields are emitted. Fields are
/// ordered by message type, then by ascending bit start.
pub fn infer_fields(messages: &[Message], cfg: &EstimatorConfig) -> Vec<ProtocolField> {
    if messages.len() < 2 || messages.iter().any(|m| m.is_empty()) {
        return Vec::new();
    }
    let clusters = cluster_by_length(messages);
    let layouts: Vec<Vec<ProtocolField>> = clusters
        .par_iter()
        .map(|cluster| infer_type(messages, cluster, cfg))
        .collect();
    layouts.concat()
}

/// One message type: an id plus the indices of its messages in arrival
/// order.
#[derive(Debug, Clone)]
struct Cluster {
    id: String,
    indices: Vec<usize>,
}

/// Group messages into types by exact bit length (arrival order names
/// the types). Lengths sharing an identical prefix belong to one
/// protocol with a variable payload and merge into the default type.
fn cluster_by_length(messages: &[Message]) -> Vec<Cluster> {
    let mut clusters: Vec<(usize, Vec<usize>)> = Vec::new();
    for (index, message) in messages.iter().enumerate() {
        match clusters.iter_mut().find(|(len, _)| *len == message.len()) {
            Some((_, indices)) => indices.push(index),
            None => clusters.push((message.len(), vec![index])),
        }
    }

    if clusters.len() > 1 && shared_prefix_len(messages) >= MERGE_PREFIX_BITS {
        return vec![Cluster {
            id: DEFAULT_TYPE.to_string(),
            indices: (0..messages.len()).collect(),
        }];
    }

    clusters
        .into_iter()
        .enumerate()
        .map(|(k, (_, indices))| Cluster {
            id: if k == 0 {
                DEFAULT_TYPE.to_string()
            } else {
                format!("Type {}", k + 1)
            },
            indices,
        })
        .collect()
}

fn shared_prefix_len(messages: &[Message]) -> usize {
    let common = messages.iter().map(Message::len).min().unwrap_or(0);
    let first = messages[0].bits();
    (0..common)
        .take_while(|&i| messages.iter().all(|m| m.bits()[i] == first[i]))
        .count()
}

/// Run stages I.1 through I.7 for one message type.
fn infer_type(messages: &[Message], cluster: &Cluster, cfg: &EstimatorConfig) -> Vec<ProtocolField> {
    let bits: Vec<&[u8]> = cluster.indices.iter().map(|&i| messages[i].bits()).collect();
    let lens: Vec<usize> = bits.iter().map(|b| b.len()).collect();
    let common_len = *lens.iter().min().expect("cluster is non-empty");
    let type_id = cluster.id.as_str();

    let mut fields: Vec<ProtocolField> = Vec::new();

    let preamble_end = preamble::find_preamble(&bits, common_len).unwrap_or(0);
    if preamble_end > 0 {
        fields.push(ProtocolField::new(FieldLabel::Preamble, 0, preamble_end, type_id));
    }

    // identical messages carry no variance to compare; only the preamble
    // and an opaque payload can be told apart
    let identical = bits.windows(2).all(|w| w[0] == w[1]);
    if !identical {
        let sync_end = match preamble::find_sync(&bits, preamble_end, common_len, cfg) {
            Some(end) => {
                fields.push(ProtocolField::new(FieldLabel::Sync, preamble_end, end, type_id));
                end
            }
            None => preamble_end,
        };

        let length_range = length::find_length(&bits, &lens, sync_end, cfg);
        if let Some((start, end)) = length_range {
            fields.push(ProtocolField::new(FieldLabel::Length, start, end, type_id));
        }
        let after = length_range.map_or(sync_end, |(_, end)| end);

        let assigned: Vec<(usize, usize)> = fields.iter().map(|f| (f.start, f.end)).collect();
        for (start, end) in address::find_addresses(&bits, common_len, after, &assigned) {
            fields.push(ProtocolField::new(FieldLabel::Address, start, end, type_id));
        }

        let assigned: Vec<(usize, usize)> = fields.iter().map(|f| (f.start, f.end)).collect();
        if let Some((start, end)) = sequence::find_sequence(&bits, common_len, &assigned) {
            fields.push(ProtocolField::new(
                FieldLabel::SequenceNumber,
                start,
                end,
                type_id,
            ));
        }

        if let Some((start, end)) = checksum::find_checksum(&bits, &lens, sync_end, cfg) {
            fields.push(ProtocolField::new(FieldLabel::Checksum, start, end, type_id));
        }
    }

    finalize(fields, common_len, type_id)
}

/// Sort the assigned fields, then tile the uncovered prefix: the last
/// gap becomes the payload, interior gaps are unknown.
fn finalize(mut fields: Vec<ProtocolField>, common_len: usize, type_id: &str) -> Vec<ProtocolField> {
    fields.sort_by_key(|f| f.start);

    let mut tiled: Vec<ProtocolField> = Vec::new();
    let mut cursor = 0usize;
    for field in fields {
        if field.start > cursor {
            tiled.push(ProtocolField::new(FieldLabel::Unknown, cursor, field.start, type_id));
        }
        cursor = field.end;
        tiled.push(field);
    }
    if cursor < common_len {
        tiled.push(ProtocolField::new(FieldLabel::Data, cursor, common_len, type_id));
    } else {
        // the trailing gap is the payload; relabel the last unknown if
        // the checksum closed the prefix
        if let Some(last_unknown) = tiled
            .iter_mut()
            .rev()
            .find(|f| f.label == FieldLabel::Unknown)
        {
            last_unknown.label = FieldLabel::Data;
        }
    }
    tiled
}
