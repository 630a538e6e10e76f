//! Per-queue depth-threshold table.
//!
//! A depth threshold marks a queue "deep" for scheduling-pressure reporting.
//! The devargs value addresses queues by range:
//!
//! - `all:<threshold>` — every queue
//! - `<first>-<last>:<threshold>` — an inclusive range
//! - `<queue>:<threshold>` — one queue
//!
//! Syntaxes are tried in that order; `all:50` must match the first form, not
//! be misread as a range. When ranges from successive values overlap, the
//! last value applied wins — application order is the order the options were
//! supplied, and that ordering is part of the contract.

use serde::{Deserialize, Serialize};

use hqm_core::error::HqmError;
use hqm_core::limits::{MAX_NUM_QUEUES, MAX_QUEUE_DEPTH_THRESHOLD};

use super::keys;
use super::parse::parse_int;

/// Depth-threshold override table, indexed by queue id.
///
/// An entry of 0 means "use the hardware default".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QidDepthThresholds {
    val: Vec<u32>,
}

impl Default for QidDepthThresholds {
    fn default() -> Self {
        Self {
            val: vec![0; MAX_NUM_QUEUES],
        }
    }
}

impl QidDepthThresholds {
    /// Parse one devargs value and assign the threshold to the queues it
    /// addresses. Validates the whole value before touching the table, so a
    /// failed call leaves it unchanged.
    pub fn apply_spec(&mut self, value: &str) -> Result<(), HqmError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(HqmError::MissingArgument(keys::QID_DEPTH_THRESH));
        }

        let syntax_err = || HqmError::Parse {
            key: keys::QID_DEPTH_THRESH,
            value: value.to_string(),
        };

        let (range, thresh_str) = value.split_once(':').ok_or_else(syntax_err)?;
        let (first, last) = if range == "all" {
            (0, MAX_NUM_QUEUES as i32 - 1)
        } else {
            Self::parse_range(range).ok_or_else(syntax_err)?
        };
        let thresh = parse_int(keys::QID_DEPTH_THRESH, thresh_str).map_err(|_| syntax_err())?;

        if first > last {
            return Err(syntax_err());
        }
        if first < 0 || last >= MAX_NUM_QUEUES as i32 {
            return Err(HqmError::OutOfRange {
                key: keys::QID_DEPTH_THRESH,
                value: i64::from(if first < 0 { first } else { last }),
                min: 0,
                max: MAX_NUM_QUEUES as i64 - 1,
            });
        }
        if thresh < 0 || thresh > MAX_QUEUE_DEPTH_THRESHOLD as i32 {
            return Err(HqmError::OutOfRange {
                key: keys::QID_DEPTH_THRESH,
                value: i64::from(thresh),
                min: 0,
                max: i64::from(MAX_QUEUE_DEPTH_THRESHOLD),
            });
        }

        for qid in first as usize..=last as usize {
            self.val[qid] = thresh as u32;
        }
        Ok(())
    }

    /// `<first>-<last>` if both halves are integers, else a single queue id.
    fn parse_range(range: &str) -> Option<(i32, i32)> {
        if let Some((first, last)) = range.split_once('-') {
            let parsed = (
                parse_int(keys::QID_DEPTH_THRESH, first),
                parse_int(keys::QID_DEPTH_THRESH, last),
            );
            if let (Ok(first), Ok(last)) = parsed {
                return Some((first, last));
            }
        }
        let qid = parse_int(keys::QID_DEPTH_THRESH, range).ok()?;
        Some((qid, qid))
    }

    /// Threshold override for `qid`, 0 meaning hardware default.
    #[must_use]
    pub fn get(&self, qid: usize) -> u32 {
        self.val[qid]
    }

    /// The non-default entries, as `(qid, threshold)` pairs.
    pub fn overrides(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.val
            .iter()
            .enumerate()
            .filter(|(_, &thresh)| thresh != 0)
            .map(|(qid, &thresh)| (qid, thresh))
    }
}
