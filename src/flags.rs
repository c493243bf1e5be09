use serde::{Deserialize, Serialize};

/// Raw bit asking to replay the file from its start.
pub const READ_ALL: u32 = 0x004;
/// Raw bit telling that the handle was supplied by the caller.
pub const FP_SET: u32 = 0x010;

/// Options controlling how `FileQueue::open` acquires its handle.
///
/// Named counterpart of the `READ_ALL | FP_SET` bitmask used by the alerts writer tooling. Conversion to and from
/// raw bits is lossless for the recognized bits; unknown bits are dropped.
///
/// ```rust
/// use jsontrack::{QueueFlags, flags::{FP_SET, READ_ALL}};
/// let flags = QueueFlags::from_bits(READ_ALL | FP_SET);
/// assert!(flags.read_from_start && flags.handle_preattached);
/// assert_eq!(flags.bits(), READ_ALL | FP_SET);
/// ```
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueueFlags {
    /// Position at the start of the file instead of its end.
    pub read_from_start: bool,
    /// Skip open/seek/stat and keep the handle given to `FileQueue::attach`.
    pub handle_preattached: bool,
}

impl QueueFlags {
    pub fn from_bits(bits: u32) -> Self {
        Self {
            read_from_start: bits & READ_ALL != 0,
            handle_preattached: bits & FP_SET != 0,
        }
    }

    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.read_from_start {
            bits |= READ_ALL;
        }
        if self.handle_preattached {
            bits |= FP_SET;
        }
        bits
    }
}
