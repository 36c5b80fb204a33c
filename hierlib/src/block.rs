/// A single cache line slot
///
/// No data is stored, only the metadata needed to decide hits, misses and write-backs. Blocks live
/// in their engine's arena and are handed out by value, so an evicted block carries everything the
/// hierarchy needs to rebuild its address one level down
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct Block {
    pub tag: u64,
    pub set_index: u64,
    pub valid: bool,
    pub dirty: bool,
    /// Logical time of the last hit or load, used by LRU
    pub recency_stamp: u64,
    /// Logical time of the load, used by FIFO
    pub load_stamp: u64,
}

impl Block {
    /// Overwrites the slot with a freshly loaded line. Both stamps are set to `time`
    pub(crate) fn load(&mut self, tag: u64, set_index: u64, dirty: bool, time: u64) {
        *self = Self {
            tag,
            set_index,
            valid: true,
            dirty,
            recency_stamp: time,
            load_stamp: time,
        };
    }

    /// Refreshes the recency stamp on a hit. The load stamp is left alone
    pub(crate) fn touch(&mut self, time: u64) {
        self.recency_stamp = time;
    }

    pub(crate) fn matches(&self, tag: u64) -> bool {
        self.valid && self.tag == tag
    }
}
