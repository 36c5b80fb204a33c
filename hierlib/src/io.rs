use std::fs::File;
use std::path::Path;
use crate::error::TraceError;
use crate::trace::{parse_trace, TraceEntry};

/// Reads and parses a trace file
///
/// Traces are read strictly front to back, so on unix the file is memory mapped with sequential
/// access advice, elsewhere it is read through a buffer
pub fn read_trace_file<P: AsRef<Path>>(path: P) -> Result<Vec<TraceEntry>, TraceError> {
    let file = File::open(path)?;
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::{BufReader, Read};
        const BUFFER_SIZE: usize = 64 * 4096;
        let mut bytes = Vec::new();
        BufReader::with_capacity(BUFFER_SIZE, file).read_to_end(&mut bytes)?;
        parse_trace(&bytes)
    }
    #[cfg(unix)]
    {
        use memmap2::{Advice, Mmap};
        // Mapping an empty file fails on some platforms
        if file.metadata()?.len() == 0 {
            return Ok(Vec::new());
        }
        // Safety: the map is only read for the duration of the parse. The file being truncated
        // underneath us is the usual mmap caveat and not something a trace reader guards against
        let map = unsafe { Mmap::map(&file)? };
        map.advise(Advice::Sequential)?;
        parse_trace(&map)
    }
}
