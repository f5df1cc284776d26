/// Progress update interval (tick every N pages)
pub const PROGRESS_INTERVAL: u64 = 1000;

/// Buffer size for reading the dump (decompressed side)
pub const READ_BUFFER_CAPACITY: usize = 256 * 1024;

/// Templates nested deeper than this make the page unparseable
pub const MAX_TEMPLATE_DEPTH: usize = 32;

/// File name of the JSON-lines person store inside the output directory
pub const STORE_FILE_NAME: &str = "persons.jsonl";

/// Buffer size for the store writer
pub const WRITE_BUFFER_CAPACITY: usize = 128 * 1024;
