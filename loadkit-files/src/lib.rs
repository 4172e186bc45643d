pub mod csv_sink;
pub mod fs_ops;
pub mod line_range;
pub mod samples;

pub use csv_sink::{format_record, parse_record, record_is_open, CsvSink};
pub use fs_ops::{
    append_string, clear_file, delete_file, is_file_empty, rename_file, write_bytes, write_string,
};
pub use line_range::{remove_line_range, remove_line_range_with, LineRange};
pub use loadkit_common::RewriteMode;
pub use samples::read_samples;
