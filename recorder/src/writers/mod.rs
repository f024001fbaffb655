pub mod jsonl_writer;

pub use jsonl_writer::JsonlTranscriptWriter;
