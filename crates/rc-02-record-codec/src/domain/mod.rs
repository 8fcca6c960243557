pub mod errors;
pub mod record;
pub mod timestamp;

pub use errors::CodecError;
pub use record::{
    decode_bool, decode_metadata, decode_record, decode_store_args, decode_string_array,
    decode_uint, encode_getter, encode_lookup, encode_metadata, encode_record,
    encode_record_wrapped, encode_store, Record, RecordInput, RecordMetadata, RecordPayload,
};
pub use timestamp::{parse_iso_seconds, to_iso, TimestampInput};
