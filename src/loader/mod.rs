mod loader;

pub use loader::{
    parse_record, LoadError, LoadReport, Loader, ParseErrorPolicy, RecordError, DATE_FORMAT,
    FIELD_COUNT,
};
