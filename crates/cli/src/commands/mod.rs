pub(crate) mod ingest;
pub(crate) mod migrate;
pub(crate) mod query;
