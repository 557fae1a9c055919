pub(crate) mod dashboard;
pub(crate) mod records;
pub(crate) mod summary;
