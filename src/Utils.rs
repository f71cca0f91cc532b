/// line and bar charts rendered with plotters; the file extension (png or svg) picks the backend
pub mod plots;
/// terminal + file logger
pub mod logger;
