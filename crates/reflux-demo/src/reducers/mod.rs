pub mod app_reducer;
pub mod feed_reducer;
