mod progress;
mod summary;

pub(crate) use progress::setup_progress_indicator;
pub(crate) use summary::render_summary;
