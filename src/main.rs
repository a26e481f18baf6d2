mod app;
mod entry;
mod logger;
mod shutdown_handlers;

use chopper::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
