mod application;
mod presentation;

use crs_core::error::Result;

fn main() -> Result<()> {
    application::run()
}
