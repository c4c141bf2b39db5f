mod entry;

use webswarm::{args, config, distributed, error, system};

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
