use std::process::ExitCode;

use scan::runtime::{boot, run};

fn main() -> ExitCode {
    boot::init_logging();
    run::run(std::env::args_os())
}
