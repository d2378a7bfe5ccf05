#![forbid(unsafe_code)]

//! varlab binary entry point.

use varlab::app::GameModel;
use varlab::program::Program;
use varlab::{build_session, cli, logging, program_config};

fn main() {
    let opts = cli::Opts::parse();

    if let Some(path) = &opts.log_file
        && let Err(e) = logging::init(path, &opts.log_filter)
    {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let session = match build_session(&opts) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to load catalog: {e}");
            std::process::exit(1);
        }
    };

    let model = GameModel::new(session).with_ascii(opts.ascii);
    let mut program = match Program::new(model, program_config(&opts)) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            std::process::exit(1);
        }
    };
    let result = program.run();
    // Restore the terminal before printing anything
    drop(program);
    if let Err(e) = result {
        eprintln!("Runtime error: {e}");
        std::process::exit(1);
    }
}
