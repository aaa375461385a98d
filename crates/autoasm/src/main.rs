#![forbid(unsafe_code)]

//! autoasm binary entry point.

use autoasm::cli::Opts;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env("AUTOASM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = installed {
        eprintln!("Failed to install logger: {e}");
    }
}

fn main() {
    let opts = Opts::parse();
    init_tracing(opts.log_json);

    match autoasm::execute(&opts) {
        Ok(Ok(transcript)) => {
            let many = transcript.pages.len() > 1;
            for (i, page) in transcript.pages.iter().enumerate() {
                if many {
                    println!("--- panel {i} ---");
                }
                print!("{page}");
            }
        }
        Ok(Err(fatal)) => {
            eprintln!("{fatal}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("autoasm: {e}");
            std::process::exit(2);
        }
    }
}
