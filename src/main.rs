use log::info;

use clap::Parser;
use snafu::ErrorCompat;

mod acvr;
mod args;
mod dashboard;

fn main() {
    let args = args::Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    info!("args: {:?}", args);

    let res = match args.acvr.clone() {
        Some(path) => acvr::run_format(path),
        None => dashboard::run_report(&args),
    };

    if let Err(e) = res {
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
