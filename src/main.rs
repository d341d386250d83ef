use {
    clap::Parser,
    sma_sweep::{Cli, app},
    std::{panic, process::ExitCode},
};

#[tokio::main]
async fn main() -> ExitCode {
    panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("CRITICAL PANIC:\n{}\nStack Trace:\n{}", info, backtrace);
    }));

    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Warn)
    };

    let mut builder = env_logger::Builder::new();

    // RUST_LOG still wins when set
    builder
        .filter(None, global_level)
        .filter(Some("sma_sweep"), my_code_level)
        .parse_default_env()
        .init();

    let args = Cli::parse();

    match app::run(args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
