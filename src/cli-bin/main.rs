mod args;
mod run;

use args::Args;

fn main() {
    let args = match <Args as clap::Parser>::try_parse() {
        Ok(args) => args,
        Err(err) => {
            use clap::error::ErrorKind::*;

            let exit_code = match err.kind() {
                DisplayHelp | DisplayHelpOnMissingArgumentOrSubcommand | DisplayVersion => 0,
                _ => 2,
            };

            err.print().unwrap();
            std::process::exit(exit_code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let quiet = args.quiet;
    match run::run(&args) {
        Ok(schedulable) => {
            if quiet {
                std::process::exit(if schedulable { 0 } else { 1 });
            }
        }
        Err(err) => {
            eprintln!("{err:?}");
            std::process::exit(2);
        }
    }
}
