mod cli;
mod gss;

use libgsstoken::{config::USAGE, session, Error, Options};
use std::{io, process};

fn run(opts: Options) -> Result<(), Error> {
    let mut provider = gss::Gss::new(opts.service.as_deref())?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    session::run(&mut provider, &opts, stdin.lock(), &mut stdout.lock())
}

fn main() {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "warn"),
    );
    let opts = Options::from(cli::GssToken::from_env_or_exit());
    match run(opts) {
        Ok(()) => (),
        Err(e) => {
            eprintln!("{}", e);
            if e.is_usage() {
                eprintln!("{}", USAGE);
            }
            process::exit(1)
        }
    }
}
