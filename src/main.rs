mod cli;
mod commands;
mod env_loader;
mod error;
mod logging;
mod store;

fn main() {
    let dotenv = env_loader::load_dotenv();

    if let Err(err) = cli::run(dotenv.as_deref()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
