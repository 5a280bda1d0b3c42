use clap::Parser;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = gridplan_demo::Cli::parse();
    match gridplan_demo::run(&cli) {
        Ok(out) => print!("{out}"),
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
