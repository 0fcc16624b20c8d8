use clap::Parser;
use provider_cli::commands::{describe, run};
use provider_cli::config::Config;

#[tokio::main]
async fn main() {
    env_logger::init();
    let config: Config = Config::parse();
    let (global_options, command) = config.to_parts();

    match run(global_options, command).await {
        Ok(output) => {
            for event in &output.events {
                println!("event: {}", describe(event));
            }
            println!("{:#}", output.result);
        }
        Err(err) => {
            eprintln!("** Error ** \n {err}");
            std::process::exit(1);
        }
    }
}
