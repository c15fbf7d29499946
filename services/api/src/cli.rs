use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use estate_catalog::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Real Estate Catalog",
    about = "Run and demonstrate the real estate catalog service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Seed an in-memory catalog and print one filtered page
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Populate the catalog with N generated properties before serving
    #[arg(long)]
    pub(crate) seed: Option<usize>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_optional_and_accepts_overrides() {
        let cli = Cli::try_parse_from(["estate-catalog-api"]).expect("parses");
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from([
            "estate-catalog-api",
            "serve",
            "--port",
            "8080",
            "--seed",
            "12",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.seed, Some(12));
                assert!(args.host.is_none());
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }

    #[test]
    fn demo_rejects_unknown_view() {
        assert!(Cli::try_parse_from(["estate-catalog-api", "demo", "--view", "table"]).is_err());
        assert!(Cli::try_parse_from(["estate-catalog-api", "demo", "--view", "list"]).is_ok());
    }
}
