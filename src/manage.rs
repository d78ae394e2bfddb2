use clap::{Args, Parser, Subcommand};
use postgres::{Client, NoTls};

#[derive(Parser)]
#[clap(version = "0.1", about = "Administration tasks of the interviews server")]
struct Opts {
    #[clap(subcommand)]
    subcmd: SubCommand,
}

#[derive(Subcommand)]
enum SubCommand {
    /// Create the interviews table
    Init(Init),
}

#[derive(Args)]
struct Init {
    /// Defaults to the DATABASE_URL environment variable
    database_url: Option<String>,
}

fn main() -> Result<(), anyhow::Error> {
    dotenv::dotenv().ok();
    let opts: Opts = Opts::parse();

    match opts.subcmd {
        SubCommand::Init(Init { database_url }) => {
            let database_url = database_url
                .or_else(|| std::env::var("DATABASE_URL").ok())
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL not configured"))?;

            println!("initializing database");
            let mut client = Client::connect(&database_url, NoTls)?;
            client.batch_execute(include_str!("../schema.sql"))?;
            println!("done");
        }
    }
    Ok(())
}
