//! kontragent — counterparty lookup CLI
//!
//! Looks up every INN/OGRN found in the arguments and prints the rendered
//! pages, one message per block.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use kontragent::{Config, Kontragent, KontragentService, Outcome, Page};

/// Counterparty lookup by INN/OGRN
#[derive(Parser)]
#[command(name = "kontragent")]
#[command(version = kontragent::PKG_VERSION)]
#[command(about = "Look up Russian companies by INN/OGRN in the DaData registry")]
struct Args {
    /// Config file (default: ~/.kontragent/config.toml, /etc/kontragent/config.toml)
    #[arg(short, long, env = "KONTRAGENT_CONFIG")]
    config: Option<PathBuf>,

    /// Page to print for each found record
    #[arg(short, long, default_value = "card")]
    page: Page,

    /// Print every page instead of one
    #[arg(long, conflicts_with = "page")]
    all_pages: bool,

    /// Ask the AI mode instead of the registry
    #[arg(long)]
    ai: bool,

    /// Text containing identifiers
    #[arg(required = true)]
    text: Vec<String>,
}

fn print_messages(messages: &[String]) {
    for message in messages {
        println!("{message}\n");
    }
}

async fn run_ai(service: &KontragentService, text: &str) {
    let options = service.batch_options();
    for identifier in kontragent::validate::extract_all(text, &options.extract) {
        let validation = kontragent::validate::validate(&identifier, options.strictness);
        if !validation.valid {
            println!("{identifier}: {}\n", validation.message);
            continue;
        }
        print_messages(&service.analyze(&identifier).await);
    }
}

async fn run_lookup(service: &KontragentService, text: &str, pages: &[Page]) {
    let report = service.check(text).await;
    for outcome in &report.outcomes {
        match outcome {
            Outcome::Found { record, .. } => {
                for page in pages {
                    print_messages(&service.render_page(record, *page));
                }
            }
            Outcome::NotFound { identifier } => println!("{identifier}: not found\n"),
            Outcome::Invalid {
                identifier,
                message,
                ..
            } => println!("{identifier}: {message}\n"),
        }
    }
    println!("{}", report.totals_line());
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialise tracing (default: warn; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let service = match Config::load(args.config.as_deref())
        .and_then(|config| Kontragent::builder().config(config).build())
    {
        Ok(service) => service,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let text = args.text.join(" ");
    if args.ai {
        run_ai(&service, &text).await;
    } else {
        let pages: Vec<Page> = if args.all_pages {
            Page::ALL.to_vec()
        } else {
            vec![args.page]
        };
        run_lookup(&service, &text, &pages).await;
    }
    ExitCode::SUCCESS
}
