use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use perspective_core::{
    API_KEY_ENV, AnalysisInput, AnalyzeOptions, ClientConfig, DEFAULT_ENDPOINT, MAX_TEXT_LENGTH, Perspective,
    build_request,
};
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Score comments with the Perspective comment analysis API
#[derive(Parser, Debug)]
#[command(name = "perspective")]
#[command(version)]
#[command(about = "Score comments with the Perspective API", long_about = None)]
struct Args {
    /// Comment text, or "-" to read from stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// API key sent with each request
    #[arg(long, env = API_KEY_ENV, hide_env_values = true, value_name = "KEY")]
    api_key: Option<String>,

    /// Attributes to request, comma separated (default: TOXICITY)
    #[arg(short, long, value_delimiter = ',', value_name = "ATTRS")]
    attributes: Vec<String>,

    /// Treat INPUT as a JSON request object
    #[arg(long)]
    json: bool,

    /// Keep HTML markup instead of stripping it
    #[arg(long)]
    keep_html: bool,

    /// Truncate text longer than the maximum instead of failing
    #[arg(long)]
    truncate: bool,

    /// Allow the service to store the comment
    #[arg(long)]
    store: bool,

    /// Print the request that would be sent and exit
    #[arg(long)]
    dry_run: bool,

    /// Print one summary score per attribute instead of the raw response
    #[arg(long)]
    summary: bool,

    /// Analyze endpoint URL
    #[arg(long, default_value = DEFAULT_ENDPOINT, value_name = "URL")]
    endpoint: String,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn analyze_options(&self) -> AnalyzeOptions {
        let builder = AnalyzeOptions::builder()
            .strip_html(!self.keep_html)
            .truncate(self.truncate)
            .do_not_store(!self.store);

        if self.attributes.is_empty() {
            builder.build()
        } else {
            builder.attributes(self.attributes.iter().cloned()).build()
        }
    }

    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::builder().endpoint(&self.endpoint).timeout(self.timeout).build();
        config.api_key = self.api_key.clone();
        config
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "perspective_core=debug,perspective=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn read_input(args: &Args) -> anyhow::Result<AnalysisInput> {
    let raw = if args.input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer.trim_end_matches(['\r', '\n']).to_string()
    } else {
        args.input.clone()
    };

    if args.json {
        let value: serde_json::Value = serde_json::from_str(&raw).context("Input is not valid JSON")?;
        Ok(AnalysisInput::from_json(value)?)
    } else {
        Ok(AnalysisInput::Text(raw))
    }
}

fn write_output(output: &str, path: Option<&PathBuf>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            print!("{}", output);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let total_steps = if args.dry_run { 2 } else { 3 };

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
        echo::print_step(1, total_steps, if args.input == "-" { "Reading from stdin" } else { "Reading input" });
    }

    let input = read_input(&args)?;
    let options = args.analyze_options();

    if args.verbose {
        if let AnalysisInput::Text(text) = &input {
            echo::print_detail("Length", &echo::format_chars(text.chars().count()));
        }
        echo::print_detail("Limit", &echo::format_chars(MAX_TEXT_LENGTH));
        eprintln!();
    }

    let output = if args.dry_run {
        if args.verbose {
            echo::print_step(2, total_steps, "Building request");
        }
        let request = build_request(input, &options).context("Failed to build request")?;
        serde_json::to_string_pretty(&request)? + "\n"
    } else {
        let client = Perspective::new(args.client_config()).context("Failed to create client")?;

        if args.verbose {
            echo::print_step(
                2,
                total_steps,
                &format!("Sending request to {}", args.endpoint.bright_white().underline()),
            );
        }

        let started = Instant::now();
        let response = client.analyze(input, &options).await.context("Analyze request failed")?;
        tracing::debug!(attributes = ?response.attribute_names(), "scores received");

        if args.verbose {
            echo::print_timing("Request", started.elapsed());
            eprintln!();
            echo::print_step(3, total_steps, "Writing output");
        }

        if args.summary {
            echo::format_summary(&response.summary_scores())
        } else {
            serde_json::to_string_pretty(response.as_value())? + "\n"
        }
    };

    write_output(&output, args.output.as_ref())
}
