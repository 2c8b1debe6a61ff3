use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("perspective")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Score comments with the Perspective API")
        .arg(clap::arg!(<INPUT> "Comment text, or '-' for stdin"))
        .arg(
            clap::arg!(--"api-key" <KEY> "API key sent with each request")
                .env("PERSPECTIVE_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            clap::arg!(-a --attributes <ATTRS> "Attributes to request, comma separated (default: TOXICITY)")
                .value_delimiter(','),
        )
        .arg(clap::arg!(--json "Treat INPUT as a JSON request object"))
        .arg(clap::arg!(--"keep-html" "Keep HTML markup instead of stripping it"))
        .arg(clap::arg!(--truncate "Truncate text longer than the maximum instead of failing"))
        .arg(clap::arg!(--store "Allow the service to store the comment"))
        .arg(clap::arg!(--"dry-run" "Print the request that would be sent and exit"))
        .arg(clap::arg!(--summary "Print one summary score per attribute instead of the raw response"))
        .arg(clap::arg!(--endpoint <URL> "Analyze endpoint URL"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "perspective", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "perspective", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "perspective", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "perspective", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
