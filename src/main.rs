use clap::{Arg, ArgAction, Command};
use repoterm::config::Config;
use repoterm::http_client::ReqwestHttpClient;
use repoterm::index::RepoIndex;
use repoterm::interpreter::Interpreter;
use repoterm::providers::TokioDelay;
use repoterm::render::Renderer;
use repoterm::source;
use repoterm::terminal::Terminal;
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("repoterm")
        .about("Browse a collection of repositories from a terminal-style shell")
        .long_about(
            "repoterm loads a JSON list of repositories and lets you list, filter, chart and tour them. \
             Without COMMANDs it starts an interactive session; with COMMANDs it runs each one in order and exits.",
        )
        .arg(
            Arg::new("commands")
                .help("Command lines to run in batch mode, e.g. 'filter lang=Rust' 'ls -l'")
                .num_args(1..)
                .allow_hyphen_values(true)
                .trailing_var_arg(true),
        )
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .help("Repository JSON file or http(s) URL")
                .value_name("PATH_OR_URL")
                .num_args(1),
        )
        .arg(
            Arg::new("set-data")
                .long("set-data")
                .help("Save the default data source to the config file")
                .value_name("PATH_OR_URL")
                .num_args(1),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Show configuration information")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable coloured output")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    // Handle configuration commands
    if let Some(data) = matches.get_one::<String>("set-data") {
        Config::save_data_source(data)?;
        println!("Data source saved: {}", data);
        return Ok(());
    }

    if matches.get_flag("config") {
        Config::show_config_info()?;
        return Ok(());
    }

    let config = Config::load()?;
    let commands: Vec<String> = matches
        .get_many::<String>("commands")
        .unwrap_or_default()
        .cloned()
        .collect();
    let interactive = commands.is_empty();

    let color = config.color
        && !matches.get_flag("no-color")
        && (interactive || std::io::stdout().is_terminal());
    colored::control::set_override(color);

    let data_source = config.data_source(matches.get_one::<String>("data").map(String::as_str));
    info!("Loading repositories from {}", data_source);
    let http = ReqwestHttpClient::new();
    let (repos, diagnostic) = source::load_or_empty(&data_source, &http).await;

    let index = Arc::new(RepoIndex::new(repos));
    let interpreter = Interpreter::new(index, config.tour_timing());
    let renderer = Renderer::new(color);
    let mut terminal = Terminal::new(interpreter, renderer, Arc::new(TokioDelay));
    let startup: Vec<_> = diagnostic.into_iter().collect();

    if interactive {
        terminal.run_interactive(startup).await
    } else {
        renderer.render(&startup)?;
        terminal.run_batch(&commands).await
    }
}
