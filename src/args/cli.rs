use clap::Parser;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Distributed HTTP load generator: a master starts its slaves, every slave fires paced GET requests at its targets, and the master merges the timings into one report.",
    after_help = "master: webswarm -m\nslave:  webswarm"
)]
pub struct CliArgs {
    /// Run as master (coordinator); without this flag the process runs as a slave
    #[arg(short = 'm', long = "master")]
    pub master: bool,

    /// Push the master's target list to every slave before the run starts
    #[arg(short = 's', long = "send-urls", requires = "master")]
    pub send_urls: bool,

    /// Path to config file (TOML or JSON); defaults to ./webswarm.toml or ./webswarm.json
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Enable debug logging (overridden by WEBSWARM_LOG / RUST_LOG)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
