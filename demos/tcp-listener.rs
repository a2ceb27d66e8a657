use httpfromtcp::{ReaderConfig, Request, server::Server};
use std::{net::SocketAddr, time::Duration};

/// Accepts TCP connections and prints the HTTP/1.1 request read from each one.
#[derive(clap::Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about = "Print incoming HTTP/1.1 requests", long_about = None)]
pub struct CmdOpt {
    /// Address to listen on.
    #[clap(short, long, value_name = "address:port", default_value = "127.0.0.1:42069")]
    listen_addr: SocketAddr,

    /// Read window size in bytes.
    #[clap(short, long, value_name = "bytes", default_value = "1024")]
    buffer_size: usize,

    /// Let the read window grow up to this many bytes instead of failing when it fills up.
    #[clap(short, long, value_name = "bytes")]
    max_buffer_size: Option<usize>,

    /// Seconds to wait for a complete request before dropping the connection.
    #[clap(short, long, value_name = "seconds", default_value = "10")]
    timeout: u64,

    /// Verbosity level
    #[arg(short, long, value_name = "level", value_enum, default_value = "info")]
    verbosity: ArgVerbosity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
enum ArgVerbosity {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for ArgVerbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgVerbosity::Off => write!(f, "off"),
            ArgVerbosity::Error => write!(f, "error"),
            ArgVerbosity::Warn => write!(f, "warn"),
            ArgVerbosity::Info => write!(f, "info"),
            ArgVerbosity::Debug => write!(f, "debug"),
            ArgVerbosity::Trace => write!(f, "trace"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let opt: CmdOpt = clap::Parser::parse();

    let default = format!("{}={}", module_path!(), opt.verbosity);
    let default = format!("{default},httpfromtcp={}", opt.verbosity);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();

    let mut config = ReaderConfig::new(opt.buffer_size);
    if let Some(max) = opt.max_buffer_size {
        config = config.with_max_buffer_size(max);
    }

    tokio::select! {
        res = main_loop(&opt, config) => {
            res?;
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("Ctrl-C received, exiting...");
        }
    }
    Ok(())
}

async fn main_loop(opt: &CmdOpt, config: ReaderConfig) -> httpfromtcp::Result<()> {
    let server = Server::bind_with_config(opt.listen_addr, config).await?;
    log::info!("Listening on {}", server.local_addr()?);

    let timeout = Duration::from_secs(opt.timeout);
    loop {
        let (mut conn, peer) = server.accept().await?;
        tokio::spawn(async move {
            match conn.read_request_with_timeout(timeout).await {
                Ok(request) => print_request(&request),
                Err(err) => log::warn!("{peer}: {err}"),
            }
            if let Err(err) = conn.shutdown().await {
                log::debug!("{peer}: shutdown: {err}");
            }
        });
    }
}

fn print_request(request: &Request) {
    let Some(line) = request.request_line() else {
        return;
    };
    println!("Request line:");
    println!("- Method: {}", line.method());
    println!("- Target: {}", line.target());
    println!("- Version: {}", line.version());
    println!("Headers:");
    request.headers().for_each(|name, value| println!("- {name}: {value}"));
    if !request.body().is_empty() {
        println!("Body:");
        println!("{}", String::from_utf8_lossy(request.body()));
    }
}
