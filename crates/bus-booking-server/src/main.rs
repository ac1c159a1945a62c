//! Server implementation

#![warn(missing_docs)]

mod http;

use std::thread;

use bus_booking_core::{Config, RequestHandler};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command line options
#[derive(Debug)]
struct Opts {
    /// Configuration of the booking system
    config: Config,

    /// Port for the HTTP server to listen on
    port: u16,
    /// Address for the HTTP server to listen on
    host: String,
    /// Number of request handling threads
    handler_threads: u32,
}

impl Opts {
    fn from_args() -> Self {
        let mut opts = Opts {
            port: 8080,
            host: String::from("127.0.0.1"),
            config: Config::default(),
            handler_threads: 16,
        };

        let mut option: Option<String> = None;
        for arg in std::env::args().skip(1) {
            if let Some(opt) = option {
                match opt.as_str() {
                    "-port" => opts.port = arg.parse().expect("-port takes a decimal u16"),
                    "-host" => opts.host = arg,
                    "-handler-threads" => {
                        opts.handler_threads =
                            arg.parse().expect("-handler-threads takes a decimal u32")
                    }
                    _ => {
                        eprintln!("Error: ignoring unknown option {opt}");
                        std::process::exit(1);
                    }
                }
                option = None;
            } else {
                match arg.as_str() {
                    "-require-price-confirmation" => opts.config.require_price_confirmation = true,
                    _ => option = Some(arg),
                }
            }
        }
        if let Some(opt) = option {
            eprintln!("Error: ignoring leftover option {opt}");
            std::process::exit(1);
        }

        opts
    }
}

fn http_loop<H: RequestHandler>(server: &tiny_http::Server, handler: &H) {
    loop {
        let rq = match server.recv() {
            Ok(rq) => rq,
            Err(err) => {
                error!(%err, "HTTP receive failed");
                return;
            }
        };
        if let Some(rq) = http::parse(rq) {
            handler.handle(rq);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts = Opts::from_args();

    let server = match tiny_http::Server::http((opts.host.as_str(), opts.port)) {
        Ok(server) => server,
        Err(err) => {
            error!(%err, host = %opts.host, port = opts.port, "Could not bind HTTP server");
            std::process::exit(1);
        }
    };
    info!(host = %opts.host, port = opts.port, threads = opts.handler_threads, "Listening");

    let balancer = bus_booking_engine::launch(&opts.config);

    thread::scope(|s| {
        for i in 0..opts.handler_threads {
            thread::Builder::new()
                .name(format!("handler_{i}"))
                .spawn_scoped(s, || http_loop(&server, &balancer))
                .expect("failed to spawn handler thread");
        }
    });

    balancer.shutdown();
}
