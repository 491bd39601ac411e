use std::sync::Arc;

use tokio::net::TcpListener;

use capture_rs::adapters::SerialOpener;
use capture_rs::AcquisitionService;
use server_rs::dispatch::Dispatcher;
use server_rs::registry::SerialRegistry;
use server_rs::server;

const DEFAULT_ADDR: &str = "0.0.0.0:50001";
const DEFAULT_OUTPUT_DIR: &str = "samples";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| DEFAULT_ADDR.to_string());
    let output_dir = args.next().unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());

    let service = AcquisitionService::new(SerialOpener, &output_dir);
    let dispatcher = Arc::new(Dispatcher::new(service, Box::new(SerialRegistry)));

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Server running on {}", addr);

    tokio::select! {
        result = server::run(listener, dispatcher) => result?,
        _ = tokio::signal::ctrl_c() => {
            log::info!("Ctrl+C received. Server shutting down.");
        }
    }
    Ok(())
}
