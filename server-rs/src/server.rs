//! TCP accept loop.

use std::sync::Arc;

use tokio::net::TcpListener;

use capture_rs::ports::ChannelOpener;
use common::AcquireError;

use crate::dispatch::Dispatcher;

/// Accepts clients forever, serving each connection on its own task.
pub async fn run<O>(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher<O>>,
) -> Result<(), AcquireError>
where
    O: ChannelOpener + 'static,
{
    loop {
        let (mut stream, addr) = listener
            .accept()
            .await
            .map_err(|e| AcquireError::Transport(e.to_string()))?;
        log::info!("Connected by {}", addr);

        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            match dispatcher.handle_connection(&mut stream).await {
                Ok(()) => log::info!("Connection {} closed", addr),
                Err(e) => log::error!("Connection {} ended with error: {}", addr, e),
            }
        });
    }
}
