use std::sync::Arc;

use carpool_server::server::Server;
use carpool_server::store::MemoryRoomStore;

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() {
  env_logger::init();

  let port = std::env::var("CARPOOL_PORT")
    .ok()
    .and_then(|value| value.parse().ok())
    .unwrap_or(DEFAULT_PORT);

  let store = Arc::new(MemoryRoomStore::new());
  let server = Server::new(port, store);
  server.run().await;
}
