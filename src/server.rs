use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use log::{error, info};
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_stream::wrappers::{BroadcastStream, UnboundedReceiverStream};
use uuid::Uuid;
use warp::ws::WebSocket;
use warp::Filter;

use crate::client::Client;
use crate::error::Error;
use crate::hub::Hub;
use crate::proto::InputParcel;
use crate::store::RoomStore;

pub struct Server {
  port: u16,
  hub: Arc<Hub>,
}

impl Server {
  pub fn new(port: u16, store: Arc<dyn RoomStore>) -> Self {
    Server {
      port,
      hub: Arc::new(Hub::new(store)),
    }
  }

  pub async fn run(&self) {
    let (input_sender, input_receiver) = mpsc::unbounded_channel::<InputParcel>();
    let hub = self.hub.clone();

    let rooms = warp::path!("ws" / Uuid)
      .and(warp::ws())
      .and(warp::any().map(move || input_sender.clone()))
      .and(warp::any().map(move || hub.clone()))
      .map(
        move |user_id: Uuid,
              ws: warp::ws::Ws,
              input_sender: UnboundedSender<InputParcel>,
              hub: Arc<Hub>| {
          ws.on_upgrade(move |web_socket| async move {
            tokio::spawn(Self::process_client(user_id, hub, web_socket, input_sender));
          })
        },
      );

    let shutdown = async {
      tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C signal handler");
    };

    info!("listening on port {}", self.port);
    let (_, serving) =
      warp::serve(rooms).bind_with_graceful_shutdown(([0, 0, 0, 0], self.port), shutdown);
    let running_hub = self.hub.run(input_receiver);

    tokio::select! {
      _ = serving => {},
      _ = running_hub => {},
    }
  }

  async fn process_client(
    user_id: Uuid,
    hub: Arc<Hub>,
    web_socket: WebSocket,
    input_sender: UnboundedSender<InputParcel>,
  ) {
    let output_receiver = hub.subscribe();
    let (ws_sink, ws_stream) = web_socket.split();
    let client = Client::new(user_id);

    info!("client {} connected", user_id);

    let reading = client.read_input(ws_stream).try_for_each(|input_parcel| async {
      input_sender
        .send(input_parcel)
        .map_err(|err| Error::System(err.to_string()))
    });

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(UnboundedReceiverStream::new(rx).forward(ws_sink));

    let writing = client
      .write_output(BroadcastStream::new(output_receiver))
      .try_for_each(|message| async {
        tx.send(Ok(message)).map_err(|err| Error::System(err.to_string()))
      });

    if let Err(err) = tokio::select! {
      result = reading => result,
      result = writing => result,
    } {
      error!("client connection error: {}", err);
    }

    hub.on_disconnect(user_id).await;
    info!("client {} disconnected", user_id);
  }
}
