use std::{error, result};

use futures::stream::SplitStream;
use futures::{future, Stream, StreamExt, TryStream, TryStreamExt};
use uuid::Uuid;
use warp::filters::ws::WebSocket;

use crate::error::{Error, Result};
use crate::proto::{InputParcel, OutputParcel};

/// Stream adapters for one websocket connection, identified by the
/// authenticated user id from the connection path.
#[derive(Clone, Copy)]
pub struct Client {
  pub user_id: Uuid,
}

impl Client {
  pub fn new(user_id: Uuid) -> Self {
    Client { user_id }
  }

  pub fn read_input(
    &self,
    stream: SplitStream<WebSocket>,
  ) -> impl Stream<Item = Result<InputParcel>> {
    let user_id = self.user_id;

    stream
      // take only text messages
      .take_while(|message| {
        future::ready(if let Ok(message) = message {
          message.is_text()
        } else {
          false
        })
      })
      // deserialize json
      .map(move |message| match message {
        Err(err) => Err(Error::System(err.to_string())),
        Ok(message) => {
          let input = serde_json::from_str(message.to_str().unwrap_or_default())?;
          Ok(InputParcel::new(user_id, input))
        }
      })
  }

  pub fn write_output<S, E>(&self, stream: S) -> impl Stream<Item = Result<warp::ws::Message>>
  where
    S: TryStream<Ok = OutputParcel, Error = E> + Stream<Item = result::Result<OutputParcel, E>>,
    E: error::Error,
  {
    let user_id = self.user_id;
    stream
      // skip parcels addressed to other users
      .try_filter(move |output_parcel| future::ready(output_parcel.user_id == user_id))
      // serialize to JSON
      .map_ok(|output_parcel| {
        let data = serde_json::to_string(&output_parcel.output).unwrap_or_default();
        warp::ws::Message::text(data)
      })
      .map_err(|err| Error::System(err.to_string()))
  }
}
