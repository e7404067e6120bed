use crate::model::SocketAddress;
use crate::outcome::Outcome;
use crate::target::{Target, TransportError};
use hostguard_types::ids;
use serde_json::json;

pub fn run(target: &dyn Target, address: &SocketAddress) -> Result<Outcome, TransportError> {
    let outcome = if target.socket_listening(address)? {
        Outcome::pass(format!("{address} is listening"))
    } else {
        Outcome::fail(ids::CODE_NOT_LISTENING, format!("{address} is not listening"))
    };
    Ok(outcome.with_data(json!({ "address": address.to_string() })))
}
