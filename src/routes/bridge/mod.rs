mod handler;
mod model;

pub use handler::{create_bridge, redeem_bridge};
pub use model::{CreateBridgeRequest, CreateBridgeResponse, RedeemBridgeQuery};
