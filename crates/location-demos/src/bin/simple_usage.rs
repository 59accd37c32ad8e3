//! Simple usage tour: a fixed set of location questions, some with
//! coordinates attached.

use location_demos::{connect, init, simple_usage};

const APP_NAME: &str = "location_aware_app";
const USER_ID: &str = "demo_user";
const SESSION_ID: &str = "demo_session";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();

    simple_usage(|| connect(APP_NAME, USER_ID, SESSION_ID)).await
}
