//! Quick start: checks that the location agent is configured and reachable.
//!
//! Run this first to verify credentials before trying `simple-usage`.

use location_demos::{connect, init, quick_start};

const APP_NAME: &str = "quick_test_app";
const USER_ID: &str = "test_user";
const SESSION_ID: &str = "test_session";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();

    quick_start(|| connect(APP_NAME, USER_ID, SESSION_ID)).await
}
