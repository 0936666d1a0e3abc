//! Wiring the admission filter in front of a request loop.
//!
//! The hosting protocol layer is simulated here with plain function calls:
//! each "request" carries a peer address, the filter decides admit/reject,
//! and rejected requests would be answered with the protocol's
//! too-many-requests outcome instead of reaching a handler.
//!
//! Run with: `cargo run --example server_wiring`

use floodgate::AdmissionFilter;
use std::time::Duration;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let filter = AdmissionFilter::builder()
        .with_sketch_dimensions(5, 25)
        .with_threshold(20)
        .with_decay_interval(Duration::from_secs(60))
        .build()
        .expect("valid admission config");

    // one client hammering, one behaving
    for i in 1..=25 {
        let decision = filter.check(None, "203.0.113.9:40001");
        println!("request {:2} from 203.0.113.9 -> {:?}", i, decision);
    }
    let decision = filter.check(None, "198.51.100.2:40002");
    println!("request  1 from 198.51.100.2 -> {:?}", decision);

    println!("\ncounter state:\n{}", filter.dump_counter());

    let snapshot = filter.metrics().snapshot();
    println!(
        "admitted={} rejected={} rejection_rate={:.0}%",
        snapshot.requests_admitted,
        snapshot.requests_rejected,
        snapshot.rejection_rate() * 100.0
    );

    filter.shutdown().await.expect("clean shutdown");
}
