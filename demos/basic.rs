//! Walkthrough of the sketch counter: insert a few keys, dump the table,
//! query an estimate.
//!
//! Run with: `cargo run --example basic`

use floodgate::{SketchCounter, SketchParams};

fn main() {
    let mut cms = SketchCounter::new(SketchParams::new(3, 4).unwrap());

    println!("{}", cms);

    for key in ["iphone", "android", "windows"] {
        cms.update(key);
        println!("inserted {}", key);
        println!("{}", cms);
    }

    println!("estimated count of android = {}", cms.estimate("android"));
}
