//! One-shot deployment of Screen Relay.
//!
//! The consumer for this build writes each delivered PNG to stdout, so
//! the tool composes with a pipe:
//!
//! ```sh
//! SCREEN_RELAY_QUIT=auto screen-relay > shot.png
//! ```

use std::io::{self, Write};
use std::sync::Arc;

fn main() {
    let config = screen_relay_lib::RunConfig::load();

    screen_relay_lib::run(
        Arc::new(|png: Vec<u8>| {
            let mut out = io::stdout().lock();
            if let Err(e) = out.write_all(&png).and_then(|_| out.flush()) {
                log::error!("consumer could not write frame to stdout: {e}");
            }
        }),
        config,
    );
}
