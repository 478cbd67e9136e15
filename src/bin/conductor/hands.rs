//! Hand frames from stdin.
//!
//! An external tracker pipes one JSON object per video frame, e.g.
//! `{"hands":[{"x":320,"y":240,"label":"left"}]}`. A reader thread parses
//! each line and queues it for the UI thread.

use std::io::BufRead;
use std::thread;

use rtrb::{Consumer, RingBuffer};
use tracing::{debug, info, warn};

use lane_conductor::mapping::HandFrame;

const FRAME_QUEUE_SIZE: usize = 64;

/// Spawn the reader; the returned queue yields frames as they arrive.
pub fn spawn_stdin_reader() -> Consumer<HandFrame> {
    let (mut tx, rx) = RingBuffer::<HandFrame>::new(FRAME_QUEUE_SIZE);

    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "hand feed read failed");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match HandFrame::from_json(&line) {
                Ok(frame) => {
                    if tx.push(frame).is_err() {
                        debug!("hand queue full; frame dropped");
                    }
                }
                Err(e) => warn!(error = %e, "bad hand frame"),
            }
        }
        info!("hand feed closed");
    });

    rx
}
