mod control_loop;
mod hardware_fault;
mod properties;
mod rule_file_cycles;

use std::time::{Duration, Instant};

/// Poll `cond` every millisecond until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}
