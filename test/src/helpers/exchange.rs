use std::time::Instant;

use super::TestNode;

const MAX_EXCHANGE_ROUNDS: usize = 32;

/// Pumps every node until no transport events are left in flight
pub fn exchange(nodes: &mut [&mut TestNode], now: Instant) {
    for _ in 0..MAX_EXCHANGE_ROUNDS {
        let delivered: usize = nodes.iter_mut().map(|node| node.pump(now)).sum();
        if delivered == 0 {
            return;
        }
    }
    panic!("transport events still in flight after {} rounds", MAX_EXCHANGE_ROUNDS);
}
