//! Demo for topicbus
//!
//! Starts one producer and two consumers on the same topic. The fast consumer
//! has a large queue; the slow one has a queue of two and loses the oldest
//! messages it cannot keep up with.

use std::thread;
use std::time::Duration;

use topicbus::config::load_config;
use topicbus::utils::logging;
use topicbus::{Publisher, Subscriber, TopicRegistry};
use tracing::{error, info};

const TOPIC: &str = "demo/ticks";
const MESSAGES: u32 = 20;

fn main() {
    if let Err(e) = run() {
        eprintln!("Demo failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init(&config.logging.level);

    let registry = TopicRegistry::with_settings(config.bus.clone());

    let fast = registry.subscriber_default::<u32>(TOPIC);
    let slow = Subscriber::<u32>::new(&registry, TOPIC, 2);
    info!(
        fast_capacity = fast.capacity(),
        slow_capacity = slow.capacity(),
        "subscribers attached"
    );

    let fast_consumer = thread::Builder::new()
        .name("fast".into())
        .spawn(move || {
            let mut received = 0;
            while let Some(tick) = fast.pop_for(Duration::from_millis(200)) {
                received += 1;
                if tick + 1 == MESSAGES {
                    break;
                }
            }
            info!(received, dropped = fast.dropped(), "fast consumer done");
        })?;

    let slow_consumer = thread::Builder::new()
        .name("slow".into())
        .spawn(move || {
            let mut received = Vec::new();
            while let Some(tick) = slow.pop_for(Duration::from_millis(200)) {
                received.push(tick);
                thread::sleep(Duration::from_millis(15));
            }
            info!(?received, dropped = slow.dropped(), "slow consumer done");
        })?;

    let publisher = Publisher::<u32>::new(&registry, TOPIC);
    for tick in 0..MESSAGES {
        let delivered = publisher.push(tick);
        tracing::debug!(tick, delivered, "published");
        thread::sleep(Duration::from_millis(5));
    }

    if fast_consumer.join().is_err() || slow_consumer.join().is_err() {
        error!("a consumer thread panicked");
    }

    info!(topics = ?registry.topic_names::<u32>(), "demo finished");
    Ok(())
}
