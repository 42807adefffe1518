//! Traffic Light State Machine
//!
//! A pedestrian crossing: red and yellow phases are timed, green lasts
//! until the crossing button is pressed (but at least two seconds).
//!
//! Key concepts:
//! - Exit times and overflow carried across transitions
//! - Trigger parameters consumed by the transition they fire
//! - Checkpointing the runtime position
//!
//! Run with: cargo run --example traffic_light

use bluecheese::core::{Condition, State};
use bluecheese::fsm::StateMachine;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    println!("=== Traffic Light State Machine ===\n");

    let mut light = StateMachine::builder()
        .name("crossing")
        .add_default_state(State::new("Red").on_enter(|_| println!("  STOP")))?
        .add_state(State::new("Green").on_enter(|_| println!("  GO")))?
        .add_state(State::new("Yellow").on_enter(|_| println!("  CAUTION")))?
        .add_transition("Red", "Green", 4.0, [])?
        .add_transition("Green", "Yellow", 2.0, [Condition::trigger("button")])?
        .add_transition("Yellow", "Red", 1.0, [])?
        .build()?;

    light.start()?;
    println!("Initial state: {:?}\n", light.current_state());

    for second in 1..=12 {
        if second == 8 {
            println!("  (button pressed)");
            light.set_trigger("button");
        }
        light.update(1.0);
        println!(
            "t={second:>2}s  {:<6} ({:.1}s in state)",
            light.current_state().unwrap_or("-"),
            light.state_time()
        );
    }

    println!("\nOne large step carries overflow into the next phase:");
    light.update(4.5);
    println!("  now {:?} after {:.1}s", light.current_state(), light.state_time());
    println!("  path: {:?}", light.history().get_path());

    let checkpoint = light.checkpoint();
    println!("\nCheckpoint {} at {:?}", checkpoint.id, checkpoint.current_state);

    light.dispose();
    println!("\n=== Example Complete ===");
    Ok(())
}
