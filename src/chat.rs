use crate::agent::Agent;
use crate::shortcuts::{self, Dispatch};
use crate::store::TaskStore;
use std::io::{self, BufRead, Write};

/// The interactive loop: read a line, fully resolve it, print, repeat.
/// Fast shortcuts never reach the agent; everything else is one blocking
/// round trip, and an agent failure is printed without ending the loop.
pub fn run_chat(store: &TaskStore, agent: &mut Agent) -> anyhow::Result<()> {
    println!("Task assistant ready. Type 'quit' to exit.");
    println!("Tip: type '/help' to see available shortcuts.\n");

    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("You: ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();

        if input.eq_ignore_ascii_case("quit") {
            break;
        }

        match shortcuts::dispatch(store, input) {
            Dispatch::Reply(text) => println!("{text}"),
            Dispatch::Forward(text) | Dispatch::Passthrough(text) => {
                match agent.send(store, &text) {
                    Ok(reply) => println!("\nAgent: {reply}\n"),
                    Err(e) => println!("Run failed: {e}"),
                }
            }
        }
    }

    Ok(())
}
