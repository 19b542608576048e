//! `storewise chat`: interactive console session.

use std::io::Write;
use std::path::Path;
use storewise_core::agent::AgentDisplay;
use storewise_core::session::SharedSessionState;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{console_driver, load_config, spawn_progress};

/// What a line typed at the prompt asks for.
#[derive(Debug, PartialEq)]
enum ReplCommand<'a> {
    Skip,
    Exit,
    Debug,
    Clear,
    Query(&'a str),
}

fn parse_line(line: &str) -> ReplCommand<'_> {
    let input = line.trim();
    match input.to_lowercase().as_str() {
        "" => ReplCommand::Skip,
        "exit" | "quit" => ReplCommand::Exit,
        "debug" => ReplCommand::Debug,
        "clear" => ReplCommand::Clear,
        _ => ReplCommand::Query(input),
    }
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let driver = console_driver(&config, "console")?;
    let _progress = spawn_progress(driver.events(), driver.session_id());

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Storewise, your retail assistant        ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Ask about store performance, inventory, policy, demographics");
    println!("  or market trends.");
    println!();
    println!("  Commands: 'debug' shows session state, 'clear' starts over,");
    println!("  'exit' or 'quit' leaves.");
    println!();

    let missing = config.missing_keys();
    if !missing.is_empty() {
        println!("  ⚠️  Not configured: {}", missing.join(", "));
        println!();
    }

    let mut state = SharedSessionState::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            ReplCommand::Skip => {}
            ReplCommand::Exit => break,
            ReplCommand::Debug => {
                let view = serde_json::to_string_pretty(&state.debug_view())?;
                println!("{view}");
            }
            ReplCommand::Clear => {
                state.clear();
                println!("  Conversation cleared.");
            }
            ReplCommand::Query(query) => match driver.process_query(query, &mut state).await {
                Ok(reply) => {
                    println!();
                    println!("  {}", AgentDisplay::for_agent(reply.agent).label());
                    for line in reply.final_text.lines() {
                        println!("  {line}");
                    }
                    println!();
                }
                Err(e) => {
                    eprintln!("  [Error] {}", e.user_message());
                    println!();
                }
            },
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}
