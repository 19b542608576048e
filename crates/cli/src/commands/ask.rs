//! `storewise ask`: answer one query and exit.

use std::path::Path;
use storewise_core::agent::AgentDisplay;
use storewise_core::session::SharedSessionState;

use super::{console_driver, load_config, spawn_progress};

pub async fn run(config_path: Option<&Path>, query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let driver = console_driver(&config, "console")?;
    let progress = spawn_progress(driver.events(), driver.session_id());

    let mut state = SharedSessionState::new();
    let result = driver.process_query(query, &mut state).await;
    progress.abort();

    match result {
        Ok(reply) => {
            println!("{}", AgentDisplay::for_agent(reply.agent).label());
            println!("{}", reply.final_text);
            Ok(())
        }
        Err(e) => {
            eprintln!("  [Error] {}", e.user_message());
            Err(e.into())
        }
    }
}
