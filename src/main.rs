use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;

use partyline::{
    AppConfig, ExampleDeck, GameEngine, MemoryStore, OpenAIPromptModel, PromptModel, logging,
};

fn read_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn print_scores(engine: &GameEngine) {
    if let Some(session) = engine.session() {
        for (index, (player, score)) in session
            .players
            .iter()
            .zip(session.scores.iter())
            .enumerate()
        {
            println!("  {}. {player}: {score}", index + 1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let config = AppConfig::load().unwrap_or_default();
    let model: Option<Arc<dyn PromptModel>> = match (&config.openai_api_key, config.offline) {
        (Some(key), false) => Some(Arc::new(OpenAIPromptModel::new(
            key.clone(),
            config.model.clone(),
        ))),
        _ => None,
    };

    let store = Arc::new(MemoryStore::new());
    let mut engine = GameEngine::new(store, model, ExampleDeck::builtin().clone());
    engine.set_offline(config.offline);

    println!("partyline - party prompt engine");
    let line = read_line("Players (comma separated): ")?;
    let players: Vec<String> = line
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    let id = engine.start_session(players).await?;
    println!("Session {id} started.");
    println!("Enter: next prompt | p <n>: penalty for player n | s: scores | q: quit");

    for line in io::stdin().lock().lines() {
        let line = line?;
        let input = line.trim();

        if input == "q" {
            break;
        }
        if input == "s" {
            print_scores(&engine);
            continue;
        }
        if let Some(rest) = input.strip_prefix("p ") {
            match rest.trim().parse::<usize>() {
                Ok(number) if number >= 1 => {
                    engine.increment_penalty(number - 1).await?;
                    print_scores(&engine);
                }
                _ => println!("usage: p <player number>"),
            }
            continue;
        }

        let prompt = engine.next_prompt().await;
        println!("\n  {prompt}\n");
        if let Some(err) = engine.last_store_error() {
            println!("(warning: prompt not saved: {err})");
        }
    }

    Ok(())
}
