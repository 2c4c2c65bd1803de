// authcli/src/main.rs
//! Small command-line client exercising the auth API through the session
//! agent.

use anyhow::bail;
use std::env;

mod agent;

use agent::SessionAgent;

const USAGE: &str = "usage: authcli <register|login|logout-all> <email> <password>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_url = env::var("AUTH_API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let args: Vec<String> = env::args().collect();

    let (command, email, password) = match args.as_slice() {
        [_, command, email, password] => (command.as_str(), email.as_str(), password.as_str()),
        _ => bail!(USAGE),
    };

    let mut agent = SessionAgent::new(base_url)?;

    match command {
        "register" => {
            let body = agent.register(email, password, None).await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        "login" => {
            let body = agent.login(email, password).await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
            if let Some(token) = agent.access_token() {
                println!("access token: {}", token);
            }

            let response = agent.get("/api/me").await?;
            let me: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&me)?);
        }
        "logout-all" => {
            agent.login(email, password).await?;
            let response = agent.post("/api/auth/logout-all", &serde_json::json!({})).await?;
            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        _ => bail!(USAGE),
    }

    Ok(())
}
