// Terminal client for a running symptom-service.
//
// Usage:
//   cargo run --bin terminal_client -- --url http://localhost:3000
use clap::Parser;
use demos::render;
use serde::Deserialize;
use serde_json::{Value, json};
use symptom_flow::Message;

#[derive(Parser, Debug)]
#[command(name = "terminal_client", about = "Chat with a symptom-service over HTTP")]
struct Args {
    /// Base URL of the service
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    session_id: String,
    messages: Vec<Message>,
    status: String,
}

struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    async fn post(&self, path: &str, body: Value) -> anyhow::Result<ChatReply> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error: Value = response.json().await.unwrap_or(Value::Null);
            let message = error["error"].as_str().unwrap_or("request failed");
            anyhow::bail!("{status}: {message}");
        }
        Ok(response.json().await?)
    }
}

fn read_line() -> anyhow::Result<Option<String>> {
    let mut input = String::new();
    if std::io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = Client {
        http: reqwest::Client::new(),
        base_url: args.url.trim_end_matches('/').to_string(),
    };

    let opened = client.post("/chat", json!({})).await?;
    let session_id = opened.session_id;
    println!("Session: {session_id}");
    println!("Type 'restart' to start over, 'quit' to exit.\n");
    render(&opened.messages);

    while let Some(input) = read_line()? {
        let result = match input.as_str() {
            "quit" | "exit" => break,
            "restart" => {
                client
                    .post(&format!("/chat/{session_id}/reset"), json!({}))
                    .await
            }
            _ => {
                client
                    .post(
                        "/chat",
                        json!({ "session_id": session_id, "content": input }),
                    )
                    .await
            }
        };

        match result {
            Ok(reply) => {
                render(&reply.messages);
                if reply.status == "completed" {
                    println!("\n(conversation complete, type 'restart' to go again)");
                }
            }
            Err(e) => println!("Error: {e}"),
        }
    }

    Ok(())
}
