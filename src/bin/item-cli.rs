use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use item_gateway::backend::{GrpcBackend, ItemBackend};
use item_gateway::config::BackendConfig;
use item_gateway::resilience::Deadlines;

#[derive(Parser)]
#[command(name = "item-cli")]
#[command(about = "Command line client for the item gateway and item service", long_about = None)]
struct Cli {
    /// Gateway base URL
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    /// Item service host (gRPC commands)
    #[arg(long, env = "GRPC_HOST", default_value = "localhost")]
    grpc_host: String,

    /// Item service port (gRPC commands)
    #[arg(long, env = "GRPC_PORT", default_value_t = 50051)]
    grpc_port: u16,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an item through the gateway
    Create { id: i64, name: String },
    /// Read one item through the gateway
    Get { id: i64 },
    /// List all items through the gateway
    List,
    /// Rename an item through the gateway
    Update { id: i64, name: String },
    /// Delete an item through the gateway
    Delete { id: i64 },
    /// Show gateway health and breaker state
    Health,
    /// Add items over the client-streaming RPC
    BulkAdd {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Send messages over the bidirectional chat RPC
    Chat {
        #[arg(required = true)]
        messages: Vec<String>,
    },
    /// Walk through all four RPC shapes against the item service
    RpcDemo,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let items = format!("{}/items", cli.url.trim_end_matches('/'));

    match cli.command {
        Commands::Create { id, name } => {
            let res = client
                .post(&items)
                .json(&json!({ "id": id, "name": name }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Get { id } => {
            let res = client.get(format!("{items}/{id}")).send().await?;
            print_response(res).await?;
        }
        Commands::List => {
            let res = client.get(&items).send().await?;
            print_response(res).await?;
        }
        Commands::Update { id, name } => {
            let res = client
                .put(format!("{items}/{id}"))
                .json(&json!({ "id": id, "name": name }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Delete { id } => {
            let res = client
                .delete(format!("{items}/{id}"))
                .json(&json!({ "id": id }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client
                .get(format!("{}/health", cli.url.trim_end_matches('/')))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::BulkAdd { names } => {
            let backend = grpc(&cli.grpc_host, cli.grpc_port)?;
            let total = backend.add_items(names).await?;
            println!("Total items added: {total}");
        }
        Commands::Chat { messages } => {
            let backend = grpc(&cli.grpc_host, cli.grpc_port)?;
            for reply in backend.chat(messages).await? {
                println!("Server replied: {reply}");
            }
        }
        Commands::RpcDemo => {
            let backend = grpc(&cli.grpc_host, cli.grpc_port)?;
            rpc_demo(&backend).await?;
        }
    }

    Ok(())
}

fn grpc(host: &str, port: u16) -> Result<GrpcBackend, Box<dyn std::error::Error>> {
    let config = BackendConfig {
        host: host.to_string(),
        port,
        ..BackendConfig::default()
    };
    Ok(GrpcBackend::connect_lazy(&config, Deadlines::default())?)
}

async fn rpc_demo(backend: &GrpcBackend) -> Result<(), Box<dyn std::error::Error>> {
    banner("1. UNARY RPC: GetItemById");
    match backend.get_item(1).await {
        Ok(item) => println!("Response: ID={}, Name={}", item.id, item.name),
        Err(e) => println!("Error: {e}"),
    }

    banner("2. SERVER-STREAMING RPC: ListAllItems");
    for item in backend.list_items().await? {
        println!("Item: ID={}, Name={}", item.id, item.name);
    }

    banner("3. CLIENT-STREAMING RPC: AddItems");
    let names: Vec<String> = ["Zoey", "Prapti", "Bavan"].map(String::from).into();
    for name in &names {
        println!("Sending: {name}");
    }
    let total = backend.add_items(names).await?;
    println!("Total items added: {total}");

    banner("4. BIDIRECTIONAL STREAMING RPC: ChatAboutItems");
    let messages: Vec<String> = ["Hello", "How are you?", "Goodbye"].map(String::from).into();
    for message in &messages {
        println!("Client sending: {message}");
    }
    match backend.chat(messages).await {
        Ok(replies) => replies
            .iter()
            .for_each(|reply| println!("Server replied: {reply}")),
        Err(e) => println!("gRPC error: {e}"),
    }

    Ok(())
}

fn banner(title: &str) {
    println!("\n{}", "=".repeat(50));
    println!("{title}");
    println!("{}", "=".repeat(50));
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let request_id = res
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let json: Value = res.json().await.unwrap_or(Value::Null);

    if status.is_success() {
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        eprintln!("Error: gateway returned status {status} (request {request_id})");
        eprintln!("{}", serde_json::to_string_pretty(&json)?);
    }
    Ok(())
}
