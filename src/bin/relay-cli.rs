use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Call the session relay's public endpoints", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Session cookie to send, e.g. "access_token=...".
    #[arg(short, long)]
    cookie: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upstream liveness
    Health,
    /// Upstream readiness
    Ready,
    /// Log in; prints the session cookie the relay hands back
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// End the session
    Logout,
    /// Current user
    Me,
    /// GitHub profile of the current user
    GithubUser,
    /// GitHub repositories of the current user
    GithubRepos,
    /// Store a GitHub personal access token
    GithubConfigure {
        #[arg(long)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(cookie) = &cli.cookie {
        headers.insert(COOKIE, HeaderValue::from_str(cookie)?);
    }

    let base = cli.url.trim_end_matches('/');
    let request = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)),
        Commands::Ready => client.get(format!("{}/health/ready", base)),
        Commands::Login { username, password } => client
            .post(format!("{}/auth/login", base))
            .json(&json!({ "username": username, "password": password })),
        Commands::Register {
            username,
            password,
            email,
        } => {
            let mut body = json!({ "username": username, "password": password });
            if let Some(email) = email {
                body["email"] = Value::String(email);
            }
            client.post(format!("{}/auth/register", base)).json(&body)
        }
        Commands::Logout => client.post(format!("{}/auth/logout", base)),
        Commands::Me => client.get(format!("{}/auth/me", base)),
        Commands::GithubUser => client.get(format!("{}/github/user", base)),
        Commands::GithubRepos => client.get(format!("{}/github/repos", base)),
        Commands::GithubConfigure { token } => client
            .post(format!("{}/github/configure", base))
            .json(&json!({ "github_token": token })),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    println!("Status: {}", status);
    for cookie in res.headers().get_all(SET_COOKIE) {
        println!("Set-Cookie: {}", cookie.to_str().unwrap_or("<non-ascii>"));
    }

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }

    if !status.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
