//! Request authorization example.
//!
//! Builds a captured request carrying an API key and authenticates it
//! against Archetype, then walks the common error cases.
//!
//! # Running
//!
//! ```bash
//! export ARCHETYPE_APP_ID="your-app-id"
//! export ARCHETYPE_SECRET_KEY="sk_test_your_key"
//! export CALLER_APIKEY="a-caller-key"
//! cargo run --example authorize_request
//! ```

use archetype::{Archetype, ArchetypeConfig, ArchetypeError, CapturedRequest};

#[tokio::main]
async fn main() {
    // The key a caller would have supplied on their request
    let caller_key =
        std::env::var("CALLER_APIKEY").expect("Set CALLER_APIKEY environment variable");

    // Credentials from ARCHETYPE_APP_ID / ARCHETYPE_SECRET_KEY
    let config = match ArchetypeConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let gateway = match Archetype::new(config) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Failed to build gateway: {}", e);
            std::process::exit(1);
        }
    };

    println!("Authorizing against {}", gateway.base_endpoint());

    // In a real service an adapter fills this in from the framework's
    // request type; here we fake an inbound GET.
    let request = CapturedRequest::new("GET", "/api/reports")
        .with_ip("127.0.0.1")
        .with_header("apikey", caller_key);

    match gateway.authenticate(&request).await {
        Ok(outcome) => {
            println!("✓ Request authorized (status {})", outcome.status_code);
        }
        Err(e) => {
            // Handle specific error cases appropriately
            match &e {
                ArchetypeError::MissingApiKey => {
                    eprintln!("The request carried no apikey at all");
                }
                ArchetypeError::ApiKeyRejected => {
                    eprintln!("The caller's apikey is invalid or expired");
                }
                ArchetypeError::QuotaExceeded => {
                    eprintln!("The caller is over quota or rate limited");
                }
                ArchetypeError::Transport(_) => {
                    eprintln!("Archetype is unreachable: {}", e);
                }
                _ => {
                    eprintln!("Authorization failed: {}", e);
                }
            }
            std::process::exit(1);
        }
    }
}
