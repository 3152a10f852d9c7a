//! Pizza ordering console.
//!
//! Configure with `pizza.toml` or `DB_DIR` / `DB_NAME` / `DB_MAX_CONNECTIONS`,
//! logging with `RUST_LOG`.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pizza_cli::run().await
}
