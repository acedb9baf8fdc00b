#[cfg(not(target_arch = "wasm32"))]
use anyhow::Result;
#[cfg(not(target_arch = "wasm32"))]
use scriptvox::core::config::Config;

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            eprintln!("Please check 'config.yml' or remove it to use the defaults.");
            return Err(e);
        }
    };

    scriptvox::terminal::run(config).await
}

// The browser build starts from `scriptvox::start`.
#[cfg(target_arch = "wasm32")]
fn main() {}
