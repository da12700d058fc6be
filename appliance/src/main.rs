mod app;
mod console;
mod drivers;
mod input;
mod panel;
mod serial;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
