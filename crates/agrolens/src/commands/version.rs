pub fn run() -> anyhow::Result<()> {
    println!("agrolens {}", env!("CARGO_PKG_VERSION"));
    println!("Crop photo diagnosis client with resumable, cached analysis");
    Ok(())
}
