//! Binary entrypoint for the swarm-prune CLI.

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = swarm_prune_cli::run().await;
    std::process::exit(exit_code);
}
