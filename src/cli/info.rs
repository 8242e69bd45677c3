use anyhow::Result;

use super::context::CliContext;

pub fn cmd_info(ctx: &CliContext) -> Result<()> {
    let config = ctx.config();
    println!("tabpilot v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "  build:        {} ({})",
        env!("TABPILOT_GIT_HASH"),
        env!("TABPILOT_BUILD_DATE")
    );
    println!("  config:       {}", ctx.config_path().display());
    println!(
        "  reasoning:    {}",
        if config.reasoning.mock {
            "mock".to_string()
        } else {
            config.reasoning.endpoint.clone()
        }
    );
    println!("  max steps:    {}", config.agent.max_steps);
    println!("  run policy:   {:?}", config.agent.run_policy);
    println!("  router origin: {}", config.router.origin);
    Ok(())
}
