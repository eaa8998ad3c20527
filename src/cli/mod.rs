// CLI module for infradash
// Author: kelexine (https://github.com/kelexine)

use clap::Parser;

/// infradash - runtime-portable OpenAI-compatible proxy for DeepInfra
///
/// All configuration is environment-driven (`PORT`, `TOKEN`, `HOST`,
/// `INFRADASH_RUNTIME`); the binary takes no flags beyond
/// `--help`/`--version`.
#[derive(Parser, Debug)]
#[command(name = "infradash", version, about, long_about = None)]
pub struct Args {}
