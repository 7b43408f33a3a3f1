//! Policy command implementation

use anyhow::Result;
use finaicer_core::policy::default_config_path;
use finaicer_core::PolicyConfig;

pub fn cmd_policy(policy: &PolicyConfig) -> Result<()> {
    if let Some(path) = default_config_path() {
        println!("# Override file: {}", path.display());
    }
    print!("{}", policy.to_toml()?);
    Ok(())
}
