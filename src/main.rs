use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = sdf_sandbox::config::Config::parse();
    if cfg.list_presets {
        for name in sdf_sandbox::preset::PresetLibrary::builtin().names() {
            println!("{name}");
        }
        return Ok(());
    }

    sdf_sandbox::logging::init(cfg.log_file.as_deref())?;
    sdf_sandbox::app::run(cfg)
}
