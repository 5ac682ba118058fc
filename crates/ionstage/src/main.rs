mod cli;
mod input;
mod page;
mod run;

use anyhow::Result;
use cli::{CheckArgs, Command};

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Check(check)) => run_check(check),
        None => run::run(cli.run),
    }
}

fn run_check(args: CheckArgs) -> Result<()> {
    let scene = run::load_scene_file(&args.scene)?;

    println!("{}: ok", args.scene.display());
    println!("  version:  {}", scene.version);
    println!("  sections: {}", scene.sections.len());
    for section in &scene.sections {
        let lightning = section.lightning;
        println!(
            "  [{id}] media={media} hue={hue} x_offset={x_offset} speed={speed} \
             intensity={intensity} size={size}",
            id = section.id,
            media = section.media,
            hue = lightning.hue,
            x_offset = lightning.x_offset,
            speed = lightning.speed,
            intensity = lightning.intensity,
            size = lightning.size,
        );
        if let Some(title) = &section.title {
            println!("        title:  {title}");
        }
        if let Some(source) = &section.source {
            println!("        source: {source}");
        }
    }

    Ok(())
}
