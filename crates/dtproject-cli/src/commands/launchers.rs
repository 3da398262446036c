use super::{json_pretty, Context, EXIT_SUCCESS};
use dtproject_core::CoreError;

pub fn run(ctx: &Context) -> Result<u8, CoreError> {
    let project = ctx.load()?;
    let launchers = project.launcher_files()?;
    if ctx.json {
        println!("{}", json_pretty(&launchers)?);
    } else {
        for (name, path) in &launchers {
            println!("{name:<20} {}", path.display());
        }
    }
    Ok(EXIT_SUCCESS)
}
