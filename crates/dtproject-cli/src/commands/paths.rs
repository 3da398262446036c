use super::{json_pretty, Context, PathKind, EXIT_SUCCESS};
use dtproject_core::CoreError;
use std::path::Path;

pub fn run(ctx: &Context, kind: PathKind, root: Option<&Path>) -> Result<u8, CoreError> {
    let project = ctx.load()?;
    let name = project.name();
    let mappings = project.path_resolver(&name).paths(kind.into(), root)?;

    if ctx.json {
        println!("{}", json_pretty(&mappings)?);
    } else if mappings.is_empty() {
        println!("no matching paths");
    } else {
        for mapping in &mappings {
            if mapping.destination.is_empty() {
                println!("{}", mapping.local.display());
            } else {
                println!("{} -> {}", mapping.local.display(), mapping.destination);
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
