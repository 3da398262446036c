use super::{json_pretty, spin_fail, spin_ok, spinner, Context, EXIT_SUCCESS};
use dtproject_core::CoreError;

pub fn run(ctx: &Context, update: bool) -> Result<u8, CoreError> {
    let project = ctx.load()?;
    let Some(dir) = project.recipe_dir()? else {
        if ctx.json {
            println!("{}", json_pretty(&serde_json::json!({ "recipe": null }))?);
        } else {
            println!("project '{}' does not use a recipe", project.name());
        }
        return Ok(EXIT_SUCCESS);
    };

    let pb = spinner("fetching recipe…");
    project.ensure_recipe_exists().inspect_err(|_| {
        spin_fail(&pb, "recipe not available");
    })?;
    let updated = if update {
        pb.set_message("updating recipe…");
        project.ensure_recipe_updated().inspect_err(|_| {
            spin_fail(&pb, "recipe update failed");
        })?
    } else {
        false
    };
    spin_ok(&pb, if updated { "recipe updated" } else { "recipe ready" });

    if ctx.json {
        let payload = serde_json::json!({
            "recipe": dir,
            "reference": project.recipe_ref()?,
            "updated": updated,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("{}", dir.display());
    }
    Ok(EXIT_SUCCESS)
}
