use super::{colorize_flag, json_pretty, Context, EXIT_SUCCESS};
use dtproject_core::{CiProjectInfo, CoreError};
use dtproject_schema::Field;

pub fn run(ctx: &Context) -> Result<u8, CoreError> {
    let project = ctx.load()?;
    let info = CiProjectInfo::from_project(&project);
    let descriptor = project.descriptor();

    if ctx.json {
        let mut value = serde_json::to_value(&info)?;
        if descriptor.supports(Field::Description) {
            value["description"] = project.description()?.into();
            value["maintainer"] = project.maintainer()?.into();
            value["icon"] = project.icon()?.into();
        }
        if descriptor.supports(Field::Layers) {
            value["layers"] = project.layers()?.names().into();
        }
        println!("{}", json_pretty(&value)?);
        return Ok(EXIT_SUCCESS);
    }

    println!("name:         {}", info.name);
    println!("path:         {}", info.path.display());
    println!("type:         {} v{}", info.project_type, info.type_version);
    println!("version:      {}", info.version);
    println!("distro:       {}", info.distro);
    if descriptor.supports(Field::Description) {
        println!("description:  {}", project.description()?);
        println!("maintainer:   {}", project.maintainer()?);
        println!("icon:         {}", project.icon()?);
    }
    if descriptor.supports(Field::Layers) {
        println!("layers:       {}", project.layers()?.names().join(", "));
    }
    println!("version name: {}", info.version_name);
    println!("head:         {}", info.head_version);
    println!("closest:      {}", info.closest_version);
    println!("sha:          {}", info.sha);
    println!("url:          {}", info.url.as_deref().unwrap_or("(none)"));
    println!(
        "adapters:     {}",
        info.adapters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "state:        {}, {}, {}",
        colorize_flag("clean", info.is_clean),
        colorize_flag("release", info.is_release),
        colorize_flag("detached", info.is_detached),
    );
    Ok(EXIT_SUCCESS)
}
