use super::{json_pretty, spin_fail, spin_ok, spinner, Context, ImageArgs, EXIT_SUCCESS};
use dtproject_core::CoreError;
use dtproject_remote::HttpMetadataClient;

pub fn run(ctx: &Context, args: &ImageArgs) -> Result<u8, CoreError> {
    let project = ctx.load()?;
    let client = HttpMetadataClient::new(ctx.settings.remote()?);
    let arch = args.arch()?;

    let pb = spinner("fetching image metadata…");
    let meta = project
        .remote_image_metadata(&client, &arch, &args.registry, &args.owner)
        .inspect_err(|_| spin_fail(&pb, "metadata not available"))?;
    spin_ok(&pb, "metadata fetched");
    println!("{}", json_pretty(&meta)?);
    Ok(EXIT_SUCCESS)
}
