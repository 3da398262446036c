use super::{Context, ImageArgs, EXIT_SUCCESS};
use dtproject_core::CoreError;
use dtproject_runtime::DockerCli;

pub fn run(ctx: &Context, args: &ImageArgs) -> Result<u8, CoreError> {
    let project = ctx.load()?;
    let mut docker = DockerCli::new().with_program(ctx.settings.docker.clone());
    if let Some(host) = &ctx.settings.docker_host {
        docker = docker.with_host(host.clone());
    }
    let meta = project.ci_metadata(&docker, &args.spec()?)?;
    println!("{}", meta.to_json_pretty()?);
    Ok(EXIT_SUCCESS)
}
