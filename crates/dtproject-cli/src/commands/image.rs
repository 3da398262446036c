use super::{json_pretty, Context, ImageArgs, EXIT_SUCCESS};
use dtproject_core::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Image,
    Vscode,
    Vnc,
    Release,
    Manifest,
}

impl Variant {
    pub fn from_flags(manifest: bool, release: bool, vscode: bool, vnc: bool) -> Self {
        if manifest {
            Variant::Manifest
        } else if release {
            Variant::Release
        } else if vscode {
            Variant::Vscode
        } else if vnc {
            Variant::Vnc
        } else {
            Variant::Image
        }
    }
}

pub fn run(ctx: &Context, args: &ImageArgs, variant: Variant) -> Result<u8, CoreError> {
    let project = ctx.load()?;
    let tag = match variant {
        Variant::Image => project.image(&args.spec()?)?,
        Variant::Vscode => project.image_vscode(&args.spec()?)?,
        Variant::Vnc => project.image_vnc(&args.spec()?)?,
        Variant::Release => {
            project.image_release(&args.arch()?, &args.registry, &args.owner, args.docs)?
        }
        Variant::Manifest => project.manifest(&args.registry, &args.owner, args.tag.as_deref()),
    };

    if ctx.json {
        println!("{}", json_pretty(&serde_json::json!({ "image": tag }))?);
    } else {
        println!("{tag}");
    }
    Ok(EXIT_SUCCESS)
}
