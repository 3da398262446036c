mod common;

use common::{layered_project, legacy_project, loader, write};
use dtproject_core::{ArtifactKind, CoreError, PathMapping};
use dtproject_runtime::mock::{MockRecipeClient, MockVcs};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn exercise(parent: &Path) -> PathBuf {
    legacy_project(
        parent,
        "lane-following",
        &[
            "TYPE=template-exercise",
            "TYPE_VERSION=3",
            "VERSION=1.0",
            "RECIPE_REPOSITORY=org/recipes",
            "RECIPE_BRANCH=ente",
            "RECIPE_LOCATION=lane",
        ],
    )
}

fn recipes() -> Arc<MockRecipeClient> {
    Arc::new(
        MockRecipeClient::new()
            .with_file(
                "lane/.dtproject",
                "TYPE=template-ros\nTYPE_VERSION=3\nVERSION=2.0\n",
            )
            .with_file("lane/Dockerfile", "FROM scratch\n")
            .with_file("lane/Dockerfile.vnc", "FROM scratch\n")
            .with_file("lane/launchers/default.sh", "#!/bin/bash\necho recipe\n")
            .with_file("lane/launchers/record.sh", "#!/bin/bash\necho record\n"),
    )
}

#[test]
fn recipe_is_cloned_into_the_cache_on_demand() {
    let dir = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let client = recipes();
    let project = loader(MockVcs::clean("x", "b"), Arc::clone(&client), cache.path())
        .load(&exercise(dir.path()))
        .unwrap();

    assert!(project.needs_recipe());
    let expected = cache.path().join("org__recipes/ente/lane");
    assert_eq!(project.recipe_dir().unwrap(), Some(expected.clone()));
    assert!(matches!(project.recipe(), Err(CoreError::RecipeNotFound(_))));

    project.ensure_recipe_exists().unwrap();
    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].op, "clone");
    assert_eq!(calls[0].repository, "org/recipes");
    assert_eq!(calls[0].destination, cache.path().join("org__recipes/ente"));

    let recipe = project.recipe().unwrap().unwrap();
    assert_eq!(recipe.path(), expected);
    assert_eq!(recipe.version(), "2.0");

    // existing clone is reused
    project.ensure_recipe_exists().unwrap();
    assert_eq!(client.calls().len(), 1);
}

#[test]
fn recipe_supplies_dockerfiles_and_launchers() {
    let dir = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let path = exercise(dir.path());
    write(&path, "launchers/default.sh", "#!/bin/bash\necho project\n");
    write(&path, "launchers/calibrate.sh", "#!/bin/sh\n");
    write(&path, "launchers/README.md", "not a launcher\n");
    write(&path, "Dockerfile.vscode", "FROM scratch\n");

    let project = loader(MockVcs::clean("x", "b"), recipes(), cache.path())
        .load(&path)
        .unwrap();
    project.ensure_recipe_exists().unwrap();
    let recipe_dir = cache.path().join("org__recipes/ente/lane");

    assert_eq!(project.dockerfile().unwrap(), recipe_dir.join("Dockerfile"));
    assert_eq!(
        project.vscode_dockerfile().unwrap(),
        Some(path.join("Dockerfile.vscode"))
    );
    assert_eq!(
        project.vnc_dockerfile().unwrap(),
        Some(recipe_dir.join("Dockerfile.vnc"))
    );

    assert_eq!(
        project.launchers().unwrap(),
        vec!["calibrate", "default", "record"]
    );
    let files = project.launcher_files().unwrap();
    assert_eq!(files["default"], recipe_dir.join("launchers/default.sh"));
    assert_eq!(files["calibrate"], path.join("launchers/calibrate.sh"));
}

#[test]
fn unreachable_recipe_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let project = loader(
        MockVcs::clean("x", "b"),
        Arc::new(MockRecipeClient::new().unreachable()),
        cache.path(),
    )
    .load(&exercise(dir.path()))
    .unwrap();
    assert!(matches!(
        project.ensure_recipe_exists(),
        Err(CoreError::RecipeNotFound(_))
    ));
}

#[test]
fn custom_recipe_dir_is_never_cloned_or_updated() {
    let dir = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let client = recipes();
    let mut project = loader(MockVcs::clean("x", "b"), Arc::clone(&client), cache.path())
        .load(&exercise(dir.path()))
        .unwrap();

    let custom = legacy_project(
        dir.path(),
        "my-recipe",
        &["TYPE=template-ros", "TYPE_VERSION=3", "VERSION=9.9"],
    );
    project.set_recipe_dir(&custom);
    project.ensure_recipe_exists().unwrap();
    assert!(!project.ensure_recipe_updated().unwrap());
    assert!(client.calls().is_empty());
    assert_eq!(project.recipe().unwrap().unwrap().version(), "9.9");

    project.set_recipe_dir(dir.path().join("missing"));
    assert!(matches!(
        project.ensure_recipe_exists(),
        Err(CoreError::RecipeNotFound(_))
    ));
    assert!(client.calls().is_empty());
}

#[test]
fn recipe_version_override_and_update() {
    let dir = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let client = recipes();
    let mut project = loader(MockVcs::clean("x", "b"), Arc::clone(&client), cache.path())
        .load(&exercise(dir.path()))
        .unwrap();
    project.set_recipe_version("daffy");
    assert_eq!(
        project.recipe_dir().unwrap(),
        Some(cache.path().join("org__recipes/daffy/lane"))
    );

    // updating before cloning fails
    assert!(matches!(
        project.ensure_recipe_updated(),
        Err(CoreError::Runtime(_))
    ));
    project.ensure_recipe_exists().unwrap();
    assert!(!project.ensure_recipe_updated().unwrap());
    let ops: Vec<_> = client.calls().iter().map(|c| (c.op, c.branch.clone())).collect();
    assert_eq!(
        ops,
        vec![
            ("update", "daffy".to_owned()),
            ("clone", "daffy".to_owned()),
            ("update", "daffy".to_owned()),
        ]
    );
}

#[test]
fn layered_exercise_reads_recipe_layer_and_expands_packages() {
    let dir = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let path = layered_project(dir.path(), "ex", "template-exercise", "4");
    write(
        &path,
        "dtproject/recipe.yaml",
        "repository: org/recipes\nbranch: ente\nlocation: lane\n",
    );
    std::fs::create_dir_all(path.join("packages/a")).unwrap();
    std::fs::create_dir_all(path.join("packages/b")).unwrap();

    let project = loader(MockVcs::clean("x", "b"), recipes(), cache.path())
        .load(&path)
        .unwrap();
    assert_eq!(
        project.recipe_dir().unwrap(),
        Some(cache.path().join("org__recipes/ente/lane"))
    );

    let code = project.code_paths(Some(Path::new("/mnt/ex"))).unwrap();
    assert_eq!(
        code,
        vec![
            PathMapping {
                local: PathBuf::from("/mnt/ex/packages/a"),
                destination: "/code/catkin_ws/src/ex/packages/a".to_owned(),
            },
            PathMapping {
                local: PathBuf::from("/mnt/ex/packages/b"),
                destination: "/code/catkin_ws/src/ex/packages/b".to_owned(),
            },
        ]
    );
    assert_eq!(
        project.path_resolver("ex").paths(ArtifactKind::Launch, None).unwrap().len(),
        1
    );
    assert_eq!(project.docs_path().unwrap(), path.join("docs"));
}

#[test]
fn layered_exercise_without_recipe_layer_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let path = layered_project(dir.path(), "ex", "template-exercise", "4");
    let err = loader(MockVcs::clean("x", "b"), recipes(), cache.path())
        .load(&path)
        .err()
        .unwrap();
    assert!(err.is_invalid_descriptor(), "{err}");
}

#[test]
fn projects_without_recipe() {
    let dir = tempfile::tempdir().unwrap();
    let path = legacy_project(
        dir.path(),
        "plain",
        &["TYPE=template-basic", "TYPE_VERSION=1", "VERSION=1"],
    );
    let project = loader(MockVcs::clean("x", "b"), recipes(), Path::new("/unused"))
        .load(&path)
        .unwrap();
    assert!(!project.needs_recipe());
    assert_eq!(project.recipe_dir().unwrap(), None);
    assert!(project.recipe().unwrap().is_none());
    project.ensure_recipe_exists().unwrap();
    assert!(!project.ensure_recipe_updated().unwrap());
    assert_eq!(project.dockerfile().unwrap(), path.join("Dockerfile"));
    assert_eq!(project.vscode_dockerfile().unwrap(), None);
    assert!(project.launchers().unwrap_err().is_not_implemented());
    assert!(project.configurations().unwrap_err().is_not_implemented());
}

#[cfg(unix)]
#[test]
fn executable_files_count_as_launchers() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = legacy_project(
        dir.path(),
        "plain",
        &["TYPE=template-basic", "TYPE_VERSION=2", "VERSION=1"],
    );
    write(&path, "launchers/run.py", "print('hi')\n");
    write(&path, "launchers/data.txt", "x\n");
    let run = path.join("launchers/run.py");
    std::fs::set_permissions(&run, std::fs::Permissions::from_mode(0o755)).unwrap();

    let project = loader(MockVcs::clean("x", "b"), recipes(), Path::new("/unused"))
        .load(&path)
        .unwrap();
    assert_eq!(project.launchers().unwrap(), vec!["run"]);
}

#[test]
fn configurations_for_template_v2() {
    let dir = tempfile::tempdir().unwrap();
    let path = legacy_project(
        dir.path(),
        "plain",
        &["TYPE=template-basic", "TYPE_VERSION=2", "VERSION=1"],
    );
    let project = loader(MockVcs::clean("x", "b"), recipes(), Path::new("/unused"))
        .load(&path)
        .unwrap();
    assert!(project.configurations().unwrap().is_empty());

    write(&path, "configurations.yaml", "robot:\n  description: On robot\n");
    assert_eq!(project.configuration("robot").unwrap()["description"], "On robot");
    assert!(matches!(
        project.configuration("desk"),
        Err(CoreError::Usage(_))
    ));
}
