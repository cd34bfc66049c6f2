use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use directories::ProjectDirs;

struct Directories {
    config_file: PathBuf,
}

static DIRECTORIES: LazyLock<Option<Directories>> = LazyLock::new(|| {
    let project_dirs = ProjectDirs::from("org", "mhf-launcher", "launcher-client")?;
    let config_file = project_dirs.config_dir().join("client.json");

    Some(Directories { config_file })
});

pub fn config_file() -> Option<&'static Path> {
    DIRECTORIES.as_ref().map(|dirs| dirs.config_file.as_path())
}
