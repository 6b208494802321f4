pub mod paths {
    use std::path::PathBuf;

    #[cfg(not(feature = "local_paths"))]
    pub fn base_path() -> PathBuf {
        dirs::preference_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tmenu")
    }

    #[cfg(feature = "local_paths")]
    pub fn base_path() -> PathBuf {
        PathBuf::from("./tmenu")
    }

    pub fn settings_path() -> PathBuf {
        base_path().join("settings.json5")
    }
}
